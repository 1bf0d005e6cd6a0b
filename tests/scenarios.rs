use chrono::NaiveDate;
use cinegraph::*;

fn init() -> Directory<sled::Db> {
    let _ = env_logger::builder().is_test(true).try_init();
    Directory::open(&Config::temporary()).unwrap()
}

fn user(dir: &Directory<sled::Db>, login: &str) -> User {
    dir.create_user(UserDraft {
        email: format!("{}@mail.ru", login),
        login: login.to_owned(),
        name: Some(String::new()),
        birthday: NaiveDate::from_ymd_opt(1976, 9, 20).unwrap(),
    })
    .unwrap()
}

fn film(dir: &Directory<sled::Db>, name: &str) -> Film {
    dir.create_film(FilmDraft {
        name: name.to_owned(),
        description: "adipisicing".to_owned(),
        release_date: NaiveDate::from_ymd_opt(1967, 3, 25).unwrap(),
        duration: 100,
        mpa: 1,
        genres: vec![],
    })
    .unwrap()
}

fn ids(users: &[User]) -> Vec<UserId> {
    users.iter().map(|u| u.id).collect()
}

#[test]
fn friendship_lifecycle() {
    let dir = init();
    let u1 = user(&dir, "u1");
    let u2 = user(&dir, "u2");
    let u3 = user(&dir, "u3");
    assert_eq!(u1.name, "u1");

    assert_eq!(dir.add_friend(u1.id, u2.id).unwrap(), FriendshipStatus::Pending);
    assert_eq!(ids(&dir.get_friends(u1.id).unwrap()), vec![u2.id]);
    assert!(dir.get_friends(u2.id).unwrap().is_empty());

    assert_eq!(dir.add_friend(u2.id, u1.id).unwrap(), FriendshipStatus::Confirmed);
    assert_eq!(ids(&dir.get_friends(u1.id).unwrap()), vec![u2.id]);
    assert_eq!(ids(&dir.get_friends(u2.id).unwrap()), vec![u1.id]);
    assert_eq!(dir.friendships().edge_count(), 1);

    dir.add_friend(u3.id, u1.id).unwrap();
    dir.add_friend(u3.id, u2.id).unwrap();
    assert!(dir.get_common_friends(u1.id, u2.id).unwrap().is_empty());
    dir.add_friend(u1.id, u3.id).unwrap();
    dir.add_friend(u2.id, u3.id).unwrap();
    assert_eq!(ids(&dir.get_common_friends(u1.id, u2.id).unwrap()), vec![u3.id]);
    assert_eq!(ids(&dir.get_common_friends(u1.id, u3.id).unwrap()), vec![u2.id]);

    dir.remove_friend(u1.id, u2.id).unwrap();
    dir.remove_friend(u1.id, u2.id).unwrap();
    assert_eq!(ids(&dir.get_friends(u1.id).unwrap()), vec![u3.id]);
    assert_eq!(ids(&dir.get_friends(u2.id).unwrap()), vec![u3.id]);
    assert_eq!(dir.friendships().edge_count(), 2);
}

#[test]
fn self_friendship_is_invalid() {
    let dir = init();
    let u1 = user(&dir, "u1");
    match dir.add_friend(u1.id, u1.id) {
        Err(Error::InvalidOperation(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
    assert!(dir.get_friends(u1.id).unwrap().is_empty());
}

#[test]
fn popular_films() {
    let dir = init();
    let users: Vec<_> = (0..3).map(|i| user(&dir, &format!("u{}", i))).collect();
    let f1 = film(&dir, "F1");
    let f2 = film(&dir, "F2");
    let f3 = film(&dir, "F3");
    dir.add_like(f2.id, users[0].id).unwrap();
    dir.add_like(f2.id, users[1].id).unwrap();
    dir.add_like(f3.id, users[2].id).unwrap();
    dir.add_like(f3.id, users[2].id).unwrap();

    assert_eq!(dir.get_popular_films(2).unwrap(), vec![f2.clone(), f3.clone()]);
    assert_eq!(
        dir.get_popular_films(0).unwrap(),
        vec![f2.clone(), f3.clone(), f1.clone()]
    );
    assert_eq!(dir.get_popular_films(-1).unwrap().len(), 3);
    assert_eq!(dir.get_popular_films(100).unwrap().len(), 3);

    dir.remove_like(f2.id, users[0].id).unwrap();
    dir.remove_like(f2.id, users[1].id).unwrap();
    // f1 and f2 now tie at zero and keep creation order
    assert_eq!(dir.get_popular_films(3).unwrap(), vec![f3, f1, f2]);
}

#[test]
fn popular_is_non_increasing() {
    let dir = init();
    let users: Vec<_> = (0..6).map(|i| user(&dir, &format!("u{}", i))).collect();
    let films: Vec<_> = (0..12).map(|i| film(&dir, &format!("F{}", i))).collect();
    for (i, f) in films.iter().enumerate() {
        for u in users.iter().take((i * 7) % 6) {
            dir.add_like(f.id, u.id).unwrap();
        }
    }
    let popular = dir.get_popular_films(0).unwrap();
    assert_eq!(popular.len(), 10);
    let counts: Vec<u64> = popular
        .iter()
        .map(|f| dir.like_ledger().like_count(f.id).unwrap())
        .collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]), "{:?}", counts);
}

#[test]
fn entities_round_trip_through_updates() {
    let dir = init();
    let u = user(&dir, "dolore");
    let updated = dir
        .update_user(
            u.id,
            UserDraft {
                email: "mail@yandex.ru".to_owned(),
                login: "doloreUpdate".to_owned(),
                name: Some("est adipisicing".to_owned()),
                birthday: NaiveDate::from_ymd_opt(1976, 9, 20).unwrap(),
            },
        )
        .unwrap();
    assert_eq!(dir.get_user(u.id).unwrap(), updated);
    assert_eq!(dir.all_users().unwrap(), vec![updated]);

    let f = film(&dir, "nisi eiusmod");
    let changed = dir
        .update_film(
            f.id,
            FilmDraft {
                name: "Film Updated".to_owned(),
                description: "New film update decription".to_owned(),
                release_date: NaiveDate::from_ymd_opt(1989, 4, 17).unwrap(),
                duration: 190,
                mpa: 5,
                genres: vec![2, 1, 2],
            },
        )
        .unwrap();
    assert_eq!(changed.mpa.name, "NC-17");
    assert_eq!(
        changed.genres.iter().map(|g| g.id).collect::<Vec<_>>(),
        vec![1, 2]
    );
    assert_eq!(dir.get_film(f.id).unwrap(), changed);
    assert!(dir.get_film(f.id + 1).unwrap_err().is_not_found());
}
