use chrono::NaiveDate;
use cinegraph::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn directory_with_users(n: usize) -> Arc<Directory<sled::Db>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = Directory::open(&Config::temporary()).unwrap();
    for i in 0..n {
        dir.create_user(UserDraft {
            email: format!("user{}@example.com", i),
            login: format!("user{}", i),
            name: None,
            birthday: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        })
        .unwrap();
    }
    Arc::new(dir)
}

#[test]
fn opposite_requests_racing_leave_one_confirmed_edge() {
    let pairs = 20u64;
    let dir = directory_with_users(2 * pairs as usize);
    let barrier = Arc::new(Barrier::new(2 * pairs as usize));
    let mut handles = Vec::new();
    for p in 0..pairs {
        let (a, b) = (2 * p + 1, 2 * p + 2);
        for &(from, to) in &[(a, b), (b, a)] {
            let dir = Arc::clone(&dir);
            let barrier = Arc::clone(&barrier);
            handles.push(thread::spawn(move || {
                barrier.wait();
                dir.add_friend(from, to).unwrap()
            }));
        }
    }
    let statuses: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(dir.friendships().edge_count(), pairs as usize);
    for p in 0..pairs {
        let (a, b) = (2 * p + 1, 2 * p + 2);
        let edge = dir.friendships().friendship(a, b).unwrap().unwrap();
        assert!(edge.confirmed);
        // exactly one of the two racers created the edge
        let pair_statuses = &statuses[2 * p as usize..2 * p as usize + 2];
        assert!(pair_statuses.contains(&FriendshipStatus::Pending));
        assert!(pair_statuses.contains(&FriendshipStatus::Confirmed));
        assert_eq!(dir.friendships().friends_of(a).unwrap().len(), 1);
        assert_eq!(dir.friendships().friends_of(b).unwrap().len(), 1);
    }
}

#[test]
fn duplicate_likes_racing_count_once() {
    let dir = directory_with_users(8);
    let film = dir
        .create_film(FilmDraft {
            name: "Heat".to_owned(),
            description: "crime".to_owned(),
            release_date: NaiveDate::from_ymd_opt(1995, 12, 15).unwrap(),
            duration: 170,
            mpa: 4,
            genres: vec![4, 6],
        })
        .unwrap();
    let film_id = film.id;
    let barrier = Arc::new(Barrier::new(16));
    let handles: Vec<_> = (0..16u64)
        .map(|i| {
            let dir = Arc::clone(&dir);
            let barrier = Arc::clone(&barrier);
            // two threads per user
            let user = i / 2 + 1;
            thread::spawn(move || {
                barrier.wait();
                dir.add_like(film_id, user).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(dir.like_ledger().like_count(film_id).unwrap(), 8);
    assert_eq!(dir.get_film_likes(film_id).unwrap(), (1..=8).collect::<Vec<_>>());
}
