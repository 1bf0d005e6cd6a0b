//! Fixed reference data: rating classifications and genre tags.

use crate::error::{EntityKind, Error, Result};
use crate::model::{Genre, Mpa};

const RATINGS: &[(u32, &str, &str)] = &[
    (1, "G", "General audiences, no age restrictions"),
    (2, "PG", "Parental guidance suggested"),
    (3, "PG-13", "Parents strongly cautioned, not for children under 13"),
    (4, "R", "Restricted, under 17 requires accompanying adult"),
    (5, "NC-17", "No one 17 and under admitted"),
];

const GENRES: &[(u32, &str)] = &[
    (1, "Comedy"),
    (2, "Drama"),
    (3, "Animation"),
    (4, "Thriller"),
    (5, "Documentary"),
    (6, "Action"),
];

pub fn ratings() -> Vec<Mpa> {
    RATINGS
        .iter()
        .map(|&(id, name, description)| Mpa {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
        })
        .collect()
}

pub fn rating(id: u32) -> Result<Mpa> {
    ratings()
        .into_iter()
        .find(|mpa| mpa.id == id)
        .ok_or_else(|| Error::not_found(EntityKind::Rating, u64::from(id)))
}

pub fn genres() -> Vec<Genre> {
    GENRES
        .iter()
        .map(|&(id, name)| Genre {
            id,
            name: name.to_owned(),
        })
        .collect()
}

pub fn genre(id: u32) -> Result<Genre> {
    GENRES
        .iter()
        .find(|&&(genre_id, _)| genre_id == id)
        .map(|&(id, name)| Genre {
            id,
            name: name.to_owned(),
        })
        .ok_or_else(|| Error::not_found(EntityKind::Genre, u64::from(id)))
}

/// Resolves genre ids, dropping duplicates and sorting by id.
pub fn resolve_genres(ids: &[u32]) -> Result<Vec<Genre>> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids.into_iter().map(genre).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups() {
        assert_eq!(rating(3).unwrap().name, "PG-13");
        assert_eq!(genre(6).unwrap().name, "Action");
        assert!(rating(9).unwrap_err().is_not_found());
        assert!(genre(0).unwrap_err().is_not_found());
        assert_eq!(ratings().len(), 5);
        assert_eq!(genres().len(), 6);
    }

    #[test]
    fn genres_are_deduplicated_and_sorted() {
        let resolved = resolve_genres(&[4, 1, 4, 2]).unwrap();
        let ids: Vec<u32> = resolved.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn unknown_genre_fails_whole_resolution() {
        match resolve_genres(&[1, 42]) {
            Err(Error::NotFound { kind, id }) => {
                assert_eq!(kind, EntityKind::Genre);
                assert_eq!(id, 42);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
