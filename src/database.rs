use crate::catalog;
use crate::error::{EntityKind, Error, Result};
use crate::model::*;
use log::{info, warn};
use sled::transaction::{abort, ConflictableTransactionError, ConflictableTransactionResult};
use std::convert::TryInto;

// Ids are big-endian so tree iteration is in ascending id order and
// pair keys can be prefix-scanned by their first component.
pub(crate) fn serialize_id(id: u64) -> [u8; 8] {
    id.to_be_bytes()
}

pub(crate) fn deserialize_id<V: AsRef<[u8]>>(id: V) -> Result<u64> {
    let bytes: [u8; 8] = id
        .as_ref()
        .try_into()
        .map_err(|_| Error::StoreFailure("malformed id key".to_owned()))?;
    Ok(u64::from_be_bytes(bytes))
}

pub(crate) fn pair_key(first: u64, second: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&serialize_id(first));
    key[8..].copy_from_slice(&serialize_id(second));
    key
}

pub(crate) const EMPTY: &[u8] = &[];

pub(crate) type TxResult<T> = ConflictableTransactionResult<T, Error>;

/// Lifts a crate result into a transaction body, aborting on error.
pub(crate) fn in_tx<T>(result: Result<T>) -> TxResult<T> {
    result.map_err(ConflictableTransactionError::Abort)
}

pub(crate) fn split_pair_key<V: AsRef<[u8]>>(key: V) -> Result<(u64, u64)> {
    let key = key.as_ref();
    if key.len() != 16 {
        return Err(Error::StoreFailure("malformed pair key".to_owned()));
    }
    Ok((deserialize_id(&key[..8])?, deserialize_id(&key[8..])?))
}

/// Entity store for users.
pub trait UserDb {
    fn add_user(&self, user: UserDraft) -> Result<User>;
    fn get_user(&self, id: UserId) -> Result<Option<User>>;
    /// Fails with `NotFound` when no user has this id.
    fn update_user(&self, id: UserId, user: UserDraft) -> Result<User>;
    fn all_users(&self) -> Result<Vec<User>>;
    fn user_exists(&self, id: UserId) -> Result<bool>;

    fn require_user(&self, id: UserId) -> Result<User> {
        self.get_user(id)?.ok_or_else(|| {
            warn!("user with id {} not found", id);
            Error::not_found(EntityKind::User, id)
        })
    }

    fn ensure_user(&self, id: UserId) -> Result<()> {
        if self.user_exists(id)? {
            Ok(())
        } else {
            warn!("user with id {} not found", id);
            Err(Error::not_found(EntityKind::User, id))
        }
    }
}

/// Entity store for films.
pub trait FilmDb {
    fn add_film(&self, film: FilmDraft) -> Result<Film>;
    fn get_film(&self, id: FilmId) -> Result<Option<Film>>;
    /// Fails with `NotFound` when no film has this id.
    fn update_film(&self, id: FilmId, film: FilmDraft) -> Result<Film>;
    /// All films in ascending id order.
    fn all_films(&self) -> Result<Vec<Film>>;
    fn film_exists(&self, id: FilmId) -> Result<bool>;

    fn require_film(&self, id: FilmId) -> Result<Film> {
        self.get_film(id)?.ok_or_else(|| {
            warn!("film with id {} not found", id);
            Error::not_found(EntityKind::Film, id)
        })
    }

    fn ensure_film(&self, id: FilmId) -> Result<()> {
        if self.film_exists(id)? {
            Ok(())
        } else {
            warn!("film with id {} not found", id);
            Err(Error::not_found(EntityKind::Film, id))
        }
    }
}

/// Everything the relationship and ranking engine needs from its store.
pub trait EntityStore: UserDb + FilmDb {}

impl<T: UserDb + FilmDb> EntityStore for T {}

pub(crate) fn resolve_film(id: FilmId, film: FilmDraft) -> Result<Film> {
    Ok(Film {
        id,
        mpa: catalog::rating(film.mpa)?,
        genres: catalog::resolve_genres(&film.genres)?,
        name: film.name,
        description: film.description,
        release_date: film.release_date,
        duration: film.duration,
    })
}

const USERS: &[u8] = b"users";
const FILMS: &[u8] = b"films";
const SEQUENCES: &[u8] = b"sequences";

trait SequenceExt {
    fn next_id(&self, sequence: &[u8]) -> Result<u64>;
}

impl SequenceExt for sled::Db {
    fn next_id(&self, sequence: &[u8]) -> Result<u64> {
        let sequences = self.open_tree(SEQUENCES)?;
        let next = sequences.update_and_fetch(sequence, |old| {
            let current = old
                .and_then(|bytes| bytes.try_into().ok())
                .map(u64::from_be_bytes)
                .unwrap_or(0);
            Some(serialize_id(current + 1).to_vec())
        })?;
        match next {
            Some(id) => deserialize_id(id),
            None => Err(Error::StoreFailure("sequence vanished".to_owned())),
        }
    }
}

fn replace_existing<T: serde::Serialize>(
    tree: &sled::Tree,
    kind: EntityKind,
    id: u64,
    record: &T,
) -> Result<()> {
    let bytes = bincode::serialize(record)?;
    tree.transaction(|tree| -> TxResult<()> {
        if tree.get(serialize_id(id))?.is_none() {
            return abort(Error::not_found(kind, id));
        }
        tree.insert(&serialize_id(id)[..], bytes.as_slice())?;
        Ok(())
    })?;
    Ok(())
}

fn decode_all<T: serde::de::DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>> {
    tree.iter()
        .values()
        .map(|value| -> Result<T> { Ok(bincode::deserialize(&value?)?) })
        .collect()
}

impl UserDb for sled::Db {
    fn add_user(&self, user: UserDraft) -> Result<User> {
        let users = self.open_tree(USERS)?;
        let user = user.into_user(self.next_id(USERS)?);
        users.insert(&serialize_id(user.id), bincode::serialize(&user)?)?;
        info!("user {} created with login {:?}", user.id, user.login);
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.open_tree(USERS)?;
        match users.get(serialize_id(id))? {
            Some(d) => Ok(Some(bincode::deserialize(&d)?)),
            None => Ok(None),
        }
    }

    fn update_user(&self, id: UserId, user: UserDraft) -> Result<User> {
        let users = self.open_tree(USERS)?;
        let user = user.into_user(id);
        if let Err(err) = replace_existing(&users, EntityKind::User, id, &user) {
            if err.is_not_found() {
                warn!("user with id {} not found", id);
            }
            return Err(err);
        }
        Ok(user)
    }

    fn all_users(&self) -> Result<Vec<User>> {
        decode_all(&self.open_tree(USERS)?)
    }

    fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.open_tree(USERS)?.contains_key(serialize_id(id))?)
    }
}

impl FilmDb for sled::Db {
    fn add_film(&self, film: FilmDraft) -> Result<Film> {
        let films = self.open_tree(FILMS)?;
        // Resolve before taking an id so a bad rating does not burn one.
        let film = resolve_film(0, film)?;
        let film = Film {
            id: self.next_id(FILMS)?,
            ..film
        };
        films.insert(&serialize_id(film.id), bincode::serialize(&film)?)?;
        info!("film {} created: {:?}", film.id, film.name);
        Ok(film)
    }

    fn get_film(&self, id: FilmId) -> Result<Option<Film>> {
        let films = self.open_tree(FILMS)?;
        match films.get(serialize_id(id))? {
            Some(d) => Ok(Some(bincode::deserialize(&d)?)),
            None => Ok(None),
        }
    }

    fn update_film(&self, id: FilmId, film: FilmDraft) -> Result<Film> {
        let films = self.open_tree(FILMS)?;
        let film = resolve_film(id, film)?;
        if let Err(err) = replace_existing(&films, EntityKind::Film, id, &film) {
            if err.is_not_found() {
                warn!("film with id {} not found", id);
            }
            return Err(err);
        }
        Ok(film)
    }

    fn all_films(&self) -> Result<Vec<Film>> {
        decode_all(&self.open_tree(FILMS)?)
    }

    fn film_exists(&self, id: FilmId) -> Result<bool> {
        Ok(self.open_tree(FILMS)?.contains_key(serialize_id(id))?)
    }
}
