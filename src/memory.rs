//! Map-backed entity store for embedding and tests. Holds no relationship
//! state; pair it with a sled database for the graph and the ledger.

use crate::database::{resolve_film, FilmDb, UserDb};
use crate::error::{EntityKind, Error, Result};
use crate::model::*;
use log::{info, warn};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Table<T> {
    sequence: AtomicU64,
    rows: RwLock<BTreeMap<u64, T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            sequence: AtomicU64::new(0),
            rows: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<T: Clone> Table<T> {
    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u64, T>>> {
        self.rows
            .read()
            .map_err(|_| Error::StoreFailure("memory store lock poisoned".to_owned()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u64, T>>> {
        self.rows
            .write()
            .map_err(|_| Error::StoreFailure("memory store lock poisoned".to_owned()))
    }

    fn replace(&self, kind: EntityKind, id: u64, row: T) -> Result<()> {
        match self.write()?.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => {
                warn!("{} with id {} not found", kind, id);
                Err(Error::not_found(kind, id))
            }
        }
    }
}

/// Cheap to clone; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<Table<User>>,
    films: Arc<Table<Film>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl UserDb for MemoryStore {
    fn add_user(&self, user: UserDraft) -> Result<User> {
        let user = user.into_user(self.users.next_id());
        self.users.write()?.insert(user.id, user.clone());
        info!("user {} created with login {:?}", user.id, user.login);
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.read()?.get(&id).cloned())
    }

    fn update_user(&self, id: UserId, user: UserDraft) -> Result<User> {
        let user = user.into_user(id);
        self.users.replace(EntityKind::User, id, user.clone())?;
        Ok(user)
    }

    fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read()?.values().cloned().collect())
    }

    fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.users.read()?.contains_key(&id))
    }
}

impl FilmDb for MemoryStore {
    fn add_film(&self, film: FilmDraft) -> Result<Film> {
        let film = resolve_film(0, film)?;
        let film = Film {
            id: self.films.next_id(),
            ..film
        };
        self.films.write()?.insert(film.id, film.clone());
        info!("film {} created: {:?}", film.id, film.name);
        Ok(film)
    }

    fn get_film(&self, id: FilmId) -> Result<Option<Film>> {
        Ok(self.films.read()?.get(&id).cloned())
    }

    fn update_film(&self, id: FilmId, film: FilmDraft) -> Result<Film> {
        let film = resolve_film(id, film)?;
        self.films.replace(EntityKind::Film, id, film.clone())?;
        Ok(film)
    }

    fn all_films(&self) -> Result<Vec<Film>> {
        Ok(self.films.read()?.values().cloned().collect())
    }

    fn film_exists(&self, id: FilmId) -> Result<bool> {
        Ok(self.films.read()?.contains_key(&id))
    }
}
