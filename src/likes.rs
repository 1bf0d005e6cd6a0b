//! Like ledger: which users like which films.
//!
//! A like is the key `(film, user)` with an empty value, so the key itself
//! is the uniqueness constraint. A per-film counter lives in its own tree
//! and is adjusted in the same transaction only when a like actually
//! appears or disappears.

use crate::database::{
    deserialize_id, in_tx, pair_key, serialize_id, split_pair_key, EntityStore, TxResult, EMPTY,
};
use crate::error::{Error, Result};
use crate::model::{FilmId, UserId};
use log::debug;
use sled::Transactional;
use std::collections::BTreeSet;

const LIKES: &[u8] = b"likes";
const LIKE_COUNTS: &[u8] = b"like_counts";

fn decode_count(bytes: Option<sled::IVec>) -> Result<u64> {
    match bytes {
        Some(bytes) => deserialize_id(bytes),
        None => Ok(0),
    }
}

pub struct LikeLedger<S> {
    store: S,
    likes: sled::Tree,
    counts: sled::Tree,
}

impl<S: EntityStore> LikeLedger<S> {
    pub fn open(store: S, db: &sled::Db) -> Result<Self> {
        Ok(LikeLedger {
            store,
            likes: db.open_tree(LIKES)?,
            counts: db.open_tree(LIKE_COUNTS)?,
        })
    }

    fn ensure_pair(&self, film: FilmId, user: UserId) -> Result<()> {
        self.store.ensure_film(film)?;
        self.store.ensure_user(user)
    }

    /// Returns `true` when the like is new.
    pub fn add_like(&self, film: FilmId, user: UserId) -> Result<bool> {
        self.ensure_pair(film, user)?;
        let key = pair_key(film, user);
        let film_key = serialize_id(film);
        let added = (&self.likes, &self.counts).transaction(
            |(likes, counts)| -> TxResult<bool> {
                if likes.insert(&key[..], EMPTY)?.is_some() {
                    return Ok(false);
                }
                let count = in_tx(decode_count(counts.get(&film_key[..])?))?;
                counts.insert(&film_key[..], &serialize_id(count + 1)[..])?;
                Ok(true)
            },
        )?;
        if added {
            debug!("user {} likes film {}", user, film);
        } else {
            debug!("user {} already likes film {}", user, film);
        }
        Ok(added)
    }

    /// Returns `true` when a like was removed.
    pub fn remove_like(&self, film: FilmId, user: UserId) -> Result<bool> {
        self.ensure_pair(film, user)?;
        let key = pair_key(film, user);
        let film_key = serialize_id(film);
        let removed = (&self.likes, &self.counts).transaction(
            |(likes, counts)| -> TxResult<bool> {
                if likes.remove(&key[..])?.is_none() {
                    return Ok(false);
                }
                match in_tx(decode_count(counts.get(&film_key[..])?))? {
                    0 => {
                        return in_tx(Err(Error::StoreFailure(
                            "like counter out of step with likes".to_owned(),
                        )))
                    }
                    1 => {
                        counts.remove(&film_key[..])?;
                    }
                    count => {
                        counts.insert(&film_key[..], &serialize_id(count - 1)[..])?;
                    }
                }
                Ok(true)
            },
        )?;
        if removed {
            debug!("user {} no longer likes film {}", user, film);
        } else {
            debug!("user {} did not like film {}", user, film);
        }
        Ok(removed)
    }

    /// Users who like the film.
    pub fn likes_of(&self, film: FilmId) -> Result<BTreeSet<UserId>> {
        self.likes
            .scan_prefix(serialize_id(film))
            .keys()
            .map(|key| -> Result<UserId> { Ok(split_pair_key(key?)?.1) })
            .collect()
    }

    pub fn like_count(&self, film: FilmId) -> Result<u64> {
        decode_count(self.counts.get(serialize_id(film))?)
    }
}
