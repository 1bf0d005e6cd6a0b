//! Use-case layer over the entity store, the friendship graph, the like
//! ledger and the ranking engine. Every call resolves the identifiers it
//! is given before delegating, so unknown ids fail with `NotFound` before
//! any relationship state is touched.

use crate::catalog;
use crate::config::Config;
use crate::database::EntityStore;
use crate::error::Result;
use crate::friendship::FriendshipGraph;
use crate::likes::LikeLedger;
use crate::model::*;
use crate::ranking::RankingEngine;
use std::collections::BTreeSet;

pub struct Directory<S> {
    store: S,
    friends: FriendshipGraph<S>,
    likes: LikeLedger<S>,
    ranking: RankingEngine,
}

impl Directory<sled::Db> {
    /// Opens the database described by `config` and keeps entities and
    /// relationships in it.
    pub fn open(config: &Config) -> Result<Self> {
        let db = config.open()?;
        Directory::new(db.clone(), &db, config)
    }
}

impl<S: EntityStore + Clone> Directory<S> {
    /// Entities live in `store`; friendships and likes live in `db`.
    pub fn new(store: S, db: &sled::Db, config: &Config) -> Result<Self> {
        Ok(Directory {
            friends: FriendshipGraph::open(store.clone(), db)?,
            likes: LikeLedger::open(store.clone(), db)?,
            ranking: RankingEngine::new(config.popular_default),
            store,
        })
    }

    pub fn friendships(&self) -> &FriendshipGraph<S> {
        &self.friends
    }

    pub fn like_ledger(&self) -> &LikeLedger<S> {
        &self.likes
    }

    fn materialize(&self, ids: BTreeSet<UserId>) -> Result<Vec<User>> {
        ids.into_iter()
            .map(|id| self.store.require_user(id))
            .collect()
    }

    pub fn create_user(&self, user: UserDraft) -> Result<User> {
        self.store.add_user(user)
    }

    pub fn update_user(&self, id: UserId, user: UserDraft) -> Result<User> {
        self.store.update_user(id, user)
    }

    pub fn get_user(&self, id: UserId) -> Result<User> {
        self.store.require_user(id)
    }

    pub fn all_users(&self) -> Result<Vec<User>> {
        self.store.all_users()
    }

    pub fn create_film(&self, film: FilmDraft) -> Result<Film> {
        self.store.add_film(film)
    }

    pub fn update_film(&self, id: FilmId, film: FilmDraft) -> Result<Film> {
        self.store.update_film(id, film)
    }

    pub fn get_film(&self, id: FilmId) -> Result<Film> {
        self.store.require_film(id)
    }

    pub fn all_films(&self) -> Result<Vec<Film>> {
        self.store.all_films()
    }

    pub fn genres(&self) -> Vec<Genre> {
        catalog::genres()
    }

    pub fn genre(&self, id: u32) -> Result<Genre> {
        catalog::genre(id)
    }

    pub fn ratings(&self) -> Vec<Mpa> {
        catalog::ratings()
    }

    pub fn rating(&self, id: u32) -> Result<Mpa> {
        catalog::rating(id)
    }

    pub fn add_friend(&self, id: UserId, friend_id: UserId) -> Result<FriendshipStatus> {
        self.store.ensure_user(id)?;
        self.store.ensure_user(friend_id)?;
        self.friends.request_friend(id, friend_id)
    }

    pub fn remove_friend(&self, id: UserId, friend_id: UserId) -> Result<()> {
        self.store.ensure_user(id)?;
        self.store.ensure_user(friend_id)?;
        self.friends.break_friend(id, friend_id)
    }

    /// Friends as seen by `id`, in ascending id order.
    pub fn get_friends(&self, id: UserId) -> Result<Vec<User>> {
        self.store.ensure_user(id)?;
        let ids = self.friends.friends_of(id)?;
        self.materialize(ids)
    }

    pub fn get_common_friends(&self, id: UserId, other_id: UserId) -> Result<Vec<User>> {
        self.store.ensure_user(id)?;
        self.store.ensure_user(other_id)?;
        let ids = self.friends.common_friends(id, other_id)?;
        self.materialize(ids)
    }

    /// Returns the users who like the film afterwards.
    pub fn add_like(&self, film_id: FilmId, user_id: UserId) -> Result<Vec<UserId>> {
        self.store.ensure_film(film_id)?;
        self.store.ensure_user(user_id)?;
        self.likes.add_like(film_id, user_id)?;
        self.get_film_likes(film_id)
    }

    /// Returns the users who like the film afterwards.
    pub fn remove_like(&self, film_id: FilmId, user_id: UserId) -> Result<Vec<UserId>> {
        self.store.ensure_film(film_id)?;
        self.store.ensure_user(user_id)?;
        self.likes.remove_like(film_id, user_id)?;
        self.get_film_likes(film_id)
    }

    pub fn get_film_likes(&self, film_id: FilmId) -> Result<Vec<UserId>> {
        self.store.ensure_film(film_id)?;
        Ok(self.likes.likes_of(film_id)?.into_iter().collect())
    }

    /// Most liked films first; see [`RankingEngine::popular`].
    pub fn get_popular_films(&self, count: i64) -> Result<Vec<Film>> {
        Ok(self
            .ranking
            .popular(&self.store, &self.likes, count)?
            .into_iter()
            .map(|ranked| ranked.film)
            .collect())
    }
}
