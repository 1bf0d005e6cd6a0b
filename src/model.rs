use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type FilmId = u64;

/// Stored user record. Friendships live in the friendship graph, not here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: NaiveDate,
}

/// User fields supplied by the caller on create or update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub birthday: NaiveDate,
}

impl UserDraft {
    /// A blank or missing display name falls back to the login.
    pub fn into_user(self, id: UserId) -> User {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.login.clone(),
        };
        User {
            id,
            email: self.email,
            login: self.login,
            name,
            birthday: self.birthday,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Motion-picture rating classification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mpa {
    pub id: u32,
    pub name: String,
    pub description: String,
}

/// Stored film record. Likes live in the like ledger, not here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Film {
    pub id: FilmId,
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    /// Runtime in minutes.
    pub duration: u32,
    pub mpa: Mpa,
    /// Sorted by id, no duplicates.
    pub genres: Vec<Genre>,
}

/// Film fields supplied by the caller; rating and genres are given by id
/// and resolved against the reference catalog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilmDraft {
    pub name: String,
    pub description: String,
    pub release_date: NaiveDate,
    pub duration: u32,
    pub mpa: u32,
    #[serde(default)]
    pub genres: Vec<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipStatus {
    Pending,
    Confirmed,
}

/// The single canonical record for an unordered pair of users.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Friendship {
    pub requester: UserId,
    pub target: UserId,
    pub confirmed: bool,
}

impl Friendship {
    pub fn pending(requester: UserId, target: UserId) -> Self {
        Friendship {
            requester,
            target,
            confirmed: false,
        }
    }

    pub fn status(&self) -> FriendshipStatus {
        if self.confirmed {
            FriendshipStatus::Confirmed
        } else {
            FriendshipStatus::Pending
        }
    }

    pub fn other(&self, user: UserId) -> UserId {
        if self.requester == user {
            self.target
        } else {
            self.requester
        }
    }

    /// Whether `user` counts `other()` among their friends: always once
    /// confirmed, and for the requester while still pending.
    pub fn visible_to(&self, user: UserId) -> bool {
        self.confirmed || self.requester == user
    }
}
