//! Friendship graph.
//!
//! Every unordered pair of users has at most one edge, stored under the
//! key `(min, max)`. The edge remembers who asked first; a request from
//! the other side confirms it instead of adding a second edge. A secondary
//! index holds `(user, other)` for both endpoints so a user's edges can be
//! found with a prefix scan. Edge and index change together inside one
//! sled transaction, which serializes concurrent requests on the same pair.

use crate::database::{
    in_tx, pair_key, serialize_id, split_pair_key, TxResult, UserDb, EMPTY,
};
use crate::error::{Error, Result};
use crate::model::{Friendship, FriendshipStatus, UserId};
use log::debug;
use sled::Transactional;
use std::collections::BTreeSet;

const FRIENDSHIPS: &[u8] = b"friendships";
const FRIENDSHIP_INDEX: &[u8] = b"friendship_index";

fn edge_key(a: UserId, b: UserId) -> [u8; 16] {
    if a <= b {
        pair_key(a, b)
    } else {
        pair_key(b, a)
    }
}

fn self_reference(action: &str, id: UserId) -> Error {
    Error::InvalidOperation(format!("user {} cannot {} themselves", id, action))
}

pub struct FriendshipGraph<S> {
    users: S,
    edges: sled::Tree,
    index: sled::Tree,
}

impl<S: UserDb> FriendshipGraph<S> {
    pub fn open(users: S, db: &sled::Db) -> Result<Self> {
        Ok(FriendshipGraph {
            users,
            edges: db.open_tree(FRIENDSHIPS)?,
            index: db.open_tree(FRIENDSHIP_INDEX)?,
        })
    }

    /// Records that `from` wants to be friends with `to`.
    ///
    /// Creates a pending edge when the pair has none, confirms a pending
    /// edge that `to` opened earlier, and otherwise leaves the edge as it
    /// is. Returns the status of the pair afterwards.
    pub fn request_friend(&self, from: UserId, to: UserId) -> Result<FriendshipStatus> {
        if from == to {
            return Err(self_reference("befriend", from));
        }
        self.users.ensure_user(from)?;
        self.users.ensure_user(to)?;

        let key = edge_key(from, to);
        let (edge, changed) = (&self.edges, &self.index).transaction(
            |(edges, index)| -> TxResult<(Friendship, bool)> {
                let edge = match edges.get(&key[..])? {
                    None => {
                        index.insert(&pair_key(from, to)[..], EMPTY)?;
                        index.insert(&pair_key(to, from)[..], EMPTY)?;
                        Friendship::pending(from, to)
                    }
                    Some(bytes) => {
                        let edge: Friendship =
                            in_tx(bincode::deserialize(&bytes).map_err(Error::from))?;
                        if edge.confirmed || edge.requester == from {
                            return Ok((edge, false));
                        }
                        Friendship {
                            confirmed: true,
                            ..edge
                        }
                    }
                };
                let bytes = in_tx(bincode::serialize(&edge).map_err(Error::from))?;
                edges.insert(&key[..], bytes)?;
                Ok((edge, true))
            },
        )?;

        if changed {
            debug!(
                "friendship {} -> {} is now {:?}",
                edge.requester,
                edge.target,
                edge.status()
            );
        } else {
            debug!("repeated friend request from user {} to user {}", from, to);
        }
        Ok(edge.status())
    }

    /// Removes whatever edge joins the pair. Removing a missing edge is
    /// not an error.
    pub fn break_friend(&self, a: UserId, b: UserId) -> Result<()> {
        self.users.ensure_user(a)?;
        self.users.ensure_user(b)?;
        if a == b {
            return Ok(());
        }

        let key = edge_key(a, b);
        let removed = (&self.edges, &self.index).transaction(
            |(edges, index)| -> TxResult<bool> {
                if edges.remove(&key[..])?.is_none() {
                    return Ok(false);
                }
                index.remove(&pair_key(a, b)[..])?;
                index.remove(&pair_key(b, a)[..])?;
                Ok(true)
            },
        )?;

        if removed {
            debug!("friendship between users {} and {} removed", a, b);
        } else {
            debug!("no friendship between users {} and {} to remove", a, b);
        }
        Ok(())
    }

    /// The edge joining the pair, if any.
    pub fn friendship(&self, a: UserId, b: UserId) -> Result<Option<Friendship>> {
        match self.edges.get(edge_key(a, b))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Users that `user` counts as friends: every confirmed partner plus
    /// everyone `user` has asked and who has not answered yet. The target
    /// of a pending request does not see the requester.
    pub fn friends_of(&self, user: UserId) -> Result<BTreeSet<UserId>> {
        let mut friends = BTreeSet::new();
        for entry in self.index.scan_prefix(serialize_id(user)) {
            let (key, _) = entry?;
            let (_, other) = split_pair_key(&key)?;
            // The edge may have been removed after the index was read.
            if let Some(edge) = self.friendship(user, other)? {
                if edge.visible_to(user) {
                    friends.insert(other);
                }
            }
        }
        Ok(friends)
    }

    pub fn common_friends(&self, a: UserId, b: UserId) -> Result<BTreeSet<UserId>> {
        if a == b {
            return Err(self_reference("compare friends with", a));
        }
        self.users.ensure_user(a)?;
        self.users.ensure_user(b)?;
        let theirs = self.friends_of(b)?;
        Ok(self
            .friends_of(a)?
            .intersection(&theirs)
            .copied()
            .collect())
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of index entries; always twice the edge count when the
    /// graph is at rest.
    #[cfg(test)]
    pub(crate) fn index_len(&self) -> usize {
        self.index.len()
    }
}
