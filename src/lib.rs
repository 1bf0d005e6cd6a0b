//! Friendship graph, like ledger and popularity ranking for a film
//! catalog, stored in sled.
//!
//! ```
//! use cinegraph::{Config, Directory};
//!
//! let directory = Directory::open(&Config::temporary()).unwrap();
//! assert!(directory.get_popular_films(10).unwrap().is_empty());
//! ```

pub mod catalog;
pub mod config;
pub mod database;
pub mod directory;
pub mod error;
pub mod friendship;
pub mod likes;
pub mod memory;
pub mod model;
pub mod ranking;

pub use config::Config;
pub use database::{EntityStore, FilmDb, UserDb};
pub use directory::Directory;
pub use error::{EntityKind, Error, Result};
pub use friendship::FriendshipGraph;
pub use likes::LikeLedger;
pub use memory::MemoryStore;
pub use model::*;
pub use ranking::{RankedFilm, RankingEngine};
