use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_POPULAR_COUNT: usize = 10;

/// Storage and ranking settings.
///
/// Deserializable so the embedding application can load it from whatever
/// format it already uses for its own settings.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// Database directory. `None` opens a temporary database that is
    /// removed when dropped.
    pub path: Option<PathBuf>,
    pub cache_capacity: Option<u64>,
    pub flush_every_ms: Option<u64>,
    /// Result size used by the popularity ranking when the caller asks
    /// for zero or a negative number of films.
    pub popular_default: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            path: None,
            cache_capacity: None,
            flush_every_ms: None,
            popular_default: DEFAULT_POPULAR_COUNT,
        }
    }
}

impl Config {
    pub fn temporary() -> Self {
        Config::default()
    }

    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Config {
            path: Some(path.into()),
            ..Config::default()
        }
    }

    pub fn open(&self) -> Result<sled::Db> {
        let mut config = match &self.path {
            Some(path) => sled::Config::new().path(path),
            None => sled::Config::new().temporary(true),
        };
        if let Some(capacity) = self.cache_capacity {
            config = config.cache_capacity(capacity);
        }
        config = config.flush_every_ms(self.flush_every_ms);
        log::debug!("opening database: {:?}", self);
        Ok(config.open()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_temporary_with_ten_popular() {
        let config = Config::default();
        assert!(config.path.is_none());
        assert_eq!(config.popular_default, 10);
    }

    #[test]
    fn temporary_config_opens() {
        let db = Config::temporary().open().unwrap();
        db.insert(b"k", b"v".as_ref()).unwrap();
        assert!(db.contains_key(b"k").unwrap());
    }
}
