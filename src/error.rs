use log::error;
use sled::transaction::TransactionError;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Film,
    Genre,
    Rating,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::User => "user",
            EntityKind::Film => "film",
            EntityKind::Genre => "genre",
            EntityKind::Rating => "rating",
        })
    }
}

/// Engine-neutral error taxonomy. Storage errors never leak through
/// unchanged; they are logged and collapsed into `StoreFailure`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("store failure: {0}")]
    StoreFailure(String),
}

impl Error {
    pub fn not_found(kind: EntityKind, id: u64) -> Self {
        Error::NotFound { kind, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl From<sled::Error> for Error {
    fn from(err: sled::Error) -> Self {
        error!("sled error: {:?}", err);
        let description = match err {
            sled::Error::Io(_) => "storage I/O failure",
            sled::Error::Corruption { .. } => "storage corruption detected",
            sled::Error::CollectionNotFound(_) => "storage collection missing",
            _ => "storage engine failure",
        };
        Error::StoreFailure(description.to_owned())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        error!("record codec error: {:?}", err);
        Error::StoreFailure("undecodable record".to_owned())
    }
}

impl From<TransactionError<Error>> for Error {
    fn from(err: TransactionError<Error>) -> Self {
        match err {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => e.into(),
        }
    }
}
