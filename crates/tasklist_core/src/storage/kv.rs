//! Key-value store contract.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a key-value medium.
#[derive(Debug)]
pub enum StoreError {
    /// Backing database failure.
    Db(DbError),
    /// Write would exceed the medium's capacity.
    QuotaExceeded { limit: usize, requested: usize },
    /// Medium refuses the operation (disabled, sandboxed, read-only).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded { limit, requested } => write!(
                f,
                "storage quota exceeded: {requested} bytes requested, limit is {limit}"
            ),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value medium.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removing a missing key succeeds.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
