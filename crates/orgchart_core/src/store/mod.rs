//! Record store: blob persistence, seed data and record-level migration.
//!
//! # Responsibility
//! - Define the key-value blob contract and its SQLite/in-memory backends.
//! - Load and save the whole member collection as one JSON blob.
//! - Self-heal stale or corrupted data without surfacing it to the user.
//!
//! # Invariants
//! - Writes always replace the whole collection; there are no partial patches.
//! - `migrate` is a fixed point on its own output.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod blob_store;
pub mod member_store;
pub mod migrate;
pub mod photos;
pub mod seed;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from blob persistence and member (de)serialization.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Member collection could not be encoded.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "blob store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::Encode(err) => write!(f, "failed to encode members: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::Encode(err) => Some(err),
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
