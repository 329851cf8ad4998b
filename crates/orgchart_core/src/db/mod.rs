//! Chart database: the single `kv_blobs` table behind `SqliteBlobStore`.
//!
//! The org chart persists as whole JSON values keyed by storage key, so
//! the schema is one key/value table plus an `updated_at` stamp. Nothing
//! here knows about members; record-level repair lives in `store::migrate`.
//!
//! # Invariants
//! - `PRAGMA user_version` equals the last applied entry in `migrations`.
//! - `SqliteBlobStore::try_new` refuses a connection whose version differs
//!   from `migrations::latest_version()`.
//! - A database written by a newer build is never downgraded or touched.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or upgrading the chart database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement or could not open the file.
    Sqlite(rusqlite::Error),
    /// The directory meant to hold the chart database could not be created.
    CreateDirectory {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// The blob table was written by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "chart database error: {err}"),
            Self::CreateDirectory { dir, source } => {
                write!(f, "cannot create chart database directory {}: {source}", dir.display())
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "kv_blobs schema version {db_version} was written by a newer build (this build knows up to {latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDirectory { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Reads the blob schema version recorded on `conn` (0 for a fresh file).
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{open_db_in_memory, schema_version, DbError};
    use crate::db::migrations::latest_version;
    use rusqlite::Connection;
    use std::path::PathBuf;

    #[test]
    fn fresh_connection_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn opened_database_is_at_latest_blob_schema() {
        let conn = open_db_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn messages_name_the_chart_database() {
        let newer = DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 2,
        };
        assert!(newer.to_string().starts_with("kv_blobs schema version 9"));

        let dir = DbError::CreateDirectory {
            dir: PathBuf::from("/charts/team"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let text = dir.to_string();
        assert!(text.contains("/charts/team"));
        assert!(text.contains("denied"));
    }
}
