//! SQLite file holding the persisted collections.
//!
//! # Responsibility
//! - Open the database behind `SqliteKvRepository` and bring its schema up
//!   to date.
//!
//! # Invariants
//! - One table, `kv_entries(key, value, updated_at)`, holds one row per
//!   storage key (`routine_items_v1`, `todo_items_v1`,
//!   `brain_dump_text_v1`); values are opaque codec bytes.
//! - No row is read or written before the schema steps have run.
//! - A file stamped with a newer `user_version` is refused rather than
//!   rewritten by an older binary.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// File name hosts use when they do not pick their own.
pub const DEFAULT_DB_FILE_NAME: &str = "routine.sqlite3";

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file is newer than this binary understands.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "storage database error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "storage schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
