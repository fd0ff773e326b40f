//! Key/value blob repository contracts and implementations.
//!
//! # Responsibility
//! - Provide durable byte storage addressed by stable string keys.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set` replaces the whole value for a key; there are no partial writes.
//! - `get` on a key that was never written returns `Ok(None)`, not an error.

use crate::db::{open_db, open_db_in_memory, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for blob reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidKey(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidKey(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable byte storage keyed by string.
pub trait KvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> RepoResult<()>;
}

impl<R: KvRepository + ?Sized> KvRepository for Box<R> {
    fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        (**self).set(key, value)
    }
}

fn validate_key(key: &str) -> RepoResult<()> {
    if key.trim().is_empty() {
        return Err(RepoError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// SQLite-backed blob repository.
///
/// Owns its connection so the store can move it onto a worker thread.
pub struct SqliteKvRepository {
    conn: Connection,
}

impl SqliteKvRepository {
    /// Wraps a connection that already went through `open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvRepository for SqliteKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, Vec<u8>>,
    writes: Vec<String>,
}

/// Process-local blob repository.
///
/// Clones share the same map, so a test can keep one handle while the store
/// owns another and inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKvRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryKvRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value without counting it as a write.
    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        self.lock().entries.insert(key.to_string(), value.into());
    }

    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().entries.get(key).cloned()
    }

    /// Total number of `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Number of `set` calls for one key.
    pub fn writes_for(&self, key: &str) -> usize {
        self.lock().writes.iter().filter(|k| k.as_str() == key).count()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KvRepository for InMemoryKvRepository {
    fn get(&self, key: &str) -> RepoResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: &[u8]) -> RepoResult<()> {
        validate_key(key)?;
        let mut state = self.lock();
        state.entries.insert(key.to_string(), value.to_vec());
        state.writes.push(key.to_string());
        Ok(())
    }
}
