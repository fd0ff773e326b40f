//! Schema steps for the blob store.
//!
//! # Responsibility
//! - List the schema steps that create and evolve `kv_entries`.
//! - Bring an opened connection up to the newest step in one transaction.
//!
//! # Invariants
//! - Steps are append-only; a shipped step's SQL never changes.
//! - `PRAGMA user_version` equals the last step applied.
//! - `kv_entries.key` stays the primary key; the store relies on upsert by
//!   key to replace a whole collection per write.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(user_version, name, sql)` in apply order.
const STEPS: &[(u32, &str, &str)] = &[(1, "kv_entries", include_str!("0001_kv_entries.sql"))];

/// Newest schema version this binary can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Applies every step newer than the database's `user_version`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file was written by a
///   newer binary.
/// - `DbError::Sqlite` when a step fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let on_disk: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let latest = latest_version();
    if on_disk > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: on_disk,
            latest_supported: latest,
        });
    }

    let pending: Vec<_> = STEPS
        .iter()
        .filter(|(version, _, _)| *version > on_disk)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, name, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        info!("event=db_migrate module=db status=ok version={version} step={name}");
    }
    tx.commit()?;
    Ok(())
}
