//! Persistence adapter layer.
//!
//! # Responsibility
//! - Define the key/value byte storage contract the store persists through.
//! - Isolate SQLite details from store and codec logic.
//!
//! # Invariants
//! - Adapters are synchronous and process-local.
//! - Adapters never interpret the bytes they store.

pub mod kv_repo;
