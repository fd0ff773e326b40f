//! Domain model for routines and to-dos.
//!
//! # Responsibility
//! - Define canonical records owned by the store.
//! - Keep lifecycle helpers (completion-by-day, trash, archive) next to data.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Titles are stored trimmed and non-empty.

pub mod routine;
pub mod todo;

/// Normalizes user-entered title text.
///
/// Returns `None` when nothing but whitespace remains.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
