//! To-do domain model.
//!
//! # Responsibility
//! - Define one-off to-do records with trash and archive tombstones.
//! - Derive the lifecycle state from the optional timestamps.
//!
//! # Invariants
//! - `deleted_at` takes precedence over `archived_at`.
//! - Exactly one of active/archived/trashed holds for a record.
//! - Timestamps are Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for to-do records.
pub type TodoId = Uuid;

/// Lifecycle bucket derived from a record's tombstones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoState {
    Active,
    Archived,
    Trashed,
}

/// One-off task with binary done state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
    pub created_at: i64,
    /// Soft-delete tombstone; set while the record sits in the trash.
    #[serde(default)]
    pub deleted_at: Option<i64>,
    /// Set by the completion sweep.
    #[serde(default)]
    pub archived_at: Option<i64>,
}

impl TodoRecord {
    /// Creates a pending to-do with a generated stable ID.
    pub fn new(title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_done: false,
            created_at,
            deleted_at: None,
            archived_at: None,
        }
    }

    pub fn state(&self) -> TodoState {
        if self.deleted_at.is_some() {
            TodoState::Trashed
        } else if self.archived_at.is_some() {
            TodoState::Archived
        } else {
            TodoState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == TodoState::Active
    }

    pub fn is_archived(&self) -> bool {
        self.state() == TodoState::Archived
    }

    pub fn is_trashed(&self) -> bool {
        self.state() == TodoState::Trashed
    }
}
