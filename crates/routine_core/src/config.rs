//! Store configuration.

use std::time::Duration;

/// Default quiet interval before a scheduled save is flushed.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(400);
/// Default retention window for trashed to-dos.
pub const DEFAULT_TRASH_RETENTION_DAYS: u32 = 7;

/// Tunables for one store instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Quiet interval after the last mutation before persisting.
    pub save_debounce: Duration,
    /// Trashed to-dos older than this many days are purged.
    pub trash_retention_days: u32,
    /// Whether a missing or unreadable routines key is filled with the
    /// starter set.
    pub seed_default_routines: bool,
    /// How often the autosave worker checks for a due save.
    pub autosave_poll_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            trash_retention_days: DEFAULT_TRASH_RETENTION_DAYS,
            seed_default_routines: true,
            autosave_poll_interval: Duration::from_millis(50),
        }
    }
}
