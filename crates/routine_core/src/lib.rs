//! Core state and persistence for the Routine app.
//! This crate is the single source of truth for routine and to-do invariants.

pub mod autosave;
pub mod clock;
pub mod codec;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod promotion;
pub mod repo;
pub mod store;

pub use autosave::AutosaveHandle;
pub use clock::{day_key, Clock, DayKey, ManualClock, SystemClock};
pub use codec::{CodecError, BRAIN_DUMP_KEY, ROUTINES_KEY, TODOS_KEY};
pub use config::StoreConfig;
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::routine::{RoutineCategory, RoutineId, RoutineRecord};
pub use model::todo::{TodoId, TodoRecord, TodoState};
pub use promotion::{BrainDumpReport, RoutinePromotion};
pub use repo::kv_repo::{
    InMemoryKvRepository, KvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use store::{Store, StoreChange, SubscriptionId, SEED_ROUTINES};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
