//! In-memory store for routines, to-dos and brain-dump text.
//!
//! # Responsibility
//! - Own the canonical collections and every mutation on them.
//! - Load from and persist to a `KvRepository` through the codec.
//! - Debounce saves and notify subscribers after each change.
//!
//! # Invariants
//! - All access goes through `&mut Store`; operations run to completion, so
//!   no two mutations interleave.
//! - Validation failures (blank titles, unknown IDs) are silent no-ops.
//! - Persistence failures are logged and never surface to callers.
//! - A flush encodes the collections as they are at flush time.
//! - Dropping the store flushes any pending save.

mod promote;
pub mod reorder;
mod routines;
pub mod scheduler;
mod todos;

use crate::clock::{Clock, DayKey, SystemClock};
use crate::codec::{
    decode_brain_dump, decode_routines, decode_todos, encode_brain_dump, encode_routines,
    encode_todos, CodecError, BRAIN_DUMP_KEY, ROUTINES_KEY, TODOS_KEY,
};
use crate::config::StoreConfig;
use crate::model::routine::{RoutineCategory, RoutineRecord};
use crate::model::todo::TodoRecord;
use crate::repo::kv_repo::{KvRepository, RepoError};
use log::{debug, error, info, warn};
use scheduler::{DirtySet, SaveScheduler};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Which part of the persisted state a mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Routines,
    Todos,
    BrainDump,
}

impl StoreChange {
    fn dirty(self) -> DirtySet {
        let mut dirty = DirtySet::default();
        match self {
            Self::Routines => dirty.routines = true,
            Self::Todos => dirty.todos = true,
            Self::BrainDump => dirty.brain_dump = true,
        }
        dirty
    }
}

/// Handle returned by `Store::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn Fn(StoreChange) + Send>;

/// Starter routines used on first run and when the routines blob is unreadable.
pub const SEED_ROUTINES: &[(&str, RoutineCategory)] = &[
    ("Take vitamins (AM)", RoutineCategory::Morning),
    ("Wash face (AM)", RoutineCategory::Morning),
    ("Wash face (PM)", RoutineCategory::Evening),
    ("Shower", RoutineCategory::Anytime),
    ("Bed by 10:00", RoutineCategory::Evening),
];

/// Internal persistence failure, logged by the store.
#[derive(Debug)]
enum PersistError {
    Repo(RepoError),
    Codec(CodecError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<RepoError> for PersistError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<CodecError> for PersistError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Single owner of all routine and to-do state.
pub struct Store<R: KvRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
    routines: Vec<RoutineRecord>,
    todos: Vec<TodoRecord>,
    brain_dump: String,
    scheduler: SaveScheduler,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    revision: u64,
}

impl<R: KvRepository> Store<R> {
    /// Loads persisted state and runs the startup trash purge.
    ///
    /// Never fails: unreadable blobs fall back to empty collections (seed
    /// routines for the routines key) and the failure is logged.
    pub fn open(repo: R, clock: Arc<dyn Clock>, config: StoreConfig) -> Self {
        let started_at = Instant::now();
        let mut store = Self {
            repo,
            clock,
            scheduler: SaveScheduler::new(config.save_debounce),
            config,
            routines: Vec::new(),
            todos: Vec::new(),
            brain_dump: String::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            revision: 0,
        };

        store.load_routines();
        store.load_todos();
        store.load_brain_dump();

        let retention_days = store.config.trash_retention_days;
        let now_ms = store.clock.now_ms();
        let purged = store.purge_expired_trash(retention_days, now_ms);

        info!(
            "event=store_open module=store status=ok routines={} todos={} purged={} duration_ms={}",
            store.routines.len(),
            store.todos.len(),
            purged,
            started_at.elapsed().as_millis()
        );
        store
    }

    /// Opens with the system clock.
    pub fn open_with_system_clock(repo: R, config: StoreConfig) -> Self {
        Self::open(repo, Arc::new(SystemClock), config)
    }

    /// Flushes any pending save and tears the store down.
    ///
    /// Returns `false` when the final write failed (already logged).
    pub fn close(mut self) -> bool {
        self.flush_now()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Day key for the clock's current local date.
    pub fn today_key(&self) -> DayKey {
        self.clock.today_key()
    }

    /// All routines in storage order (grouped by category after any move).
    pub fn routines(&self) -> &[RoutineRecord] {
        &self.routines
    }

    /// All to-dos in storage order, regardless of state.
    pub fn todos(&self) -> &[TodoRecord] {
        &self.todos
    }

    pub fn brain_dump_text(&self) -> &str {
        &self.brain_dump
    }

    /// Monotonic counter bumped once per committed mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn has_pending_save(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Epoch-millis deadline of the pending save, if any.
    pub fn pending_save_deadline_ms(&self) -> Option<i64> {
        self.scheduler.deadline_ms()
    }

    /// Registers a change callback.
    ///
    /// Callbacks run synchronously inside the mutating call and must not
    /// block.
    pub fn subscribe(
        &mut self,
        subscriber: impl Fn(StoreChange) + Send + 'static,
    ) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Flushes if the debounce interval has elapsed.
    ///
    /// Hosts running their own event loop call this periodically.
    pub fn tick(&mut self) -> bool {
        let now_ms = self.clock.now_ms();
        match self.scheduler.take_due(now_ms) {
            Some(dirty) => self.write(dirty),
            None => false,
        }
    }

    /// Writes any pending changes immediately.
    ///
    /// Returns `true` when something was written successfully.
    pub fn flush_now(&mut self) -> bool {
        match self.scheduler.take_pending() {
            Some(dirty) => self.write(dirty),
            None => false,
        }
    }

    fn commit(&mut self, change: StoreChange) {
        self.commit_all(&[change]);
    }

    /// One mutation touching several collections: a single revision bump
    /// and one save schedule, then one notification per collection.
    fn commit_all(&mut self, changes: &[StoreChange]) {
        if changes.is_empty() {
            return;
        }
        self.revision += 1;
        let dirty = changes
            .iter()
            .fold(DirtySet::default(), |dirty, change| dirty.union(change.dirty()));
        self.scheduler.schedule(dirty, self.clock.now_ms());
        for change in changes {
            for (_, subscriber) in &self.subscribers {
                subscriber(*change);
            }
        }
    }

    fn write(&mut self, dirty: DirtySet) -> bool {
        let started_at = Instant::now();
        let mut failed = DirtySet::default();

        if dirty.routines {
            if let Err(err) = self.write_key(ROUTINES_KEY, encode_routines(&self.routines)) {
                log_write_failure(ROUTINES_KEY, &err);
                failed.routines = true;
            }
        }
        if dirty.todos {
            if let Err(err) = self.write_key(TODOS_KEY, encode_todos(&self.todos)) {
                log_write_failure(TODOS_KEY, &err);
                failed.todos = true;
            }
        }
        if dirty.brain_dump {
            let bytes = encode_brain_dump(&self.brain_dump);
            if let Err(err) = self.write_key(BRAIN_DUMP_KEY, Ok(bytes)) {
                log_write_failure(BRAIN_DUMP_KEY, &err);
                failed.brain_dump = true;
            }
        }

        if failed.is_empty() {
            debug!(
                "event=store_flush module=store status=ok routines={} todos={} brain_dump={} duration_ms={}",
                dirty.routines,
                dirty.todos,
                dirty.brain_dump,
                started_at.elapsed().as_millis()
            );
            return true;
        }

        // Failed keys retry after the next quiet interval.
        self.scheduler.schedule(failed, self.clock.now_ms());
        false
    }

    fn write_key(
        &self,
        key: &str,
        encoded: Result<Vec<u8>, CodecError>,
    ) -> Result<(), PersistError> {
        let bytes = encoded?;
        self.repo.set(key, &bytes)?;
        Ok(())
    }

    fn read_key(&self, key: &str) -> Result<Option<Vec<u8>>, PersistError> {
        Ok(self.repo.get(key)?)
    }

    fn load_routines(&mut self) {
        let loaded = self.read_key(ROUTINES_KEY).and_then(|bytes| match bytes {
            Some(bytes) => Ok(Some(decode_routines(&bytes)?)),
            None => Ok(None),
        });

        match loaded {
            Ok(Some(decoded)) => {
                log_skipped(ROUTINES_KEY, decoded.skipped);
                self.routines = decoded.records;
            }
            Ok(None) => {
                if self.config.seed_default_routines {
                    self.routines = seed_routines();
                    // First run: persist the seed so IDs stay stable.
                    self.scheduler
                        .schedule(StoreChange::Routines.dirty(), self.clock.now_ms());
                }
            }
            Err(err) => {
                error!(
                    "event=store_load module=store status=error key={} error={}",
                    ROUTINES_KEY, err
                );
                if self.config.seed_default_routines {
                    self.routines = seed_routines();
                }
            }
        }
    }

    fn load_todos(&mut self) {
        let loaded = self.read_key(TODOS_KEY).and_then(|bytes| match bytes {
            Some(bytes) => Ok(Some(decode_todos(&bytes)?)),
            None => Ok(None),
        });

        match loaded {
            Ok(Some(decoded)) => {
                log_skipped(TODOS_KEY, decoded.skipped);
                self.todos = decoded.records;
            }
            Ok(None) => {}
            Err(err) => {
                error!(
                    "event=store_load module=store status=error key={} error={}",
                    TODOS_KEY, err
                );
            }
        }
    }

    fn load_brain_dump(&mut self) {
        let loaded = self.read_key(BRAIN_DUMP_KEY).and_then(|bytes| match bytes {
            Some(bytes) => Ok(Some(decode_brain_dump(&bytes)?)),
            None => Ok(None),
        });

        match loaded {
            Ok(Some(text)) => self.brain_dump = text,
            Ok(None) => {}
            Err(err) => {
                error!(
                    "event=store_load module=store status=error key={} error={}",
                    BRAIN_DUMP_KEY, err
                );
            }
        }
    }
}

impl<R: KvRepository> Drop for Store<R> {
    fn drop(&mut self) {
        if self.scheduler.is_pending() {
            self.flush_now();
        }
    }
}

fn seed_routines() -> Vec<RoutineRecord> {
    SEED_ROUTINES
        .iter()
        .map(|(title, category)| RoutineRecord::new(*title, *category))
        .collect()
}

fn log_skipped(key: &str, skipped: usize) {
    if skipped > 0 {
        warn!(
            "event=store_load module=store status=partial key={} skipped={}",
            key, skipped
        );
    }
}

fn log_write_failure(key: &str, err: &PersistError) {
    error!(
        "event=store_flush module=store status=error key={} error={}",
        key, err
    );
}
