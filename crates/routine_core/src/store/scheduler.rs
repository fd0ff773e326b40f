//! Debounced save scheduling.
//!
//! # Responsibility
//! - Collapse bursts of mutations into one write after a quiet interval.
//! - Track which persisted keys changed since the last flush.
//!
//! # Invariants
//! - Every `schedule` call replaces the pending deadline (cancel-and-reschedule).
//! - The scheduler never holds record data; a flush always encodes the
//!   collections as they are at flush time.

use std::time::Duration;

use crate::clock::duration_ms;

/// Persisted keys touched since the last flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtySet {
    pub routines: bool,
    pub todos: bool,
    pub brain_dump: bool,
}

impl DirtySet {
    pub fn is_empty(&self) -> bool {
        !(self.routines || self.todos || self.brain_dump)
    }

    pub fn union(self, other: DirtySet) -> DirtySet {
        DirtySet {
            routines: self.routines || other.routines,
            todos: self.todos || other.todos,
            brain_dump: self.brain_dump || other.brain_dump,
        }
    }
}

/// Deadline-based debouncer driven by an external clock.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce_ms: i64,
    deadline_ms: Option<i64>,
    dirty: DirtySet,
}

impl SaveScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce_ms: duration_ms(debounce),
            deadline_ms: None,
            dirty: DirtySet::default(),
        }
    }

    /// Marks keys dirty and pushes the deadline to `now_ms + debounce`.
    pub fn schedule(&mut self, changed: DirtySet, now_ms: i64) {
        if changed.is_empty() {
            return;
        }
        self.dirty = self.dirty.union(changed);
        self.deadline_ms = Some(now_ms.saturating_add(self.debounce_ms));
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn deadline_ms(&self) -> Option<i64> {
        self.deadline_ms
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        matches!(self.deadline_ms, Some(deadline) if now_ms >= deadline)
    }

    /// Takes the dirty set if the quiet interval has elapsed.
    pub fn take_due(&mut self, now_ms: i64) -> Option<DirtySet> {
        if self.is_due(now_ms) {
            self.take_pending()
        } else {
            None
        }
    }

    /// Takes the dirty set regardless of the deadline.
    pub fn take_pending(&mut self) -> Option<DirtySet> {
        self.deadline_ms.take()?;
        Some(std::mem::take(&mut self.dirty))
    }
}

#[cfg(test)]
mod tests {
    use super::{DirtySet, SaveScheduler};
    use std::time::Duration;

    const TODOS: DirtySet = DirtySet {
        routines: false,
        todos: true,
        brain_dump: false,
    };

    #[test]
    fn rescheduling_pushes_deadline_out() {
        let mut scheduler = SaveScheduler::new(Duration::from_millis(400));
        scheduler.schedule(TODOS, 0);
        scheduler.schedule(TODOS, 300);

        assert!(!scheduler.is_due(400));
        assert_eq!(scheduler.take_due(699), None);
        assert_eq!(scheduler.take_due(700), Some(TODOS));
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn dirty_keys_accumulate_until_taken() {
        let mut scheduler = SaveScheduler::new(Duration::from_millis(250));
        scheduler.schedule(TODOS, 0);
        scheduler.schedule(
            DirtySet {
                routines: true,
                ..DirtySet::default()
            },
            10,
        );

        let taken = scheduler.take_pending().unwrap();
        assert!(taken.todos && taken.routines && !taken.brain_dump);
        assert_eq!(scheduler.take_pending(), None);
    }

    #[test]
    fn empty_change_does_not_schedule() {
        let mut scheduler = SaveScheduler::new(Duration::from_millis(250));
        scheduler.schedule(DirtySet::default(), 0);
        assert!(!scheduler.is_pending());
    }
}
