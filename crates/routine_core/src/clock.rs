//! Wall-clock access for day keys and record timestamps.
//!
//! # Responsibility
//! - Derive `YYYYMMDD` day keys from the local calendar date.
//! - Provide a manual clock so hosts and tests can drive time explicitly.
//!
//! # Invariants
//! - Day keys are a pure function of the local date; nothing is persisted.
//! - Timestamps are Unix epoch milliseconds.

use chrono::{Datelike, Local, NaiveDate, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Calendar day encoded as `year * 10000 + month * 100 + day`.
pub type DayKey = u32;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Source of "now" for the store and its save scheduler.
pub trait Clock: Send + Sync {
    /// Current time in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Day key for the current local date.
    fn today_key(&self) -> DayKey {
        day_key_for_epoch_ms(self.now_ms())
    }
}

/// Clock backed by the system wall clock and local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today_key(&self) -> DayKey {
        day_key(Local::now().date_naive())
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(duration_ms(by), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// Encodes a calendar date as a `YYYYMMDD` key.
pub fn day_key(date: NaiveDate) -> DayKey {
    // Year is clamped to keep the key non-negative for pre-epoch dates.
    let year = date.year().max(0) as u32;
    year * 10_000 + date.month() * 100 + date.day()
}

/// Day key of the local date containing `epoch_ms`.
pub fn day_key_for_epoch_ms(epoch_ms: i64) -> DayKey {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(local) => day_key(local.date_naive()),
        // Only reachable for timestamps outside chrono's supported range.
        None => 0,
    }
}

/// Saturating conversion used by the scheduler and clocks.
pub fn duration_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
