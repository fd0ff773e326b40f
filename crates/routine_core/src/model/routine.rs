//! Routine domain model.
//!
//! # Responsibility
//! - Define recurring routine records and their category buckets.
//! - Interpret `last_completed_day` relative to the current day key.
//!
//! # Invariants
//! - `last_completed_day == Some(today)` is the only "done today" state.
//! - The field is never reset at midnight; yesterday's key simply reads as
//!   not done.

use crate::clock::DayKey;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for routine records.
pub type RoutineId = Uuid;

/// Time-of-day bucket for a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoutineCategory {
    Morning,
    #[default]
    Anytime,
    Evening,
}

impl RoutineCategory {
    /// Fixed display and rebuild order.
    pub const ALL: [RoutineCategory; 3] = [
        RoutineCategory::Morning,
        RoutineCategory::Anytime,
        RoutineCategory::Evening,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Anytime => "Anytime",
            Self::Evening => "Evening",
        }
    }
}

impl Display for RoutineCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl Display for ParseCategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown routine category `{}`; expected morning|anytime|evening",
            self.0
        )
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for RoutineCategory {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Self::Morning),
            "anytime" => Ok(Self::Anytime),
            "evening" => Ok(Self::Evening),
            _ => Err(ParseCategoryError(value.to_string())),
        }
    }
}

/// Recurring routine tracked per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineRecord {
    pub id: RoutineId,
    pub title: String,
    /// Older payloads predate categories; they land in `Anytime`.
    #[serde(default)]
    pub category: RoutineCategory,
    /// Day key (`YYYYMMDD`) of the last completion.
    #[serde(default)]
    pub last_completed_day: Option<DayKey>,
}

impl RoutineRecord {
    /// Creates a routine with a generated stable ID and no completion.
    ///
    /// Callers are expected to pass an already normalized title.
    pub fn new(title: impl Into<String>, category: RoutineCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category,
            last_completed_day: None,
        }
    }

    /// Returns whether this routine was completed on `today`.
    pub fn is_done_on(&self, today: DayKey) -> bool {
        self.last_completed_day == Some(today)
    }
}
