//! Duplicate-suppression rules shared by the promotion pipelines.
//!
//! # Responsibility
//! - Split brain-dump text into candidate to-do titles.
//! - Compare titles case-insensitively after trimming.
//!
//! # Invariants
//! - The first occurrence of a title wins and keeps its original casing.
//! - Blank lines never become candidates.

use crate::model::routine::RoutineId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static LINE_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0B\x0C\x{85}\x{2028}\x{2029}]").expect("valid line break regex")
});

/// Comparison key for duplicate detection.
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Returns whether two titles collide under the duplicate rule.
pub fn titles_match(left: &str, right: &str) -> bool {
    title_key(left) == title_key(right)
}

/// Splits free text into trimmed, non-empty lines.
pub fn non_empty_lines(text: &str) -> Vec<String> {
    LINE_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Removes case-insensitive duplicates, keeping first occurrences.
///
/// Returns the unique titles and how many duplicates were dropped.
pub fn dedupe_titles(lines: Vec<String>) -> (Vec<String>, usize) {
    let mut seen = HashSet::with_capacity(lines.len());
    let mut unique = Vec::with_capacity(lines.len());
    let mut removed = 0;
    for line in lines {
        if seen.insert(title_key(&line)) {
            unique.push(line);
        } else {
            removed += 1;
        }
    }
    (unique, removed)
}

/// Outcome of sending brain-dump text to the to-do list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BrainDumpReport {
    /// New to-dos created.
    pub added: usize,
    /// Lines dropped because an earlier line had the same title.
    pub internal_duplicates_removed: usize,
    /// Lines skipped because a to-do (in any state) already had the title.
    pub already_existing_skipped: usize,
}

impl BrainDumpReport {
    /// Number of non-empty lines the report accounts for.
    pub fn lines_considered(&self) -> usize {
        self.added + self.internal_duplicates_removed + self.already_existing_skipped
    }
}

/// Outcome of moving a to-do into the routines list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutinePromotion {
    /// Routine created; the originating to-do was removed.
    Promoted(RoutineId),
    /// A routine with the same title exists; nothing changed.
    AlreadyExists,
    /// No to-do with that ID.
    TodoNotFound,
}
