//! Per-habit completion bookkeeping.
//!
//! # Responsibility
//! - Hold the `DateKey -> Completion` map of one habit.
//! - Implement the toggle and note-edit transitions on that map.
//!
//! # Invariants
//! - A day has at most one entry; "not completed" is the absence of an entry.
//! - Toggling a completed day off removes the entry and its note.
//! - A note can only be attached to a day that already has an entry.
//! - Entries loaded with `completed: false` are kept as-is but never count as
//!   completed.

use crate::model::date_key::DateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Record of one completed day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Always `true` for entries written by the core.
    pub completed: bool,
    #[serde(default)]
    pub note: String,
    /// Exact instant the completion was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Completion {
    pub fn new(note: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            note: note.into(),
            timestamp,
        }
    }
}

/// Result of toggling one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new entry was inserted.
    Completed,
    /// The existing entry was removed together with its note.
    Cleared,
}

/// Completion entries of one habit, ordered by day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionLog(BTreeMap<DateKey, Completion>);

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw entry for `day`, including entries with `completed: false`.
    pub fn get(&self, day: DateKey) -> Option<&Completion> {
        self.0.get(&day)
    }

    /// Completed entry for `day`, if any.
    pub fn completed_on(&self, day: DateKey) -> Option<&Completion> {
        self.0.get(&day).filter(|entry| entry.completed)
    }

    pub fn is_completed_on(&self, day: DateKey) -> bool {
        self.completed_on(day).is_some()
    }

    /// Inserts a completion for `day`, or removes the existing entry.
    pub fn toggle(
        &mut self,
        day: DateKey,
        note: impl Into<String>,
        at: DateTime<Utc>,
    ) -> ToggleOutcome {
        if self.0.remove(&day).is_some() {
            return ToggleOutcome::Cleared;
        }
        self.0.insert(day, Completion::new(note, at));
        ToggleOutcome::Completed
    }

    /// Replaces the note of an existing entry.
    ///
    /// Returns `false` and changes nothing when `day` has no entry.
    pub fn set_note(&mut self, day: DateKey, note: impl Into<String>) -> bool {
        match self.0.get_mut(&day) {
            Some(entry) => {
                entry.note = note.into();
                true
            }
            None => false,
        }
    }

    /// Inserts or replaces an entry verbatim. Used by import paths and tests.
    pub fn insert(&mut self, day: DateKey, completion: Completion) -> Option<Completion> {
        self.0.insert(day, completion)
    }

    /// Number of entries, completed or not.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All entries in ascending day order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (DateKey, &Completion)> + '_ {
        self.0.iter().map(|(day, entry)| (*day, entry))
    }

    /// Completed days in ascending order.
    pub fn completed_days(&self) -> impl DoubleEndedIterator<Item = DateKey> + '_ {
        self.0
            .iter()
            .filter(|(_, entry)| entry.completed)
            .map(|(day, _)| *day)
    }

    /// Completed days within `from..=to`, ascending. Empty when `from > to`.
    pub fn completed_between(
        &self,
        from: DateKey,
        to: DateKey,
    ) -> impl DoubleEndedIterator<Item = DateKey> + '_ {
        let upper = if from <= to {
            Bound::Included(to)
        } else {
            Bound::Excluded(from)
        };
        self.0
            .range((Bound::Included(from), upper))
            .filter(|(_, entry)| entry.completed)
            .map(|(day, _)| *day)
    }

    pub fn first_completed(&self) -> Option<DateKey> {
        self.completed_days().next()
    }

    pub fn last_completed(&self) -> Option<DateKey> {
        self.completed_days().next_back()
    }
}

impl FromIterator<(DateKey, Completion)> for CompletionLog {
    fn from_iter<T: IntoIterator<Item = (DateKey, Completion)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Completion, CompletionLog, ToggleOutcome};
    use crate::model::date_key::DateKey;
    use chrono::{TimeZone, Utc};

    fn day(value: &str) -> DateKey {
        DateKey::parse(value).unwrap()
    }

    #[test]
    fn toggle_twice_restores_empty_log() {
        let mut log = CompletionLog::new();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        assert_eq!(log.toggle(day("2024-05-01"), "done", at), ToggleOutcome::Completed);
        assert!(log.is_completed_on(day("2024-05-01")));
        assert_eq!(log.toggle(day("2024-05-01"), "", at), ToggleOutcome::Cleared);
        assert_eq!(log, CompletionLog::new());
    }

    #[test]
    fn set_note_requires_an_existing_entry() {
        let mut log = CompletionLog::new();
        assert!(!log.set_note(day("2024-05-01"), "nope"));
        assert!(log.is_empty());

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        log.toggle(day("2024-05-01"), "", at);
        assert!(log.set_note(day("2024-05-01"), "felt great"));
        assert_eq!(log.get(day("2024-05-01")).unwrap().note, "felt great");
        assert_eq!(log.get(day("2024-05-01")).unwrap().timestamp, at);
    }

    #[test]
    fn explicit_misses_are_not_completed() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let mut log = CompletionLog::new();
        log.insert(
            day("2024-05-01"),
            Completion {
                completed: false,
                note: String::new(),
                timestamp: at,
            },
        );
        assert_eq!(log.len(), 1);
        assert!(!log.is_completed_on(day("2024-05-01")));
        assert_eq!(log.completed_days().count(), 0);
    }

    #[test]
    fn serializes_as_a_date_keyed_object() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 7, 30, 0).unwrap();
        let mut log = CompletionLog::new();
        log.toggle(day("2024-01-02"), "note", at);
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["2024-01-02"]["completed"], true);
        assert_eq!(json["2024-01-02"]["note"], "note");
        assert_eq!(json["2024-01-02"]["timestamp"], "2024-01-02T07:30:00Z");
    }
}
