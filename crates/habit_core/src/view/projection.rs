//! Today view, status filter and completion history.

use crate::model::completion::{Completion, CompletionLog};
use crate::model::date_key::DateKey;
use crate::model::habit::Habit;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of entries shown in a habit's recent history.
pub const RECENT_HISTORY_LIMIT: usize = 10;

/// One habit annotated with its status for the given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayEntry<'a> {
    pub habit: &'a Habit,
    pub is_completed_today: bool,
    /// Note of today's completion; empty when not completed.
    pub today_note: &'a str,
}

/// Annotates every habit with its completion status on `today`.
pub fn today_view(habits: &[Habit], today: DateKey) -> Vec<TodayEntry<'_>> {
    habits
        .iter()
        .map(|habit| {
            let entry = completion_on(habit, today);
            TodayEntry {
                habit,
                is_completed_today: entry.is_some(),
                today_note: entry.map(|entry| entry.note.as_str()).unwrap_or_default(),
            }
        })
        .collect()
}

/// Habit list filter keyed on today's completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }

    /// Whether a habit with the given status passes this filter.
    pub fn accepts(self, completed_today: bool) -> bool {
        match self {
            Self::All => true,
            Self::Completed => completed_today,
            Self::Pending => !completed_today,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            other => Err(format!(
                "unknown status filter `{other}`; expected all, completed or pending"
            )),
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Habits matching `status` on `today`, in collection order.
pub fn filter_by_status(habits: &[Habit], status: StatusFilter, today: DateKey) -> Vec<&Habit> {
    habits
        .iter()
        .filter(|habit| status.accepts(habit.completions.is_completed_on(today)))
        .collect()
}

/// Completed entry of `habit` on `day`, if any.
pub fn completion_on(habit: &Habit, day: DateKey) -> Option<&Completion> {
    habit.completions.completed_on(day)
}

/// Most recent completed entries, newest first.
pub fn recent_history(completions: &CompletionLog, limit: usize) -> Vec<(DateKey, &Completion)> {
    completions
        .iter()
        .rev()
        .filter(|(_, entry)| entry.completed)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_by_status, recent_history, today_view, StatusFilter};
    use crate::model::completion::Completion;
    use crate::model::date_key::DateKey;
    use crate::model::habit::{Habit, NewHabit};
    use chrono::{TimeZone, Utc};
    use std::collections::HashSet;

    fn day(value: &str) -> DateKey {
        DateKey::parse(value).unwrap()
    }

    fn habit(name: &str, done: &[(&str, &str)]) -> Habit {
        let at = Utc.with_ymd_and_hms(2024, 4, 1, 6, 0, 0).unwrap();
        let mut habit = NewHabit::new(name, "desc", "learning")
            .into_habit(at)
            .unwrap();
        for (key, note) in done {
            habit.completions.insert(day(key), Completion::new(*note, at));
        }
        habit
    }

    #[test]
    fn today_view_reports_status_and_note() {
        let habits = vec![
            habit("Read", &[("2024-04-10", "chapter 2")]),
            habit("Stretch", &[("2024-04-09", "")]),
        ];
        let view = today_view(&habits, day("2024-04-10"));
        assert_eq!(view.len(), 2);
        assert!(view[0].is_completed_today);
        assert_eq!(view[0].today_note, "chapter 2");
        assert!(!view[1].is_completed_today);
        assert_eq!(view[1].today_note, "");
    }

    #[test]
    fn completed_and_pending_partition_the_collection() {
        let habits = vec![
            habit("A", &[("2024-04-10", "")]),
            habit("B", &[]),
            habit("C", &[("2024-04-09", ""), ("2024-04-10", "")]),
            habit("D", &[("2024-04-11", "")]),
        ];
        let today = day("2024-04-10");
        let completed = filter_by_status(&habits, StatusFilter::Completed, today);
        let pending = filter_by_status(&habits, StatusFilter::Pending, today);
        let all = filter_by_status(&habits, StatusFilter::All, today);

        let completed_ids: HashSet<_> = completed.iter().map(|habit| &habit.id).collect();
        let pending_ids: HashSet<_> = pending.iter().map(|habit| &habit.id).collect();
        assert!(completed_ids.is_disjoint(&pending_ids));
        assert_eq!(completed.len() + pending.len(), habits.len());
        assert_eq!(all.len(), habits.len());
        assert_eq!(
            completed.iter().map(|habit| habit.name.as_str()).collect::<Vec<_>>(),
            vec!["A", "C"]
        );
    }

    #[test]
    fn status_filter_parses_case_insensitively() {
        assert_eq!("Pending".parse::<StatusFilter>(), Ok(StatusFilter::Pending));
        assert_eq!(" all ".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert!("done".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn recent_history_is_newest_first_and_bounded() {
        let habit = habit(
            "Run",
            &[
                ("2024-04-01", "a"),
                ("2024-04-03", "b"),
                ("2024-04-02", "c"),
                ("2024-04-05", "d"),
            ],
        );
        let history = recent_history(&habit.completions, 3);
        let keys: Vec<String> = history.iter().map(|(key, _)| key.to_string()).collect();
        assert_eq!(keys, vec!["2024-04-05", "2024-04-03", "2024-04-02"]);
        assert_eq!(history[0].1.note, "d");
    }
}
