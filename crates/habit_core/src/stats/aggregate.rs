//! Success rates and day-windowed aggregates.
//!
//! Success rate is measured over the calendar days between the first and the
//! last completion, not over recorded entries.

use crate::model::completion::CompletionLog;
use crate::model::date_key::DateKey;
use crate::model::habit::Habit;
use crate::stats::streak::{current_streak, longest_streak};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Summary metrics for one habit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStats {
    /// Number of entries in the completion map.
    pub total_days: usize,
    /// Entries that count as completed.
    pub completed_days: usize,
    /// Calendar days from the first to the last completion, inclusive.
    pub tracked_days: usize,
    /// `completed_days / tracked_days` as a percentage in `[0, 100]`.
    pub success_rate: f64,
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Entry count, completed or not.
pub fn total_days(completions: &CompletionLog) -> usize {
    completions.len()
}

pub fn completed_days(completions: &CompletionLog) -> usize {
    completions.completed_days().count()
}

/// Length of the calendar span between the first and last completion.
pub fn tracked_days(completions: &CompletionLog) -> usize {
    match (completions.first_completed(), completions.last_completed()) {
        (Some(first), Some(last)) => usize::try_from(first.days_until(last) + 1).unwrap_or(0),
        _ => 0,
    }
}

/// Percentage of completed days within the tracked span; 0 when empty.
pub fn success_rate(completions: &CompletionLog) -> f64 {
    percentage(completed_days(completions), tracked_days(completions))
}

pub fn habit_stats(completions: &CompletionLog) -> HabitStats {
    HabitStats {
        total_days: total_days(completions),
        completed_days: completed_days(completions),
        tracked_days: tracked_days(completions),
        success_rate: success_rate(completions),
        current_streak: current_streak(completions),
        longest_streak: longest_streak(completions),
    }
}

/// Fixed day window ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Week,
    Month,
    Year,
}

impl Period {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Number of days in the window.
    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    /// First day of the window that ends on `today`.
    pub fn start(self, today: DateKey) -> DateKey {
        today.minus_days(self.days() - 1).unwrap_or(today)
    }

    /// Every day of the window, oldest first.
    pub fn days_ending(self, today: DateKey) -> Vec<DateKey> {
        let mut days = Vec::with_capacity(self.days() as usize);
        let mut cursor = Some(self.start(today));
        while let Some(day) = cursor.filter(|day| *day <= today) {
            days.push(day);
            cursor = day.succ();
        }
        days
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion summary of one habit over a [`Period`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub days: u32,
    pub completed_days: usize,
    pub success_rate: f64,
}

pub fn period_summary(completions: &CompletionLog, period: Period, today: DateKey) -> PeriodSummary {
    let completed = completions
        .completed_between(period.start(today), today)
        .count();
    PeriodSummary {
        period,
        days: period.days(),
        completed_days: completed,
        success_rate: percentage(completed, period.days() as usize),
    }
}

/// Whether a habit was completed on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayMark {
    pub date: DateKey,
    pub completed: bool,
}

/// Per-day completion marks of one habit over a window, oldest first.
pub fn habit_progress(completions: &CompletionLog, period: Period, today: DateKey) -> Vec<DayMark> {
    period
        .days_ending(today)
        .into_iter()
        .map(|date| DayMark {
            date,
            completed: completions.is_completed_on(date),
        })
        .collect()
}

/// Number of habits completed on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayTally {
    pub date: DateKey,
    pub completed: usize,
    pub total: usize,
}

/// Per-day completed-habit counts across the collection, oldest first.
pub fn daily_totals(habits: &[Habit], period: Period, today: DateKey) -> Vec<DayTally> {
    period
        .days_ending(today)
        .into_iter()
        .map(|date| DayTally {
            date,
            completed: habits
                .iter()
                .filter(|habit| habit.completions.is_completed_on(date))
                .count(),
            total: habits.len(),
        })
        .collect()
}

/// Collection-wide summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub total_habits: usize,
    pub completed_today: usize,
    pub total_completions: usize,
    /// Pooled rate: all completed days over all tracked days.
    pub average_success_rate: f64,
}

/// Summary across all habits; `None` when there are none.
pub fn overall_stats(habits: &[Habit], today: DateKey) -> Option<OverallStats> {
    if habits.is_empty() {
        return None;
    }

    let completed_today = habits
        .iter()
        .filter(|habit| habit.completions.is_completed_on(today))
        .count();
    let total_completions: usize = habits
        .iter()
        .map(|habit| completed_days(&habit.completions))
        .sum();
    let total_tracked: usize = habits
        .iter()
        .map(|habit| tracked_days(&habit.completions))
        .sum();

    Some(OverallStats {
        total_habits: habits.len(),
        completed_today,
        total_completions,
        average_success_rate: percentage(total_completions, total_tracked),
    })
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}
