//! Streak counting over calendar days.

use crate::model::completion::CompletionLog;
use crate::model::date_key::DateKey;

/// Consecutive completed days ending at the most recent completed day.
///
/// The most recent completion is the anchor, not today; see [`active_streak`]
/// for the variant that expires once a day is missed.
pub fn current_streak(completions: &CompletionLog) -> u32 {
    let mut days = completions.completed_days().rev();
    let Some(mut cursor) = days.next() else {
        return 0;
    };

    let mut streak = 1;
    for day in days {
        if cursor.pred() != Some(day) {
            break;
        }
        streak += 1;
        cursor = day;
    }
    streak
}

/// Current streak that is still alive as of `today`.
///
/// Returns 0 unless the most recent completion is `today` or the day before.
pub fn active_streak(completions: &CompletionLog, today: DateKey) -> u32 {
    match completions.last_completed() {
        Some(last) if (0..=1).contains(&last.days_until(today)) => current_streak(completions),
        _ => 0,
    }
}

/// Longest run of consecutive completed calendar days.
pub fn longest_streak(completions: &CompletionLog) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<DateKey> = None;

    for day in completions.completed_days() {
        run = match previous {
            Some(prev) if prev.succ() == Some(day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::{active_streak, current_streak, longest_streak};
    use crate::model::completion::{Completion, CompletionLog};
    use crate::model::date_key::DateKey;
    use chrono::{TimeZone, Utc};

    fn day(value: &str) -> DateKey {
        DateKey::parse(value).unwrap()
    }

    fn log_of(days: &[&str]) -> CompletionLog {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        days.iter()
            .map(|value| (day(value), Completion::new("", at)))
            .collect()
    }

    #[test]
    fn empty_log_has_no_streaks() {
        let log = CompletionLog::new();
        assert_eq!(current_streak(&log), 0);
        assert_eq!(longest_streak(&log), 0);
        assert_eq!(active_streak(&log, day("2024-01-01")), 0);
    }

    #[test]
    fn calendar_gap_breaks_the_current_streak() {
        let log = log_of(&["2024-01-01", "2024-01-02", "2024-01-04"]);
        assert_eq!(current_streak(&log), 1);
    }

    #[test]
    fn current_streak_crosses_month_and_year_boundaries() {
        let log = log_of(&["2023-12-30", "2023-12-31", "2024-01-01"]);
        assert_eq!(current_streak(&log), 3);
    }

    #[test]
    fn longest_streak_picks_the_longest_run() {
        let log = log_of(&[
            "2024-02-01",
            "2024-02-02",
            "2024-02-05",
            "2024-02-06",
            "2024-02-07",
            "2024-02-09",
        ]);
        assert_eq!(longest_streak(&log), 3);
        assert_eq!(current_streak(&log), 1);
    }

    #[test]
    fn explicit_miss_breaks_runs() {
        let mut log = log_of(&["2024-03-01", "2024-03-03"]);
        log.insert(
            day("2024-03-02"),
            Completion {
                completed: false,
                note: String::new(),
                timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap(),
            },
        );
        assert_eq!(longest_streak(&log), 1);
        assert_eq!(current_streak(&log), 1);
    }

    #[test]
    fn active_streak_expires_after_a_missed_day() {
        let log = log_of(&["2024-04-09", "2024-04-10"]);
        assert_eq!(active_streak(&log, day("2024-04-10")), 2);
        assert_eq!(active_streak(&log, day("2024-04-11")), 2);
        assert_eq!(active_streak(&log, day("2024-04-12")), 0);
    }
}
