//! Core domain logic for the habit tracker.
//! This crate is the single source of truth for habit records, completion
//! bookkeeping and derived statistics.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;
pub mod view;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{LoadFallback, PersistencePolicy, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::command::HabitCommand;
pub use model::completion::{Completion, CompletionLog, ToggleOutcome};
pub use model::date_key::DateKey;
pub use model::habit::{Category, Habit, HabitId, HabitValidationError, NewHabit};
pub use repo::snapshot_repo::{
    RepoError, RepoResult, SnapshotRepository, SqliteSnapshotRepository,
};
pub use service::error::{StoreError, StoreResult};
pub use service::export::{export_snapshot, ExportEnvelope, EXPORT_FORMAT_VERSION};
pub use service::habit_store::HabitStore;
pub use service::transition::{Effect, HabitState, Transition};
pub use stats::aggregate::{
    DayMark, DayTally, HabitStats, OverallStats, Period, PeriodSummary,
};
pub use view::projection::{StatusFilter, TodayEntry, RECENT_HISTORY_LIMIT};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
