//! Habit store: the single mutable source of truth.
//!
//! # Responsibility
//! - Own the in-memory collection and the repository that persists it.
//! - Route every mutation through [`transition::apply`] and flush snapshots.
//! - Serve clock-anchored projections and statistics.
//!
//! # Invariants
//! - Each mutation swaps in a whole new state; no partial mutation is
//!   ever observable.
//! - Commands whose effect changes nothing are not persisted.
//! - Log events carry ids and counts only, never names, descriptions or notes.

use crate::clock::Clock;
use crate::config::{LoadFallback, PersistencePolicy, StoreConfig};
use crate::model::command::HabitCommand;
use crate::model::completion::ToggleOutcome;
use crate::model::date_key::DateKey;
use crate::model::habit::{Habit, HabitId, NewHabit};
use crate::repo::snapshot_repo::{RepoError, SnapshotRepository};
use crate::service::error::{StoreError, StoreResult};
use crate::service::export::{export_snapshot, ExportEnvelope};
use crate::service::transition::{self, Effect, HabitState, Transition};
use crate::stats::aggregate::{
    self, daily_totals, habit_progress, habit_stats, DayMark, DayTally, HabitStats,
    OverallStats, Period, PeriodSummary,
};
use crate::stats::streak::active_streak;
use crate::view::projection::{self, StatusFilter, TodayEntry};
use chrono::Utc;
use log::{error, info, warn};
use std::time::Instant;

/// Habit collection bound to a snapshot repository and a clock.
pub struct HabitStore<R: SnapshotRepository> {
    repo: R,
    state: HabitState,
    clock: Box<dyn Clock>,
    config: StoreConfig,
    load_error: Option<RepoError>,
    unsaved: bool,
}

impl<R: SnapshotRepository> HabitStore<R> {
    /// Loads the persisted collection and returns a ready store.
    ///
    /// # Errors
    /// - `Storage` when the snapshot cannot be read and the config says
    ///   [`LoadFallback::Fail`].
    pub fn open(repo: R, clock: Box<dyn Clock>, config: StoreConfig) -> StoreResult<Self> {
        let (habits, load_error) = match repo.load() {
            Ok(habits) => (habits, None),
            Err(err) => match config.load_fallback {
                LoadFallback::Fail => {
                    error!("event=store_open module=store status=error error={err}");
                    return Err(StoreError::Storage(err));
                }
                LoadFallback::StartEmpty => {
                    warn!("event=store_open module=store status=recovered fallback=start_empty error={err}");
                    (Vec::new(), Some(err))
                }
            },
        };

        info!(
            "event=store_open module=store status=ok habit_count={} persistence={:?}",
            habits.len(),
            config.persistence
        );
        Ok(Self {
            repo,
            state: HabitState::new(habits),
            clock,
            config,
            load_error,
            unsaved: false,
        })
    }

    /// Saves any state a best-effort flush failed to persist and returns the
    /// repository.
    ///
    /// # Errors
    /// - `Storage` when that save fails. The store is handed back unchanged
    ///   with the error so the caller can retry.
    pub fn close(mut self) -> Result<R, (Self, StoreError)> {
        if self.unsaved {
            if let Err(err) = self.flush() {
                warn!(
                    "event=store_close module=store status=error habit_count={} code={}",
                    self.state.len(),
                    err.code()
                );
                return Err((self, err));
            }
        }
        info!(
            "event=store_close module=store status=ok habit_count={}",
            self.state.len()
        );
        Ok(self.repo)
    }

    /// Load failure the store recovered from at open, if any.
    pub fn load_error(&self) -> Option<&RepoError> {
        self.load_error.as_ref()
    }

    /// Whether the in-memory state is ahead of the last successful save.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Current local calendar day according to the injected clock.
    pub fn today(&self) -> DateKey {
        self.clock.today()
    }

    /// Applies one command and persists the result per the persistence policy.
    ///
    /// # Errors
    /// - `Validation`, `NotFound` or `DuplicateId` from the transition; the
    ///   state is unchanged.
    /// - `Storage` when the save fails. Under `BestEffort` the new state is
    ///   kept; under `WriteThrough` it is discarded.
    pub fn dispatch(&mut self, command: HabitCommand) -> StoreResult<Effect> {
        let started_at = Instant::now();
        let name = command.name();
        let target = command
            .habit_id()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let Transition { state, effect } =
            transition::apply(&self.state, command).inspect_err(|err| {
                warn!(
                    "event=store_dispatch module=store status=rejected command={name} habit_id={target} code={}",
                    err.code()
                );
            })?;

        if !effect.changed() {
            info!("event=store_dispatch module=store status=noop command={name} habit_id={target}");
            return Ok(effect);
        }

        match self.config.persistence {
            PersistencePolicy::BestEffort => {
                self.state = state;
                self.unsaved = true;
                self.flush()?;
            }
            PersistencePolicy::WriteThrough => {
                persist(&mut self.repo, &state, self.config.version_stamp.as_deref())?;
                self.state = state;
                self.unsaved = false;
            }
        }

        info!(
            "event=store_dispatch module=store status=ok command={name} habit_id={target} habit_count={} duration_ms={}",
            self.state.len(),
            started_at.elapsed().as_millis()
        );
        Ok(effect)
    }

    /// Writes the current collection to the repository.
    pub fn flush(&mut self) -> StoreResult<()> {
        persist(&mut self.repo, &self.state, self.config.version_stamp.as_deref())?;
        self.unsaved = false;
        Ok(())
    }

    /// Validates and appends a new habit.
    pub fn add_habit(&mut self, request: NewHabit) -> StoreResult<Habit> {
        let habit = request.into_habit(self.clock.now_utc())?;
        self.dispatch(HabitCommand::AddHabit(habit.clone()))?;
        Ok(habit)
    }

    /// Replaces the stored habit with the same id.
    pub fn update_habit(&mut self, habit: Habit) -> StoreResult<()> {
        self.dispatch(HabitCommand::UpdateHabit(habit)).map(|_| ())
    }

    /// Removes a habit; unknown ids are a no-op.
    pub fn delete_habit(&mut self, id: &HabitId) -> StoreResult<()> {
        self.dispatch(HabitCommand::DeleteHabit(id.clone())).map(|_| ())
    }

    /// Toggles today's completion of a habit.
    pub fn toggle_completion(
        &mut self,
        id: &HabitId,
        note: impl Into<String>,
    ) -> StoreResult<ToggleOutcome> {
        let now = self.clock.now();
        let day = DateKey::from_instant(&now);
        self.dispatch(HabitCommand::ToggleCompletion {
            habit_id: id.clone(),
            day,
            note: note.into(),
            at: now.with_timezone(&Utc),
        })?;

        let completed = self
            .state
            .get(id)
            .is_some_and(|habit| habit.completions.is_completed_on(day));
        info!("event=habit_toggle module=store status=ok habit_id={id} completed={completed}");
        Ok(if completed {
            ToggleOutcome::Completed
        } else {
            ToggleOutcome::Cleared
        })
    }

    /// Replaces the note of the completion on `day`.
    ///
    /// Returns `false` and changes nothing when `day` has no completion.
    pub fn set_note(
        &mut self,
        id: &HabitId,
        day: DateKey,
        note: impl Into<String>,
    ) -> StoreResult<bool> {
        let effect = self.dispatch(HabitCommand::AddNote {
            habit_id: id.clone(),
            day,
            note: note.into(),
        })?;
        Ok(effect.changed())
    }

    /// Deletes every habit and returns how many were removed.
    pub fn clear_all(&mut self) -> StoreResult<usize> {
        let removed = self.state.len();
        self.dispatch(HabitCommand::ClearAll)?;
        Ok(removed)
    }

    /// All habits in insertion order.
    pub fn list_habits(&self) -> &[Habit] {
        self.state.habits()
    }

    pub fn get_habit(&self, id: &HabitId) -> Option<&Habit> {
        self.state.get(id)
    }

    pub fn today_view(&self) -> Vec<TodayEntry<'_>> {
        projection::today_view(self.state.habits(), self.today())
    }

    pub fn filter_by_status(&self, status: StatusFilter) -> Vec<&Habit> {
        projection::filter_by_status(self.state.habits(), status, self.today())
    }

    pub fn habit_stats(&self, id: &HabitId) -> StoreResult<HabitStats> {
        Ok(habit_stats(&self.require(id)?.completions))
    }

    pub fn habit_progress(&self, id: &HabitId, period: Period) -> StoreResult<Vec<DayMark>> {
        Ok(habit_progress(
            &self.require(id)?.completions,
            period,
            self.today(),
        ))
    }

    /// Completion summary of one habit over the window ending today.
    pub fn period_summary(&self, id: &HabitId, period: Period) -> StoreResult<PeriodSummary> {
        Ok(aggregate::period_summary(
            &self.require(id)?.completions,
            period,
            self.today(),
        ))
    }

    /// Current streak, or 0 once neither today nor yesterday is completed.
    pub fn active_streak(&self, id: &HabitId) -> StoreResult<u32> {
        Ok(active_streak(&self.require(id)?.completions, self.today()))
    }

    /// Collection-wide summary; `None` when there are no habits.
    pub fn overall_stats(&self) -> Option<OverallStats> {
        aggregate::overall_stats(self.state.habits(), self.today())
    }

    pub fn daily_totals(&self, period: Period) -> Vec<DayTally> {
        daily_totals(self.state.habits(), period, self.today())
    }

    /// Export document stamped with the current instant.
    pub fn export(&self) -> ExportEnvelope<'_> {
        export_snapshot(self.state.habits(), self.clock.now_utc())
    }

    fn require(&self, id: &HabitId) -> StoreResult<&Habit> {
        self.state
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}

fn persist<R: SnapshotRepository>(
    repo: &mut R,
    state: &HabitState,
    version: Option<&str>,
) -> StoreResult<()> {
    repo.save_snapshot(state.habits(), version).map_err(|err| {
        error!(
            "event=store_flush module=store status=error habit_count={} error={err}",
            state.len()
        );
        StoreError::Storage(err)
    })
}

#[cfg(test)]
mod tests {
    use super::HabitStore;
    use crate::clock::FixedClock;
    use crate::config::StoreConfig;
    use crate::model::date_key::DateKey;
    use crate::model::habit::{Habit, HabitId, NewHabit};
    use crate::repo::snapshot_repo::{RepoError, RepoResult, SnapshotRepository};
    use crate::service::error::StoreError;
    use crate::stats::aggregate::Period;

    /// In-memory repository counting saves.
    #[derive(Default)]
    struct MemoryRepo {
        habits: Vec<Habit>,
        saves: usize,
    }

    impl SnapshotRepository for MemoryRepo {
        fn load(&self) -> RepoResult<Vec<Habit>> {
            Ok(self.habits.clone())
        }

        fn save_snapshot(&mut self, habits: &[Habit], _version: Option<&str>) -> RepoResult<()> {
            self.habits = habits.to_vec();
            self.saves += 1;
            Ok(())
        }

        fn load_version(&self) -> RepoResult<Option<String>> {
            Ok(None)
        }
    }

    /// Repository whose reads always fail.
    struct BrokenRepo;

    impl SnapshotRepository for BrokenRepo {
        fn load(&self) -> RepoResult<Vec<Habit>> {
            Err(RepoError::InvalidData("unreadable".to_string()))
        }

        fn save_snapshot(&mut self, _habits: &[Habit], _version: Option<&str>) -> RepoResult<()> {
            Ok(())
        }

        fn load_version(&self) -> RepoResult<Option<String>> {
            Ok(None)
        }
    }

    fn store_on(day: &str) -> HabitStore<MemoryRepo> {
        let clock = FixedClock::at_noon(DateKey::parse(day).unwrap());
        HabitStore::open(MemoryRepo::default(), Box::new(clock), StoreConfig::default()).unwrap()
    }

    #[test]
    fn no_op_commands_skip_the_flush() {
        let mut store = store_on("2024-03-01");
        let habit = store
            .add_habit(NewHabit::new("Read", "10 pages", "learning"))
            .unwrap();
        assert_eq!(store.repository().saves, 1);

        store.delete_habit(&HabitId::from("ghost")).unwrap();
        let applied = store
            .set_note(&habit.id, DateKey::parse("2024-03-01").unwrap(), "x")
            .unwrap();
        assert!(!applied);
        assert_eq!(store.repository().saves, 1);
    }

    #[test]
    fn validation_errors_do_not_touch_state() {
        let mut store = store_on("2024-03-01");
        let err = store
            .add_habit(NewHabit::new("", "desc", "health"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_habits().is_empty());
        assert_eq!(store.repository().saves, 0);
    }

    #[test]
    fn close_returns_repository_with_latest_snapshot() {
        let mut store = store_on("2024-03-01");
        store
            .add_habit(NewHabit::new("Walk", "outside", "health"))
            .unwrap();
        let repo = store.close().map_err(|(_, err)| err).unwrap();
        assert_eq!(repo.habits.len(), 1);
        assert_eq!(repo.saves, 1);
    }

    #[test]
    fn windowed_reads_use_the_store_clock() {
        let mut store = store_on("2024-03-01");
        let habit = store
            .add_habit(NewHabit::new("Walk", "outside", "health"))
            .unwrap();
        store.toggle_completion(&habit.id, "").unwrap();

        let summary = store.period_summary(&habit.id, Period::Week).unwrap();
        assert_eq!(summary.completed_days, 1);
        assert_eq!(store.active_streak(&habit.id).unwrap(), 1);

        let ghost = HabitId::from("ghost");
        assert!(matches!(
            store.period_summary(&ghost, Period::Week),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.active_streak(&ghost),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn start_empty_fallback_records_the_load_error() {
        let clock = FixedClock::at_noon(DateKey::parse("2024-03-01").unwrap());
        let store = HabitStore::open(BrokenRepo, Box::new(clock), StoreConfig::default()).unwrap();
        assert!(store.list_habits().is_empty());
        assert!(store.load_error().is_some());
        assert!(!store.has_unsaved_changes());
    }
}
