//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the habit store to Dart via FRB as sync, use-case-level calls.
//! - Hold the one process-level store handle between `habits_open` and
//!   `habits_close`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids, date keys and enum values cross the boundary as strings;
//!   instants cross as epoch milliseconds.
//! - Calls made while no store is open return a failure envelope.

use habit_core::db::open_db;
use habit_core::view::projection::recent_history;
use habit_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, Completion, DateKey, Habit, HabitId, HabitStore, NewHabit, Period,
    SqliteSnapshotRepository, StatusFilter, StoreConfig, StoreError, SystemClock,
    ToggleOutcome, RECENT_HISTORY_LIMIT,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

const HABITS_DB_FILE_NAME: &str = "habit_tracker.sqlite3";
const HABITS_DB_PATH_ENV: &str = "HABIT_TRACKER_DB_PATH";
const STORE_NOT_OPEN: &str = "habit store is not open";

type Store = HabitStore<SqliteSnapshotRepository>;

static STORE: Mutex<Option<Store>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected habit ID, when the action targets one habit.
    pub habit_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl HabitActionResponse {
    fn success(message: impl Into<String>, habit_id: Option<String>) -> Self {
        Self {
            ok: true,
            habit_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            habit_id: None,
            message: message.into(),
        }
    }
}

/// Toggle response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitToggleResponse {
    pub ok: bool,
    /// Today's status after the toggle.
    pub completed: bool,
    pub message: String,
}

/// One completion entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    /// Calendar day in `YYYY-MM-DD`.
    pub date_key: String,
    pub completed: bool,
    pub note: String,
    pub timestamp_ms: i64,
}

/// Habit record projected for Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub reminder_time: Option<String>,
    pub created_at_ms: i64,
    /// Entries in ascending day order.
    pub completions: Vec<CompletionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitListResponse {
    pub ok: bool,
    pub items: Vec<HabitItem>,
    pub message: String,
}

/// Habit annotated with today's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayItem {
    pub habit: HabitItem,
    pub is_completed_today: bool,
    pub today_note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayResponse {
    pub ok: bool,
    pub items: Vec<TodayItem>,
    /// Effective filter (`all|completed|pending`).
    pub applied_filter: String,
    pub message: String,
}

/// Per-habit statistics envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitStatsResponse {
    pub ok: bool,
    pub total_days: u32,
    pub completed_days: u32,
    pub tracked_days: u32,
    pub success_rate: f64,
    pub current_streak: u32,
    /// Current streak, or 0 once neither today nor yesterday is completed.
    pub active_streak: u32,
    pub longest_streak: u32,
    /// Latest completed entries, newest first.
    pub recent: Vec<CompletionItem>,
    pub message: String,
}

impl HabitStatsResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            total_days: 0,
            completed_days: 0,
            tracked_days: 0,
            success_rate: 0.0,
            current_streak: 0,
            active_streak: 0,
            longest_streak: 0,
            recent: Vec::new(),
            message: message.into(),
        }
    }
}

/// Collection-wide statistics envelope. All zero when no habits exist.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitsOverviewResponse {
    pub ok: bool,
    pub total_habits: u32,
    pub completed_today: u32,
    pub total_completions: u32,
    pub average_success_rate: f64,
    pub message: String,
}

impl HabitsOverviewResponse {
    fn empty(ok: bool, message: impl Into<String>) -> Self {
        Self {
            ok,
            total_habits: 0,
            completed_today: 0,
            total_completions: 0,
            average_success_rate: 0.0,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTallyItem {
    pub date_key: String,
    pub completed: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotalsResponse {
    pub ok: bool,
    /// Days oldest first.
    pub items: Vec<DayTallyItem>,
    /// Effective period (`week|month|year`).
    pub applied_period: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitsExportResponse {
    pub ok: bool,
    /// Pretty-printed export document; empty on failure.
    pub json: String,
    pub message: String,
}

/// Opens the habit store backed by a SQLite file.
///
/// Input semantics:
/// - `db_path`: database file; when absent or blank, `HABIT_TRACKER_DB_PATH`
///   or a file in the temp directory is used.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - An already open store is closed (and flushed) first. When that flush
///   fails, the previous store stays open and the call fails.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_open(db_path: Option<String>) -> HabitActionResponse {
    let path = resolve_db_path(db_path);
    let mut slot = lock_store();
    if let Some(previous) = slot.take() {
        if let Err((previous, err)) = previous.close() {
            warn!("event=ffi_store_reopen module=ffi status=error code={}", err.code());
            *slot = Some(previous);
            return HabitActionResponse::failure(format!(
                "habits_open failed: previous store could not be saved: {err}"
            ));
        }
    }

    let opened = open_db(&path)
        .map_err(|err| format!("habit DB open failed: {err}"))
        .and_then(|conn| {
            SqliteSnapshotRepository::try_new(conn)
                .map_err(|err| format!("habit repo init failed: {err}"))
        })
        .and_then(|repo| {
            HabitStore::open(repo, Box::new(SystemClock), StoreConfig::default())
                .map_err(|err| format!("habits_open failed: {err}"))
        });

    match opened {
        Ok(store) => {
            let count = store.list_habits().len();
            let message = match store.load_error() {
                Some(err) => format!("Stored habits were unreadable; starting empty ({err})."),
                None => format!("Loaded {count} habit(s)."),
            };
            info!("event=ffi_store_open module=ffi status=ok habit_count={count}");
            *slot = Some(store);
            HabitActionResponse::success(message, None)
        }
        Err(message) => HabitActionResponse::failure(message),
    }
}

/// Flushes and releases the open store.
///
/// Closing when nothing is open succeeds. When the flush fails the store
/// stays open, so a later call can retry.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_close() -> HabitActionResponse {
    let mut slot = lock_store();
    let Some(store) = slot.take() else {
        return HabitActionResponse::success("Habit store already closed.", None);
    };
    match store.close() {
        Ok(_) => HabitActionResponse::success("Habit store closed.", None),
        Err((store, err)) => {
            *slot = Some(store);
            HabitActionResponse::failure(format!("habits_close failed: {err}"))
        }
    }
}

/// Creates a habit.
///
/// # FFI contract
/// - Returns created habit ID on success.
/// - Blank `reminder_time` is stored as absent.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_add(
    name: String,
    description: String,
    category: String,
    reminder_time: Option<String>,
) -> HabitActionResponse {
    let mut request = NewHabit::new(name, description, category);
    request.reminder_time = reminder_time;
    match with_store(|store| store.add_habit(request)) {
        Ok(habit) => HabitActionResponse::success("Habit created.", Some(habit.id.to_string())),
        Err(err) => HabitActionResponse::failure(format!("habit_add failed: {err}")),
    }
}

/// Replaces the editable fields of a habit; completions are kept.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_update(
    habit_id: String,
    name: String,
    description: String,
    category: String,
    reminder_time: Option<String>,
) -> HabitActionResponse {
    let id = HabitId::from(habit_id);
    let result = with_store(|store| {
        let mut habit = store
            .get_habit(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        habit.name = name.trim().to_string();
        habit.description = description.trim().to_string();
        habit.category = Category::parse(&category)?;
        habit.reminder_time = reminder_time
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        store.update_habit(habit)
    });
    match result {
        Ok(()) => HabitActionResponse::success("Habit updated.", Some(id.to_string())),
        Err(err) => HabitActionResponse::failure(format!("habit_update failed: {err}")),
    }
}

/// Deletes a habit and its history. Unknown IDs succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_delete(habit_id: String) -> HabitActionResponse {
    let id = HabitId::from(habit_id);
    match with_store(|store| store.delete_habit(&id)) {
        Ok(()) => HabitActionResponse::success("Habit deleted.", Some(id.to_string())),
        Err(err) => HabitActionResponse::failure(format!("habit_delete failed: {err}")),
    }
}

/// Toggles today's completion; `note` is stored only when completing.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_toggle(habit_id: String, note: Option<String>) -> HabitToggleResponse {
    let id = HabitId::from(habit_id);
    match with_store(|store| store.toggle_completion(&id, note.unwrap_or_default())) {
        Ok(ToggleOutcome::Completed) => HabitToggleResponse {
            ok: true,
            completed: true,
            message: "Marked complete.".to_string(),
        },
        Ok(ToggleOutcome::Cleared) => HabitToggleResponse {
            ok: true,
            completed: false,
            message: "Completion cleared.".to_string(),
        },
        Err(err) => HabitToggleResponse {
            ok: false,
            completed: false,
            message: format!("habit_toggle failed: {err}"),
        },
    }
}

/// Replaces the note of a recorded completion.
///
/// A day without a completion is left unchanged and still reports `ok`.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_set_note(habit_id: String, date_key: String, note: String) -> HabitActionResponse {
    let id = HabitId::from(habit_id);
    let result = with_store(|store| {
        let day = DateKey::parse(&date_key)?;
        store.set_note(&id, day, note)
    });
    match result {
        Ok(true) => HabitActionResponse::success("Note saved.", Some(id.to_string())),
        Ok(false) => HabitActionResponse::success(
            "No completion recorded for that day.",
            Some(id.to_string()),
        ),
        Err(err) => HabitActionResponse::failure(format!("habit_set_note failed: {err}")),
    }
}

/// Lists every habit in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_list() -> HabitListResponse {
    match with_store(|store| Ok(store.list_habits().iter().map(to_habit_item).collect::<Vec<_>>())) {
        Ok(items) => HabitListResponse {
            message: format!("Found {} habit(s).", items.len()),
            ok: true,
            items,
        },
        Err(err) => HabitListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("habits_list failed: {err}"),
        },
    }
}

/// Today's view, optionally filtered by status.
///
/// Input semantics:
/// - `filter`: `all|completed|pending`; absent means `all`.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_today(filter: Option<String>) -> TodayResponse {
    let status = match filter.as_deref().map(str::parse::<StatusFilter>) {
        None => StatusFilter::All,
        Some(Ok(status)) => status,
        Some(Err(err)) => {
            return TodayResponse {
                ok: false,
                items: Vec::new(),
                applied_filter: StatusFilter::All.to_string(),
                message: format!("habits_today failed: {err}"),
            };
        }
    };

    let result = with_store(|store| {
        Ok(store
            .today_view()
            .into_iter()
            .filter(|entry| status.accepts(entry.is_completed_today))
            .map(|entry| TodayItem {
                habit: to_habit_item(entry.habit),
                is_completed_today: entry.is_completed_today,
                today_note: entry.today_note.to_string(),
            })
            .collect::<Vec<_>>())
    });
    match result {
        Ok(items) => TodayResponse {
            message: format!("{} habit(s) for today.", items.len()),
            ok: true,
            items,
            applied_filter: status.to_string(),
        },
        Err(err) => TodayResponse {
            ok: false,
            items: Vec::new(),
            applied_filter: status.to_string(),
            message: format!("habits_today failed: {err}"),
        },
    }
}

/// Streaks, success rate and recent history of one habit.
#[flutter_rust_bridge::frb(sync)]
pub fn habit_stats(habit_id: String) -> HabitStatsResponse {
    let id = HabitId::from(habit_id);
    let result = with_store(|store| {
        let stats = store.habit_stats(&id)?;
        let active = store.active_streak(&id)?;
        let recent: Vec<CompletionItem> = store
            .get_habit(&id)
            .map(|habit| {
                recent_history(&habit.completions, RECENT_HISTORY_LIMIT)
                    .into_iter()
                    .map(|(day, entry)| to_completion_item(day, entry))
                    .collect()
            })
            .unwrap_or_default();
        Ok((stats, active, recent))
    });
    match result {
        Ok((stats, active, recent)) => HabitStatsResponse {
            ok: true,
            total_days: to_u32(stats.total_days),
            completed_days: to_u32(stats.completed_days),
            tracked_days: to_u32(stats.tracked_days),
            success_rate: stats.success_rate,
            current_streak: stats.current_streak,
            active_streak: active,
            longest_streak: stats.longest_streak,
            recent,
            message: "Stats computed.".to_string(),
        },
        Err(err) => HabitStatsResponse::failure(format!("habit_stats failed: {err}")),
    }
}

/// Collection-wide summary for the statistics screen.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_overview() -> HabitsOverviewResponse {
    match with_store(|store| Ok(store.overall_stats())) {
        Ok(Some(stats)) => HabitsOverviewResponse {
            ok: true,
            total_habits: to_u32(stats.total_habits),
            completed_today: to_u32(stats.completed_today),
            total_completions: to_u32(stats.total_completions),
            average_success_rate: stats.average_success_rate,
            message: "Overview computed.".to_string(),
        },
        Ok(None) => HabitsOverviewResponse::empty(true, "No habits yet."),
        Err(err) => HabitsOverviewResponse::empty(false, format!("habits_overview failed: {err}")),
    }
}

/// Habits completed per day over a window ending today.
///
/// Input semantics:
/// - `period`: `week|month|year`.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_daily_totals(period: String) -> DailyTotalsResponse {
    let Some(period) = Period::parse(&period) else {
        return DailyTotalsResponse {
            ok: false,
            items: Vec::new(),
            applied_period: String::new(),
            message: format!("habits_daily_totals failed: unknown period `{}`", period.trim()),
        };
    };

    match with_store(|store| Ok(store.daily_totals(period))) {
        Ok(tallies) => DailyTotalsResponse {
            ok: true,
            items: tallies
                .into_iter()
                .map(|tally| DayTallyItem {
                    date_key: tally.date.to_string(),
                    completed: to_u32(tally.completed),
                    total: to_u32(tally.total),
                })
                .collect(),
            applied_period: period.to_string(),
            message: format!("Totals for the last {} day(s).", period.days()),
        },
        Err(err) => DailyTotalsResponse {
            ok: false,
            items: Vec::new(),
            applied_period: period.to_string(),
            message: format!("habits_daily_totals failed: {err}"),
        },
    }
}

/// Serializes every habit into a portable JSON document.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_export() -> HabitsExportResponse {
    let result = with_store(|store| Ok(store.export().to_json_pretty()))
        .and_then(|json| json.map_err(|err| err.to_string()));
    match result {
        Ok(json) => HabitsExportResponse {
            ok: true,
            json,
            message: "Export ready.".to_string(),
        },
        Err(err) => HabitsExportResponse {
            ok: false,
            json: String::new(),
            message: format!("habits_export failed: {err}"),
        },
    }
}

/// Deletes every habit.
#[flutter_rust_bridge::frb(sync)]
pub fn habits_clear_all() -> HabitActionResponse {
    match with_store(|store| store.clear_all()) {
        Ok(removed) => HabitActionResponse::success(format!("Removed {removed} habit(s)."), None),
        Err(err) => HabitActionResponse::failure(format!("habits_clear_all failed: {err}")),
    }
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    if let Some(raw) = explicit {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    if let Ok(raw) = std::env::var(HABITS_DB_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(HABITS_DB_FILE_NAME)
}

fn lock_store() -> MutexGuard<'static, Option<Store>> {
    STORE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_store<T>(f: impl FnOnce(&mut Store) -> Result<T, StoreError>) -> Result<T, String> {
    let mut slot = lock_store();
    let store = slot.as_mut().ok_or_else(|| STORE_NOT_OPEN.to_string())?;
    f(store).map_err(|err| err.to_string())
}

fn to_habit_item(habit: &Habit) -> HabitItem {
    HabitItem {
        id: habit.id.to_string(),
        name: habit.name.clone(),
        description: habit.description.clone(),
        category: habit.category.to_string(),
        reminder_time: habit.reminder_time.clone(),
        created_at_ms: habit.created_at.timestamp_millis(),
        completions: habit
            .completions
            .iter()
            .map(|(day, entry)| to_completion_item(day, entry))
            .collect(),
    }
}

fn to_completion_item(day: DateKey, entry: &Completion) -> CompletionItem {
    CompletionItem {
        date_key: day.to_string(),
        completed: entry.completed,
        note: entry.note.clone(),
        timestamp_ms: entry.timestamp.timestamp_millis(),
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
