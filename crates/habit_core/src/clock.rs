//! Wall-clock source for "now" and "today".
//!
//! Store operations never read the system time directly; they ask the
//! injected [`Clock`], so date-dependent behavior is reproducible in tests.

use crate::model::date_key::DateKey;
use chrono::{DateTime, Local, Utc};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Current instant in UTC, used for persisted timestamps.
    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    /// Date key of the current local calendar day.
    fn today(&self) -> DateKey {
        DateKey::from_instant(&self.now())
    }
}

/// Reads the device clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now }
    }

    /// Local noon of the given day; noon avoids DST gaps around midnight.
    pub fn at_noon(day: DateKey) -> Self {
        let naive = day
            .date()
            .and_hms_opt(12, 0, 0)
            .expect("noon is a valid time of day");
        let now = naive
            .and_local_timezone(Local)
            .earliest()
            .unwrap_or_else(|| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc).into());
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }
}
