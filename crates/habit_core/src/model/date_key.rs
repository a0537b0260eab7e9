//! Canonical calendar-day keys.
//!
//! # Responsibility
//! - Map any instant to the calendar day it falls on.
//! - Parse and print the `YYYY-MM-DD` key used by completion bookkeeping.
//!
//! # Invariants
//! - Keys are zero-padded with a four digit year, so string order equals
//!   chronological order.
//! - Two instants on the same calendar day in the same zone produce equal keys.

use crate::model::habit::HabitValidationError;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const MAX_KEY_YEAR: i32 = 9999;

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date key regex"));

/// One calendar day, printed as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Calendar day of `instant` in the instant's own time zone.
    pub fn from_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.date_naive())
    }

    /// Device-local calendar day of a UTC instant.
    pub fn local(instant: DateTime<Utc>) -> Self {
        Self::from_instant(&instant.with_timezone(&Local))
    }

    /// Wraps a calendar date.
    ///
    /// # Errors
    /// - Returns `InvalidDateKey` for years outside `0..=9999`, which would
    ///   break the lexicographic ordering of the printed key.
    pub fn from_date(date: NaiveDate) -> Result<Self, HabitValidationError> {
        if !(0..=MAX_KEY_YEAR).contains(&date.year()) {
            return Err(HabitValidationError::InvalidDateKey(date.to_string()));
        }
        Ok(Self(date))
    }

    /// Parses a strict, zero-padded `YYYY-MM-DD` key.
    pub fn parse(value: &str) -> Result<Self, HabitValidationError> {
        if !DATE_KEY_RE.is_match(value) {
            return Err(HabitValidationError::InvalidDateKey(value.to_string()));
        }
        let date = NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .map_err(|_| HabitValidationError::InvalidDateKey(value.to_string()))?;
        Self::from_date(date)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// The following calendar day.
    pub fn succ(self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding calendar day.
    pub fn pred(self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Signed number of days from `self` to `later`.
    pub fn days_until(self, later: Self) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// The day `days` calendar days before this one.
    pub fn minus_days(self, days: u32) -> Option<Self> {
        self.0
            .checked_sub_days(chrono::Days::new(u64::from(days)))
            .map(Self)
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = HabitValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = HabitValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(value: DateKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::DateKey;
    use chrono::{FixedOffset, Local, NaiveDate, TimeZone, Utc};

    #[test]
    fn same_day_instants_share_a_key() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let morning = zone.with_ymd_and_hms(2024, 3, 9, 0, 0, 1).unwrap();
        let night = zone.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        assert_eq!(DateKey::from_instant(&morning), DateKey::from_instant(&night));
        assert_eq!(DateKey::from_instant(&night).to_string(), "2024-03-09");
    }

    #[test]
    fn key_follows_the_instant_zone_not_utc() {
        let zone = FixedOffset::west_opt(5 * 3600).unwrap();
        let late_evening = zone.with_ymd_and_hms(2024, 12, 31, 22, 30, 0).unwrap();
        assert_eq!(DateKey::from_instant(&late_evening).to_string(), "2024-12-31");
    }

    #[test]
    fn local_key_uses_the_device_zone() {
        let utc = Utc.with_ymd_and_hms(2024, 7, 1, 23, 30, 0).unwrap();
        assert_eq!(
            DateKey::local(utc),
            DateKey::from_instant(&utc.with_timezone(&Local))
        );

        if let Some(after_midnight) = Local.with_ymd_and_hms(2024, 7, 2, 0, 30, 0).earliest() {
            let key = DateKey::local(after_midnight.with_timezone(&Utc));
            assert_eq!(key.to_string(), "2024-07-02");
        }
    }

    #[test]
    fn parse_is_strict_about_padding() {
        assert!(DateKey::parse("2024-01-05").is_ok());
        assert!(DateKey::parse("2024-1-5").is_err());
        assert!(DateKey::parse("2024-02-30").is_err());
        assert!(DateKey::parse(" 2024-01-05").is_err());
    }

    #[test]
    fn string_order_matches_chronological_order() {
        let mut keys = vec![
            DateKey::parse("2024-10-01").unwrap(),
            DateKey::parse("2023-12-31").unwrap(),
            DateKey::parse("2024-09-30").unwrap(),
        ];
        let mut as_strings: Vec<String> = keys.iter().map(ToString::to_string).collect();
        keys.sort();
        as_strings.sort();
        let sorted: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, as_strings);
    }

    #[test]
    fn calendar_helpers_cross_month_boundaries() {
        let key = DateKey::parse("2024-03-01").unwrap();
        assert_eq!(key.pred().unwrap().to_string(), "2024-02-29");
        assert_eq!(key.minus_days(29).unwrap().to_string(), "2024-02-01");
        assert_eq!(
            DateKey::parse("2024-02-28").unwrap().days_until(key),
            2
        );
    }

    #[test]
    fn from_date_rejects_five_digit_years() {
        let far = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(DateKey::from_date(far).is_err());
    }
}
