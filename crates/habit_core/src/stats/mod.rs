//! Derived habit metrics.
//!
//! # Responsibility
//! - Compute streaks, success rates and day-windowed aggregates.
//!
//! # Invariants
//! - Every function is pure: inputs are borrowed immutably, nothing is cached.
//! - Contiguity is calendar-based: a day without a completed entry breaks a
//!   streak even if no entry was ever recorded for it.
//! - Entries with `completed: false` count as missed days.

pub mod aggregate;
pub mod streak;
