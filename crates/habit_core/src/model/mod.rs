//! Habit domain model.
//!
//! # Responsibility
//! - Define the habit record, its completion log and calendar-day keys.
//! - Define the command vocabulary for store mutations.
//!
//! # Invariants
//! - Every habit is identified by a stable `HabitId`.
//! - Completion bookkeeping is keyed by `DateKey` only.
//! - Deletion is a hard delete; no completion data outlives its habit.

pub mod command;
pub mod completion;
pub mod date_key;
pub mod habit;
