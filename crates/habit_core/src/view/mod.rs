//! Read-only, day-scoped projections of the habit collection.
//!
//! # Invariants
//! - Projections borrow stored habits and never mutate them.
//! - "Today" is always passed in; nothing here reads the clock.

pub mod projection;
