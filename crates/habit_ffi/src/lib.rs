//! Flutter-facing bindings for the habit tracker core.
//! Functions here adapt `habit_core` to FFI-safe types and hold no business rules.

pub mod api;
