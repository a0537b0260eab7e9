//! Core use-case services.
//!
//! # Responsibility
//! - Own the habit collection behind an explicit open/close lifecycle.
//! - Express mutations as pure state transitions plus a persistence step.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod error;
pub mod export;
pub mod habit_store;
pub mod transition;
