//! Persistence adapter for the habit collection.
//!
//! # Responsibility
//! - Define the snapshot load/save contract used by the store.
//! - Keep SQLite and JSON details inside the persistence boundary.
//!
//! # Invariants
//! - Saves replace the whole snapshot; there are no partial updates.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod snapshot_repo;
