//! Store-level error taxonomy.

use crate::model::habit::{HabitId, HabitValidationError};
use crate::repo::snapshot_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by every store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Caller input failed validation.
    Validation(HabitValidationError),
    /// The referenced habit does not exist.
    NotFound(HabitId),
    /// A habit with this id is already stored.
    DuplicateId(HabitId),
    /// Durable storage read or write failed.
    Storage(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::DuplicateId(id) => write!(f, "habit id already exists: {id}"),
            Self::Storage(err) => write!(f, "habit storage failed: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound(_) | Self::DuplicateId(_) => None,
        }
    }
}

impl From<HabitValidationError> for StoreError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl StoreError {
    /// Short machine-readable code for log events and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::DuplicateId(_) => "duplicate_id",
            Self::Storage(_) => "storage",
        }
    }
}
