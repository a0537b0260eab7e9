//! Habit domain model.
//!
//! # Responsibility
//! - Define the canonical habit record and its creation request.
//! - Validate caller input at the core boundary.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused for another habit.
//! - `created_at` never changes after creation.
//! - `completions` is only written through store mutations.

use crate::model::completion::CompletionLog;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, stable habit identifier.
///
/// New ids are UUID v4 strings; ids loaded from storage are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Generates a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for HabitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Habit grouping.
///
/// Unknown category strings are preserved as `Custom` so that data written by
/// newer clients survives a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Health,
    Productivity,
    Learning,
    Mindfulness,
    Social,
    Other,
    Custom(String),
}

impl Category {
    /// Parses a category name; an empty or blank value is `MissingCategory`.
    pub fn parse(value: &str) -> Result<Self, HabitValidationError> {
        let trimmed = value.trim();
        let category = match trimmed {
            "" => return Err(HabitValidationError::MissingCategory),
            "health" => Self::Health,
            "productivity" => Self::Productivity,
            "learning" => Self::Learning,
            "mindfulness" => Self::Mindfulness,
            "social" => Self::Social,
            "other" => Self::Other,
            custom => Self::Custom(custom.to_string()),
        };
        Ok(category)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Health => "health",
            Self::Productivity => "productivity",
            Self::Learning => "learning",
            Self::Mindfulness => "mindfulness",
            Self::Social => "social",
            Self::Other => "other",
            Self::Custom(value) => value.as_str(),
        }
    }

    /// Whether this is one of the built-in categories.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl TryFrom<String> for Category {
    type Error = HabitValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for caller-provided habit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    EmptyName,
    EmptyDescription,
    MissingCategory,
    InvalidDateKey(String),
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name must not be empty"),
            Self::EmptyDescription => write!(f, "habit description must not be empty"),
            Self::MissingCategory => write!(f, "habit category is required"),
            Self::InvalidDateKey(value) => {
                write!(f, "invalid date key `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for HabitValidationError {}

/// Canonical habit record.
///
/// Field names serialize in camelCase to match the persisted snapshot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    /// Time-of-day string kept for the reminder layer; not interpreted here.
    #[serde(default)]
    pub reminder_time: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completions: CompletionLog,
}

impl Habit {
    /// Checks the fields every stored habit must satisfy.
    ///
    /// Description may be empty on records written by update paths.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::EmptyName);
        }
        if self.category.as_str().trim().is_empty() {
            return Err(HabitValidationError::MissingCategory);
        }
        Ok(())
    }
}

/// Creation request for a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub description: String,
    /// Raw category name; validated by [`NewHabit::into_habit`].
    pub category: String,
    pub reminder_time: Option<String>,
}

impl NewHabit {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: category.into(),
            reminder_time: None,
        }
    }

    pub fn with_reminder(mut self, reminder_time: impl Into<String>) -> Self {
        self.reminder_time = Some(reminder_time.into());
        self
    }

    /// Validates the request and builds a fresh habit.
    ///
    /// # Contract
    /// - Name and description are trimmed and must be non-empty.
    /// - A blank reminder time is stored as absent.
    /// - The new habit has a generated id and an empty completion log.
    pub fn into_habit(self, created_at: DateTime<Utc>) -> Result<Habit, HabitValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(HabitValidationError::EmptyName);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(HabitValidationError::EmptyDescription);
        }
        let category = Category::parse(&self.category)?;
        let reminder_time = self
            .reminder_time
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Habit {
            id: HabitId::generate(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            reminder_time,
            created_at,
            completions: CompletionLog::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, HabitValidationError, NewHabit};
    use chrono::Utc;

    #[test]
    fn into_habit_trims_and_drops_blank_reminder() {
        let habit = NewHabit::new("  Drink water ", " 8 glasses ", "health")
            .with_reminder("  ")
            .into_habit(Utc::now())
            .unwrap();
        assert_eq!(habit.name, "Drink water");
        assert_eq!(habit.description, "8 glasses");
        assert_eq!(habit.category, Category::Health);
        assert_eq!(habit.reminder_time, None);
        assert!(habit.completions.is_empty());
    }

    #[test]
    fn into_habit_rejects_blank_fields_in_order() {
        let err = NewHabit::new(" ", "", "").into_habit(Utc::now()).unwrap_err();
        assert_eq!(err, HabitValidationError::EmptyName);
        let err = NewHabit::new("Read", "\t", "").into_habit(Utc::now()).unwrap_err();
        assert_eq!(err, HabitValidationError::EmptyDescription);
        let err = NewHabit::new("Read", "20 pages", "").into_habit(Utc::now()).unwrap_err();
        assert_eq!(err, HabitValidationError::MissingCategory);
    }

    #[test]
    fn unknown_category_is_preserved() {
        let category = Category::parse("finance").unwrap();
        assert_eq!(category, Category::Custom("finance".to_string()));
        assert!(!category.is_known());
        assert_eq!(String::from(category), "finance");
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = NewHabit::new("A", "a", "other").into_habit(Utc::now()).unwrap();
        let second = NewHabit::new("A", "a", "other").into_habit(Utc::now()).unwrap();
        assert_ne!(first.id, second.id);
    }
}
