//! Store commands.
//!
//! Every store mutation is expressed as one [`HabitCommand`] and processed by
//! `service::transition::apply`, which keeps mutations auditable and testable
//! without a live store.

use crate::model::date_key::DateKey;
use crate::model::habit::{Habit, HabitId};
use chrono::{DateTime, Utc};

/// Tagged mutation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitCommand {
    /// Append a fully built habit.
    AddHabit(Habit),
    /// Replace the habit with the same id verbatim.
    UpdateHabit(Habit),
    /// Remove a habit and its completion history. Unknown ids are a no-op.
    DeleteHabit(HabitId),
    /// Flip completion of `day`; inserts with `note` and `at` when completing.
    ToggleCompletion {
        habit_id: HabitId,
        day: DateKey,
        note: String,
        at: DateTime<Utc>,
    },
    /// Replace the note of an existing completion.
    AddNote {
        habit_id: HabitId,
        day: DateKey,
        note: String,
    },
    /// Remove every habit.
    ClearAll,
}

impl HabitCommand {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddHabit(_) => "add_habit",
            Self::UpdateHabit(_) => "update_habit",
            Self::DeleteHabit(_) => "delete_habit",
            Self::ToggleCompletion { .. } => "toggle_completion",
            Self::AddNote { .. } => "add_note",
            Self::ClearAll => "clear_all",
        }
    }

    /// Habit the command targets; `None` for collection-wide commands.
    pub fn habit_id(&self) -> Option<&HabitId> {
        match self {
            Self::AddHabit(habit) | Self::UpdateHabit(habit) => Some(&habit.id),
            Self::DeleteHabit(id) => Some(id),
            Self::ToggleCompletion { habit_id, .. } | Self::AddNote { habit_id, .. } => {
                Some(habit_id)
            }
            Self::ClearAll => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HabitCommand;
    use crate::model::habit::HabitId;

    #[test]
    fn habit_id_is_absent_only_for_collection_commands() {
        let id = HabitId::from("h-1");
        assert_eq!(HabitCommand::DeleteHabit(id.clone()).habit_id(), Some(&id));
        assert_eq!(HabitCommand::ClearAll.habit_id(), None);
    }
}
