//! Pure state transitions for the habit collection.
//!
//! # Responsibility
//! - Compute the next collection for one [`HabitCommand`].
//! - Report what changed, so callers can skip no-op persistence.
//!
//! # Invariants
//! - `apply` never mutates its input; a failed command leaves no trace.
//! - Collection order is insertion order; updates keep a habit's position.

use crate::model::command::HabitCommand;
use crate::model::completion::ToggleOutcome;
use crate::model::date_key::DateKey;
use crate::model::habit::{Habit, HabitId};
use crate::service::error::{StoreError, StoreResult};

/// The in-memory habit collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitState {
    habits: Vec<Habit>,
}

impl HabitState {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    fn position(&self, id: &HabitId) -> Option<usize> {
        self.habits.iter().position(|habit| &habit.id == id)
    }
}

/// Observable result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Added(HabitId),
    Updated(HabitId),
    Deleted {
        habit_id: HabitId,
        existed: bool,
    },
    Toggled {
        habit_id: HabitId,
        day: DateKey,
        outcome: ToggleOutcome,
    },
    NoteSet {
        habit_id: HabitId,
        day: DateKey,
        applied: bool,
    },
    Cleared {
        removed: usize,
    },
}

impl Effect {
    /// Whether the collection differs from the previous state.
    pub fn changed(&self) -> bool {
        match self {
            Self::Added(_) | Self::Updated(_) | Self::Toggled { .. } => true,
            Self::Deleted { existed, .. } => *existed,
            Self::NoteSet { applied, .. } => *applied,
            Self::Cleared { removed } => *removed > 0,
        }
    }
}

/// Next state plus the effect that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: HabitState,
    pub effect: Effect,
}

/// Applies one command to `state`.
///
/// # Errors
/// - `Validation` when an added or updated habit is invalid.
/// - `DuplicateId` when an added habit reuses a stored id.
/// - `NotFound` for update, toggle and note commands on unknown ids.
pub fn apply(state: &HabitState, command: HabitCommand) -> StoreResult<Transition> {
    let mut next = state.clone();
    let effect = match command {
        HabitCommand::AddHabit(habit) => {
            habit.validate()?;
            if next.position(&habit.id).is_some() {
                return Err(StoreError::DuplicateId(habit.id));
            }
            let id = habit.id.clone();
            next.habits.push(habit);
            Effect::Added(id)
        }
        HabitCommand::UpdateHabit(habit) => {
            habit.validate()?;
            let index = next
                .position(&habit.id)
                .ok_or_else(|| StoreError::NotFound(habit.id.clone()))?;
            let id = habit.id.clone();
            next.habits[index] = habit;
            Effect::Updated(id)
        }
        HabitCommand::DeleteHabit(habit_id) => {
            let before = next.habits.len();
            next.habits.retain(|habit| habit.id != habit_id);
            let existed = next.habits.len() != before;
            Effect::Deleted { habit_id, existed }
        }
        HabitCommand::ToggleCompletion {
            habit_id,
            day,
            note,
            at,
        } => {
            let habit = habit_mut(&mut next, &habit_id)?;
            let outcome = habit.completions.toggle(day, note, at);
            Effect::Toggled {
                habit_id,
                day,
                outcome,
            }
        }
        HabitCommand::AddNote {
            habit_id,
            day,
            note,
        } => {
            let habit = habit_mut(&mut next, &habit_id)?;
            let applied = habit.completions.set_note(day, note);
            Effect::NoteSet {
                habit_id,
                day,
                applied,
            }
        }
        HabitCommand::ClearAll => {
            let removed = next.habits.len();
            next.habits.clear();
            Effect::Cleared { removed }
        }
    };

    Ok(Transition {
        state: next,
        effect,
    })
}

fn habit_mut<'a>(state: &'a mut HabitState, id: &HabitId) -> StoreResult<&'a mut Habit> {
    state
        .habits
        .iter_mut()
        .find(|habit| &habit.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

#[cfg(test)]
mod tests {
    use super::{apply, Effect, HabitState};
    use crate::model::command::HabitCommand;
    use crate::model::completion::ToggleOutcome;
    use crate::model::date_key::DateKey;
    use crate::model::habit::{Habit, HabitId, NewHabit};
    use crate::service::error::StoreError;
    use chrono::{TimeZone, Utc};

    fn habit(name: &str) -> Habit {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        NewHabit::new(name, "desc", "health")
            .into_habit(created)
            .unwrap()
    }

    fn toggle(id: &HabitId, day: &str, note: &str) -> HabitCommand {
        HabitCommand::ToggleCompletion {
            habit_id: id.clone(),
            day: DateKey::parse(day).unwrap(),
            note: note.to_string(),
            at: Utc.with_ymd_and_hms(2024, 1, 2, 7, 0, 0).unwrap(),
        }
    }

    #[test]
    fn failed_command_leaves_state_untouched() {
        let state = HabitState::new(vec![habit("Read")]);
        let err = apply(&state, toggle(&HabitId::from("missing"), "2024-01-02", "")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id.as_str() == "missing"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn toggle_then_toggle_is_identity() {
        let read = habit("Read");
        let id = read.id.clone();
        let state = HabitState::new(vec![read]);

        let first = apply(&state, toggle(&id, "2024-01-02", "ch. 3")).unwrap();
        assert!(matches!(
            first.effect,
            Effect::Toggled { outcome: ToggleOutcome::Completed, .. }
        ));
        let second = apply(&first.state, toggle(&id, "2024-01-02", "")).unwrap();
        assert!(matches!(
            second.effect,
            Effect::Toggled { outcome: ToggleOutcome::Cleared, .. }
        ));
        assert_eq!(second.state, state);
    }

    #[test]
    fn update_keeps_position_and_replaces_verbatim() {
        let first = habit("First");
        let mut second = habit("Second");
        let state = HabitState::new(vec![first.clone(), second.clone()]);

        second.name = "Second, renamed".to_string();
        second.description = String::new();
        let next = apply(&state, HabitCommand::UpdateHabit(second.clone())).unwrap();
        assert_eq!(next.state.habits()[0], first);
        assert_eq!(next.state.habits()[1], second);
    }

    #[test]
    fn update_rejects_blank_name() {
        let mut read = habit("Read");
        let state = HabitState::new(vec![read.clone()]);
        read.name = "   ".to_string();
        let err = apply(&state, HabitCommand::UpdateHabit(read)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn add_rejects_reused_id() {
        let read = habit("Read");
        let state = HabitState::new(vec![read.clone()]);
        let err = apply(&state, HabitCommand::AddHabit(read)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
    }

    #[test]
    fn no_op_effects_report_unchanged() {
        let read = habit("Read");
        let id = read.id.clone();
        let state = HabitState::new(vec![read]);

        let delete = apply(&state, HabitCommand::DeleteHabit(HabitId::from("ghost"))).unwrap();
        assert!(!delete.effect.changed());
        assert_eq!(delete.state, state);

        let note = apply(
            &state,
            HabitCommand::AddNote {
                habit_id: id,
                day: DateKey::parse("2024-01-02").unwrap(),
                note: "orphan".to_string(),
            },
        )
        .unwrap();
        assert!(!note.effect.changed());
        assert_eq!(note.state, state);

        let cleared = apply(&HabitState::default(), HabitCommand::ClearAll).unwrap();
        assert!(!cleared.effect.changed());
    }
}
