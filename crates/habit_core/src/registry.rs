//! Registry mutations on the habit list. The registry trusts its inputs;
//! field validation happens in [`NewHabit::validate`] before calls land here.

use tracing::{debug, info};

use crate::habit::{Habit, HabitId, NewHabit};
use crate::snapshot::HabitData;

impl HabitData {
    /// Appends a habit under a fresh id and returns it.
    pub fn add_habit(&mut self, fields: NewHabit) -> Habit {
        let habit = fields.with_id(self.fresh_id(HabitId::generate));
        info!(id = %habit.id, name = %habit.name, "habit added");
        self.habits.push(habit.clone());
        habit
    }

    /// Replaces the habit with the same id in place. Returns the previous
    /// definition, or `None` when the id is unknown.
    pub fn update_habit(&mut self, habit: Habit) -> Option<Habit> {
        let Some(slot) = self.habits.iter_mut().find(|h| h.id == habit.id) else {
            debug!(id = %habit.id, "update ignored, habit not found");
            return None;
        };
        Some(std::mem::replace(slot, habit))
    }

    /// Removes the habit and all of its recorded statuses.
    pub fn remove_habit(&mut self, habit_id: &HabitId) -> Option<Habit> {
        let Some(idx) = self.habits.iter().position(|h| &h.id == habit_id) else {
            debug!(id = %habit_id, "remove ignored, habit not found");
            return None;
        };
        let removed = self.habits.remove(idx);
        let dropped = self.entries.remove_habit(habit_id);
        info!(id = %habit_id, dropped_entries = dropped, "habit removed");
        Some(removed)
    }

    /// Re-appends a removed habit. Its former entries stay gone.
    pub fn restore_habit(&mut self, habit: Habit) {
        info!(id = %habit.id, "habit restored");
        self.habits.push(habit);
    }

    /// First generated id that is neither registered nor still owning
    /// entries.
    fn fresh_id(&self, mut generate: impl FnMut() -> HabitId) -> HabitId {
        loop {
            let candidate = generate();
            if self.habit(&candidate).is_none() && !self.entries.contains_habit(&candidate) {
                return candidate;
            }
        }
    }
}
