//! Undoable mutations.
//!
//! Every [`HabitCommand`] applied to a snapshot hands back the command that
//! reverts it. [`UndoSlot`] keeps the most recent inverse for a short window,
//! which is how "undo delete" is offered.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::habit::{Habit, HabitId, NewHabit};
use crate::snapshot::HabitData;
use crate::status::HabitStatus;

pub const DEFAULT_UNDO_WINDOW_MS: i64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitCommand {
    Add(NewHabit),
    Update(Habit),
    Remove(HabitId),
    Restore(Habit),
    SetStatus {
        habit_id: HabitId,
        date: NaiveDate,
        status: HabitStatus,
    },
    ClearStatus {
        habit_id: HabitId,
        date: NaiveDate,
    },
    Toggle {
        habit_id: HabitId,
        date: NaiveDate,
    },
}

impl HabitCommand {
    /// Applies the command and returns its inverse, or `None` when the
    /// snapshot was left untouched.
    ///
    /// Reverting a `Remove` goes through `Restore`, so the removed habit's
    /// statuses are not brought back.
    pub fn apply(self, data: &mut HabitData, today: NaiveDate) -> Option<HabitCommand> {
        match self {
            HabitCommand::Add(fields) => {
                let habit = data.add_habit(fields);
                Some(HabitCommand::Remove(habit.id))
            }
            HabitCommand::Update(habit) => data.update_habit(habit).map(HabitCommand::Update),
            HabitCommand::Remove(habit_id) => {
                data.remove_habit(&habit_id).map(HabitCommand::Restore)
            }
            HabitCommand::Restore(habit) => {
                let habit_id = habit.id.clone();
                data.restore_habit(habit);
                Some(HabitCommand::Remove(habit_id))
            }
            HabitCommand::SetStatus {
                habit_id,
                date,
                status,
            } => {
                let previous = data.entries.get(&habit_id, date);
                if !data.set_status(&habit_id, date, status) {
                    return None;
                }
                Some(Self::reverting_to(habit_id, date, previous))
            }
            HabitCommand::ClearStatus { habit_id, date } => {
                let previous = data.clear_status(&habit_id, date)?;
                Some(HabitCommand::SetStatus {
                    habit_id,
                    date,
                    status: previous,
                })
            }
            HabitCommand::Toggle { habit_id, date } => {
                let previous = data.entries.get(&habit_id, date);
                data.toggle(&habit_id, date, today)?;
                Some(Self::reverting_to(habit_id, date, previous))
            }
        }
    }

    fn reverting_to(habit_id: HabitId, date: NaiveDate, previous: Option<HabitStatus>) -> Self {
        match previous {
            Some(status) => HabitCommand::SetStatus {
                habit_id,
                date,
                status,
            },
            None => HabitCommand::ClearStatus { habit_id, date },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUndo {
    pub label: String,
    pub inverse: HabitCommand,
    pub expires_at: DateTime<Utc>,
}

/// Holds at most one inverse command until it expires.
#[derive(Debug, Clone)]
pub struct UndoSlot {
    window: Duration,
    pending: Option<PendingUndo>,
}

impl Default for UndoSlot {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_UNDO_WINDOW_MS))
    }
}

impl UndoSlot {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replaces whatever was pending.
    pub fn record(&mut self, label: impl Into<String>, inverse: HabitCommand, now: DateTime<Utc>) {
        let label = label.into();
        debug!(%label, "undo recorded");
        self.pending = Some(PendingUndo {
            label,
            inverse,
            expires_at: now + self.window,
        });
    }

    pub fn peek(&self, now: DateTime<Utc>) -> Option<&PendingUndo> {
        self.pending.as_ref().filter(|pending| now < pending.expires_at)
    }

    /// Empties the slot, returning the pending inverse if it has not expired.
    pub fn take(&mut self, now: DateTime<Utc>) -> Option<PendingUndo> {
        self.pending.take().filter(|pending| now < pending.expires_at)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_710_400_000 + secs, 0).unwrap()
    }

    #[test]
    fn remove_then_inverse_restores_without_entries() {
        let today = day(2024, 3, 14);
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 1));
        let read = data.add_habit(NewHabit::new("Read", "📘", 10));
        data.set_status(&read.id, day(2024, 3, 5), HabitStatus::Completed);

        let inverse = HabitCommand::Remove(read.id.clone())
            .apply(&mut data, today)
            .unwrap();
        assert_eq!(inverse, HabitCommand::Restore(read.clone()));
        assert!(data.habits.is_empty());

        let redo = inverse.apply(&mut data, today).unwrap();
        assert_eq!(redo, HabitCommand::Remove(read.id.clone()));
        assert_eq!(data.habits, vec![read.clone()]);
        assert!(data.entries.get(&read.id, day(2024, 3, 5)).is_none());
    }

    #[test]
    fn toggle_inverse_restores_previous_cell() {
        let today = day(2024, 3, 14);
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 1));
        let read = data.add_habit(NewHabit::new("Read", "📘", 10)).id;
        let before = data.clone();

        let inverse = HabitCommand::Toggle {
            habit_id: read.clone(),
            date: today,
        }
        .apply(&mut data, today)
        .unwrap();
        assert_eq!(data.entries.get(&read, today), Some(HabitStatus::Completed));

        inverse.apply(&mut data, today).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn set_status_inverse_puts_back_the_old_value() {
        let today = day(2024, 3, 14);
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 1));
        let read = data.add_habit(NewHabit::new("Read", "📘", 10)).id;
        data.set_status(&read, today, HabitStatus::Missed);

        let inverse = HabitCommand::SetStatus {
            habit_id: read.clone(),
            date: today,
            status: HabitStatus::Completed,
        }
        .apply(&mut data, today)
        .unwrap();
        inverse.apply(&mut data, today).unwrap();
        assert_eq!(data.entries.get(&read, today), Some(HabitStatus::Missed));
    }

    #[test]
    fn no_op_commands_have_no_inverse() {
        let today = day(2024, 3, 14);
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 10));
        let read = data.add_habit(NewHabit::new("Read", "📘", 10)).id;

        assert!(HabitCommand::Remove(HabitId::new("ghost"))
            .apply(&mut data, today)
            .is_none());
        assert!(HabitCommand::Toggle {
            habit_id: read.clone(),
            date: day(2024, 3, 1),
        }
        .apply(&mut data, today)
        .is_none());
        assert!(HabitCommand::ClearStatus {
            habit_id: read,
            date: today,
        }
        .apply(&mut data, today)
        .is_none());
    }

    #[test]
    fn undo_slot_expires() {
        let mut slot = UndoSlot::new(Duration::seconds(5));
        let inverse = HabitCommand::Remove(HabitId::new("read"));

        slot.record("Deleted Read", inverse.clone(), at(0));
        assert!(slot.peek(at(4)).is_some());
        assert_eq!(slot.take(at(4)).unwrap().inverse, inverse);
        assert!(slot.take(at(4)).is_none());

        slot.record("Deleted Read", inverse.clone(), at(10));
        assert!(slot.peek(at(15)).is_none());
        assert!(slot.take(at(15)).is_none());
    }

    #[test]
    fn newer_record_replaces_older() {
        let mut slot = UndoSlot::default();
        slot.record("first", HabitCommand::Remove(HabitId::new("a")), at(0));
        slot.record("second", HabitCommand::Remove(HabitId::new("b")), at(1));
        assert_eq!(slot.take(at(2)).unwrap().label, "second");
    }
}
