//! Effective status of a habit on a day.
//!
//! Storage is sparse: only statuses a user (or a bulk write) recorded are kept.
//! Everything else is inferred on read and never written back:
//!
//! 1. days before the join date are `paused`, whatever is stored;
//! 2. a recorded status wins;
//! 3. untouched past days are `skipped`;
//! 4. today and later default to `empty`.

use chrono::NaiveDate;
use tracing::debug;

use crate::habit::HabitId;
use crate::snapshot::HabitData;
use crate::status::HabitStatus;

impl HabitData {
    pub fn status_on(&self, habit_id: &HabitId, date: NaiveDate, today: NaiveDate) -> HabitStatus {
        if self.is_date_before_join(date) {
            return HabitStatus::Paused;
        }
        if let Some(stored) = self.entries.get(habit_id, date) {
            return stored;
        }
        if date < today {
            HabitStatus::Skipped
        } else {
            HabitStatus::Empty
        }
    }

    pub fn is_date_before_join(&self, date: NaiveDate) -> bool {
        date < self.join_date
    }

    /// Advances the cell to the next status in the cycle, starting from what
    /// [`status_on`](Self::status_on) reports. Paused cells and unknown habits
    /// are left alone and yield `None`.
    pub fn toggle(
        &mut self,
        habit_id: &HabitId,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Option<HabitStatus> {
        if self.habit(habit_id).is_none() {
            debug!(id = %habit_id, "toggle ignored, habit not found");
            return None;
        }
        let next = self.status_on(habit_id, date, today).next_in_cycle()?;
        self.entries.insert(habit_id.clone(), date, next);
        Some(next)
    }

    /// Records a status directly. Unlike [`toggle`](Self::toggle) this does
    /// not check the join date; callers wanting that guard use
    /// [`is_date_before_join`](Self::is_date_before_join) first. `Paused` is
    /// derived only and is never written.
    pub fn set_status(&mut self, habit_id: &HabitId, date: NaiveDate, status: HabitStatus) -> bool {
        if status == HabitStatus::Paused {
            debug!(id = %habit_id, %date, "refusing to store a paused status");
            return false;
        }
        if self.habit(habit_id).is_none() {
            debug!(id = %habit_id, "status ignored, habit not found");
            return false;
        }
        self.entries.insert(habit_id.clone(), date, status);
        true
    }

    /// Forgets a recorded status so the day falls back to its inferred value.
    pub fn clear_status(&mut self, habit_id: &HabitId, date: NaiveDate) -> Option<HabitStatus> {
        self.entries.remove(habit_id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::NewHabit;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (HabitData, HabitId) {
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 10));
        let read = data.add_habit(NewHabit::new("Read", "📘", 10));
        (data, read.id)
    }

    #[test]
    fn days_before_join_are_paused_even_with_entries() {
        let (mut data, read) = fixture();
        let today = day(2024, 3, 14);
        data.set_status(&read, day(2024, 3, 9), HabitStatus::Completed);

        assert_eq!(data.status_on(&read, day(2024, 3, 9), today), HabitStatus::Paused);
        assert_eq!(data.status_on(&read, day(2024, 2, 1), today), HabitStatus::Paused);
        assert!(data.is_date_before_join(day(2024, 3, 9)));
        assert!(!data.is_date_before_join(day(2024, 3, 10)));
    }

    #[test]
    fn untouched_days_default_by_position_relative_to_today() {
        let (data, read) = fixture();
        let today = day(2024, 3, 14);
        assert_eq!(data.status_on(&read, day(2024, 3, 10), today), HabitStatus::Skipped);
        assert_eq!(data.status_on(&read, day(2024, 3, 13), today), HabitStatus::Skipped);
        assert_eq!(data.status_on(&read, today, today), HabitStatus::Empty);
        assert_eq!(data.status_on(&read, day(2024, 3, 20), today), HabitStatus::Empty);
        assert!(data.entries.is_empty());
    }

    #[test]
    fn recorded_status_is_returned_verbatim() {
        let (mut data, read) = fixture();
        let today = day(2024, 3, 14);
        data.set_status(&read, day(2024, 3, 12), HabitStatus::Missed);
        data.set_status(&read, day(2024, 3, 20), HabitStatus::Completed);
        assert_eq!(data.status_on(&read, day(2024, 3, 12), today), HabitStatus::Missed);
        assert_eq!(data.status_on(&read, day(2024, 3, 20), today), HabitStatus::Completed);
    }

    #[test]
    fn four_toggles_complete_the_cycle() {
        let (mut data, read) = fixture();
        let today = day(2024, 3, 14);
        let seen: Vec<_> = (0..4)
            .map(|_| data.toggle(&read, today, today).unwrap())
            .collect();
        assert_eq!(
            seen,
            vec![
                HabitStatus::Completed,
                HabitStatus::Missed,
                HabitStatus::Skipped,
                HabitStatus::Empty,
            ]
        );
        assert_eq!(data.status_on(&read, today, today), HabitStatus::Empty);
    }

    #[test]
    fn toggle_starts_from_the_inferred_status() {
        let (mut data, read) = fixture();
        let today = day(2024, 3, 14);
        // An untouched past day reads as skipped, so the next step is empty.
        assert_eq!(data.toggle(&read, day(2024, 3, 12), today), Some(HabitStatus::Empty));
    }

    #[test]
    fn toggle_on_paused_day_changes_nothing() {
        let (mut data, read) = fixture();
        let before = data.clone();
        assert_eq!(data.toggle(&read, day(2024, 3, 9), day(2024, 3, 14)), None);
        assert_eq!(data, before);
    }

    #[test]
    fn writes_for_unknown_habits_or_paused_are_refused() {
        let (mut data, read) = fixture();
        let ghost = HabitId::new("ghost");
        let before = data.clone();
        assert_eq!(data.toggle(&ghost, day(2024, 3, 14), day(2024, 3, 14)), None);
        assert!(!data.set_status(&ghost, day(2024, 3, 14), HabitStatus::Completed));
        assert!(!data.set_status(&read, day(2024, 3, 14), HabitStatus::Paused));
        assert_eq!(data, before);
    }

    #[test]
    fn set_status_skips_the_join_guard() {
        let (mut data, read) = fixture();
        assert!(data.set_status(&read, day(2024, 3, 1), HabitStatus::Completed));
        assert_eq!(data.entries.get(&read, day(2024, 3, 1)), Some(HabitStatus::Completed));
        assert_eq!(data.clear_status(&read, day(2024, 3, 1)), Some(HabitStatus::Completed));
        assert!(data.entries.is_empty());
    }
}
