use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::Habit;
use crate::snapshot::HabitData;
use crate::status::HabitStatus;
use crate::streak::streak_for;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFilter {
    #[default]
    All,
    /// Still `empty` today.
    Pending,
    /// Streak is active and non-zero.
    Active,
}

/// Narrows the registry by a case-insensitive name query and a status filter,
/// keeping registry order. A blank query matches everything; otherwise the
/// query is matched as typed, surrounding spaces included.
pub fn filter_habits<'a>(
    data: &'a HabitData,
    query: &str,
    filter: HabitFilter,
    today: NaiveDate,
) -> Vec<&'a Habit> {
    let searching = !query.trim().is_empty();
    let needle = query.to_lowercase();
    data.habits
        .iter()
        .filter(|habit| !searching || habit.name.to_lowercase().contains(&needle))
        .filter(|habit| match filter {
            HabitFilter::All => true,
            HabitFilter::Pending => data.status_on(&habit.id, today, today) == HabitStatus::Empty,
            HabitFilter::Active => {
                let streak = streak_for(data, &habit.id, today);
                streak.is_active && streak.current_streak > 0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::NewHabit;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn names(habits: Vec<&Habit>) -> Vec<&str> {
        habits.into_iter().map(|habit| habit.name.as_str()).collect()
    }

    #[test]
    fn query_matches_case_insensitively() {
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 1));
        data.add_habit(NewHabit::new("Read 10 Pages", "📘", 30));
        data.add_habit(NewHabit::new("Gym Workout", "🏋️", 20));
        data.add_habit(NewHabit::new("Bread baking", "🍞", 4));
        let today = day(2024, 3, 14);

        assert_eq!(
            names(filter_habits(&data, "READ", HabitFilter::All, today)),
            vec!["Read 10 Pages", "Bread baking"]
        );
        assert_eq!(
            names(filter_habits(&data, "gym ", HabitFilter::All, today)),
            vec!["Gym Workout"]
        );
        // Only a blank query is treated as absent; padding is matched as typed.
        assert!(filter_habits(&data, " read ", HabitFilter::All, today).is_empty());
        assert_eq!(filter_habits(&data, "   ", HabitFilter::All, today).len(), 3);
    }

    #[test]
    fn pending_and_active_filters() {
        let mut data = HabitData::new(Vec::new(), day(2024, 3, 1));
        let read = data.add_habit(NewHabit::new("Read", "📘", 30)).id;
        let gym = data.add_habit(NewHabit::new("Gym", "🏋️", 20)).id;
        data.add_habit(NewHabit::new("Stretch", "🧘", 30));
        let today = day(2024, 3, 14);
        data.set_status(&read, day(2024, 3, 13), HabitStatus::Completed);
        data.set_status(&gym, today, HabitStatus::Missed);

        assert_eq!(
            names(filter_habits(&data, "", HabitFilter::Pending, today)),
            vec!["Read", "Stretch"]
        );
        assert_eq!(
            names(filter_habits(&data, "", HabitFilter::Active, today)),
            vec!["Read"]
        );
    }
}
