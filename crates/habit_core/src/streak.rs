//! Streak engine.
//!
//! Streaks only count recorded `completed` days; an untouched day is never a
//! completion, whatever the resolver would infer for it.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::HabitId;
use crate::snapshot::HabitData;
use crate::status::HabitStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakData {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub is_active: bool,
}

pub fn streak_for(data: &HabitData, habit_id: &HabitId, today: NaiveDate) -> StreakData {
    let current_streak = current_streak(data, habit_id, today);
    let longest_streak = longest_streak(data, habit_id, today).max(current_streak);
    StreakData {
        current_streak,
        longest_streak,
        is_active: is_active(data, habit_id, today),
    }
}

/// Batch form of [`streak_for`]; each value equals the single-habit result.
pub fn streaks_for(
    data: &HabitData,
    habit_ids: &[HabitId],
    today: NaiveDate,
) -> HashMap<HabitId, StreakData> {
    habit_ids
        .iter()
        .map(|id| (id.clone(), streak_for(data, id, today)))
        .collect()
}

/// Walks back from today. A today that is not completed yet does not break
/// the run; any other non-completed day does. Stops at the join date.
fn current_streak(data: &HabitData, habit_id: &HabitId, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = today;
    while cursor >= data.join_date {
        if data.entries.is_completed(habit_id, cursor) {
            streak += 1;
        } else if cursor != today {
            break;
        }
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

fn longest_streak(data: &HabitData, habit_id: &HabitId, today: NaiveDate) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    for date in data.join_date.iter_days().take_while(|date| *date <= today) {
        if data.entries.is_completed(habit_id, date) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Completed today, or completed yesterday with today not explicitly skipped.
fn is_active(data: &HabitData, habit_id: &HabitId, today: NaiveDate) -> bool {
    if data.entries.is_completed(habit_id, today) {
        return true;
    }
    let yesterday_done = today
        .pred_opt()
        .is_some_and(|yesterday| data.entries.is_completed(habit_id, yesterday));
    yesterday_done && data.entries.get(habit_id, today) != Some(HabitStatus::Skipped)
}
