//! Aggregations over a snapshot. Completion counts only look at recorded
//! `completed` entries, never at inferred statuses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::Month;
use crate::habit::{Habit, HabitId};
use crate::snapshot::HabitData;
use crate::status::HabitStatus;

pub const DEFAULT_TOP_HABITS: usize = 5;

/// Days per reporting week in [`weekly_stats`]. Counted from the 1st of the
/// month, unlike the Monday-first grid.
pub const REPORT_WEEK_LEN: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitStats {
    pub completed: u32,
    pub remaining: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_completed: u32,
    pub total_goals: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub day: u32,
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStat {
    pub week: u32,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedHabit {
    #[serde(flatten)]
    pub habit: Habit,
    #[serde(flatten)]
    pub stats: HabitStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YesterdayStats {
    pub completed: u32,
    pub total: u32,
    pub skipped: u32,
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

pub fn habit_stats(data: &HabitData, habit_id: &HabitId, month: Month) -> HabitStats {
    let Some(habit) = data.habit(habit_id) else {
        return HabitStats::default();
    };
    let completed = count_u32(
        data.entries
            .habit_entries(habit_id)
            .filter(|(date, status)| month.contains(*date) && *status == HabitStatus::Completed)
            .count(),
    );
    HabitStats {
        completed,
        remaining: habit.monthly_goal.saturating_sub(completed),
        percentage: percent(completed, habit.monthly_goal).min(100),
    }
}

pub fn monthly_stats(data: &HabitData, month: Month) -> MonthlyStats {
    let (total_completed, total_goals) =
        data.habits.iter().fold((0u32, 0u32), |(done, goals), habit| {
            let stats = habit_stats(data, &habit.id, month);
            (done + stats.completed, goals + habit.monthly_goal)
        });
    MonthlyStats {
        total_completed,
        total_goals,
        percentage: percent(total_completed, total_goals),
    }
}

fn completed_on(data: &HabitData, date: NaiveDate) -> u32 {
    count_u32(
        data.habits
            .iter()
            .filter(|habit| data.entries.is_completed(&habit.id, date))
            .count(),
    )
}

pub fn daily_stats(data: &HabitData, month: Month) -> Vec<DailyStat> {
    let total = count_u32(data.habits.len());
    month
        .days()
        .enumerate()
        .map(|(idx, date)| {
            let completed = completed_on(data, date);
            DailyStat {
                day: idx as u32 + 1,
                date,
                completed,
                total,
                percentage: percent(completed, total),
            }
        })
        .collect()
}

pub fn weekly_stats(data: &HabitData, month: Month) -> Vec<WeeklyStat> {
    daily_stats(data, month)
        .chunks(REPORT_WEEK_LEN)
        .enumerate()
        .map(|(idx, days)| {
            let completed = days.iter().map(|day| day.completed).sum();
            let total = days.iter().map(|day| day.total).sum();
            WeeklyStat {
                week: idx as u32 + 1,
                completed,
                total,
                percentage: percent(completed, total),
            }
        })
        .collect()
}

/// Habits ranked by monthly percentage. Ties keep registry order.
pub fn top_habits(data: &HabitData, month: Month, limit: usize) -> Vec<RankedHabit> {
    let mut ranked: Vec<RankedHabit> = data
        .habits
        .iter()
        .map(|habit| RankedHabit {
            habit: habit.clone(),
            stats: habit_stats(data, &habit.id, month),
        })
        .collect();
    ranked.sort_by(|a, b| b.stats.percentage.cmp(&a.stats.percentage));
    ranked.truncate(limit);
    ranked
}

/// Summary of the day before `today`. Missed and skipped both count as
/// skipped; habits with nothing recorded count toward neither.
pub fn yesterday_stats(data: &HabitData, today: NaiveDate) -> YesterdayStats {
    let mut summary = YesterdayStats {
        total: count_u32(data.habits.len()),
        ..YesterdayStats::default()
    };
    let Some(yesterday) = today.pred_opt() else {
        return summary;
    };
    for habit in &data.habits {
        match data.entries.get(&habit.id, yesterday) {
            Some(HabitStatus::Completed) => summary.completed += 1,
            Some(HabitStatus::Skipped | HabitStatus::Missed) => summary.skipped += 1,
            _ => {}
        }
    }
    summary
}

/// Completion percentage over a grid row, ignoring padding slots and days
/// before the join date.
pub fn week_progress(data: &HabitData, week_days: &[Option<NaiveDate>]) -> u32 {
    let counted: Vec<NaiveDate> = week_days
        .iter()
        .flatten()
        .copied()
        .filter(|date| !data.is_date_before_join(*date))
        .collect();
    let possible = count_u32(counted.len() * data.habits.len());
    let completed = counted.iter().map(|date| completed_on(data, *date)).sum();
    percent(completed, possible)
}

/// A row is complete once it has a real day and no habit is still pending
/// on any of its days.
pub fn is_week_complete(data: &HabitData, week_days: &[Option<NaiveDate>], today: NaiveDate) -> bool {
    let mut days = week_days.iter().flatten().peekable();
    if days.peek().is_none() {
        return false;
    }
    days.all(|date| {
        data.habits
            .iter()
            .all(|habit| data.status_on(&habit.id, *date, today) != HabitStatus::Empty)
    })
}
