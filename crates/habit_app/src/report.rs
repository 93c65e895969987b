use std::fmt::Write as _;

use anyhow::Result;
use chrono::{Local, Timelike};
use habit_core::stats::DEFAULT_TOP_HABITS;
use habit_service::{HabitService, HabitServiceBuilder, ServiceConfig};
use tracing::info;

pub fn run(config: ServiceConfig) -> Result<()> {
    info!(data_dir = %config.data_dir.display(), "loading habits");
    let service = HabitServiceBuilder::from_config(&config).build()?;
    print!("{}", render(&service, Local::now().hour()));
    Ok(())
}

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

/// Plain-text dashboard for the service's current day.
pub fn render(service: &HabitService, hour: u32) -> String {
    let today = service.today();
    let month = service.current_month();
    let mut out = String::new();

    let _ = writeln!(out, "{}! Today is {}.", greeting(hour), today.format("%A, %B %-d"));

    let yesterday = service.yesterday_stats();
    let _ = writeln!(
        out,
        "Yesterday: {}/{} done, {} skipped",
        yesterday.completed, yesterday.total, yesterday.skipped
    );

    let monthly = service.monthly_stats(month);
    let _ = writeln!(
        out,
        "{month}: {}/{} goals ({}%)",
        monthly.total_completed, monthly.total_goals, monthly.percentage
    );

    if let Some(week) = service.current_week() {
        let done = if service.is_week_complete(&week) { ", complete" } else { "" };
        let _ = writeln!(out, "This week: {}%{done}", service.week_progress(&week));
    }

    let top = service.top_habits(month, DEFAULT_TOP_HABITS);
    if !top.is_empty() {
        let _ = writeln!(out, "\nTop habits");
        for ranked in &top {
            let _ = writeln!(
                out,
                "  {} {} {}/{} ({}%)",
                ranked.habit.emoji,
                ranked.habit.name,
                ranked.stats.completed,
                ranked.habit.monthly_goal,
                ranked.stats.percentage
            );
        }
    }

    let streaks = service.streaks();
    let active: Vec<_> = service
        .habits()
        .into_iter()
        .filter_map(|habit| {
            let streak = streaks.get(&habit.id)?;
            (streak.is_active && streak.current_streak > 0).then_some((habit, *streak))
        })
        .collect();
    if !active.is_empty() {
        let _ = writeln!(out, "\nActive streaks");
        for (habit, streak) in active {
            let _ = writeln!(
                out,
                "  {} {}: {} days (best {})",
                habit.emoji, habit.name, streak.current_streak, streak.longest_streak
            );
        }
    }
    out
}
