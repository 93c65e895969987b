//! Calendar helpers: month grids, week rows and `YYYY-MM-DD` day keys.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{HabitError, Result};

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Width of a formatted day key, e.g. `2024-03-14`.
pub const DAY_KEY_LEN: usize = 10;

/// A Monday-first row of the month grid. Days outside the month are `None`.
pub type WeekRow = [Option<NaiveDate>; 7];

pub fn format_day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.len() != DAY_KEY_LEN {
        return Err(HabitError::InvalidDay(raw.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DAY_KEY_FORMAT)
        .map_err(|_| HabitError::InvalidDay(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(HabitError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days_in_month()).map(move |offset| first + Duration::days(i64::from(offset)))
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Lays the month out in Monday-first weeks, padding both ends with `None`.
pub fn month_grid(month: Month) -> Vec<WeekRow> {
    let leading = month.first_day().weekday().num_days_from_monday() as usize;
    let mut weeks = Vec::new();
    let mut row: WeekRow = [None; 7];
    let mut slot = leading;

    for day in month.days() {
        row[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(row);
            row = [None; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(row);
    }
    weeks
}

pub fn week_count(month: Month) -> usize {
    let leading = month.first_day().weekday().num_days_from_monday() as usize;
    (month.days_in_month() as usize + leading).div_ceil(7)
}

/// 1-based index of the grid row holding `date`, if the date falls in `month`.
pub fn week_index_of(month: Month, date: NaiveDate) -> Option<usize> {
    month_grid(month)
        .iter()
        .position(|row| row.contains(&Some(date)))
        .map(|idx| idx + 1)
}
