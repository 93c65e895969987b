use thiserror::Error;

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("invalid calendar day `{0}`, expected YYYY-MM-DD")]
    InvalidDay(String),

    #[error("invalid month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("habit name must not be empty")]
    EmptyName,

    #[error("habit name is {0} characters long, the limit is {max}", max = crate::habit::MAX_NAME_LEN)]
    NameTooLong(usize),

    #[error("monthly goal must be between 1 and 31, got {0}")]
    GoalOutOfRange(u32),

    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HabitError>;
