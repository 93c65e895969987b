use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use habit_core::undo::DEFAULT_UNDO_WINDOW_MS;
use tracing::warn;

pub const DATA_DIR_ENV_VAR: &str = "HABIT_DATA_DIR";
pub const UNDO_TIMEOUT_ENV_VAR: &str = "HABIT_UNDO_TIMEOUT_MS";
/// Overrides "today" in debug builds.
pub const MOCK_TODAY_ENV_VAR: &str = "HABIT_MOCK_TODAY";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub undo_timeout_ms: i64,
    pub mock_today: Option<NaiveDate>,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(timeout) = std::env::var(UNDO_TIMEOUT_ENV_VAR) {
            match timeout.trim().parse::<i64>() {
                Ok(value) if value > 0 => config.undo_timeout_ms = value,
                _ => warn!(%timeout, "ignoring invalid undo timeout"),
            }
        }
        config.mock_today = mock_today_from_env();
        Ok(config)
    }

    pub fn undo_window(&self) -> Duration {
        Duration::milliseconds(self.undo_timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            undo_timeout_ms: DEFAULT_UNDO_WINDOW_MS,
            mock_today: None,
        }
    }
}

#[cfg(debug_assertions)]
fn mock_today_from_env() -> Option<NaiveDate> {
    let raw = std::env::var(MOCK_TODAY_ENV_VAR).ok()?;
    match habit_core::calendar::parse_day_key(&raw) {
        Ok(date) => {
            tracing::info!(%date, "mock today enabled");
            Some(date)
        }
        Err(err) => {
            warn!(%err, "ignoring invalid mock today");
            None
        }
    }
}

#[cfg(not(debug_assertions))]
fn mock_today_from_env() -> Option<NaiveDate> {
    None
}
