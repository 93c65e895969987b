use chrono::NaiveDate;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calendar::parse_day_key;
use crate::error::Result;
use crate::habit::{default_habits, Habit, HabitId};
use crate::status::StatusLog;

/// Key the snapshot is stored under in the backing key-value store.
pub const STORAGE_KEY: &str = "habit-tracker-data";

/// Complete persisted state: registry, recorded statuses and join date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitData {
    pub habits: Vec<Habit>,
    pub entries: StatusLog,
    pub join_date: NaiveDate,
}

/// Stored shape, where `joinDate` may be missing, null or blank in snapshots
/// written before it existed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHabitData {
    habits: Vec<Habit>,
    #[serde(default)]
    entries: StatusLog,
    #[serde(default, deserialize_with = "join_date_or_blank")]
    join_date: Option<NaiveDate>,
}

fn join_date_or_blank<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            parse_day_key(&raw).map(Some).map_err(D::Error::custom)
        }
        _ => Ok(None),
    }
}

/// How a snapshot was obtained at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// `joinDate` was missing and has been set to today.
    Migrated,
    /// Nothing stored, or the stored value was unusable.
    Defaulted,
}

impl HabitData {
    pub fn new(habits: Vec<Habit>, join_date: NaiveDate) -> Self {
        Self {
            habits,
            entries: StatusLog::new(),
            join_date,
        }
    }

    /// Seed habits, no entries, joined today.
    pub fn default_for(today: NaiveDate) -> Self {
        Self::new(default_habits(), today)
    }

    /// Decodes a stored snapshot. A missing join date is filled in with
    /// `today`, reported through the returned flag.
    pub fn from_json(raw: &str, today: NaiveDate) -> Result<(Self, bool)> {
        let stored: StoredHabitData = serde_json::from_str(raw)?;
        let migrated = stored.join_date.is_none();
        let data = Self {
            habits: stored.habits,
            entries: stored.entries,
            join_date: stored.join_date.unwrap_or(today),
        };
        Ok((data, migrated))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Startup path: never fails, falling back to the default snapshot.
    pub fn load_or_default(raw: Option<&str>, today: NaiveDate) -> (Self, LoadOutcome) {
        let Some(raw) = raw else {
            info!(%today, "no stored snapshot, starting from defaults");
            return (Self::default_for(today), LoadOutcome::Defaulted);
        };
        match Self::from_json(raw, today) {
            Ok((data, true)) => {
                info!(join_date = %data.join_date, "stored snapshot had no join date, using today");
                (data, LoadOutcome::Migrated)
            }
            Ok((data, false)) => (data, LoadOutcome::Loaded),
            Err(err) => {
                warn!(%err, "stored snapshot is unreadable, starting from defaults");
                (Self::default_for(today), LoadOutcome::Defaulted)
            }
        }
    }

    pub fn habit(&self, habit_id: &HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == habit_id)
    }

    pub fn habit_ids(&self) -> Vec<HabitId> {
        self.habits.iter().map(|habit| habit.id.clone()).collect()
    }
}
