use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HabitError, Result};

pub const MAX_NAME_LEN: usize = 50;
pub const MIN_MONTHLY_GOAL: u32 = 1;
pub const MAX_MONTHLY_GOAL: u32 = 31;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// A random id in the `habit-{uuid}` shape.
    pub fn generate() -> Self {
        Self(format!("habit-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub emoji: String,
    pub monthly_goal: u32,
}

/// Habit fields as entered by the user, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    pub emoji: String,
    pub monthly_goal: u32,
}

impl NewHabit {
    pub fn new(name: impl Into<String>, emoji: impl Into<String>, monthly_goal: u32) -> Self {
        Self {
            name: name.into(),
            emoji: emoji.into(),
            monthly_goal,
        }
    }

    /// Form-level checks. Returns the fields with the name trimmed.
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(HabitError::EmptyName);
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(HabitError::NameTooLong(len));
        }
        if !(MIN_MONTHLY_GOAL..=MAX_MONTHLY_GOAL).contains(&self.monthly_goal) {
            return Err(HabitError::GoalOutOfRange(self.monthly_goal));
        }
        Ok(Self { name, ..self })
    }

    pub fn with_id(self, id: HabitId) -> Habit {
        Habit {
            id,
            name: self.name,
            emoji: self.emoji,
            monthly_goal: self.monthly_goal,
        }
    }
}

/// Seed list used when there is no usable stored snapshot.
pub fn default_habits() -> Vec<Habit> {
    [
        ("wake-up", "Wake up at 6AM", "⏰", 30),
        ("no-snooze", "No Snoozing", "🚫", 30),
        ("water", "Drink 3L Water", "💧", 30),
        ("gym", "Gym Workout", "🏋️", 20),
        ("stretch", "Stretching", "🧘", 30),
        ("read", "Read 10 Pages", "📘", 30),
        ("meditate", "Meditation", "🧠", 30),
        ("study", "Study 1 Hour", "⭐", 25),
        ("skincare", "Skincare Routine", "✨", 30),
        ("social-media", "Limit Social Media", "📵", 30),
        ("no-alcohol", "No Alcohol", "🚫", 30),
        ("expenses", "Track Expenses", "💵", 30),
    ]
    .into_iter()
    .map(|(id, name, emoji, goal)| Habit {
        id: HabitId::new(id),
        name: name.to_string(),
        emoji: emoji.to_string(),
        monthly_goal: goal,
    })
    .collect()
}
