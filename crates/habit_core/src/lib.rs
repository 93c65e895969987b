pub mod calendar;
pub mod error;
pub mod filter;
pub mod habit;
mod registry;
mod resolver;
pub mod snapshot;
pub mod stats;
pub mod status;
pub mod streak;
pub mod undo;

pub use crate::error::{HabitError, Result};
pub use crate::habit::{Habit, HabitId, NewHabit};
pub use crate::snapshot::{HabitData, LoadOutcome};
pub use crate::status::HabitStatus;
