pub mod config;
pub mod service;
pub mod store;

pub use crate::config::ServiceConfig;
pub use crate::service::{HabitService, HabitServiceBuilder};
pub use crate::store::{JsonDirStore, KeyValueStore, MemoryStore};
