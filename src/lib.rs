pub mod core;
pub mod models;
pub mod platform;

pub use crate::core::config::{AppConfig, ConfigError};
pub use crate::core::runtime::{pump_frames, spawn, WorkoutHandle};
pub use crate::core::workout::{Notification, Workout};
pub use crate::models::workout::{Language, Mode, SessionSummary, WorkoutError};
