pub mod config;
pub mod session_manager;

// Rep counting
pub mod countdown;
pub mod rep_counter;
pub mod mode_selector;

// Presentation state and the owned workout
pub mod display;
pub mod workout;
pub mod runtime;
