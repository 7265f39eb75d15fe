// Data models for pose landmarks, workout sessions, and camera selection

pub mod pose;
pub mod workout;
pub mod camera;
