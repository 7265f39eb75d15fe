// Data models for workout sessions, rep counting, modes, and display language

use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// Rep Phase
// ==============================================================================

/// The two halves of one squat repetition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Up,
    Down,
}

// ==============================================================================
// Mode
// ==============================================================================

/// Exercise mode selected from the mode buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Auto,
    Front,
    Side,
}

impl Mode {
    pub fn all() -> Vec<Mode> {
        vec![Mode::Auto, Mode::Front, Mode::Side]
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Mode::Auto => "AUTO",
            Mode::Front => "FRONT",
            Mode::Side => "SIDE",
        }
    }

    /// Parse a mode tag, case-insensitively
    pub fn from_string(s: &str) -> Result<Self, WorkoutError> {
        match s.trim().to_uppercase().as_str() {
            "AUTO" => Ok(Mode::Auto),
            "FRONT" => Ok(Mode::Front),
            "SIDE" => Ok(Mode::Side),
            _ => Err(WorkoutError::InvalidMode(s.to_string())),
        }
    }
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Auto
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// ==============================================================================
// Language
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    Th,
    En,
}

impl Language {
    pub fn toggled(self) -> Self {
        match self {
            Language::Th => Language::En,
            Language::En => Language::Th,
        }
    }

    pub fn score_label(&self) -> &'static str {
        match self {
            Language::Th => "คะแนน",
            Language::En => "SCORE",
        }
    }

    pub fn reps_label(&self) -> &'static str {
        match self {
            Language::Th => "ครั้ง",
            Language::En => "REPS",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, WorkoutError> {
        match s.trim().to_uppercase().as_str() {
            "TH" => Ok(Language::Th),
            "EN" => Ok(Language::En),
            _ => Err(WorkoutError::InvalidLanguage(s.to_string())),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::Th
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Th => write!(f, "TH"),
            Language::En => write!(f, "EN"),
        }
    }
}

// ==============================================================================
// Session Summary
// ==============================================================================

/// Result reported when a session stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Option<String>,
    /// Wall-clock start in UTC milliseconds
    pub started_at: Option<i64>,
    pub duration_ms: u64,
    pub reps: u32,
    pub score_percent: u32,
}

impl SessionSummary {
    /// Summary for a stop that had nothing to stop
    pub fn empty() -> Self {
        Self {
            session_id: None,
            started_at: None,
            duration_ms: 0,
            reps: 0,
            score_percent: 0,
        }
    }

    /// Whole seconds, rounded to nearest
    pub fn duration_secs(&self) -> u64 {
        (self.duration_ms + 500) / 1000
    }

    pub fn to_text(&self) -> String {
        format!("Time: {}s | Reps: {}", self.duration_secs(), self.reps)
    }
}

/// Score shown next to the rep counter
pub fn score_percent(reps: u32) -> u32 {
    reps.saturating_mul(10).min(100)
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkoutError {
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    #[error("Invalid language: {0}")]
    InvalidLanguage(String),

    #[error("Workout runtime is no longer running")]
    RuntimeClosed,
}

pub type WorkoutResult<T> = Result<T, WorkoutError>;
