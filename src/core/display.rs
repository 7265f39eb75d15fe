// Presentation state: what a UI shows next to the camera view.
// Rendering itself (video, skeleton overlay, CSS zoom) happens outside this crate.

use crate::models::workout::{score_percent, Language, Mode, SessionSummary};
use serde::{Deserialize, Serialize};

pub const SCORE_PLACEHOLDER: &str = "--%";

/// Upper bound accepted for any zoom percentage or step
pub const MAX_ZOOM_PERCENT: u32 = 1000;

// ==============================================================================
// Zoom
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub default_percent: u32,
    pub step_percent: u32,
    pub min_percent: u32,
    pub max_percent: u32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            default_percent: 100,
            step_percent: 10,
            min_percent: 50,
            max_percent: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Zoom {
    percent: u32,
    settings: ZoomSettings,
}

impl Zoom {
    pub fn new(settings: ZoomSettings) -> Self {
        Self {
            percent: settings
                .default_percent
                .max(settings.min_percent)
                .min(settings.max_percent),
            settings,
        }
    }

    pub fn zoom_in(&mut self) -> u32 {
        self.percent = self
            .percent
            .saturating_add(self.settings.step_percent)
            .min(self.settings.max_percent);
        self.percent
    }

    pub fn zoom_out(&mut self) -> u32 {
        self.percent = self
            .percent
            .saturating_sub(self.settings.step_percent)
            .max(self.settings.min_percent);
        self.percent
    }

    pub fn reset(&mut self) -> u32 {
        *self = Self::new(self.settings);
        self.percent
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// CSS-style scale factor for the video transform
    pub fn scale(&self) -> f32 {
        self.percent as f32 / 100.0
    }
}

// ==============================================================================
// Display State
// ==============================================================================

/// Snapshot of everything the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub language: Language,
    pub score_label: String,
    pub reps_label: String,
    pub rep_count: u32,
    pub rep_text: String,
    pub score_text: String,
    pub feedback: String,
    pub countdown_text: Option<String>,
    pub mode_label: String,
    pub zoom_percent: u32,
    pub summary_text: Option<String>,
}

/// Mutable text state behind `DisplayState`
#[derive(Debug, Clone)]
pub struct Presenter {
    language: Language,
    score_text: String,
    feedback: String,
    countdown_text: Option<String>,
    summary_text: Option<String>,
    zoom: Zoom,
}

impl Presenter {
    pub fn new(language: Language, zoom: ZoomSettings) -> Self {
        Self {
            language,
            score_text: SCORE_PLACEHOLDER.to_string(),
            feedback: String::new(),
            countdown_text: None,
            summary_text: None,
            zoom: Zoom::new(zoom),
        }
    }

    pub fn toggle_language(&mut self) -> Language {
        self.language = self.language.toggled();
        self.language
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn zoom_mut(&mut self) -> &mut Zoom {
        &mut self.zoom
    }

    pub fn session_started(&mut self) {
        self.score_text = format!("{}%", score_percent(0));
        self.feedback = "Session started".to_string();
        self.summary_text = None;
    }

    pub fn countdown(&mut self, remaining: u32) {
        let text = format!("Get ready... {}", remaining);
        self.countdown_text = Some(remaining.to_string());
        self.feedback = text;
    }

    pub fn counting_enabled(&mut self) {
        self.countdown_text = None;
        self.feedback = "GO!".to_string();
    }

    pub fn rep_completed(&mut self, count: u32) {
        self.score_text = format!("{}%", score_percent(count));
        self.feedback = format!("Rep {}!", count);
    }

    pub fn mode_changed(&mut self, mode: Mode) {
        self.score_text = SCORE_PLACEHOLDER.to_string();
        self.feedback = format!("Mode: {}", mode);
    }

    pub fn session_stopped(&mut self, summary: &SessionSummary) {
        self.countdown_text = None;
        self.feedback = "Session stopped".to_string();
        self.summary_text = Some(summary.to_text());
    }

    pub fn snapshot(&self, rep_count: u32, mode: Mode) -> DisplayState {
        DisplayState {
            language: self.language,
            score_label: self.language.score_label().to_string(),
            reps_label: self.language.reps_label().to_string(),
            rep_count,
            rep_text: rep_count.to_string(),
            score_text: self.score_text.clone(),
            feedback: self.feedback.clone(),
            countdown_text: self.countdown_text.clone(),
            mode_label: mode.tag().to_string(),
            zoom_percent: self.zoom.percent(),
            summary_text: self.summary_text.clone(),
        }
    }
}
