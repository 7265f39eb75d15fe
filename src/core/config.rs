use crate::core::countdown::DEFAULT_COUNTDOWN_SECS;
use crate::core::display::{ZoomSettings, MAX_ZOOM_PERCENT};
use crate::core::rep_counter::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::models::pose::PoseConfig;
use crate::models::workout::{Language, Mode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Countdown before reps are counted, in seconds (0 counts immediately)
    pub countdown_secs: u32,
    /// knee_y - hip_y below this marks the bottom of a squat
    pub low_threshold: f32,
    /// knee_y - hip_y above this marks standing again
    pub high_threshold: f32,
    /// Landmarks below this visibility are treated as missing
    pub min_landmark_visibility: f32,
    pub default_language: Language,
    pub default_mode: Mode,
    pub zoom: ZoomSettings,
    pub pose: PoseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            min_landmark_visibility: 0.5,
            default_language: Language::Th,
            default_mode: Mode::Auto,
            zoom: ZoomSettings::default(),
            pose: PoseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, creating it with defaults if missing
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let config: AppConfig = serde_json::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(io_err)?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.countdown_secs > 60 {
            return Err(ConfigError::Invalid(format!(
                "countdown_secs {} must be between 0 and 60",
                self.countdown_secs
            )));
        }

        for (name, value) in [
            ("low_threshold", self.low_threshold),
            ("high_threshold", self.high_threshold),
        ] {
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} {} must be between -1.0 and 1.0",
                    name, value
                )));
            }
        }

        if self.low_threshold >= self.high_threshold {
            return Err(ConfigError::Invalid(format!(
                "low_threshold {} must be below high_threshold {}",
                self.low_threshold, self.high_threshold
            )));
        }

        if !(0.0..=1.0).contains(&self.min_landmark_visibility) {
            return Err(ConfigError::Invalid(format!(
                "min_landmark_visibility {} must be between 0.0 and 1.0",
                self.min_landmark_visibility
            )));
        }

        let zoom = &self.zoom;
        if zoom.min_percent == 0 || zoom.min_percent > zoom.max_percent {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..={} is empty or starts at zero",
                zoom.min_percent, zoom.max_percent
            )));
        }
        if zoom.max_percent > MAX_ZOOM_PERCENT {
            return Err(ConfigError::Invalid(format!(
                "zoom max {} must not exceed {}",
                zoom.max_percent, MAX_ZOOM_PERCENT
            )));
        }
        if zoom.step_percent == 0 || zoom.step_percent > MAX_ZOOM_PERCENT {
            return Err(ConfigError::Invalid(format!(
                "zoom step {} must be between 1 and {}",
                zoom.step_percent, MAX_ZOOM_PERCENT
            )));
        }
        if !(zoom.min_percent..=zoom.max_percent).contains(&zoom.default_percent) {
            return Err(ConfigError::Invalid(format!(
                "default zoom {} is outside {}..={}",
                zoom.default_percent, zoom.min_percent, zoom.max_percent
            )));
        }

        let pose = &self.pose;
        if pose.target_fps == 0 || pose.target_fps > 120 {
            return Err(ConfigError::Invalid(format!(
                "target_fps {} must be between 1 and 120",
                pose.target_fps
            )));
        }
        for (name, value) in [
            ("min_detection_confidence", pose.min_detection_confidence),
            ("min_tracking_confidence", pose.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} {} must be between 0.0 and 1.0",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Reset the default location to default configuration
    pub fn reset() -> ConfigResult<Self> {
        Self::reset_at(&Self::get_config_path()?)
    }

    pub fn reset_at(path: &Path) -> ConfigResult<Self> {
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn get_config_path() -> ConfigResult<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| ConfigError::NoHomeDir)?;

        let mut path = PathBuf::from(home);
        path.push(".squat_counter");
        path.push("config");
        path.push("settings.json");

        Ok(path)
    }
}
