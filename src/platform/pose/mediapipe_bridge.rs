// Pose source integration
// The landmark model runs outside this crate (MediaPipe Pose in the browser,
// a recording on disk, ...). Sources only hand over finished landmark frames.

use crate::models::pose::{PoseConfig, PoseError, PoseFrame, PoseResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// A stream of landmark frames, one per rendered video frame
#[async_trait]
pub trait PoseSource: Send {
    /// Next frame, or `None` once the source is exhausted
    async fn next_frame(&mut self) -> PoseResult<Option<PoseFrame>>;

    /// Human-readable description of the backend
    fn model_info(&self) -> String;
}

// ==============================================================================
// Channel Source (push-style landmark callback)
// ==============================================================================

/// Producer half handed to whatever runs the pose model
#[derive(Clone)]
pub struct LandmarkCallback {
    tx: mpsc::Sender<PoseFrame>,
}

impl LandmarkCallback {
    /// Called once per processed frame. Frames are dropped, not queued
    /// unboundedly, when the consumer falls behind.
    pub fn on_landmarks(&self, frame: PoseFrame) -> PoseResult<()> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(frame)) => {
                debug!("Dropping frame {}: consumer is behind", frame.timestamp);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PoseError::SourceUnavailable(
                "landmark consumer has shut down".to_string(),
            )),
        }
    }
}

/// Consumer half: frames pushed through a `LandmarkCallback`
pub struct ChannelPoseSource {
    rx: mpsc::Receiver<PoseFrame>,
}

impl ChannelPoseSource {
    pub fn new(capacity: usize) -> (LandmarkCallback, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (LandmarkCallback { tx }, Self { rx })
    }
}

#[async_trait]
impl PoseSource for ChannelPoseSource {
    async fn next_frame(&mut self) -> PoseResult<Option<PoseFrame>> {
        Ok(self.rx.recv().await)
    }

    fn model_info(&self) -> String {
        "External landmark callback".to_string()
    }
}

// ==============================================================================
// Replay Source (recorded JSON lines)
// ==============================================================================

/// Replays frames recorded as JSON lines, optionally paced at the configured fps.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct ReplayPoseSource {
    path: PathBuf,
    frames: VecDeque<PoseFrame>,
    pacing: Option<Interval>,
}

impl ReplayPoseSource {
    pub async fn open(path: &Path, config: &PoseConfig, paced: bool) -> PoseResult<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let frames = Self::parse(&contents)?;

        info!(
            "Loaded {} frames from {} (model complexity {:?}, smoothing {})",
            frames.len(),
            path.display(),
            config.model_complexity,
            config.smooth_landmarks
        );

        let pacing = paced.then(|| {
            let period = Duration::from_secs_f64(1.0 / config.target_fps.max(1) as f64);
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        Ok(Self {
            path: path.to_path_buf(),
            frames,
            pacing,
        })
    }

    pub fn parse(contents: &str) -> PoseResult<VecDeque<PoseFrame>> {
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(idx, line)| {
                serde_json::from_str::<PoseFrame>(line).map_err(|e| PoseError::InvalidFrame {
                    line: idx + 1,
                    message: e.to_string(),
                })
            })
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl PoseSource for ReplayPoseSource {
    async fn next_frame(&mut self) -> PoseResult<Option<PoseFrame>> {
        if self.frames.is_empty() {
            return Ok(None);
        }
        if let Some(pacing) = self.pacing.as_mut() {
            pacing.tick().await;
        }
        Ok(self.frames.pop_front())
    }

    fn model_info(&self) -> String {
        format!("Landmark replay ({})", self.path.display())
    }
}
