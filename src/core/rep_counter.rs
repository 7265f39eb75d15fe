use crate::models::pose::LandmarkSample;
use crate::models::workout::Phase;

/// Default diff below which the squat counts as bottomed out
pub const DEFAULT_LOW_THRESHOLD: f32 = 0.04;
/// Default diff above which the squat counts as standing again
pub const DEFAULT_HIGH_THRESHOLD: f32 = 0.14;

/// Two-phase squat counter with a hysteresis band between the thresholds.
///
/// `diff = knee_y - hip_y` in image coordinates (y grows downward), so the
/// diff shrinks as the hip drops toward knee height. UP→DOWN fires below
/// `low`, DOWN→UP fires above `high` and completes one repetition.
#[derive(Debug, Clone)]
pub struct RepCounter {
    phase: Phase,
    count: u32,
    counting_enabled: bool,
    low: f32,
    high: f32,
}

impl RepCounter {
    pub fn new(low: f32, high: f32) -> Self {
        Self {
            phase: Phase::Up,
            count: 0,
            counting_enabled: false,
            low,
            high,
        }
    }

    /// Feed one sample. Returns `Some(count)` when a repetition was just completed.
    pub fn observe(&mut self, sample: LandmarkSample) -> Option<u32> {
        if !self.counting_enabled {
            return None;
        }

        let diff = sample.diff();
        match self.phase {
            Phase::Up => {
                if diff < self.low {
                    self.phase = Phase::Down;
                }
                None
            }
            Phase::Down => {
                if diff > self.high {
                    self.phase = Phase::Up;
                    self.count = self.count.saturating_add(1);
                    Some(self.count)
                } else {
                    None
                }
            }
        }
    }

    /// Back to {UP, 0}; the gate is left as it is
    pub fn reset(&mut self) {
        self.phase = Phase::Up;
        self.count = 0;
    }

    pub fn set_counting_enabled(&mut self, enabled: bool) {
        self.counting_enabled = enabled;
    }

    pub fn counting_enabled(&self) -> bool {
        self.counting_enabled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_THRESHOLD, DEFAULT_HIGH_THRESHOLD)
    }
}
