// Data models for body pose landmarks consumed from the pose-estimation service

use serde::{Deserialize, Serialize};

// ==============================================================================
// Pose Frame
// ==============================================================================

/// Pose tracking result for a single video frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    pub timestamp: i64,
    /// `None` when no body was detected in the frame (occlusion, empty scene)
    #[serde(rename = "landmarks", with = "body_landmarks")]
    pub body_pose: Option<BodyPose>,
    #[serde(default)]
    pub processing_time_ms: u64,
}

impl PoseFrame {
    pub fn new(timestamp: i64, body_pose: Option<BodyPose>) -> Self {
        Self {
            timestamp,
            body_pose,
            processing_time_ms: 0,
        }
    }

    /// Extract the hip/knee pair the rep counter consumes.
    /// Returns `None` if either landmark is missing or below `min_visibility`.
    pub fn sample(&self, min_visibility: f32) -> Option<LandmarkSample> {
        self.body_pose
            .as_ref()
            .and_then(|pose| LandmarkSample::from_body_pose(pose, min_visibility))
    }
}

// Frames are exchanged as `{"timestamp": .., "landmarks": [..] | null}`
mod body_landmarks {
    use super::{BodyPose, Keypoint3D};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(pose: &Option<BodyPose>, s: S) -> Result<S::Ok, S::Error> {
        pose.as_ref().map(|p| &p.keypoints).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<BodyPose>, D::Error> {
        let keypoints = Option::<Vec<Keypoint3D>>::deserialize(d)?;
        Ok(keypoints.map(BodyPose::new))
    }
}

// ==============================================================================
// Body Pose (33 keypoints)
// ==============================================================================

/// Body pose in MediaPipe Pose numbering (33 keypoints)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPose {
    pub keypoints: Vec<Keypoint3D>,
}

impl BodyPose {
    pub fn new(keypoints: Vec<Keypoint3D>) -> Self {
        Self { keypoints }
    }

    pub fn landmark(&self, landmark: BodyLandmark) -> Option<&Keypoint3D> {
        self.keypoints.get(landmark as usize)
    }
}

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub const COUNT: usize = 33;
}

// ==============================================================================
// Keypoint
// ==============================================================================

/// A normalized keypoint with visibility score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint3D {
    pub x: f32, // Normalized [0, 1], grows rightwards
    pub y: f32, // Normalized [0, 1], grows downwards
    #[serde(default)]
    pub z: f32,
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

fn default_visibility() -> f32 {
    1.0
}

impl Keypoint3D {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }
}

// ==============================================================================
// Landmark Sample
// ==============================================================================

/// Per-frame hip/knee heights fed to the rep counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkSample {
    pub hip_y: f32,
    pub knee_y: f32,
}

impl LandmarkSample {
    pub fn new(hip_y: f32, knee_y: f32) -> Self {
        Self { hip_y, knee_y }
    }

    pub fn from_body_pose(pose: &BodyPose, min_visibility: f32) -> Option<Self> {
        let hip = pose.landmark(BodyLandmark::LeftHip)?;
        let knee = pose.landmark(BodyLandmark::LeftKnee)?;

        if !hip.is_visible(min_visibility) || !knee.is_visible(min_visibility) {
            return None;
        }

        Some(Self::new(hip.y, knee.y))
    }

    /// Vertical knee-minus-hip distance; shrinks as the hip drops toward the knee
    pub fn diff(&self) -> f32 {
        self.knee_y - self.hip_y
    }
}

// ==============================================================================
// Configuration
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub model_complexity: ModelComplexity,
    pub smooth_landmarks: bool,
    pub min_detection_confidence: f32, // default: 0.5
    pub min_tracking_confidence: f32,  // default: 0.5
    pub target_fps: u32,               // Frames per second delivered by the source (default: 30)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelComplexity {
    Lite = 0,  // Fastest, less accurate
    Full = 1,  // Balanced
    Heavy = 2, // Slowest, most accurate
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            model_complexity: ModelComplexity::Lite,
            smooth_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            target_fps: 30,
        }
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("Pose source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid frame at line {line}: {message}")]
    InvalidFrame { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PoseResult<T> = Result<T, PoseError>;

#[cfg(test)]
pub(crate) fn test_pose(hip_y: f32, knee_y: f32) -> BodyPose {
    let mut keypoints = vec![Keypoint3D::new(0.5, 0.5, 0.0, 1.0); BodyLandmark::COUNT];
    keypoints[BodyLandmark::LeftHip as usize].y = hip_y;
    keypoints[BodyLandmark::LeftKnee as usize].y = knee_y;
    BodyPose::new(keypoints)
}
