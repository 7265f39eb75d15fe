// Data structures for camera selection

use serde::{Deserialize, Serialize};

/// A video input device as reported by the camera backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDevice {
    pub device_id: String,
    /// Empty when the backend withholds device names
    pub label: String,
}

impl VideoDevice {
    pub fn new(device_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            label: label.into(),
        }
    }
}

/// Entry shown in the camera picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraOption {
    pub device_id: String,
    pub label: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No video input devices found")]
    NoDevices,

    #[error("Camera device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open camera {device_id}: {message}")]
    OpenFailed { device_id: String, message: String },
}

pub type CameraResult<T> = Result<T, CameraError>;
