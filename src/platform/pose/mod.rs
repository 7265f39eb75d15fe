// Pose estimation platform integration
// Landmark sources feeding the workout runtime

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{ChannelPoseSource, LandmarkCallback, PoseSource, ReplayPoseSource};
