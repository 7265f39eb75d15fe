// Camera device selection
// Enumeration and streaming are provided by the host (browser, OS capture API);
// this module only decides which device feeds the pose source.

pub mod virtual_camera;

pub use virtual_camera::{VirtualCameraBackend, VirtualStream};

use crate::models::camera::{CameraError, CameraOption, CameraResult, VideoDevice};
use async_trait::async_trait;
use tracing::{debug, info};

/// Host camera API
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// Ask the user for camera access. Device labels may be empty until granted.
    async fn request_permission(&self) -> CameraResult<()>;

    async fn enumerate_devices(&self) -> CameraResult<Vec<VideoDevice>>;

    async fn open_stream(&self, device_id: &str) -> CameraResult<Box<dyn VideoStream>>;
}

/// An open camera stream; stopping releases the device
pub trait VideoStream: Send {
    fn device_id(&self) -> &str;

    fn stop(&mut self);

    fn is_active(&self) -> bool;
}

// ==============================================================================
// Camera Selector
// ==============================================================================

pub struct CameraSelector<B: CameraBackend> {
    backend: B,
    options: Vec<CameraOption>,
    stream: Option<Box<dyn VideoStream>>,
}

impl<B: CameraBackend> CameraSelector<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            options: Vec::new(),
            stream: None,
        }
    }

    /// Request access, list video inputs and open the first one
    pub async fn setup(&mut self) -> CameraResult<&[CameraOption]> {
        self.backend.request_permission().await?;

        let devices = self.backend.enumerate_devices().await?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }

        self.options = devices
            .into_iter()
            .enumerate()
            .map(|(i, device)| CameraOption {
                label: if device.label.is_empty() {
                    format!("Camera {}", i + 1)
                } else {
                    device.label
                },
                device_id: device.device_id,
            })
            .collect();

        debug!("Found {} camera(s)", self.options.len());

        let first = self.options[0].device_id.clone();
        self.open(&first).await?;

        Ok(&self.options)
    }

    /// Switch to another enumerated device, stopping the current stream first
    pub async fn select(&mut self, device_id: &str) -> CameraResult<()> {
        if !self.options.iter().any(|o| o.device_id == device_id) {
            return Err(CameraError::DeviceNotFound(device_id.to_string()));
        }
        self.open(device_id).await
    }

    async fn open(&mut self, device_id: &str) -> CameraResult<()> {
        if let Some(mut previous) = self.stream.take() {
            previous.stop();
        }

        let stream = self.backend.open_stream(device_id).await?;
        info!("Camera selected: {}", device_id);
        self.stream = Some(stream);
        Ok(())
    }

    pub fn options(&self) -> &[CameraOption] {
        &self.options
    }

    pub fn current_device_id(&self) -> Option<&str> {
        self.stream.as_ref().map(|s| s.device_id())
    }

    /// Stop the active stream, if any
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> VirtualCameraBackend {
        VirtualCameraBackend::new(vec![
            VideoDevice::new("cam-a", ""),
            VideoDevice::new("cam-b", "USB Webcam"),
        ])
    }

    #[tokio::test]
    async fn test_setup_labels_and_opens_first() {
        let mut selector = CameraSelector::new(backend());
        let options = selector.setup().await.unwrap().to_vec();

        assert_eq!(options[0].label, "Camera 1");
        assert_eq!(options[1].label, "USB Webcam");
        assert_eq!(selector.current_device_id(), Some("cam-a"));
    }

    #[tokio::test]
    async fn test_select_stops_previous_stream() {
        let backend = backend();
        let mut selector = CameraSelector::new(backend.clone());
        selector.setup().await.unwrap();

        selector.select("cam-b").await.unwrap();
        assert_eq!(selector.current_device_id(), Some("cam-b"));
        assert_eq!(backend.active_streams(), vec!["cam-b".to_string()]);

        assert!(matches!(
            selector.select("cam-z").await,
            Err(CameraError::DeviceNotFound(_))
        ));
        assert_eq!(selector.current_device_id(), Some("cam-b"));

        selector.release();
        assert!(backend.active_streams().is_empty());
    }

    #[tokio::test]
    async fn test_setup_errors() {
        let mut selector = CameraSelector::new(VirtualCameraBackend::new(Vec::new()));
        assert!(matches!(selector.setup().await, Err(CameraError::NoDevices)));

        let mut selector = CameraSelector::new(backend().deny_permission());
        assert!(matches!(
            selector.setup().await,
            Err(CameraError::PermissionDenied)
        ));
        assert!(selector.current_device_id().is_none());
    }
}
