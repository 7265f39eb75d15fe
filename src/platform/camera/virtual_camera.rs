// In-process camera backend used for headless replay and tests

use super::{CameraBackend, VideoStream};
use crate::models::camera::{CameraError, CameraResult, VideoDevice};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Backend over a fixed device list. Clones share the open-stream registry.
#[derive(Clone)]
pub struct VirtualCameraBackend {
    devices: Vec<VideoDevice>,
    permission_granted: bool,
    active: Arc<Mutex<Vec<String>>>,
}

impl VirtualCameraBackend {
    pub fn new(devices: Vec<VideoDevice>) -> Self {
        Self {
            devices,
            permission_granted: true,
            active: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Single device named after the replay input
    pub fn single(device_id: &str, label: &str) -> Self {
        Self::new(vec![VideoDevice::new(device_id, label)])
    }

    pub fn deny_permission(mut self) -> Self {
        self.permission_granted = false;
        self
    }

    /// Device ids with an open stream
    pub fn active_streams(&self) -> Vec<String> {
        self.active.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CameraBackend for VirtualCameraBackend {
    async fn request_permission(&self) -> CameraResult<()> {
        if self.permission_granted {
            Ok(())
        } else {
            Err(CameraError::PermissionDenied)
        }
    }

    async fn enumerate_devices(&self) -> CameraResult<Vec<VideoDevice>> {
        Ok(self.devices.clone())
    }

    async fn open_stream(&self, device_id: &str) -> CameraResult<Box<dyn VideoStream>> {
        if !self.devices.iter().any(|d| d.device_id == device_id) {
            return Err(CameraError::DeviceNotFound(device_id.to_string()));
        }

        let mut active = self.active.lock().map_err(|_| CameraError::OpenFailed {
            device_id: device_id.to_string(),
            message: "stream registry poisoned".to_string(),
        })?;
        active.push(device_id.to_string());

        Ok(Box::new(VirtualStream {
            device_id: device_id.to_string(),
            registry: Arc::clone(&self.active),
            active: true,
        }))
    }
}

pub struct VirtualStream {
    device_id: String,
    registry: Arc<Mutex<Vec<String>>>,
    active: bool,
}

impl VideoStream for VirtualStream {
    fn device_id(&self) -> &str {
        &self.device_id
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Ok(mut registry) = self.registry.lock() {
            if let Some(pos) = registry.iter().position(|id| id == &self.device_id) {
                registry.remove(pos);
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for VirtualStream {
    fn drop(&mut self) {
        self.stop();
    }
}
