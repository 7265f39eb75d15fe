// Integrations with host-provided collaborators: camera devices and pose sources

pub mod camera;
pub mod pose;
