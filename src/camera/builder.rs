use super::device::CameraDevice;
use super::synthetic::SyntheticCamera;
use crate::config::{CameraBackend, CameraConfig};
use crate::error::DeviceError;
use std::sync::Arc;
use tracing::info;

/// Build the camera device selected by configuration
pub fn build_device(config: &CameraConfig) -> Result<Arc<dyn CameraDevice>, DeviceError> {
    match config.backend {
        CameraBackend::Synthetic => {
            info!("Using synthetic camera device");
            Ok(Arc::new(SyntheticCamera::new()))
        }
        CameraBackend::Gstreamer => build_gstreamer(),
    }
}

#[cfg(all(feature = "camera", target_os = "linux"))]
fn build_gstreamer() -> Result<Arc<dyn CameraDevice>, DeviceError> {
    info!("Using GStreamer camera device");
    Ok(Arc::new(super::v4l2::GstreamerCamera::new()?))
}

#[cfg(not(all(feature = "camera", target_os = "linux")))]
fn build_gstreamer() -> Result<Arc<dyn CameraDevice>, DeviceError> {
    Err(DeviceError::Configuration {
        details: "GStreamer backend requires the `camera` feature on Linux".to_string(),
    })
}
