use crate::config::{CameraConfig, FacingMode};
use crate::error::DeviceError;
use crate::frame::FrameData;
use async_trait::async_trait;
use tracing::debug;

/// Parameters for a stream request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub index: u32,
    pub facing_mode: FacingMode,
    /// Nominal resolution; the device may grant something else
    pub resolution: (u32, u32),
    pub fps: u32,
}

impl From<&CameraConfig> for StreamRequest {
    fn from(config: &CameraConfig) -> Self {
        Self {
            index: config.index,
            facing_mode: config.facing_mode,
            resolution: config.resolution,
            fps: config.fps,
        }
    }
}

/// A source of camera streams. Opening may suspend while the user is asked
/// for permission.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, DeviceError>;

    fn name(&self) -> &str;
}

/// A live stream granted by a [`CameraDevice`]
pub trait VideoStream: Send {
    fn id(&self) -> u64;

    /// Resolution actually delivered by the device
    fn resolution(&self) -> (u32, u32);

    /// Current frame at native resolution
    fn grab_frame(&mut self) -> Result<FrameData, DeviceError>;

    /// Stop every track. Must be safe to call more than once.
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Exclusive owner of a granted stream; stops it when dropped
pub struct StreamHandle {
    stream: Box<dyn VideoStream>,
}

impl StreamHandle {
    pub fn new(stream: Box<dyn VideoStream>) -> Self {
        Self { stream }
    }

    pub fn id(&self) -> u64 {
        self.stream.id()
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.stream.resolution()
    }

    pub fn grab_frame(&mut self) -> Result<FrameData, DeviceError> {
        self.stream.grab_frame()
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_live()
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        if self.stream.is_live() {
            debug!("Stopping stream {} on drop", self.stream.id());
        }
        self.stream.stop();
    }
}
