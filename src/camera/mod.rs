mod builder;
mod device;
mod session;
mod synthetic;
#[cfg(all(feature = "camera", target_os = "linux"))]
mod v4l2;

pub use builder::build_device;
pub use device::{CameraDevice, StreamHandle, StreamRequest, VideoStream};
pub use session::{AcquireOutcome, CameraSession};
pub use synthetic::SyntheticCamera;
#[cfg(all(feature = "camera", target_os = "linux"))]
pub use v4l2::GstreamerCamera;
