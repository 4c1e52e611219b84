use super::device::{CameraDevice, StreamRequest, VideoStream};
use crate::error::DeviceError;
use crate::frame::{FrameData, FrameFormat};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, trace};

struct SyntheticState {
    permission: AtomicBool,
    present: bool,
    grant_delay: Duration,
    active_streams: AtomicUsize,
    opens: AtomicUsize,
    next_stream_id: AtomicU64,
}

/// In-process camera that generates RGB24 test-pattern frames.
///
/// Clones share state, so a test can keep one handle to inspect the number of
/// live streams while the session owns another.
#[derive(Clone)]
pub struct SyntheticCamera {
    state: Arc<SyntheticState>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::with_state(true, Duration::ZERO)
    }

    /// A device whose permission prompt takes `delay` to resolve
    pub fn with_grant_delay(delay: Duration) -> Self {
        Self::with_state(true, delay)
    }

    /// A device that reports no camera at the requested index
    pub fn unplugged() -> Self {
        Self::with_state(false, Duration::ZERO)
    }

    fn with_state(present: bool, grant_delay: Duration) -> Self {
        Self {
            state: Arc::new(SyntheticState {
                permission: AtomicBool::new(true),
                present,
                grant_delay,
                active_streams: AtomicUsize::new(0),
                opens: AtomicUsize::new(0),
                next_stream_id: AtomicU64::new(1),
            }),
        }
    }

    /// Grant or deny future open requests
    pub fn set_permission(&self, granted: bool) {
        self.state.permission.store(granted, Ordering::SeqCst);
    }

    /// Streams opened and not yet stopped
    pub fn active_streams(&self) -> usize {
        self.state.active_streams.load(Ordering::SeqCst)
    }

    /// Successful opens so far
    pub fn open_count(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraDevice for SyntheticCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, DeviceError> {
        if !self.state.grant_delay.is_zero() {
            tokio::time::sleep(self.state.grant_delay).await;
        }

        if !self.state.present {
            return Err(DeviceError::NotFound {
                index: request.index,
            });
        }

        if !self.state.permission.load(Ordering::SeqCst) {
            return Err(DeviceError::PermissionDenied);
        }

        let id = self.state.next_stream_id.fetch_add(1, Ordering::SeqCst);
        self.state.active_streams.fetch_add(1, Ordering::SeqCst);
        self.state.opens.fetch_add(1, Ordering::SeqCst);

        info!(
            "Synthetic stream {} opened ({}x{} @ {}fps, {:?})",
            id, request.resolution.0, request.resolution.1, request.fps, request.facing_mode
        );

        Ok(Box::new(SyntheticStream {
            id,
            width: request.resolution.0,
            height: request.resolution.1,
            frame_counter: 0,
            live: true,
            state: Arc::clone(&self.state),
        }))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

struct SyntheticStream {
    id: u64,
    width: u32,
    height: u32,
    frame_counter: u64,
    live: bool,
    state: Arc<SyntheticState>,
}

impl SyntheticStream {
    fn pattern(&self, frame_id: u64) -> Vec<u8> {
        let (width, height) = (self.width as usize, self.height as usize);
        let shift = (frame_id % 256) as usize;
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.push(((x * 255) / width.max(1)) as u8);
                data.push(((y * 255) / height.max(1)) as u8);
                data.push(((x + y + shift) % 256) as u8);
            }
        }
        data
    }
}

impl VideoStream for SyntheticStream {
    fn id(&self) -> u64 {
        self.id
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn grab_frame(&mut self) -> Result<FrameData, DeviceError> {
        if !self.live {
            return Err(DeviceError::CaptureStream {
                details: format!("Stream {} is stopped", self.id),
            });
        }

        let frame_id = self.frame_counter;
        self.frame_counter += 1;
        let data = self.pattern(frame_id);

        trace!(
            "Generated synthetic frame {} ({}x{}, {} bytes)",
            frame_id,
            self.width,
            self.height,
            data.len()
        );

        Ok(FrameData::new(
            frame_id,
            SystemTime::now(),
            data,
            self.width,
            self.height,
            FrameFormat::Rgb24,
        ))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.state.active_streams.fetch_sub(1, Ordering::SeqCst);
            debug!("Synthetic stream {} stopped", self.id);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
