use super::device::{CameraDevice, StreamRequest, VideoStream};
use crate::error::DeviceError;
use crate::frame::{FrameData, FrameFormat};
use async_trait::async_trait;
use gstreamer::prelude::*;
use gstreamer::Pipeline;
use gstreamer_app::AppSink;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::{debug, info, trace, warn};

const SAMPLE_TIMEOUT_MS: u64 = 2000;

/// V4L2 camera read through a GStreamer MJPEG pipeline
pub struct GstreamerCamera {
    next_stream_id: AtomicU64,
}

impl GstreamerCamera {
    pub fn new() -> Result<Self, DeviceError> {
        gstreamer::init().map_err(|e| DeviceError::Configuration {
            details: format!("Failed to initialize GStreamer: {}", e),
        })?;

        Ok(Self {
            next_stream_id: AtomicU64::new(1),
        })
    }

    fn device_path(index: u32) -> PathBuf {
        PathBuf::from(format!("/dev/video{}", index))
    }

    fn build_pipeline_string(request: &StreamRequest) -> String {
        let (width, height) = request.resolution;
        format!(
            "v4l2src device=/dev/video{} io-mode=mmap do-timestamp=true ! \
             image/jpeg,width={},height={},framerate={}/1 ! \
             queue max-size-buffers=2 leaky=downstream ! \
             appsink name=sink sync=false max-buffers=1 drop=true enable-last-sample=false",
            request.index, width, height, request.fps
        )
    }

    /// Surface absence and permission problems before building the pipeline
    fn probe_device(index: u32) -> Result<(), DeviceError> {
        let path = Self::device_path(index);
        match std::fs::OpenOptions::new().read(true).open(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(DeviceError::NotFound { index }),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(DeviceError::PermissionDenied)
            }
            Err(e) => Err(DeviceError::Configuration {
                details: format!("Failed to open {}: {}", path.display(), e),
            }),
        }
    }

    fn start_pipeline(request: &StreamRequest) -> Result<(Pipeline, AppSink), DeviceError> {
        let pipeline_desc = Self::build_pipeline_string(request);
        info!("Creating GStreamer pipeline: {}", pipeline_desc);

        let pipeline = gstreamer::parse::launch(&pipeline_desc)
            .map_err(|e| DeviceError::Configuration {
                details: format!("Failed to create pipeline: {}", e),
            })?
            .downcast::<Pipeline>()
            .map_err(|_| DeviceError::Configuration {
                details: "Failed to downcast to Pipeline".to_string(),
            })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| DeviceError::Configuration {
                details: "Pipeline has no appsink".to_string(),
            })?
            .downcast::<AppSink>()
            .map_err(|_| DeviceError::Configuration {
                details: "Failed to downcast to AppSink".to_string(),
            })?;

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| DeviceError::CaptureStream {
                details: format!("Failed to start GStreamer pipeline: {}", e),
            })?;

        Ok((pipeline, appsink))
    }
}

#[async_trait]
impl CameraDevice for GstreamerCamera {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>, DeviceError> {
        if request.facing_mode != crate::config::FacingMode::User {
            debug!("V4L2 devices have no facing mode; using /dev/video{}", request.index);
        }

        let owned = request.clone();
        let (pipeline, appsink) = tokio::task::spawn_blocking(move || {
            Self::probe_device(owned.index)?;
            Self::start_pipeline(&owned)
        })
        .await
        .map_err(|e| DeviceError::CaptureStream {
            details: format!("Pipeline start task failed: {}", e),
        })??;

        let id = self.next_stream_id.fetch_add(1, Ordering::Relaxed);
        info!("GStreamer stream {} started on /dev/video{}", id, request.index);

        Ok(Box::new(GstreamerStream {
            id,
            pipeline,
            appsink,
            resolution: request.resolution,
            frame_counter: 0,
            live: true,
        }))
    }

    fn name(&self) -> &str {
        "gstreamer"
    }
}

struct GstreamerStream {
    id: u64,
    pipeline: Pipeline,
    appsink: AppSink,
    resolution: (u32, u32),
    frame_counter: u64,
    live: bool,
}

impl VideoStream for GstreamerStream {
    fn id(&self) -> u64 {
        self.id
    }

    fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    fn grab_frame(&mut self) -> Result<FrameData, DeviceError> {
        if !self.live {
            return Err(DeviceError::CaptureStream {
                details: format!("Stream {} is stopped", self.id),
            });
        }

        let sample = self
            .appsink
            .try_pull_sample(gstreamer::ClockTime::from_mseconds(SAMPLE_TIMEOUT_MS))
            .ok_or_else(|| DeviceError::CaptureStream {
                details: format!("No sample within {}ms", SAMPLE_TIMEOUT_MS),
            })?;

        let buffer = sample.buffer().ok_or_else(|| DeviceError::CaptureStream {
            details: "No buffer in sample".to_string(),
        })?;

        // Caps carry the negotiated size, which may differ from the request
        if let Some(structure) = sample.caps().and_then(|caps| caps.structure(0)) {
            if let (Ok(width), Ok(height)) =
                (structure.get::<i32>("width"), structure.get::<i32>("height"))
            {
                self.resolution = (width.max(0) as u32, height.max(0) as u32);
            }
        }

        let map = buffer
            .map_readable()
            .map_err(|e| DeviceError::CaptureStream {
                details: format!("Failed to map buffer: {}", e),
            })?;

        let frame_id = self.frame_counter;
        self.frame_counter += 1;

        trace!(
            "Pulled MJPEG frame {} ({}x{}, {} bytes)",
            frame_id,
            self.resolution.0,
            self.resolution.1,
            map.len()
        );

        Ok(FrameData::new(
            frame_id,
            SystemTime::now(),
            map.as_slice().to_vec(),
            self.resolution.0,
            self.resolution.1,
            FrameFormat::Mjpeg,
        ))
    }

    fn stop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;

        if let Err(e) = self.pipeline.set_state(gstreamer::State::Null) {
            warn!("Failed to stop GStreamer pipeline {}: {}", self.id, e);
        } else {
            info!("GStreamer stream {} stopped", self.id);
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
