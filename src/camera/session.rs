use super::device::{CameraDevice, StreamHandle, StreamRequest};
use crate::error::DeviceError;
use crate::events::{CaptureEvent, EventBus};
use crate::frame::FrameData;
use crate::routes::Route;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Result of a successful acquisition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Stream granted and bound to the preview
    Attached { resolution: (u32, u32) },
    /// The page was left before the grant resolved; nothing is held
    Abandoned,
}

/// Owns at most one camera stream for the capture page.
///
/// Every acquisition releases the previous stream first, and a grant that
/// resolves after the user navigated away is stopped without being attached.
pub struct CameraSession {
    device: Arc<dyn CameraDevice>,
    request: StreamRequest,
    route: watch::Receiver<Route>,
    stream: Option<StreamHandle>,
    error: Option<String>,
    event_bus: Arc<EventBus>,
}

impl CameraSession {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        request: StreamRequest,
        route: watch::Receiver<Route>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            device,
            request,
            route,
            stream: None,
            error: None,
            event_bus,
        }
    }

    fn on_capture_route(&self) -> bool {
        *self.route.borrow() == Route::CameraCapture
    }

    /// Page entered: acquire when the capture route is current
    pub async fn enter(&mut self) -> Result<AcquireOutcome, DeviceError> {
        if !self.on_capture_route() {
            warn!(
                "Camera session entered on {} instead of {}",
                *self.route.borrow(),
                Route::CameraCapture
            );
            self.release();
            return Ok(AcquireOutcome::Abandoned);
        }
        self.acquire().await
    }

    /// Page left: release unconditionally
    pub fn exit(&mut self) {
        self.release();
    }

    /// Release any held stream, then request a new one from the device
    pub async fn acquire(&mut self) -> Result<AcquireOutcome, DeviceError> {
        self.release();

        if !self.on_capture_route() {
            debug!("Skipping camera acquisition outside {}", Route::CameraCapture);
            return Ok(AcquireOutcome::Abandoned);
        }

        self.error = None;
        info!(
            "Requesting {:?}-facing stream from {} at {}x{}",
            self.request.facing_mode,
            self.device.name(),
            self.request.resolution.0,
            self.request.resolution.1
        );

        let stream = match self.device.open(&self.request).await {
            Ok(stream) => StreamHandle::new(stream),
            Err(e) => {
                warn!("Camera acquisition failed: {}", e);
                let message = e.user_message().to_string();
                self.error = Some(message.clone());
                self.event_bus.notify(CaptureEvent::CameraError { message });
                return Err(e);
            }
        };

        // Route may have changed while the grant was pending
        if !self.on_capture_route() {
            info!(
                "Route changed to {} during acquisition; stopping stream {}",
                *self.route.borrow(),
                stream.id()
            );
            drop(stream);
            return Ok(AcquireOutcome::Abandoned);
        }

        let resolution = stream.resolution();
        info!(
            "Stream {} attached to preview ({}x{})",
            stream.id(),
            resolution.0,
            resolution.1
        );
        self.stream = Some(stream);
        self.event_bus.notify(CaptureEvent::CameraReady {
            width: resolution.0,
            height: resolution.1,
        });

        Ok(AcquireOutcome::Attached { resolution })
    }

    /// Stop and detach the held stream. Idempotent.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!("Releasing stream {}", stream.id());
            drop(stream);
            self.event_bus.notify(CaptureEvent::CameraReleased);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.stream.as_ref().is_some_and(StreamHandle::is_live)
    }

    /// User-facing error from the last acquisition, if it failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Id of the stream bound to the preview
    pub fn preview_stream(&self) -> Option<u64> {
        self.stream.as_ref().map(StreamHandle::id)
    }

    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.stream.as_ref().map(StreamHandle::resolution)
    }

    /// Current frame from the held stream; `None` when nothing is held
    pub fn grab_frame(&mut self) -> Option<Result<FrameData, DeviceError>> {
        self.stream.as_mut().map(StreamHandle::grab_frame)
    }

    pub fn current_route(&self) -> Route {
        *self.route.borrow()
    }

    /// A fresh receiver observing the same route channel
    pub fn route_receiver(&self) -> watch::Receiver<Route> {
        self.route.clone()
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.release();
    }
}
