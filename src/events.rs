use crate::error::EventBusError;
use crate::routes::Route;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Status changes published by the capture flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaptureEvent {
    /// A stream was granted and attached to the preview
    CameraReady { width: u32, height: u32 },
    /// The held stream was stopped and detached
    CameraReleased,
    /// The camera could not be opened
    CameraError { message: String },
    /// One countdown step elapsed
    CountdownTick { remaining: u32 },
    /// A still was taken and encoded
    FrameCaptured { width: u32, height: u32, bytes: usize },
    /// The frame is being submitted
    Processing,
    /// The submission failed and the page is retryable
    SubmissionFailed { message: String },
    /// The page navigated away
    Navigated { route: Route },
}

impl CaptureEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            CaptureEvent::CameraReady { width, height } => {
                format!("Camera ready ({}x{})", width, height)
            }
            CaptureEvent::CameraReleased => "Camera released".to_string(),
            CaptureEvent::CameraError { message } => format!("Camera error: {}", message),
            CaptureEvent::CountdownTick { remaining } => format!("Countdown: {}", remaining),
            CaptureEvent::FrameCaptured {
                width,
                height,
                bytes,
            } => format!("Frame captured ({}x{}, {} bytes)", width, height, bytes),
            CaptureEvent::Processing => "Processing your image...".to_string(),
            CaptureEvent::SubmissionFailed { message } => {
                format!("Submission failed: {}", message)
            }
            CaptureEvent::Navigated { route } => format!("Navigated to {}", route),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            CaptureEvent::CameraReady { .. } => "camera_ready",
            CaptureEvent::CameraReleased => "camera_released",
            CaptureEvent::CameraError { .. } => "camera_error",
            CaptureEvent::CountdownTick { .. } => "countdown_tick",
            CaptureEvent::FrameCaptured { .. } => "frame_captured",
            CaptureEvent::Processing => "processing",
            CaptureEvent::SubmissionFailed { .. } => "submission_failed",
            CaptureEvent::Navigated { .. } => "navigated",
        }
    }
}

/// Broadcast channel for capture status
pub struct EventBus {
    sender: broadcast::Sender<CaptureEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: CaptureEvent) -> Result<usize, EventBusError> {
        match &event {
            CaptureEvent::CameraError { message } => warn!("Camera error: {}", message),
            CaptureEvent::SubmissionFailed { message } => {
                warn!("Submission failed: {}", message)
            }
            CaptureEvent::FrameCaptured { .. } | CaptureEvent::Navigated { .. } => {
                info!("{}", event.description())
            }
            _ => debug!("Event: {}", event.description()),
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Publish, ignoring the absence of subscribers
    pub fn notify(&self, event: CaptureEvent) {
        let _ = self.publish(event);
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new(8);
        let mut receiver = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        bus.publish(CaptureEvent::CountdownTick { remaining: 2 })
            .unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event, CaptureEvent::CountdownTick { remaining: 2 });
        assert_eq!(event.event_type(), "countdown_tick");
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let bus = EventBus::new(8);
        assert!(bus.publish(CaptureEvent::Processing).is_err());
        // notify swallows the same failure
        bus.notify(CaptureEvent::Processing);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            CaptureEvent::Navigated { route: Route::Home }.description(),
            "Navigated to /home"
        );
        assert_eq!(
            CaptureEvent::CameraReady {
                width: 640,
                height: 480
            }
            .description(),
            "Camera ready (640x480)"
        );
    }
}
