use super::encode::encode_frame;
use crate::camera::CameraSession;
use crate::config::CaptureConfig;
use crate::error::DeviceError;
use crate::events::{CaptureEvent, EventBus};
use crate::frame::CapturedFrame;
use crate::routes::Route;
use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Countdown state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    /// Seconds remaining, from the configured length down to 1
    Countdown(u32),
    Captured,
    Error(String),
}

/// How a countdown ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownOutcome {
    Captured(CapturedFrame),
    /// The countdown token was triggered
    Cancelled,
    /// The capture route was left while counting
    Abandoned,
    /// No countdown was running or no stream was held at extraction
    NoFrame,
}

pub struct CaptureSequencer {
    config: CaptureConfig,
    state: SequencerState,
    timer: CancellationToken,
    event_bus: Arc<EventBus>,
}

impl CaptureSequencer {
    pub fn new(config: CaptureConfig, event_bus: Arc<EventBus>) -> Self {
        Self {
            config,
            state: SequencerState::Idle,
            timer: CancellationToken::new(),
            event_bus,
        }
    }

    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    pub fn countdown(&self) -> Option<u32> {
        match self.state {
            SequencerState::Countdown(remaining) => Some(remaining),
            _ => None,
        }
    }

    /// Token that stops the running countdown when cancelled
    pub fn countdown_token(&self) -> CancellationToken {
        self.timer.clone()
    }

    /// Begin a countdown. No-op unless idle with a ready camera.
    pub fn start(&mut self, session: &CameraSession) -> bool {
        if self.state != SequencerState::Idle {
            debug!("Ignoring capture trigger in state {:?}", self.state);
            return false;
        }
        if !session.is_ready() {
            debug!("Ignoring capture trigger without a ready camera");
            return false;
        }

        let remaining = self.config.countdown_seconds;
        info!("Starting {}s capture countdown", remaining);
        self.state = SequencerState::Countdown(remaining);
        self.event_bus
            .notify(CaptureEvent::CountdownTick { remaining });
        true
    }

    /// Drive the running countdown to completion.
    ///
    /// At 1 -> 0 the current frame is extracted and encoded, then the camera is
    /// released before this returns.
    pub async fn run_countdown(
        &mut self,
        session: &mut CameraSession,
    ) -> Result<CountdownOutcome, DeviceError> {
        let token = self.timer.clone();
        let mut route = session.route_receiver();
        let tick = self.config.tick_interval();
        let mut ticker = interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let remaining = match self.state {
                SequencerState::Countdown(remaining) => remaining,
                _ => return Ok(CountdownOutcome::NoFrame),
            };

            tokio::select! {
                _ = token.cancelled() => {
                    info!("Countdown cancelled at {}", remaining);
                    self.stop_timer();
                    self.state = SequencerState::Idle;
                    return Ok(CountdownOutcome::Cancelled);
                }
                changed = route.changed() => {
                    let left = changed.is_err() || *route.borrow() != Route::CameraCapture;
                    if left {
                        info!("Capture route left during countdown");
                        self.stop_timer();
                        self.state = SequencerState::Idle;
                        session.release();
                        return Ok(CountdownOutcome::Abandoned);
                    }
                }
                _ = ticker.tick() => {
                    let next = remaining.saturating_sub(1);
                    self.event_bus.notify(CaptureEvent::CountdownTick { remaining: next });
                    if next > 0 {
                        self.state = SequencerState::Countdown(next);
                        continue;
                    }

                    self.stop_timer();
                    return self.complete(session);
                }
            }
        }
    }

    fn complete(&mut self, session: &mut CameraSession) -> Result<CountdownOutcome, DeviceError> {
        let result = self.extract(session);
        session.release();

        match result {
            Ok(Some(frame)) => {
                self.state = SequencerState::Captured;
                self.event_bus.notify(CaptureEvent::FrameCaptured {
                    width: frame.width,
                    height: frame.height,
                    bytes: frame.image_base64.len(),
                });
                Ok(CountdownOutcome::Captured(frame))
            }
            Ok(None) => {
                self.state = SequencerState::Idle;
                Ok(CountdownOutcome::NoFrame)
            }
            Err(e) => {
                warn!("Frame extraction failed: {}", e);
                self.state = SequencerState::Error(e.user_message().to_string());
                Err(e)
            }
        }
    }

    /// Grab and encode the current frame. Returns `None` without a held stream.
    pub fn extract(
        &self,
        session: &mut CameraSession,
    ) -> Result<Option<CapturedFrame>, DeviceError> {
        let Some(frame) = session.grab_frame() else {
            debug!("No stream held at extraction; abandoning capture");
            return Ok(None);
        };

        let frame = frame?;
        encode_frame(&frame, self.config.jpeg_quality).map(Some)
    }

    /// Stop a running countdown from the owning task
    pub fn cancel(&mut self) {
        if matches!(self.state, SequencerState::Countdown(_)) {
            self.stop_timer();
            self.state = SequencerState::Idle;
        }
    }

    pub fn fail<S: Into<String>>(&mut self, message: S) {
        self.stop_timer();
        self.state = SequencerState::Error(message.into());
    }

    /// Back to idle, ready for another trigger
    pub fn reset(&mut self) {
        self.state = SequencerState::Idle;
    }

    // Cancel the current timer and arm a fresh one for the next countdown
    fn stop_timer(&mut self) {
        self.timer.cancel();
        self.timer = CancellationToken::new();
    }
}

impl Drop for CaptureSequencer {
    fn drop(&mut self) {
        self.timer.cancel();
    }
}
