use super::types::CaptureOutcome;
use crate::camera::{AcquireOutcome, CameraSession};
use crate::capture::{CaptureSequencer, CountdownOutcome, SequencerState};
use crate::error::DeviceError;
use crate::events::{CaptureEvent, EventBus};
use crate::identity::PendingIdentity;
use crate::routes::{HomeContext, NavigationState, Navigator, Route};
use crate::session::{SessionStore, SessionUpdate};
use crate::submit::VerificationSubmitter;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Controller for the `/camera-capture` page.
///
/// Owns the camera session, countdown and submitter for one visit. All page
/// events go through `&mut self`, so at most one of them runs at a time.
pub struct CapturePage {
    pub(super) navigator: Arc<Navigator>,
    pub(super) session: CameraSession,
    pub(super) sequencer: CaptureSequencer,
    pub(super) submitter: VerificationSubmitter,
    pub(super) store: Arc<dyn SessionStore>,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) identity: Option<PendingIdentity>,
    pub(super) error: Option<String>,
    pub(super) processing: bool,
    pub(super) active: bool,
}

impl CapturePage {
    /// Page mounted: read the pending identity once and acquire the camera
    pub async fn enter(&mut self) -> Result<AcquireOutcome, DeviceError> {
        self.active = true;
        self.error = None;
        self.sequencer.reset();

        match self.navigator.take_state() {
            Some(NavigationState::Capture(identity)) => {
                info!(
                    "Capture page entered for {} ({})",
                    identity.email(),
                    identity.mode()
                );
                self.identity = Some(identity);
            }
            Some(other) => {
                debug!("Ignoring unrelated navigation state: {:?}", other);
            }
            None => {
                if self.identity.is_none() {
                    info!("Capture page entered without pending identity");
                }
            }
        }

        let result = self.session.enter().await;
        if let Err(e) = &result {
            self.error = Some(e.user_message().to_string());
        }
        result
    }

    /// Run one countdown, extract the frame, release the camera and submit.
    pub async fn capture(&mut self) -> CaptureOutcome {
        if !self.sequencer.start(&self.session) {
            return CaptureOutcome::NotReady;
        }

        let attempt = Uuid::new_v4();
        self.error = None;
        debug!("Capture attempt {} started", attempt);

        let frame = match self.sequencer.run_countdown(&mut self.session).await {
            Ok(CountdownOutcome::Captured(frame)) => frame,
            Ok(CountdownOutcome::Cancelled) => return CaptureOutcome::Cancelled,
            Ok(CountdownOutcome::Abandoned) => {
                self.exit();
                return CaptureOutcome::Abandoned;
            }
            Ok(CountdownOutcome::NoFrame) => {
                self.sequencer.reset();
                return CaptureOutcome::NotReady;
            }
            Err(e) => {
                warn!("Capture attempt {} failed during extraction: {}", attempt, e);
                let message = e.user_message().to_string();
                return self.recover(message).await;
            }
        };

        // Release strictly precedes the network call
        self.session.release();

        let Some(identity) = self.identity.clone() else {
            info!("No pending identity; continuing to {}", Route::Home);
            self.finish(None, None);
            return CaptureOutcome::Navigated(HomeContext::default());
        };

        self.processing = true;
        self.event_bus.notify(CaptureEvent::Processing);
        let result = self.submitter.submit(frame, &identity).await;
        self.processing = false;

        if !self.is_current() {
            info!(
                "Dropping result of attempt {}: page left for {}",
                attempt,
                self.navigator.current()
            );
            self.exit();
            return CaptureOutcome::Abandoned;
        }

        match result {
            Ok(verified) => {
                let context = verified.home_context();
                self.finish(
                    Some(NavigationState::Home(context.clone())),
                    Some(&verified.session_update()),
                );
                CaptureOutcome::Navigated(context)
            }
            Err(e) => {
                warn!("Capture attempt {} rejected: {}", attempt, e);
                self.recover(e.user_message().to_string()).await
            }
        }
    }

    async fn recover(&mut self, message: String) -> CaptureOutcome {
        self.error = Some(message.clone());
        self.sequencer.fail(message.clone());
        self.event_bus.notify(CaptureEvent::SubmissionFailed {
            message: message.clone(),
        });

        // Another capture is only allowed once the camera is back
        match self.session.acquire().await {
            Ok(AcquireOutcome::Attached { .. }) => self.sequencer.reset(),
            Ok(AcquireOutcome::Abandoned) => debug!("Camera not re-acquired; page left"),
            Err(e) => warn!("Camera re-acquisition failed: {}", e),
        }

        CaptureOutcome::Failed { message }
    }

    fn finish(&mut self, state: Option<NavigationState>, update: Option<&SessionUpdate>) {
        if let Some(update) = update {
            if let Err(e) = self.store.set(update) {
                warn!("Failed to persist session fields: {}", e);
            }
        }

        self.sequencer.reset();
        self.session.release();
        self.active = false;
        self.navigator.navigate(Route::Home, state);
        self.event_bus
            .notify(CaptureEvent::Navigated { route: Route::Home });
    }

    /// Back to the auth page, handing the form data back
    pub fn cancel(&mut self) {
        self.sequencer.cancel();
        self.session.release();
        self.active = false;

        let state = self.identity.clone().map(NavigationState::Returned);
        info!("Capture cancelled; returning to {}", Route::Auth);
        self.navigator.navigate(Route::Auth, state);
        self.event_bus
            .notify(CaptureEvent::Navigated { route: Route::Auth });
    }

    /// Page unmounted
    pub fn exit(&mut self) {
        self.sequencer.cancel();
        self.sequencer.reset();
        self.session.exit();
        self.active = false;
    }

    /// Re-acquire after a camera error; clears a failed sequencer on success
    pub async fn retry_camera(&mut self) -> Result<AcquireOutcome, DeviceError> {
        let result = self.session.acquire().await;
        match &result {
            Ok(AcquireOutcome::Attached { .. }) => {
                self.error = None;
                if matches!(self.sequencer.state(), SequencerState::Error(_)) {
                    self.sequencer.reset();
                }
            }
            Ok(AcquireOutcome::Abandoned) => {}
            Err(e) => self.error = Some(e.user_message().to_string()),
        }
        result
    }

    fn is_current(&self) -> bool {
        self.active && self.navigator.current() == Route::CameraCapture
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_ready()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn countdown(&self) -> Option<u32> {
        self.sequencer.countdown()
    }

    /// Token that cancels the countdown currently running or about to start
    pub fn countdown_token(&self) -> CancellationToken {
        self.sequencer.countdown_token()
    }

    pub fn sequencer_state(&self) -> &SequencerState {
        self.sequencer.state()
    }

    /// Error shown on the page, submission errors first
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| self.session.error())
    }

    pub fn identity(&self) -> Option<&PendingIdentity> {
        self.identity.as_ref()
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}
