use super::page::CapturePage;
use crate::camera::{build_device, CameraDevice, CameraSession, StreamRequest};
use crate::capture::CaptureSequencer;
use crate::config::TrustfaceConfig;
use crate::error::{Result, TrustfaceError};
use crate::events::EventBus;
use crate::routes::Navigator;
use crate::session::{FileSessionStore, SessionStore};
use crate::submit::{HttpVerificationBackend, VerificationBackend, VerificationSubmitter};
use std::sync::Arc;

/// Builder for [`CapturePage`]. Unset parts are created from configuration.
pub struct CapturePageBuilder {
    config: Option<TrustfaceConfig>,
    navigator: Option<Arc<Navigator>>,
    device: Option<Arc<dyn CameraDevice>>,
    backend: Option<Arc<dyn VerificationBackend>>,
    store: Option<Arc<dyn SessionStore>>,
    event_bus: Option<Arc<EventBus>>,
}

impl CapturePageBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            navigator: None,
            device: None,
            backend: None,
            store: None,
            event_bus: None,
        }
    }

    pub fn config(mut self, config: TrustfaceConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn navigator(mut self, navigator: Arc<Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn device(mut self, device: Arc<dyn CameraDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn VerificationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<CapturePage> {
        let config = self
            .config
            .ok_or_else(|| TrustfaceError::system("Capture page configuration must be specified"))?;
        let navigator = self
            .navigator
            .ok_or_else(|| TrustfaceError::system("Capture page navigator must be specified"))?;

        let device = match self.device {
            Some(device) => device,
            None => build_device(&config.camera)?,
        };
        let backend: Arc<dyn VerificationBackend> = match self.backend {
            Some(backend) => backend,
            None => Arc::new(HttpVerificationBackend::new(config.api.clone())?),
        };
        let store: Arc<dyn SessionStore> = match self.store {
            Some(store) => store,
            None => Arc::new(FileSessionStore::new(&config.session.path)),
        };
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| Arc::new(EventBus::new(config.system.event_bus_capacity)));

        let session = CameraSession::new(
            device,
            StreamRequest::from(&config.camera),
            navigator.subscribe(),
            Arc::clone(&event_bus),
        );
        let sequencer = CaptureSequencer::new(config.capture.clone(), Arc::clone(&event_bus));
        let submitter = VerificationSubmitter::new(backend, config.api.registration_contract);

        Ok(CapturePage {
            navigator,
            session,
            sequencer,
            submitter,
            store,
            event_bus,
            identity: None,
            error: None,
            processing: false,
            active: false,
        })
    }
}

impl Default for CapturePageBuilder {
    fn default() -> Self {
        Self::new()
    }
}
