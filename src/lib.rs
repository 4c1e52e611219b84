pub mod app;
pub mod auth;
pub mod camera;
pub mod capture;
pub mod config;
pub mod country;
pub mod error;
pub mod events;
pub mod frame;
pub mod identity;
pub mod routes;
pub mod session;
pub mod submit;
pub mod validation;

pub use app::{run_capture_page, CaptureOutcome, CapturePage, CapturePageBuilder, PageCommand, PageExit};
pub use auth::{AuthForm, AuthMode};
pub use camera::{AcquireOutcome, CameraDevice, CameraSession, SyntheticCamera};
pub use capture::{CaptureSequencer, SequencerState};
pub use config::{RegistrationContract, TrustfaceConfig};
pub use country::{Country, COUNTRIES};
pub use error::{DeviceError, Result, SubmissionError, TrustfaceError, ValidationError};
pub use events::{CaptureEvent, EventBus};
pub use frame::{CapturedFrame, FrameData, FrameFormat};
pub use identity::{LoginFields, PendingIdentity, RegistrationFields};
pub use routes::{HomeContext, NavigationState, Navigator, Route};
pub use session::{FileSessionStore, MemorySessionStore, SessionRecord, SessionStore, SessionUpdate};
pub use submit::{HttpVerificationBackend, VerificationBackend, VerificationSubmitter};
pub use validation::{FieldErrors, FormField, PasswordStrength};
