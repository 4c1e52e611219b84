use crate::validation::FormField;
use thiserror::Error;

/// Message shown on the capture page when a submission fails for any reason
pub const RETRY_MESSAGE: &str = "Failed to process. Please try again.";

/// Message shown when the camera cannot be opened
pub const CAMERA_MESSAGE: &str = "Unable to access camera. Please allow camera permissions.";

#[derive(Error, Debug)]
pub enum TrustfaceError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Camera error: {0}")]
    Device(#[from] DeviceError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl TrustfaceError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Field-scoped form validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: FormField,
    pub message: String,
}

impl ValidationError {
    pub fn new<S: Into<String>>(field: FormField, message: S) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Camera acquisition and frame extraction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("No camera device available at index {index}")]
    NotFound { index: u32 },

    #[error("Camera configuration failed: {details}")]
    Configuration { details: String },

    #[error("Camera stream failed: {details}")]
    CaptureStream { details: String },

    #[error("Failed to encode captured frame: {details}")]
    FrameEncoding { details: String },
}

impl DeviceError {
    /// Message suitable for the capture page error banner
    pub fn user_message(&self) -> &'static str {
        CAMERA_MESSAGE
    }
}

/// Failures talking to the verification endpoints
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{endpoint} request failed: {details}")]
    Transport { endpoint: String, details: String },

    #[error("{endpoint} returned status {status}: {detail}")]
    Rejected {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("{endpoint} returned an empty or malformed response: {details}")]
    EmptyResponse { endpoint: String, details: String },

    #[error("Failed to build HTTP client: {details}")]
    Client { details: String },
}

impl SubmissionError {
    /// Message suitable for the capture page error banner
    pub fn user_message(&self) -> &'static str {
        RETRY_MESSAGE
    }

    pub fn is_empty_response(&self) -> bool {
        matches!(self, SubmissionError::EmptyResponse { .. })
    }
}

#[derive(Error, Debug, Clone)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T> = std::result::Result<T, TrustfaceError>;
