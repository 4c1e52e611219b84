use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrustfaceConfig {
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for /dev/video0)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Nominal stream resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Frames per second
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Which way the requested camera should face
    #[serde(default)]
    pub facing_mode: FacingMode,

    /// Device backend used to open streams
    #[serde(default)]
    pub backend: CameraBackend,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaptureConfig {
    /// Countdown length before the still is taken
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,

    /// Countdown tick interval in milliseconds
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,

    /// JPEG quality for the captured still (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    /// Consent endpoint used for registration
    #[serde(default = "default_consent_url")]
    pub consent_url: String,

    /// Legacy registration endpoint
    #[serde(default = "default_register_url")]
    pub register_url: String,

    /// Face login endpoint
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// Which registration contract is live
    #[serde(default)]
    pub registration_contract: RegistrationContract,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    /// File holding the persisted session fields
    #[serde(default = "default_session_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Event bus capacity
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    #[default]
    Synthetic,
    Gstreamer,
}

/// Registration endpoints are mutually exclusive; only one is treated as live.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationContract {
    #[default]
    Consent,
    LegacyRegister,
}

impl CaptureConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl TrustfaceConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("trustface.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.index", default_camera_index())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default("camera.facing_mode", "user")?
            .set_default("camera.backend", "synthetic")?
            .set_default("capture.countdown_seconds", default_countdown_seconds())?
            .set_default("capture.tick_millis", default_tick_millis() as i64)?
            .set_default("capture.jpeg_quality", default_jpeg_quality() as i64)?
            .set_default("api.consent_url", default_consent_url())?
            .set_default("api.register_url", default_register_url())?
            .set_default("api.login_url", default_login_url())?
            .set_default("api.registration_contract", "consent")?
            .set_default("api.timeout_seconds", default_timeout_seconds() as i64)?
            .set_default("session.path", default_session_path())?
            .set_default(
                "system.event_bus_capacity",
                default_event_bus_capacity() as i64,
            )?
            .add_source(File::with_name(&path_str).required(false))
            // TRUSTFACE_API__LOGIN_URL -> api.login_url
            .add_source(
                Environment::with_prefix("TRUSTFACE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: TrustfaceConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        if self.capture.countdown_seconds == 0 {
            return Err(ConfigError::Message(
                "Capture countdown_seconds must be greater than 0".to_string(),
            ));
        }

        if self.capture.tick_millis == 0 {
            return Err(ConfigError::Message(
                "Capture tick_millis must be greater than 0".to_string(),
            ));
        }

        if !(1..=100).contains(&self.capture.jpeg_quality) {
            return Err(ConfigError::Message(
                "Capture jpeg_quality must be between 1 and 100".to_string(),
            ));
        }

        for (name, url) in [
            ("consent_url", &self.api.consent_url),
            ("register_url", &self.api.register_url),
            ("login_url", &self.api.login_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::Message(format!(
                    "API {} must not be empty",
                    name
                )));
            }
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "API timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.system.event_bus_capacity == 0 {
            return Err(ConfigError::Message(
                "Event bus capacity must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TrustfaceConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                index: default_camera_index(),
                resolution: default_camera_resolution(),
                fps: default_camera_fps(),
                facing_mode: FacingMode::default(),
                backend: CameraBackend::default(),
            },
            capture: CaptureConfig {
                countdown_seconds: default_countdown_seconds(),
                tick_millis: default_tick_millis(),
                jpeg_quality: default_jpeg_quality(),
            },
            api: ApiConfig {
                consent_url: default_consent_url(),
                register_url: default_register_url(),
                login_url: default_login_url(),
                registration_contract: RegistrationContract::default(),
                timeout_seconds: default_timeout_seconds(),
            },
            session: SessionConfig {
                path: default_session_path(),
            },
            system: SystemConfig {
                event_bus_capacity: default_event_bus_capacity(),
            },
        }
    }
}

// Default value functions
fn default_camera_index() -> u32 {
    0
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_camera_fps() -> u32 {
    30
}

fn default_countdown_seconds() -> u32 {
    3
}
fn default_tick_millis() -> u64 {
    1000
}
fn default_jpeg_quality() -> u8 {
    80
}

fn default_consent_url() -> String {
    "https://ljuyvviqx0.execute-api.us-east-1.amazonaws.com/dev/consent".to_string()
}
fn default_register_url() -> String {
    "https://pm6fdjjr51.execute-api.us-east-1.amazonaws.com/dev/register".to_string()
}
fn default_login_url() -> String {
    "https://pm6fdjjr51.execute-api.us-east-1.amazonaws.com/dev/login".to_string()
}
fn default_timeout_seconds() -> u64 {
    30
}

fn default_session_path() -> String {
    "./trustface-session.json".to_string()
}

fn default_event_bus_capacity() -> usize {
    64
}
