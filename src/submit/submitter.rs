use super::client::VerificationBackend;
use super::payload::{ConsentProfile, ConsentRequest, LoginRequest, RegisterRequest};
use crate::config::RegistrationContract;
use crate::error::SubmissionError;
use crate::frame::CapturedFrame;
use crate::identity::{LoginFields, PendingIdentity, RegistrationFields};
use crate::routes::HomeContext;
use crate::session::SessionUpdate;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Successful verification, ready to be persisted and routed
#[derive(Debug, Clone, PartialEq)]
pub enum Verified {
    /// Consent registration; the service assigned `user_id`
    Registered {
        user_id: String,
        profile: ConsentProfile,
    },
    /// Legacy registration acknowledged by name
    LegacyRegistered {
        name: String,
        email: String,
        phone: String,
    },
    LoggedIn { email: String, payload: Value },
}

impl Verified {
    /// Fields to persist for the settings page
    pub fn session_update(&self) -> SessionUpdate {
        match self {
            Verified::Registered { profile, .. } => SessionUpdate {
                name: Some(profile.name.clone()),
                email: Some(profile.email.clone()),
                phone: Some(profile.phone.clone()),
            },
            Verified::LegacyRegistered { name, email, phone } => SessionUpdate {
                name: Some(name.clone()),
                email: Some(email.clone()),
                phone: Some(phone.clone()),
            },
            Verified::LoggedIn { email, .. } => SessionUpdate {
                email: Some(email.clone()),
                ..Default::default()
            },
        }
    }

    /// State handed to the home page
    pub fn home_context(&self) -> HomeContext {
        match self {
            Verified::Registered { user_id, .. } => HomeContext {
                user_id: Some(user_id.clone()),
                ..Default::default()
            },
            Verified::LegacyRegistered { name, .. } => HomeContext {
                name: Some(name.clone()),
                ..Default::default()
            },
            Verified::LoggedIn { email, .. } => HomeContext {
                email: Some(email.clone()),
                ..Default::default()
            },
        }
    }
}

/// Sends one captured frame plus the pending identity to the live endpoint
pub struct VerificationSubmitter {
    backend: Arc<dyn VerificationBackend>,
    contract: RegistrationContract,
}

impl VerificationSubmitter {
    pub fn new(backend: Arc<dyn VerificationBackend>, contract: RegistrationContract) -> Self {
        Self { backend, contract }
    }

    pub fn contract(&self) -> RegistrationContract {
        self.contract
    }

    /// Dispatch exactly one request for `identity`. The frame is consumed.
    pub async fn submit(
        &self,
        frame: CapturedFrame,
        identity: &PendingIdentity,
    ) -> Result<Verified, SubmissionError> {
        info!(
            "Submitting {}x{} frame for {} ({})",
            frame.width,
            frame.height,
            identity.email(),
            identity.mode()
        );

        match identity {
            PendingIdentity::Register(fields) => match self.contract {
                RegistrationContract::Consent => self.submit_consent(frame, fields).await,
                RegistrationContract::LegacyRegister => self.submit_register(frame, fields).await,
            },
            PendingIdentity::Login(fields) => self.submit_login(frame, fields).await,
        }
    }

    async fn submit_consent(
        &self,
        frame: CapturedFrame,
        fields: &RegistrationFields,
    ) -> Result<Verified, SubmissionError> {
        let profile = ConsentProfile {
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
        };
        let request = ConsentRequest {
            user_id: provisional_user_id(),
            consent: true,
            profile: profile.clone(),
            image: frame.image_base64,
        };

        let response = self.backend.consent(request).await?;
        info!("Consent registration accepted for user {}", response.user_id);

        Ok(Verified::Registered {
            user_id: response.user_id,
            profile,
        })
    }

    async fn submit_register(
        &self,
        frame: CapturedFrame,
        fields: &RegistrationFields,
    ) -> Result<Verified, SubmissionError> {
        let request = RegisterRequest {
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone_no: fields.phone.clone(),
            password: fields.password.clone(),
            image_base64: frame.image_base64,
        };

        let response = self.backend.register(request).await?;
        info!("Registration accepted for {}", response.name);

        Ok(Verified::LegacyRegistered {
            name: response.name,
            email: fields.email.clone(),
            phone: fields.phone.clone(),
        })
    }

    async fn submit_login(
        &self,
        frame: CapturedFrame,
        fields: &LoginFields,
    ) -> Result<Verified, SubmissionError> {
        let request = LoginRequest {
            image_base64: frame.image_base64,
            password: fields.password.clone(),
            email: fields.email.clone(),
        };

        let payload = self.backend.login(request).await?;
        info!("Face login accepted for {}", fields.email);

        Ok(Verified::LoggedIn {
            email: fields.email.clone(),
            payload,
        })
    }
}

/// `temp_<unix millis>`; replaced by the id the service returns
pub fn provisional_user_id() -> String {
    format!("temp_{}", Utc::now().timestamp_millis())
}
