use super::payload::{
    ConsentRequest, ConsentResponse, ErrorBody, LoginRequest, RegisterRequest, RegisterResponse,
};
use crate::config::ApiConfig;
use crate::error::SubmissionError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Remote identity-verification endpoints
#[async_trait]
pub trait VerificationBackend: Send + Sync {
    async fn consent(&self, request: ConsentRequest) -> Result<ConsentResponse, SubmissionError>;

    async fn register(&self, request: RegisterRequest)
        -> Result<RegisterResponse, SubmissionError>;

    /// Opaque JSON on success
    async fn login(&self, request: LoginRequest) -> Result<Value, SubmissionError>;
}

/// JSON-over-HTTPS backend
pub struct HttpVerificationBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpVerificationBackend {
    pub fn new(config: ApiConfig) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SubmissionError::Client {
                details: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    async fn post_json<B, R>(&self, endpoint: &str, url: &str, body: &B) -> Result<R, SubmissionError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let start = Instant::now();
        debug!("POST {} ({})", url, endpoint);

        let transport = |e: reqwest::Error| SubmissionError::Transport {
            endpoint: endpoint.to_string(),
            details: e.to_string(),
        };

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.detail())
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            warn!(
                "{} rejected with status {} after {}ms: {}",
                endpoint, status, latency_ms, detail
            );
            return Err(SubmissionError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let empty = |details: String| SubmissionError::EmptyResponse {
            endpoint: endpoint.to_string(),
            details,
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(empty("empty body".to_string()));
        }

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| empty(e.to_string()))?;
        if value.is_null() {
            return Err(empty("null body".to_string()));
        }

        let parsed = serde_json::from_value(value).map_err(|e| empty(e.to_string()))?;
        info!("{} succeeded with status {} in {}ms", endpoint, status, latency_ms);
        Ok(parsed)
    }
}

#[async_trait]
impl VerificationBackend for HttpVerificationBackend {
    async fn consent(&self, request: ConsentRequest) -> Result<ConsentResponse, SubmissionError> {
        self.post_json("consent", &self.config.consent_url, &request)
            .await
    }

    async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, SubmissionError> {
        self.post_json("register", &self.config.register_url, &request)
            .await
    }

    async fn login(&self, request: LoginRequest) -> Result<Value, SubmissionError> {
        self.post_json("login", &self.config.login_url, &request)
            .await
    }
}
