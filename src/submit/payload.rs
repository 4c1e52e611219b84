use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile block of a consent registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// `POST /consent` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRequest {
    /// Provisional id; the service answers with the real one
    pub user_id: String,
    pub consent: bool,
    pub profile: ConsentProfile,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsentResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /register` body
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone_no: String,
    pub password: String,
    pub image_base64: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegisterResponse {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /login` body
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub image_base64: String,
    pub password: String,
    pub email: String,
}

/// Error body some endpoints return alongside a non-2xx status
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<Value>,
    pub message: Option<Value>,
}

impl ErrorBody {
    /// First string-valued `error` or `message` field
    pub(crate) fn detail(&self) -> Option<String> {
        [&self.error, &self.message]
            .into_iter()
            .flatten()
            .find_map(|value| value.as_str().filter(|s| !s.is_empty()).map(str::to_string))
    }
}

// Passwords and image payloads stay out of logs.
impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone_no", &self.phone_no)
            .field("image_len", &self.image_base64.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("image_len", &self.image_base64.len())
            .finish_non_exhaustive()
    }
}
