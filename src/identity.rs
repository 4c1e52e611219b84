use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign-up fields carried from the form to the capture page
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationFields {
    pub name: String,
    pub email: String,
    /// Dial code followed by the local number, e.g. `+919876543210`
    pub phone: String,
    pub password: String,
    /// ISO code of the selected country, kept for shared dial codes
    pub country_code: Option<String>,
}

/// Sign-in fields carried from the form to the capture page
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginFields {
    pub email: String,
    pub password: String,
}

/// Identity awaiting face verification. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PendingIdentity {
    Register(RegistrationFields),
    Login(LoginFields),
}

impl PendingIdentity {
    pub fn email(&self) -> &str {
        match self {
            PendingIdentity::Register(fields) => &fields.email,
            PendingIdentity::Login(fields) => &fields.email,
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            PendingIdentity::Register(_) => "register",
            PendingIdentity::Login(_) => "login",
        }
    }
}

// Passwords never reach log output.
impl fmt::Debug for RegistrationFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationFields")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .field("country_code", &self.country_code)
            .finish()
    }
}

impl fmt::Debug for LoginFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFields")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
