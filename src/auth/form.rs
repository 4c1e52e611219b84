use crate::country::{country_by_code, default_country, split_phone, Country};
use crate::error::ValidationError;
use crate::identity::{LoginFields, PendingIdentity, RegistrationFields};
use crate::routes::{NavigationState, Navigator, Route};
use crate::validation::{
    check_email, check_name, check_new_password, check_password_present, check_phone,
    filter_name_input, filter_phone_input, password_strength, validate_login,
    validate_registration, FieldErrors, FormField, PasswordStrength,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Register,
    Login,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Register => f.write_str("register"),
            AuthMode::Login => f.write_str("login"),
        }
    }
}

/// Sign-up / sign-in form state.
///
/// `phone` holds the local digits only; the dial code comes from the selected
/// country and is prepended when the form is submitted.
#[derive(Clone)]
pub struct AuthForm {
    mode: AuthMode,
    name: String,
    email: String,
    phone: String,
    password: String,
    country: &'static Country,
    strength: Option<PasswordStrength>,
    errors: FieldErrors,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            password: String::new(),
            country: default_country(),
            strength: None,
            errors: FieldErrors::new(),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Password => &self.password,
        }
    }

    pub fn country(&self) -> &'static Country {
        self.country
    }

    pub fn dial_code(&self) -> &'static str {
        self.country.dial_code
    }

    /// Strength indicator; only shown while registering
    pub fn strength(&self) -> Option<PasswordStrength> {
        self.strength
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Apply an edit. Input is filtered, the edited field's error is cleared
    /// and any other displayed errors are re-checked.
    pub fn set_field(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Name => self.name = filter_name_input(value),
            FormField::Email => self.email = value.to_string(),
            FormField::Phone => self.phone = filter_phone_input(value),
            FormField::Password => {
                self.password = value.to_string();
                self.strength = match self.mode {
                    AuthMode::Register => password_strength(&self.password),
                    AuthMode::Login => None,
                };
            }
        }

        self.errors.remove(&field);
        self.recheck_displayed_errors();
    }

    fn recheck_displayed_errors(&mut self) {
        let displayed: Vec<FormField> = self.errors.keys().copied().collect();
        for field in displayed {
            match self.check_field(field) {
                Ok(()) => {
                    self.errors.remove(&field);
                }
                Err(e) => {
                    self.errors.insert(field, e.message);
                }
            }
        }
    }

    fn check_field(&self, field: FormField) -> Result<(), ValidationError> {
        match (self.mode, field) {
            (AuthMode::Register, FormField::Name) => check_name(&self.name),
            (AuthMode::Register, FormField::Phone) => check_phone(&self.phone),
            (AuthMode::Register, FormField::Password) => check_new_password(&self.password),
            (AuthMode::Login, FormField::Password) => check_password_present(&self.password),
            (_, FormField::Email) => check_email(&self.email),
            (AuthMode::Login, FormField::Name | FormField::Phone) => Ok(()),
        }
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        if self.mode == mode {
            return;
        }
        debug!("Auth form switched to {}", mode);
        self.mode = mode;
        self.errors.clear();
        self.strength = match mode {
            AuthMode::Register => password_strength(&self.password),
            AuthMode::Login => None,
        };
    }

    /// Select a country by ISO code; unknown codes are ignored
    pub fn select_country(&mut self, code: &str) -> bool {
        match country_by_code(code) {
            Some(country) => {
                self.country = country;
                true
            }
            None => false,
        }
    }

    /// Run every rule for the current mode, replacing displayed errors
    pub fn validate(&mut self) -> bool {
        self.errors = match self.mode {
            AuthMode::Register => {
                validate_registration(&self.name, &self.email, &self.phone, &self.password)
            }
            AuthMode::Login => validate_login(&self.email, &self.password),
        };
        self.errors.is_empty()
    }

    /// Identity the form currently describes
    pub fn pending_identity(&self) -> PendingIdentity {
        match self.mode {
            AuthMode::Register => PendingIdentity::Register(RegistrationFields {
                name: self.name.clone(),
                email: self.email.clone(),
                phone: format!("{}{}", self.country.dial_code, self.phone),
                password: self.password.clone(),
                country_code: Some(self.country.code.to_string()),
            }),
            AuthMode::Login => PendingIdentity::Login(LoginFields {
                email: self.email.clone(),
                password: self.password.clone(),
            }),
        }
    }

    /// Validate, then navigate to the capture page carrying the identity.
    /// On failure the first failing field is returned and nothing navigates.
    pub fn submit(&mut self, navigator: &Navigator) -> Result<PendingIdentity, ValidationError> {
        self.validate();
        if let Some((field, message)) = self.errors.iter().next() {
            debug!("Auth form rejected: {} errors", self.errors.len());
            return Err(ValidationError::new(*field, message.clone()));
        }

        let identity = self.pending_identity();
        info!("Auth form accepted for {} ({})", identity.email(), self.mode);
        navigator.navigate(
            Route::CameraCapture,
            Some(NavigationState::Capture(identity.clone())),
        );
        Ok(identity)
    }

    /// Repopulate from form data handed back by the capture page
    pub fn restore_from(&mut self, identity: &PendingIdentity) {
        self.errors.clear();
        match identity {
            PendingIdentity::Register(fields) => {
                let (country, number) = split_phone(&fields.phone, fields.country_code.as_deref());
                self.mode = AuthMode::Register;
                self.name = fields.name.clone();
                self.email = fields.email.clone();
                self.country = country;
                self.phone = number;
                self.password = fields.password.clone();
                self.strength = password_strength(&self.password);
            }
            PendingIdentity::Login(fields) => {
                self.mode = AuthMode::Login;
                self.name.clear();
                self.email = fields.email.clone();
                self.phone.clear();
                self.country = default_country();
                self.password = fields.password.clone();
                self.strength = None;
            }
        }
        debug!("Auth form restored in {} mode", self.mode);
    }

    /// Consume returned form data from the last navigation, if any
    pub fn restore_from_navigation(&mut self, navigator: &Navigator) -> bool {
        match navigator.take_state() {
            Some(NavigationState::Returned(identity)) => {
                self.restore_from(&identity);
                true
            }
            _ => false,
        }
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self::new(AuthMode::Register)
    }
}

impl fmt::Debug for AuthForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthForm")
            .field("mode", &self.mode)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("dial_code", &self.country.dial_code)
            .field("phone", &self.phone)
            .field("strength", &self.strength)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
