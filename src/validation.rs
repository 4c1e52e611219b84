//! Sign-up and sign-in field validation.
//!
//! Everything here is pure: callers own the form state and decide when to
//! show the resulting messages.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Characters accepted in the local part of an email address
const EMAIL_LOCAL_SYMBOLS: &str = ".!#$%&'*+/=?^_`{|}~-";

/// Maximum length of a single domain label
const MAX_DOMAIN_LABEL: usize = 63;

const MIN_PHONE_DIGITS: usize = 6;
const MAX_PHONE_DIGITS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormField {
    Name,
    Email,
    Phone,
    Password,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Password => "password",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Low,
    Weak,
    Strong,
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PasswordStrength::Low => "low",
            PasswordStrength::Weak => "weak",
            PasswordStrength::Strong => "strong",
        };
        f.write_str(label)
    }
}

/// Field-scoped error messages, ordered by field
pub type FieldErrors = BTreeMap<FormField, String>;

/// Letters and whitespace only, at least two characters once trimmed
pub fn validate_name(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.chars().count() >= 2
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
}

/// Conventional `local@domain` address with dot-separated domain labels
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || EMAIL_LOCAL_SYMBOLS.contains(c));

    local_ok && domain.split('.').all(is_domain_label)
}

fn is_domain_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_DOMAIN_LABEL
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

/// 6-15 digits once spaces and hyphens are stripped
pub fn validate_phone(phone: &str) -> bool {
    let digits: Vec<char> = phone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
        && digits.iter().all(|c| c.is_ascii_digit())
}

/// Raw 0-6 point score behind [`password_strength`]
pub fn password_score(password: &str) -> u8 {
    let length = password.chars().count();
    let checks = [
        length >= 8,
        length >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];

    checks.iter().filter(|passed| **passed).count() as u8
}

/// Strength bucket for a password; an empty password has none
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }

    let strength = match password_score(password) {
        0..=2 => PasswordStrength::Low,
        3..=4 => PasswordStrength::Weak,
        _ => PasswordStrength::Strong,
    };
    Some(strength)
}

/// Drop everything but ASCII letters and whitespace from name input
pub fn filter_name_input(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect()
}

/// Drop everything but digits from phone input
pub fn filter_phone_input(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn check_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ValidationError::new(FormField::Name, "Name is required"))
    } else if trimmed.chars().count() < 2 {
        Err(ValidationError::new(
            FormField::Name,
            "Name must be at least 2 characters",
        ))
    } else if !validate_name(name) {
        Err(ValidationError::new(
            FormField::Name,
            "Name can only contain letters and spaces",
        ))
    } else {
        Ok(())
    }
}

pub fn check_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        Err(ValidationError::new(FormField::Email, "Email is required"))
    } else if !validate_email(email) {
        Err(ValidationError::new(
            FormField::Email,
            "Please enter a valid email address",
        ))
    } else {
        Ok(())
    }
}

pub fn check_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.trim().is_empty() {
        Err(ValidationError::new(
            FormField::Phone,
            "Phone number is required",
        ))
    } else if !validate_phone(phone) {
        Err(ValidationError::new(
            FormField::Phone,
            "Phone number must be 6-15 digits",
        ))
    } else {
        Ok(())
    }
}

/// Sign-up password rule: present and strong
pub fn check_new_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::new(
            FormField::Password,
            "Password is required",
        ));
    }

    match password_strength(password) {
        Some(PasswordStrength::Strong) => Ok(()),
        Some(weaker) => Err(ValidationError::new(
            FormField::Password,
            format!("Password is too {}. Please use a strong password.", weaker),
        )),
        None => Err(ValidationError::new(
            FormField::Password,
            "Password must be strong",
        )),
    }
}

/// Sign-in password rule: presence only
pub fn check_password_present(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        Err(ValidationError::new(
            FormField::Password,
            "Password is required",
        ))
    } else {
        Ok(())
    }
}

/// Validate every sign-up field, collecting one message per failing field
pub fn validate_registration(name: &str, email: &str, phone: &str, password: &str) -> FieldErrors {
    collect_errors([
        check_name(name),
        check_email(email),
        check_phone(phone),
        check_new_password(password),
    ])
}

/// Validate sign-in fields
pub fn validate_login(email: &str, password: &str) -> FieldErrors {
    collect_errors([check_email(email), check_password_present(password)])
}

fn collect_errors<const N: usize>(results: [Result<(), ValidationError>; N]) -> FieldErrors {
    results
        .into_iter()
        .filter_map(|result| result.err())
        .map(|error| (error.field, error.message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("Jane Doe"));
        assert!(validate_name("  Al  "));
        assert!(validate_name("Mary Ann Smith"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!validate_name("J"));
        assert!(!validate_name("   "));
        assert!(!validate_name("Jane2"));
        assert!(!validate_name("Jane-Doe"));
        assert!(!validate_name("O'Brien"));
        assert!(!validate_name("José"));
    }

    #[test]
    fn test_check_name_messages() {
        assert_eq!(check_name("").unwrap_err().message, "Name is required");
        assert_eq!(
            check_name(" a ").unwrap_err().message,
            "Name must be at least 2 characters"
        );
        let err = check_name("R2D2").unwrap_err();
        assert_eq!(err.field, FormField::Name);
        assert_eq!(err.message, "Name can only contain letters and spaces");
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("jane@example.com"));
        assert!(validate_email(" jane.doe+pay@mail.example.co.uk "));
        assert!(validate_email("x@localhost"));
        assert!(validate_email("a!#$%&'*+/=?^_`{|}~-b@ex-ample.com"));

        assert!(!validate_email("jane"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("jane@"));
        assert!(!validate_email("jane@-example.com"));
        assert!(!validate_email("jane@example-.com"));
        assert!(!validate_email("jane@example..com"));
        assert!(!validate_email("jane@example.com."));
        assert!(!validate_email("ja ne@example.com"));
        assert!(!validate_email("jane@exa@mple.com"));
    }

    #[test]
    fn test_email_label_length() {
        let label = "a".repeat(63);
        assert!(validate_email(&format!("jane@{}.com", label)));
        let label = "a".repeat(64);
        assert!(!validate_email(&format!("jane@{}.com", label)));
    }

    #[test]
    fn test_phone_validation() {
        assert!(!validate_phone("123"));
        assert!(!validate_phone("1234567890123456"));
        assert!(validate_phone("9876543210"));
        assert!(validate_phone("98765 43210"));
        assert!(validate_phone("987-654-3210"));
        assert!(validate_phone("123456"));
        assert!(validate_phone("123456789012345"));
        assert!(!validate_phone("98765x3210"));
        assert!(!validate_phone("+919876543210"));
    }

    #[test]
    fn test_password_strength_buckets() {
        assert_eq!(password_strength(""), None);
        assert_eq!(password_strength("abc"), Some(PasswordStrength::Low));
        assert_eq!(password_strength("abcdefg"), Some(PasswordStrength::Low));
        assert_eq!(password_strength("Abcdef12"), Some(PasswordStrength::Weak));
        assert_eq!(password_strength("Abcdef1!"), Some(PasswordStrength::Strong));
        assert_eq!(
            password_strength("Ab1!Ab1!Ab1!"),
            Some(PasswordStrength::Strong)
        );
        assert_eq!(
            password_strength("Str0ng!Pass"),
            Some(PasswordStrength::Strong)
        );
    }

    #[test]
    fn test_short_lowercase_passwords_are_low() {
        for length in 1..8 {
            let password = "q".repeat(length);
            assert_eq!(password_strength(&password), Some(PasswordStrength::Low));
        }
    }

    #[test]
    fn test_password_score() {
        assert_eq!(password_score(""), 0);
        assert_eq!(password_score("a"), 1);
        assert_eq!(password_score("aaaaaaaaaaaa"), 3);
        assert_eq!(password_score("Ab1!Ab1!Ab1!"), 6);
    }

    #[test]
    fn test_new_password_messages() {
        assert_eq!(
            check_new_password("   ").unwrap_err().message,
            "Password is required"
        );
        assert_eq!(
            check_new_password("abc").unwrap_err().message,
            "Password is too low. Please use a strong password."
        );
        assert_eq!(
            check_new_password("Abcdef12").unwrap_err().message,
            "Password is too weak. Please use a strong password."
        );
        assert!(check_new_password("Str0ng!Pass").is_ok());
    }

    #[test]
    fn test_input_filters() {
        assert_eq!(filter_name_input("Jane 2 Doe!"), "Jane  Doe");
        assert_eq!(filter_phone_input("+91 98765-43210"), "919876543210");
    }

    #[test]
    fn test_registration_collects_all_errors() {
        let errors = validate_registration("J4ne", "not-an-email", "123", "weak");
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key(&FormField::Name));
        assert!(errors.contains_key(&FormField::Email));
        assert!(errors.contains_key(&FormField::Phone));
        assert!(errors.contains_key(&FormField::Password));

        let errors =
            validate_registration("Jane Doe", "jane@example.com", "9876543210", "Str0ng!Pass");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_login_skips_strength_check() {
        assert!(validate_login("jane@example.com", "abc").is_empty());

        let errors = validate_login("jane@example.com", "");
        assert_eq!(
            errors.get(&FormField::Password).map(String::as_str),
            Some("Password is required")
        );
    }
}
