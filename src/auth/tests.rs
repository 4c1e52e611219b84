use super::*;
use crate::identity::PendingIdentity;
use crate::routes::{NavigationState, Navigator, Route};
use crate::validation::{FormField, PasswordStrength};

fn filled_registration() -> AuthForm {
    let mut form = AuthForm::new(AuthMode::Register);
    form.set_field(FormField::Name, "Jane Doe");
    form.set_field(FormField::Email, "jane@example.com");
    form.set_field(FormField::Phone, "9876543210");
    form.set_field(FormField::Password, "Str0ng!Pass");
    form
}

#[test]
fn test_defaults() {
    let form = AuthForm::default();
    assert_eq!(form.mode(), AuthMode::Register);
    assert_eq!(form.dial_code(), "+91");
    assert_eq!(form.country().code, "IN");
    assert_eq!(form.strength(), None);
    assert!(form.errors().is_empty());
}

#[test]
fn test_input_filtering() {
    let mut form = AuthForm::default();
    form.set_field(FormField::Name, "J4ne D0e!");
    form.set_field(FormField::Phone, "98-765 43(210)");

    assert_eq!(form.value(FormField::Name), "Jne De");
    assert_eq!(form.value(FormField::Phone), "9876543210");
}

#[test]
fn test_strength_tracks_password_in_register_mode() {
    let mut form = AuthForm::default();
    form.set_field(FormField::Password, "abc");
    assert_eq!(form.strength(), Some(PasswordStrength::Low));

    form.set_field(FormField::Password, "Str0ng!Pass");
    assert_eq!(form.strength(), Some(PasswordStrength::Strong));

    form.set_mode(AuthMode::Login);
    assert_eq!(form.strength(), None);

    form.set_field(FormField::Password, "Str0ng!Pass");
    assert_eq!(form.strength(), None);
}

#[test]
fn test_register_submit_navigates_with_identity() {
    let navigator = Navigator::new(Route::Auth);
    let mut form = filled_registration();

    let identity = form.submit(&navigator).unwrap();

    assert_eq!(navigator.current(), Route::CameraCapture);
    match &identity {
        PendingIdentity::Register(fields) => {
            assert_eq!(fields.phone, "+919876543210");
            assert_eq!(fields.country_code.as_deref(), Some("IN"));
            assert_eq!(fields.name, "Jane Doe");
        }
        other => panic!("Unexpected identity: {:?}", other),
    }
    assert_eq!(
        navigator.take_state(),
        Some(NavigationState::Capture(identity))
    );
}

#[test]
fn test_weak_password_blocks_registration() {
    let navigator = Navigator::new(Route::Auth);
    let mut form = filled_registration();
    form.set_field(FormField::Password, "password1");

    let err = form.submit(&navigator).unwrap_err();

    assert_eq!(err.field, FormField::Password);
    assert_eq!(
        err.message,
        "Password is too weak. Please use a strong password."
    );
    assert_eq!(navigator.current(), Route::Auth);
    assert!(navigator.take_state().is_none());
}

#[test]
fn test_submit_reports_first_failing_field() {
    let navigator = Navigator::new(Route::Auth);
    let mut form = filled_registration();
    form.set_field(FormField::Phone, "123");
    form.set_field(FormField::Password, "password1");

    let err = form.submit(&navigator).unwrap_err();

    // Fields are ordered name, email, phone, password
    assert_eq!(err.field, FormField::Phone);
    assert!(!err.message.is_empty());
    assert_eq!(form.error(FormField::Phone), Some(err.message.as_str()));
    assert!(form.error(FormField::Email).is_none());
    assert_eq!(navigator.current(), Route::Auth);
}

#[test]
fn test_login_requires_only_email_and_password() {
    let navigator = Navigator::new(Route::Auth);
    let mut form = AuthForm::new(AuthMode::Login);
    form.set_field(FormField::Email, "jane@example.com");
    form.set_field(FormField::Password, "x");

    let identity = form.submit(&navigator).unwrap();

    assert!(matches!(identity, PendingIdentity::Login(_)));
    assert_eq!(navigator.current(), Route::CameraCapture);
}

#[test]
fn test_editing_clears_field_error() {
    let navigator = Navigator::new(Route::Auth);
    let mut form = AuthForm::default();

    assert!(form.submit(&navigator).is_err());
    assert_eq!(form.error(FormField::Name), Some("Name is required"));
    assert_eq!(form.error(FormField::Email), Some("Email is required"));

    form.set_field(FormField::Name, "J");
    assert_eq!(form.error(FormField::Name), None);
    assert_eq!(form.error(FormField::Email), Some("Email is required"));

    // Displayed errors are re-checked against current values
    form.set_field(FormField::Phone, "123456");
    form.set_field(FormField::Email, "jane@example.com");
    assert_eq!(form.error(FormField::Email), None);
    assert_eq!(form.error(FormField::Phone), None);
    assert_eq!(
        form.error(FormField::Password),
        Some("Password is required")
    );
}

#[test]
fn test_restore_register_with_shared_dial_code() {
    let navigator = Navigator::new(Route::Auth);
    let mut form = filled_registration();
    assert!(form.select_country("CA"));
    form.set_field(FormField::Phone, "6135550100");
    let identity = form.submit(&navigator).unwrap();
    navigator.take_state();

    navigator.navigate(Route::Auth, Some(NavigationState::Returned(identity)));
    let mut restored = AuthForm::new(AuthMode::Login);
    assert!(restored.restore_from_navigation(&navigator));

    assert_eq!(restored.mode(), AuthMode::Register);
    assert_eq!(restored.country().code, "CA");
    assert_eq!(restored.value(FormField::Phone), "6135550100");
    assert_eq!(restored.value(FormField::Password), "Str0ng!Pass");
    assert_eq!(restored.strength(), Some(PasswordStrength::Strong));
    // Navigation state is read once
    assert!(!restored.restore_from_navigation(&navigator));
}

#[test]
fn test_restore_login() {
    let mut form = filled_registration();
    form.restore_from(&PendingIdentity::Login(crate::identity::LoginFields {
        email: "jane@example.com".to_string(),
        password: "secret".to_string(),
    }));

    assert_eq!(form.mode(), AuthMode::Login);
    assert_eq!(form.value(FormField::Name), "");
    assert_eq!(form.dial_code(), "+91");
    assert_eq!(form.strength(), None);
}

#[test]
fn test_unknown_country_is_ignored() {
    let mut form = AuthForm::default();
    assert!(!form.select_country("ZZ"));
    assert_eq!(form.dial_code(), "+91");
}
