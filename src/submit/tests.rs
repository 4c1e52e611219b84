use super::mock::{MockReply, MockServer};
use super::*;
use crate::config::{ApiConfig, RegistrationContract};
use crate::error::{SubmissionError, RETRY_MESSAGE};
use crate::frame::CapturedFrame;
use crate::identity::{LoginFields, PendingIdentity, RegistrationFields};
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

fn create_test_api_config(server: &MockServer, contract: RegistrationContract) -> ApiConfig {
    ApiConfig {
        consent_url: server.url("/dev/consent"),
        register_url: server.url("/dev/register"),
        login_url: server.url("/dev/login"),
        registration_contract: contract,
        timeout_seconds: 5,
    }
}

fn create_submitter(server: &MockServer, contract: RegistrationContract) -> VerificationSubmitter {
    let backend = HttpVerificationBackend::new(create_test_api_config(server, contract)).unwrap();
    VerificationSubmitter::new(Arc::new(backend), contract)
}

fn test_frame() -> CapturedFrame {
    CapturedFrame {
        image_base64: "QUJD".to_string(),
        width: 640,
        height: 480,
        captured_at: SystemTime::now(),
    }
}

fn registration() -> PendingIdentity {
    PendingIdentity::Register(RegistrationFields {
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "+919876543210".to_string(),
        password: "Str0ng!Pass".to_string(),
        country_code: Some("IN".to_string()),
    })
}

fn login() -> PendingIdentity {
    PendingIdentity::Login(LoginFields {
        email: "jane@example.com".to_string(),
        password: "secret".to_string(),
    })
}

#[tokio::test]
async fn test_consent_registration() {
    let server = MockServer::start(vec![MockReply::new(
        "/dev/consent",
        200,
        r#"{"user_id":"u123","status":"ok"}"#,
    )])
    .await;
    let submitter = create_submitter(&server, RegistrationContract::Consent);

    let verified = submitter.submit(test_frame(), &registration()).await.unwrap();

    match &verified {
        Verified::Registered { user_id, profile } => {
            assert_eq!(user_id, "u123");
            assert_eq!(profile.phone, "+919876543210");
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
    assert_eq!(verified.home_context().user_id.as_deref(), Some("u123"));
    assert_eq!(verified.session_update().name.as_deref(), Some("Jane Doe"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let (path, body) = &requests[0];
    assert_eq!(path, "/dev/consent");
    assert!(body["user_id"].as_str().unwrap().starts_with("temp_"));
    assert_eq!(body["consent"], true);
    assert_eq!(
        body["profile"],
        json!({"name": "Jane Doe", "email": "jane@example.com", "phone": "+919876543210"})
    );
    assert_eq!(body["image"], "QUJD");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_legacy_registration_contract() {
    let server = MockServer::start(vec![MockReply::new(
        "/dev/register",
        201,
        r#"{"name":"Jane Doe"}"#,
    )])
    .await;
    let submitter = create_submitter(&server, RegistrationContract::LegacyRegister);

    let verified = submitter.submit(test_frame(), &registration()).await.unwrap();

    assert_eq!(verified.home_context().name.as_deref(), Some("Jane Doe"));
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].1,
        json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "phoneNo": "+919876543210",
            "password": "Str0ng!Pass",
            "imageBase64": "QUJD"
        })
    );
}

#[tokio::test]
async fn test_login_submission() {
    let server = MockServer::start(vec![MockReply::new(
        "/dev/login",
        200,
        r#"{"match":true,"score":0.97}"#,
    )])
    .await;
    let submitter = create_submitter(&server, RegistrationContract::Consent);

    let verified = submitter.submit(test_frame(), &login()).await.unwrap();

    match &verified {
        Verified::LoggedIn { email, payload } => {
            assert_eq!(email, "jane@example.com");
            assert_eq!(payload["score"], 0.97);
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
    let update = verified.session_update();
    assert_eq!(update.email.as_deref(), Some("jane@example.com"));
    assert_eq!(update.name, None);
    assert_eq!(
        verified.home_context().email.as_deref(),
        Some("jane@example.com")
    );
    assert_eq!(
        server.requests()[0].1,
        json!({"imageBase64": "QUJD", "password": "secret", "email": "jane@example.com"})
    );
}

#[tokio::test]
async fn test_rejection_keeps_server_detail() {
    let server = MockServer::start(vec![MockReply::new(
        "/dev/consent",
        400,
        r#"{"error":"No face detected"}"#,
    )])
    .await;
    let submitter = create_submitter(&server, RegistrationContract::Consent);

    let err = submitter
        .submit(test_frame(), &registration())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SubmissionError::Rejected {
            endpoint: "consent".to_string(),
            status: 400,
            detail: "No face detected".to_string(),
        }
    );
    assert_eq!(err.user_message(), RETRY_MESSAGE);
}

#[tokio::test]
async fn test_rejection_without_body_uses_status() {
    let server = MockServer::start(vec![MockReply::new("/dev/login", 500, "")]).await;
    let submitter = create_submitter(&server, RegistrationContract::Consent);

    let err = submitter.submit(test_frame(), &login()).await.unwrap_err();

    match err {
        SubmissionError::Rejected { status, detail, .. } => {
            assert_eq!(status, 500);
            assert_eq!(detail, "Request failed (500)");
        }
        other => panic!("Unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_and_malformed_success_bodies() {
    let server = MockServer::start(vec![
        MockReply::new("/dev/login", 200, ""),
        MockReply::new("/dev/consent", 200, r#"{"status":"ok"}"#),
        MockReply::new("/dev/register", 200, "not json"),
    ])
    .await;

    let submitter = create_submitter(&server, RegistrationContract::Consent);
    let err = submitter.submit(test_frame(), &login()).await.unwrap_err();
    assert!(err.is_empty_response());

    // Success without user_id
    let err = submitter
        .submit(test_frame(), &registration())
        .await
        .unwrap_err();
    assert!(err.is_empty_response());

    let legacy = create_submitter(&server, RegistrationContract::LegacyRegister);
    let err = legacy
        .submit(test_frame(), &registration())
        .await
        .unwrap_err();
    assert!(err.is_empty_response());
    assert_eq!(err.user_message(), RETRY_MESSAGE);
}

#[tokio::test]
async fn test_null_login_body_is_empty() {
    let server = MockServer::start(vec![MockReply::new("/dev/login", 200, "null")]).await;
    let submitter = create_submitter(&server, RegistrationContract::Consent);

    let err = submitter.submit(test_frame(), &login()).await.unwrap_err();

    assert!(err.is_empty_response());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ApiConfig {
        consent_url: format!("http://{}/dev/consent", addr),
        register_url: format!("http://{}/dev/register", addr),
        login_url: format!("http://{}/dev/login", addr),
        registration_contract: RegistrationContract::Consent,
        timeout_seconds: 2,
    };
    let backend = HttpVerificationBackend::new(config).unwrap();
    let submitter = VerificationSubmitter::new(Arc::new(backend), RegistrationContract::Consent);

    let err = submitter.submit(test_frame(), &login()).await.unwrap_err();

    assert!(matches!(err, SubmissionError::Transport { .. }));
    assert_eq!(err.user_message(), RETRY_MESSAGE);
}

#[test]
fn test_provisional_user_id_format() {
    let id = provisional_user_id();
    let millis = id.strip_prefix("temp_").unwrap();
    assert!(millis.parse::<i64>().unwrap() > 0);
}
