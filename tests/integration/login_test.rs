//! Integration tests for login, health, and the pre-upgrade handshake.

mod helpers;

use axum::http::StatusCode;

use relayhub_auth::JwtDecoder;
use relayhub_core::traits::TokenVerifier;
use relayhub_core::types::Identity;

use helpers::TestApp;

#[tokio::test]
async fn test_login_success_returns_verifiable_token() {
    let app = TestApp::new();

    let response = app.login_from("10.0.0.1", "alice", "wonderland").await;
    assert_eq!(response.status, StatusCode::OK);

    let token = response.body["token"].as_str().unwrap();
    let identity = JwtDecoder::new(&app.config.auth).verify(token).unwrap();
    assert_eq!(identity, Identity::from("alice"));
    assert_eq!(response.body["expires_in"], 1800);
}

#[tokio::test]
async fn test_login_trims_fields() {
    let app = TestApp::new();
    let response = app.login_from("10.0.0.1", "  bob ", " builder\n").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();

    let response = app.login_from("10.0.0.1", "alice", "looking-glass").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_credentials");

    let response = app.login_from("10.0.0.1", "mallory", "wonderland").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_oversized_username_is_invalid_credentials() {
    let app = TestApp::new();
    let username = "a".repeat(200);

    let response = app.login_from("10.0.0.1", &username, "wonderland").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_sixth_attempt_is_rate_limited() {
    let app = TestApp::new();

    for _ in 0..5 {
        let response = app.login_from("10.0.0.7", "alice", "nope").await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let response = app.login_from("10.0.0.7", "alice", "wonderland").await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"], "rate_limited");

    // Other addresses keep their own budget.
    let response = app.login_from("10.0.0.8", "alice", "wonderland").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_is_checked_before_body() {
    let app = TestApp::new();
    let headers = [("x-forwarded-for", "10.0.0.9")];

    for _ in 0..5 {
        let response = app
            .request("POST", "/login", Some("{not json".to_string()), &headers)
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error"], "invalid_request");
    }

    let response = app
        .request("POST", "/login", Some("{not json".to_string()), &headers)
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_login_without_address_uses_shared_bucket() {
    let app = TestApp::new();
    let body = serde_json::json!({ "username": "alice", "password": "x" }).to_string();

    for _ in 0..5 {
        app.request("POST", "/login", Some(body.clone()), &[]).await;
    }
    let response = app.request("POST", "/login", Some(body), &[]).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/health", None, &[]).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["connections"], 0);
    assert_eq!(response.body["online_users"], 0);
    assert!(response.body["metrics"].is_object());
}

#[tokio::test]
async fn test_ws_rejects_bad_token_before_upgrade() {
    let app = TestApp::new();

    let response = app.request("GET", "/ws", None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "unauthorized");

    let response = app.request("GET", "/ws?token=garbage", None, &[]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/ws", None, &[("authorization", "Bearer garbage")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.state.realtime.registry.connection_count(), 0);
    assert_eq!(app.state.realtime.metrics.snapshot().handshakes_rejected, 3);
}

#[tokio::test]
async fn test_ws_valid_token_without_upgrade_headers() {
    let app = TestApp::new();
    let uri = format!("/ws?token={}", app.token_for("alice"));

    let response = app.request("GET", &uri, None, &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.realtime.registry.connection_count(), 0);
}
