//! Server surface tests: health, config sanitization, auth, metrics.

mod common;

use axum::http::StatusCode;

use common::{TestConfig, TestFixture};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::with_config(TestConfig {
        api_key: Some("local-secret".to_string()),
    })
    .await;

    let response = fixture
        .get_with_headers("/api/v1/config", &[("x-api-key", "local-secret")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["event"]["id"], "e-1");
    assert_eq!(response.body["auth"]["method"], "api_key");
    assert_eq!(response.body["auth"]["api_key_configured"], true);

    // The key itself never leaves the server.
    let raw = response.body.to_string();
    assert!(!raw.contains("local-secret"));
}

#[tokio::test]
async fn test_api_key_auth_guards_api_routes() {
    let fixture = TestFixture::with_config(TestConfig {
        api_key: Some("local-secret".to_string()),
    })
    .await;

    // No key
    let response = fixture.get("/api/v1/status").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Wrong key
    let response = fixture
        .get_with_headers("/api/v1/status", &[("x-api-key", "wrong")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    // Right key, either header form
    let response = fixture
        .get_with_headers("/api/v1/status", &[("x-api-key", "local-secret")])
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = fixture
        .get_with_headers("/api/v1/status", &[("authorization", "Bearer local-secret")])
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_status_defaults() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/status").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_online"], true);
    assert_eq!(response.body["is_scanning"], false);
    assert_eq!(response.body["has_offline_data"], false);
    assert_eq!(response.body["offline_ticket_count"], 0);
    assert_eq!(response.body["pending_count"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/metrics").await;
    assert_eq!(response.status, StatusCode::OK);

    let text = response.body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("turnstile_scanning_active"));
    assert!(text.contains("turnstile_pending_admissions"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
