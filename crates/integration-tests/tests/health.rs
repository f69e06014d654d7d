//! Health checks and response headers.

use axum::http::{StatusCode, header};

use bizdesk_integration_tests::TestApp;

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::new().await;

    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_with_memory_store() {
    let app = TestApp::new().await;

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers() {
    let app = TestApp::new().await;

    let response = app.get("/health", None).await;

    assert_eq!(
        response.headers.get("x-content-type-options").map(|v| v.as_bytes()),
        Some(b"nosniff".as_slice())
    );
    assert_eq!(
        response.headers.get("x-frame-options").map(|v| v.as_bytes()),
        Some(b"DENY".as_slice())
    );
    assert_eq!(
        response.headers.get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
        Some(b"no-store".as_slice())
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new().await;

    let response = app.get("/nope", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
