//! 健康检查 API 集成测试

use axum::http::{header, StatusCode};

mod common;
use common::{body_json, create_test_app};

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert!(json["uptime_secs"].is_u64());
}

#[tokio::test]
async fn test_tracking_headers_present() {
    let app = create_test_app();

    let response = app.get("/health").await;
    assert!(response.headers().get("x-trace-id").is_some());
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn test_trace_id_is_echoed() {
    let app = create_test_app();

    let response = app
        .send(
            axum::http::Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc-123")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.headers()["x-trace-id"], "trace-abc-123");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app();

    let response = app.get("/api/unknown").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_error_body_request_id_matches_header() {
    let app = create_test_app();

    let response = app.get("/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let header_id = response.headers()["x-request-id"]
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    assert_eq!(json["error"]["request_id"], header_id);

    let response = app.get("/api/contacts/abc").await;
    let header_id = response.headers()["x-request-id"]
        .to_str()
        .unwrap()
        .to_string();
    let json = body_json(response).await;
    assert_eq!(json["error"]["request_id"], header_id);
}
