//! Health probe integration tests

use axum::{body::Body, http::Request, http::StatusCode};
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app};

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-trace-id"));

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_readiness_check() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"][0]["name"], "store");
}

#[tokio::test]
async fn test_trace_id_is_propagated() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-trace-id", "trace-abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
}
