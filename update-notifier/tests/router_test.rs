mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use std::sync::Arc;
use tower::util::ServiceExt;
use update_notifier::services::{FcmGateway, MockPushGateway};
use update_notifier::startup::{build_router, AppState, DISPATCH_ROUTE};

fn router(gateway: Arc<MockPushGateway>) -> axum::Router {
    let config = common::test_config(Some(common::TEST_API_KEY));
    build_router(AppState::new(&config, gateway))
}

#[tokio::test]
async fn dispatch_route_carries_security_and_cors_headers() {
    let gateway = Arc::new(MockPushGateway::new());

    let response = router(gateway.clone())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(DISPATCH_ROUTE)
                .header("x-api-key", common::TEST_API_KEY)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"versionName":"3.0.0","versionCode":300}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(gateway.send_count(), 1);
}

#[tokio::test]
async fn head_request_is_method_not_allowed() {
    let gateway = Arc::new(MockPushGateway::new());

    let response = router(gateway.clone())
        .oneshot(
            Request::builder()
                .method(Method::HEAD)
                .uri(DISPATCH_ROUTE)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(gateway.send_count(), 0);
}

#[tokio::test]
async fn metrics_route_renders_text() {
    let response = router(Arc::new(MockPushGateway::new()))
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn readiness_reflects_gateway_health_check() {
    let response = router(Arc::new(MockPushGateway::new()))
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_fails_for_misconfigured_fcm_gateway() {
    let mut config = common::test_config(Some(common::TEST_API_KEY));
    config.fcm.project_id = String::new();
    let gateway = Arc::new(FcmGateway::new(config.fcm.clone()).unwrap());

    let response = build_router(AppState::new(&config, gateway))
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
