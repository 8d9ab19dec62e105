// tests/integration/system/health_tests.rs

use axum::http::StatusCode;

use crate::common::app_helper::setup_app;
use crate::common::request::{json_request, send};

#[tokio::test]
async fn test_health_reports_database() {
    let app = setup_app().await;

    let (status, body) = send(&app.router, json_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = setup_app().await;

    let (status, _) = send(
        &app.router,
        json_request("GET", "/api/does-not-exist", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
