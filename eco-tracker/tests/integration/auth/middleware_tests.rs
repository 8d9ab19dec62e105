// tests/integration/auth/middleware_tests.rs

use axum::http::StatusCode;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::create_reporter;
use crate::common::request::{json_request, send};

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = setup_app().await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/users/profile", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "unauthorized");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let app = setup_app().await;

    let (status, _) = send(
        &app.router,
        json_request("GET", "/api/incidents", Some("not-a-jwt"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_of_deleted_user_is_rejected() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, _) = send(
        &app.router,
        json_request("DELETE", "/api/users/profile", Some(&user.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        json_request("GET", "/api/users/profile", Some(&user.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_do_not_require_token() {
    let app = setup_app().await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/recent", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
