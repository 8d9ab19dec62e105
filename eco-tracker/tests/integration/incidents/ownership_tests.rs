// tests/integration/incidents/ownership_tests.rs

use axum::http::StatusCode;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_admin, create_reporter, submit_incident};
use crate::common::request::{json_request, send};
use crate::common::test_data::leak_incident;

#[tokio::test]
async fn test_owner_can_get_incident() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let incident = submit_incident(&app.router, &user.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}", incident["id"].as_str().unwrap());

    let (status, body) = send(&app.router, json_request("GET", &uri, Some(&user.token), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], incident["id"]);
}

#[tokio::test]
async fn test_other_users_incident_is_hidden() {
    let app = setup_app().await;
    let owner = create_reporter(&app.router).await;
    let stranger = create_reporter(&app.router).await;
    let incident = submit_incident(&app.router, &owner.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}", incident["id"].as_str().unwrap());

    let (status, _) = send(
        &app.router,
        json_request("GET", &uri, Some(&stranger.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/not-a-uuid", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");
}

#[tokio::test]
async fn test_owner_can_delete_incident() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let incident = submit_incident(&app.router, &user.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}", incident["id"].as_str().unwrap());

    let (status, body) = send(
        &app.router,
        json_request("DELETE", &uri, Some(&user.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], incident["id"]);

    let (status, _) = send(&app.router, json_request("GET", &uri, Some(&user.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stranger_cannot_delete_incident() {
    let app = setup_app().await;
    let owner = create_reporter(&app.router).await;
    let stranger = create_reporter(&app.router).await;
    let incident = submit_incident(&app.router, &owner.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}", incident["id"].as_str().unwrap());

    let (status, body) = send(
        &app.router,
        json_request("DELETE", &uri, Some(&stranger.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");

    let (status, _) = send(&app.router, json_request("GET", &uri, Some(&owner.token), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_can_delete_any_incident() {
    let app = setup_app().await;
    let owner = create_reporter(&app.router).await;
    let admin = create_admin(&app).await;
    let incident = submit_incident(&app.router, &owner.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}", incident["id"].as_str().unwrap());

    let (status, _) = send(
        &app.router,
        json_request("DELETE", &uri, Some(&admin.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, json_request("GET", &uri, Some(&owner.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_incident_is_not_found() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, _) = send(
        &app.router,
        json_request(
            "DELETE",
            &format!("/api/incidents/{}", uuid::Uuid::new_v4()),
            Some(&user.token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
