// tests/integration/incidents/admin_tests.rs

use axum::http::StatusCode;
use serde_json::json;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_admin, create_reporter, submit_incident};
use crate::common::request::{json_request, send};
use crate::common::test_data::{incident_at, leak_incident};

#[tokio::test]
async fn test_admin_lists_all_incidents_with_reporter() {
    let app = setup_app().await;
    let alice = create_reporter(&app.router).await;
    let bob = create_reporter(&app.router).await;
    let admin = create_admin(&app).await;

    submit_incident(&app.router, &alice.token, leak_incident()).await;
    submit_incident(&app.router, &bob.token, leak_incident()).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/admin/all", Some(&admin.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let incidents = body["data"].as_array().unwrap();
    assert_eq!(incidents.len(), 2);
    let reporters: Vec<&str> = incidents
        .iter()
        .map(|i| i["reporter"]["username"].as_str().unwrap())
        .collect();
    assert!(reporters.contains(&alice.username.as_str()));
    assert!(reporters.contains(&bob.username.as_str()));
}

#[tokio::test]
async fn test_admin_list_filters() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let admin = create_admin(&app).await;

    submit_incident(
        &app.router,
        &user.token,
        incident_at("Chemical spill", "pollution", "critical", 67.0, 24.8),
    )
    .await;
    submit_incident(
        &app.router,
        &user.token,
        incident_at("Illegal logging", "deforestation", "high", 73.0, 34.0),
    )
    .await;

    let (_, body) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/admin/all?category=deforestation",
            Some(&admin.token),
            None,
        ),
    )
    .await;
    let incidents = body["data"].as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["title"], "Illegal logging");

    let (_, body) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/admin/all?q=SPILL",
            Some(&admin.token),
            None,
        ),
    )
    .await;
    let incidents = body["data"].as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["title"], "Chemical spill");

    let (status, _) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/admin/all?status=archived",
            Some(&admin.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reporter_cannot_list_all_incidents() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/admin/all", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");
}

#[tokio::test]
async fn test_admin_updates_status() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let admin = create_admin(&app).await;
    let incident = submit_incident(&app.router, &user.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}/status", incident["id"].as_str().unwrap());

    let (status, body) = send(
        &app.router,
        json_request(
            "PATCH",
            &uri,
            Some(&admin.token),
            Some(json!({ "status": "investigating" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "investigating");

    // 報告者側からも更新後のステータスが見える
    let (_, body) = send(
        &app.router,
        json_request(
            "GET",
            &format!("/api/incidents/{}", incident["id"].as_str().unwrap()),
            Some(&user.token),
            None,
        ),
    )
    .await;
    assert_eq!(body["data"]["status"], "investigating");
}

#[tokio::test]
async fn test_status_outside_enum_is_rejected() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let admin = create_admin(&app).await;
    let incident = submit_incident(&app.router, &user.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}/status", incident["id"].as_str().unwrap());

    let (status, body) = send(
        &app.router,
        json_request(
            "PATCH",
            &uri,
            Some(&admin.token),
            Some(json!({ "status": "archived" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_errors"]["status"].is_array());
}

#[tokio::test]
async fn test_status_update_unknown_incident_is_not_found() {
    let app = setup_app().await;
    let admin = create_admin(&app).await;

    let (status, _) = send(
        &app.router,
        json_request(
            "PATCH",
            &format!("/api/incidents/{}/status", uuid::Uuid::new_v4()),
            Some(&admin.token),
            Some(json!({ "status": "resolved" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reporter_cannot_update_status() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let incident = submit_incident(&app.router, &user.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}/status", incident["id"].as_str().unwrap());

    let (status, _) = send(
        &app.router,
        json_request(
            "PATCH",
            &uri,
            Some(&user.token),
            Some(json!({ "status": "resolved" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
