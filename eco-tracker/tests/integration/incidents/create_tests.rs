// tests/integration/incidents/create_tests.rs

use axum::http::StatusCode;
use serde_json::json;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_reporter, submit_incident};
use crate::common::request::{json_request, send};
use crate::common::test_data::leak_incident;

#[tokio::test]
async fn test_create_incident_defaults_to_reported() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let incident = submit_incident(&app.router, &user.token, leak_incident()).await;

    assert_eq!(incident["title"], "Leak");
    assert_eq!(incident["category"], "pollution");
    assert_eq!(incident["severity"], "high");
    assert_eq!(incident["status"], "reported");
    assert_eq!(incident["reportedBy"], user.id.to_string());
    assert_eq!(incident["location"]["type"], "Point");
    assert_eq!(incident["location"]["coordinates"], json!([67.01, 24.86]));
    assert_eq!(incident["images"], json!([]));
}

#[tokio::test]
async fn test_reported_by_ignores_client_value() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let other = create_reporter(&app.router).await;

    let mut body = leak_incident();
    body["reportedBy"] = json!(other.id.to_string());
    body["status"] = json!("resolved");

    let incident = submit_incident(&app.router, &user.token, body).await;
    assert_eq!(incident["reportedBy"], user.id.to_string());
    assert_eq!(incident["status"], "reported");
}

#[tokio::test]
async fn test_out_of_range_longitude_is_rejected_and_not_persisted() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let mut body = leak_incident();
    body["location"]["coordinates"] = json!([200, 24.86]);

    let (status, error) = send(
        &app.router,
        json_request("POST", "/api/incidents", Some(&user.token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["validation_errors"]["location.coordinates"].is_array());

    let (_, mine) = send(
        &app.router,
        json_request("GET", "/api/incidents", Some(&user.token), None),
    )
    .await;
    assert_eq!(mine["data"], json!([]));
}

#[tokio::test]
async fn test_coordinates_must_have_two_values() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let mut body = leak_incident();
    body["location"]["coordinates"] = json!([67.01]);

    let (status, error) = send(
        &app.router,
        json_request("POST", "/api/incidents", Some(&user.token), Some(body)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["validation_errors"]["location.coordinates"].is_array());
}

#[tokio::test]
async fn test_all_invalid_fields_are_reported_together() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, error) = send(
        &app.router,
        json_request(
            "POST",
            "/api/incidents",
            Some(&user.token),
            Some(json!({
                "title": "  ",
                "category": "noise",
                "severity": "extreme",
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = error["validation_errors"].as_object().unwrap();
    for field in ["title", "description", "category", "severity", "location"] {
        assert!(fields.contains_key(field), "missing error for {field}");
    }
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let app = setup_app().await;

    let (status, _) = send(
        &app.router,
        json_request("POST", "/api/incidents", None, Some(leak_incident())),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_my_incidents_only_returns_own() {
    let app = setup_app().await;
    let alice = create_reporter(&app.router).await;
    let bob = create_reporter(&app.router).await;

    submit_incident(&app.router, &alice.token, leak_incident()).await;
    submit_incident(&app.router, &alice.token, leak_incident()).await;
    submit_incident(&app.router, &bob.token, leak_incident()).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents", Some(&alice.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let incidents = body["data"].as_array().unwrap();
    assert_eq!(incidents.len(), 2);
    assert!(incidents
        .iter()
        .all(|i| i["reportedBy"] == alice.id.to_string()));
}
