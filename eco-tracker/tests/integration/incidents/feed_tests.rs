// tests/integration/incidents/feed_tests.rs

use axum::http::StatusCode;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_reporter, submit_incident};
use crate::common::request::{json_request, send};
use crate::common::test_data::incident_at;

#[tokio::test]
async fn test_recent_feed_returns_latest_five() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let mut ids = Vec::new();
    for i in 0..7 {
        let incident = submit_incident(
            &app.router,
            &user.token,
            incident_at(&format!("Report {i}"), "wildlife", "low", 67.0, 24.8),
        )
        .await;
        ids.push(incident["id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/recent", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let feed = body["data"].as_array().unwrap();
    assert_eq!(feed.len(), 5);

    let expected: Vec<&str> = ids.iter().rev().take(5).map(String::as_str).collect();
    let actual: Vec<&str> = feed.iter().map(|i| i["id"].as_str().unwrap()).collect();
    assert_eq!(actual, expected);

    // 公開フィードは最小限の情報のみ
    assert_eq!(feed[0]["type"], "wildlife");
    assert!(feed[0].get("category").is_none());
    assert!(feed[0]["createdAt"].is_string());
    assert!(feed[0].get("title").is_none());
    assert!(feed[0].get("reportedBy").is_none());
}

#[tokio::test]
async fn test_nearby_filters_by_radius_and_sorts_by_distance() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    // カラチ中心部から約1km、約3km、ラホール（約1000km）
    let near = submit_incident(
        &app.router,
        &user.token,
        incident_at("Near", "pollution", "high", 67.01, 24.86),
    )
    .await;
    let farther = submit_incident(
        &app.router,
        &user.token,
        incident_at("Farther", "waste", "low", 67.03, 24.87),
    )
    .await;
    submit_incident(
        &app.router,
        &user.token,
        incident_at("Lahore", "deforestation", "medium", 74.35, 31.52),
    )
    .await;

    let (status, body) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/nearby?lng=67.0&lat=24.86&radiusKm=5",
            Some(&user.token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], near["id"]);
    assert_eq!(results[1]["id"], farther["id"]);

    let d0 = results[0]["distanceKm"].as_f64().unwrap();
    let d1 = results[1]["distanceKm"].as_f64().unwrap();
    assert!(d0 < d1);
    assert!(d1 <= 5.0);
}

#[tokio::test]
async fn test_nearby_requires_coordinates() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/nearby?lng=67.0", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_errors"]["lat"].is_array());
}

#[tokio::test]
async fn test_nearby_rejects_radius_over_limit() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, _) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/nearby?lng=67.0&lat=24.86&radiusKm=500",
            Some(&user.token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_nearby_non_numeric_query_is_bad_request() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, body) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/nearby?lng=east&lat=24.86",
            Some(&user.token),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");
}
