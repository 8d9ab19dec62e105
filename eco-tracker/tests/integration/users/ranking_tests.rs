// tests/integration/users/ranking_tests.rs

use axum::http::StatusCode;
use serde_json::json;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_reporter, register_user, submit_incident};
use crate::common::request::{json_request, send};
use crate::common::test_data::{incident_at, leak_incident, TEST_PASSWORD};

#[tokio::test]
async fn test_leaderboard_orders_by_report_count() {
    let app = setup_app().await;

    let quiet = create_reporter(&app.router).await;
    let busy = create_reporter(&app.router).await;
    let moderate = create_reporter(&app.router).await;

    for _ in 0..3 {
        submit_incident(&app.router, &busy.token, leak_incident()).await;
    }
    submit_incident(&app.router, &moderate.token, leak_incident()).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/users/leaderboard", Some(&quiet.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["id"], busy.id.to_string());
    assert_eq!(entries[0]["reportCount"], 3);
    assert_eq!(entries[1]["id"], moderate.id.to_string());
    assert_eq!(entries[1]["reportCount"], 1);
    assert_eq!(entries[2]["id"], quiet.id.to_string());
    assert_eq!(entries[2]["reportCount"], 0);
}

#[tokio::test]
async fn test_leaderboard_keeps_top_ten_reporters() {
    let app = setup_app().await;

    // 報告なしのユーザーを先に登録しておく
    let idle_a = create_reporter(&app.router).await;
    let idle_b = create_reporter(&app.router).await;

    let mut reporters = Vec::new();
    for i in 0..10 {
        let reporter = create_reporter(&app.router).await;
        for _ in 0..(1 + i % 3) {
            submit_incident(&app.router, &reporter.token, leak_incident()).await;
        }
        reporters.push(reporter.id.to_string());
    }

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/users/leaderboard", Some(&idle_a.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 10);

    let mut ids: Vec<String> = entries
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect();
    assert!(!ids.contains(&idle_a.id.to_string()));
    assert!(!ids.contains(&idle_b.id.to_string()));
    ids.sort();
    reporters.sort();
    assert_eq!(ids, reporters);

    let counts: Vec<u64> = entries
        .iter()
        .map(|e| e["reportCount"].as_u64().unwrap())
        .collect();
    assert_eq!(counts[0], 3);
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    assert!(counts.iter().all(|&c| c >= 1));
}

#[tokio::test]
async fn test_leaderboard_uses_display_name() {
    let app = setup_app().await;
    let user = register_user(
        &app.router,
        json!({
            "username": "ayesha",
            "email": "ayesha@example.com",
            "password": TEST_PASSWORD,
            "name": "Ayesha Khan",
        }),
    )
    .await;

    let (_, body) = send(
        &app.router,
        json_request("GET", "/api/users/leaderboard", Some(&user.token), None),
    )
    .await;

    assert_eq!(body["data"][0]["displayName"], "Ayesha Khan");
}

#[tokio::test]
async fn test_statistics() {
    let app = setup_app().await;
    let leader = create_reporter(&app.router).await;
    let user = create_reporter(&app.router).await;

    for _ in 0..3 {
        submit_incident(&app.router, &leader.token, leak_incident()).await;
    }
    submit_incident(
        &app.router,
        &user.token,
        incident_at("Dead fish", "wildlife", "critical", 67.0, 24.8),
    )
    .await;
    submit_incident(
        &app.router,
        &user.token,
        incident_at("Litter", "waste", "low", 67.0, 24.8),
    )
    .await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/users/statistics", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["totalReports"], 2);
    assert_eq!(stats["reportsBySeverity"]["critical"], 1);
    assert_eq!(stats["reportsBySeverity"]["low"], 1);
    assert_eq!(stats["reportsBySeverity"]["high"], 0);
    assert_eq!(stats["reportsByStatus"]["reported"], 2);
    assert_eq!(stats["impactScore"], 5);
    assert_eq!(stats["rank"], 2);
    assert_eq!(stats["totalRankedUsers"], 2);

    let monthly = stats["monthlyReports"].as_array().unwrap();
    assert_eq!(monthly.len(), 6);
    assert_eq!(monthly[5]["count"], 2);
}

#[tokio::test]
async fn test_statistics_for_user_without_reports() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, body) = send(
        &app.router,
        json_request("GET", "/api/users/statistics", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalReports"], 0);
    assert_eq!(body["data"]["impactScore"], 0);
    assert_eq!(body["data"]["rank"], 1);
}
