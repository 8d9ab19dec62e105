// tests/integration/incidents/upload_tests.rs

use axum::http::StatusCode;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_reporter, submit_incident};
use crate::common::request::{json_request, multipart_request, send, Part};
use crate::common::test_data::leak_incident;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

fn png(name: &'static str) -> Part<'static> {
    Part::File {
        name: "images",
        file_name: name,
        content_type: "image/png",
        data: PNG_BYTES.to_vec(),
    }
}

#[tokio::test]
async fn test_multipart_with_payload_and_images() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let request = multipart_request(
        "/api/incidents",
        &user.token,
        vec![
            Part::Text("payload", leak_incident().to_string()),
            png("a.png"),
            png("b.png"),
        ],
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    let images = body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    for image in images {
        let uri = image.as_str().unwrap();
        assert!(uri.starts_with("mock://incidents/"));
        assert!(app.storage.contains(uri));
        assert_eq!(app.storage.content_type_of(uri).as_deref(), Some("image/png"));
    }
}

#[tokio::test]
async fn test_multipart_flat_fields() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let request = multipart_request(
        "/api/incidents",
        &user.token,
        vec![
            Part::Text("title", "Burning waste".to_string()),
            Part::Text("description", "Smoke over the landfill".to_string()),
            Part::Text("type", "waste".to_string()),
            Part::Text("severity", "medium".to_string()),
            Part::Text("longitude", "67.05".to_string()),
            Part::Text("latitude", "24.90".to_string()),
        ],
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["category"], "waste");
    assert_eq!(body["data"]["location"]["coordinates"][0], 67.05);
    assert_eq!(body["data"]["location"]["coordinates"][1], 24.9);
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let request = multipart_request(
        "/api/incidents",
        &user.token,
        vec![
            Part::Text("payload", leak_incident().to_string()),
            Part::File {
                name: "images",
                file_name: "notes.txt",
                content_type: "text/plain",
                data: b"hello".to_vec(),
            },
        ],
    );
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["validation_errors"]["images"].is_array());
    assert_eq!(app.storage.stored_count(), 0);
}

#[tokio::test]
async fn test_more_than_ten_images_is_rejected() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let mut parts = vec![Part::Text("payload", leak_incident().to_string())];
    parts.extend((0..11).map(|_| png("x.png")));

    let (status, _) = send(
        &app.router,
        multipart_request("/api/incidents", &user.token, parts),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.storage.stored_count(), 0);
}

#[tokio::test]
async fn test_invalid_multipart_incident_does_not_store_images() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let mut incident = leak_incident();
    incident["severity"] = "catastrophic".into();

    let (status, _) = send(
        &app.router,
        multipart_request(
            "/api/incidents",
            &user.token,
            vec![Part::Text("payload", incident.to_string()), png("a.png")],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.storage.stored_count(), 0);
}

#[tokio::test]
async fn test_incident_cannot_reference_another_users_upload() {
    let app = setup_app().await;
    let victim = create_reporter(&app.router).await;
    let attacker = create_reporter(&app.router).await;

    let request = multipart_request(
        "/api/incidents",
        &victim.token,
        vec![
            Part::Text("payload", leak_incident().to_string()),
            png("evidence.png"),
        ],
    );
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    // 近隣検索から他人の画像URIが見える
    let (_, nearby) = send(
        &app.router,
        json_request(
            "GET",
            "/api/incidents/nearby?lng=67.01&lat=24.86",
            Some(&attacker.token),
            None,
        ),
    )
    .await;
    let stolen = nearby["data"][0]["images"][0].as_str().unwrap().to_string();
    assert!(app.storage.contains(&stolen));

    let mut incident = leak_incident();
    incident["images"] = serde_json::json!([stolen]);
    let (status, body) = send(
        &app.router,
        json_request("POST", "/api/incidents", Some(&attacker.token), Some(incident)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_errors");
    assert!(body["validation_errors"]["images"].is_array());

    // 攻撃者が自分の報告を削除しても他人の画像は残る
    let own = submit_incident(&app.router, &attacker.token, leak_incident()).await;
    let uri = format!("/api/incidents/{}", own["id"].as_str().unwrap());
    let (status, _) = send(
        &app.router,
        json_request("DELETE", &uri, Some(&attacker.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.storage.contains(&stolen));
    assert_eq!(app.storage.stored_count(), 1);
}

#[tokio::test]
async fn test_external_image_urls_are_still_accepted() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let mut incident = leak_incident();
    incident["images"] = serde_json::json!(["https://cdn.example.com/spill.jpg"]);
    let created = submit_incident(&app.router, &user.token, incident).await;

    assert_eq!(created["images"][0], "https://cdn.example.com/spill.jpg");
    assert_eq!(app.storage.stored_count(), 0);
}
