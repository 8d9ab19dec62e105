// tests/integration/users/account_tests.rs

use axum::http::StatusCode;
use eco_tracker::repository::incident_repository::IncidentRepository;

use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_admin, create_reporter, login_body, submit_incident};
use crate::common::request::{json_request, multipart_request, send, Part};
use crate::common::test_data::leak_incident;

#[tokio::test]
async fn test_delete_account_removes_user_and_incidents() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let other = create_reporter(&app.router).await;

    for _ in 0..3 {
        submit_incident(&app.router, &user.token, leak_incident()).await;
    }
    submit_incident(&app.router, &other.token, leak_incident()).await;

    let (status, body) = send(
        &app.router,
        json_request("DELETE", "/api/users/profile", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deletedIncidents"], 3);

    let repo = IncidentRepository::new(app.db.connection.clone());
    assert_eq!(repo.count_by_reporter(user.id).await.unwrap(), 0);
    assert_eq!(repo.count_by_reporter(other.id).await.unwrap(), 1);

    let (status, _) = send(
        &app.router,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            Some(login_body(&user.email, &user.password)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_account_discards_uploaded_images() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;

    let (status, _) = send(
        &app.router,
        multipart_request(
            "/api/incidents",
            &user.token,
            vec![
                Part::Text("payload", leak_incident().to_string()),
                Part::File {
                    name: "images",
                    file_name: "spill.jpg",
                    content_type: "image/jpeg",
                    data: vec![0xff, 0xd8, 0xff, 0xe0],
                },
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.storage.stored_count(), 1);

    let (status, _) = send(
        &app.router,
        json_request("DELETE", "/api/users/profile", Some(&user.token), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.storage.stored_count(), 0);
}

#[tokio::test]
async fn test_deleted_reporter_disappears_from_admin_list() {
    let app = setup_app().await;
    let user = create_reporter(&app.router).await;
    let admin = create_admin(&app).await;
    submit_incident(&app.router, &user.token, leak_incident()).await;

    send(
        &app.router,
        json_request("DELETE", "/api/users/profile", Some(&user.token), None),
    )
    .await;

    let (_, body) = send(
        &app.router,
        json_request("GET", "/api/incidents/admin/all", Some(&admin.token), None),
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}
