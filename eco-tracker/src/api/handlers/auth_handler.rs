// src/api/handlers/auth_handler.rs

use crate::api::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::JsonBody;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::info;

/// ユーザー登録
pub async fn register_handler(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    info!(username = %payload.username, "Registration attempt");

    let response = app_state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// ログイン
pub async fn login_handler(
    State(app_state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = app_state.auth_service.login(payload).await?;
    Ok(Json(response))
}

pub fn auth_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .with_state(app_state)
}
