// src/api/handlers/system_handler.rs

use crate::api::AppState;
use crate::db;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// ヘルスチェック（DB疎通を含む）
pub async fn health_handler(State(app_state): State<AppState>) -> Json<HealthResponse> {
    let database = if db::ping(&app_state.db).await {
        "ok"
    } else {
        warn!("Health check: database unavailable");
        "unavailable"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
    })
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_state)
}
