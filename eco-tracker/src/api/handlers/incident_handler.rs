// src/api/handlers/incident_handler.rs

use crate::api::dto::incident_dto::{
    AdminIncidentDto, AdminIncidentQuery, DeleteIncidentResponse, IncidentDto, NearbyIncidentDto,
    NearbyQuery, RecentIncidentDto, UpdateStatusRequest,
};
use crate::api::AppState;
use crate::error::{AppError, AppResult};
use crate::extractors::{IncidentSubmission, JsonBody, ValidatedUuid};
use crate::middleware::auth::{AdminUser, AuthenticatedUser};
use crate::types::ApiResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::info;

/// インシデント投稿（JSON またはマルチパート）
pub async fn create_incident_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    submission: IncidentSubmission,
) -> AppResult<(StatusCode, Json<ApiResponse<IncidentDto>>)> {
    let IncidentSubmission { request, uploads } = submission;

    let incident = app_state
        .incident_service
        .create_incident(user.user_id(), request, uploads)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(incident))))
}

/// 自分の報告一覧
pub async fn list_my_incidents_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<IncidentDto>>> {
    let incidents = app_state
        .incident_service
        .list_my_incidents(user.user_id())
        .await?;

    info!(
        user_id = %user.user_id(),
        count = incidents.len(),
        "Listed own incidents"
    );

    Ok(ApiResponse::success(incidents))
}

pub async fn get_incident_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<IncidentDto>> {
    let incident = app_state.incident_service.get_incident(&user, id).await?;
    Ok(ApiResponse::success(incident))
}

/// 公開フィード（認証不要）
pub async fn list_recent_incidents_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<Vec<RecentIncidentDto>>> {
    let incidents = app_state.incident_service.list_recent_incidents().await?;
    Ok(ApiResponse::success(incidents))
}

pub async fn list_nearby_incidents_handler(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    query: Result<Query<NearbyQuery>, axum::extract::rejection::QueryRejection>,
) -> AppResult<ApiResponse<Vec<NearbyIncidentDto>>> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let incidents = app_state
        .incident_service
        .list_nearby_incidents(query)
        .await?;
    Ok(ApiResponse::success(incidents))
}

/// 全件一覧（管理者）
pub async fn list_all_incidents_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Query(query): Query<AdminIncidentQuery>,
) -> AppResult<ApiResponse<Vec<AdminIncidentDto>>> {
    let incidents = app_state.incident_service.list_all_incidents(query).await?;

    info!(
        admin_id = %admin.user_id(),
        count = incidents.len(),
        "Admin listed all incidents"
    );

    Ok(ApiResponse::success(incidents))
}

/// ステータス更新（管理者）
pub async fn update_incident_status_handler(
    State(app_state): State<AppState>,
    admin: AdminUser,
    ValidatedUuid(id): ValidatedUuid,
    JsonBody(payload): JsonBody<UpdateStatusRequest>,
) -> AppResult<ApiResponse<IncidentDto>> {
    let incident = app_state
        .incident_service
        .update_status(admin.user_id(), id, payload)
        .await?;
    Ok(ApiResponse::success(incident))
}

/// 削除（本人または管理者）
pub async fn delete_incident_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<DeleteIncidentResponse>> {
    let response = app_state.incident_service.delete_incident(&user, id).await?;
    Ok(ApiResponse::success(response))
}

/// 認証が必要なインシデントルート
pub fn incident_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/incidents",
            get(list_my_incidents_handler).post(create_incident_handler),
        )
        .route("/incidents/nearby", get(list_nearby_incidents_handler))
        .route("/incidents/admin/all", get(list_all_incidents_handler))
        .route(
            "/incidents/{id}",
            get(get_incident_handler).delete(delete_incident_handler),
        )
        .route(
            "/incidents/{id}/status",
            patch(update_incident_status_handler),
        )
        .with_state(app_state)
}

/// 認証不要のインシデントルート
pub fn public_incident_router(app_state: AppState) -> Router {
    Router::new()
        .route("/incidents/recent", get(list_recent_incidents_handler))
        .with_state(app_state)
}
