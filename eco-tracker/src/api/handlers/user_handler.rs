// src/api/handlers/user_handler.rs

use crate::api::dto::user_dto::{
    ChangePasswordRequest, DeleteAccountResponse, LeaderboardEntry, MessageResponse,
    UpdateProfileRequest, UserStatistics,
};
use crate::api::AppState;
use crate::domain::user_model::SafeUser;
use crate::error::AppResult;
use crate::extractors::JsonBody;
use crate::middleware::auth::AuthenticatedUser;
use crate::types::ApiResponse;
use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use tracing::info;

// --- ユーザープロフィール管理 ---

pub async fn get_profile_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<SafeUser>> {
    let profile = app_state.user_service.get_profile(user.user_id()).await?;
    Ok(ApiResponse::success(profile))
}

/// プロフィール更新（指定フィールドのみ）
pub async fn update_profile_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> AppResult<ApiResponse<SafeUser>> {
    let profile = app_state
        .user_service
        .update_profile(user.user_id(), payload)
        .await?;
    Ok(ApiResponse::success(profile))
}

pub async fn change_password_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    app_state
        .user_service
        .change_password(user.user_id(), payload)
        .await?;

    Ok(ApiResponse::success(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// アカウント削除（報告したインシデントも全て削除）
pub async fn delete_account_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<DeleteAccountResponse>> {
    info!(user_id = %user.user_id(), "Account deletion requested");

    let response = app_state
        .user_service
        .delete_account(user.user_id())
        .await?;
    Ok(ApiResponse::success(response))
}

// --- ランキング・統計 ---

pub async fn leaderboard_handler(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<LeaderboardEntry>>> {
    let entries = app_state.user_service.leaderboard().await?;
    Ok(ApiResponse::success(entries))
}

pub async fn statistics_handler(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<ApiResponse<UserStatistics>> {
    let statistics = app_state.user_service.statistics(user.user_id()).await?;
    Ok(ApiResponse::success(statistics))
}

pub fn user_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/users/profile",
            get(get_profile_handler)
                .put(update_profile_handler)
                .delete(delete_account_handler),
        )
        .route("/users/password", put(change_password_handler))
        .route("/users/leaderboard", get(leaderboard_handler))
        .route("/users/statistics", get(statistics_handler))
        .with_state(app_state)
}
