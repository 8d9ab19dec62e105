// src/api/mod.rs

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::AppError;
use crate::logging::{inject_request_context, logging_middleware};
use crate::middleware::auth::{cors_layer, jwt_auth_middleware};
use crate::service::storage_service::{StorageProvider, StorageService};
use crate::service::{
    auth_service::AuthService, incident_service::IncidentService, user_service::UserService,
};
use crate::utils::error_helper::internal_server_error;
use crate::utils::jwt::JwtManager;
use crate::utils::password::PasswordManager;
use axum::{extract::DefaultBodyLimit, middleware, Router};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod dto;
pub mod handlers;

use handlers::{auth_handler, incident_handler, system_handler, user_handler};

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub incident_service: Arc<IncidentService>,
    pub user_service: Arc<UserService>,
    pub db: DbPool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// 設定からユーティリティとサービスを組み立てる
    pub fn with_config(
        db_pool: DbPool,
        app_config: &AppConfig,
        storage: Arc<dyn StorageService>,
    ) -> Result<Self, AppError> {
        let password_manager = Arc::new(
            PasswordManager::new(
                app_config.password.argon2.clone(),
                app_config.password.policy.clone(),
            )
            .map_err(|e| {
                internal_server_error(e, "api::with_config", "Invalid password configuration")
            })?,
        );
        let jwt_manager = Arc::new(JwtManager::new(app_config.jwt.clone()).map_err(|e| {
            internal_server_error(e, "api::with_config", "Invalid JWT configuration")
        })?);

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            password_manager.clone(),
            jwt_manager,
        ));
        let incident_service = Arc::new(IncidentService::new(db_pool.clone(), storage));
        let user_service = Arc::new(UserService::new(
            db_pool.clone(),
            password_manager,
            incident_service.clone(),
        ));

        Ok(Self {
            auth_service,
            incident_service,
            user_service,
            db: db_pool,
            config: Arc::new(app_config.clone()),
        })
    }
}

/// ルーター全体を構築
pub fn build_app(app_state: AppState) -> Router {
    let config = app_state.config.clone();

    // 認証が必要なルート
    let protected = Router::new()
        .merge(incident_handler::incident_router(app_state.clone()))
        .merge(user_handler::user_router(app_state.clone()))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            jwt_auth_middleware,
        ));

    let api = Router::new()
        .merge(auth_handler::auth_router(app_state.clone()))
        .merge(incident_handler::public_incident_router(app_state.clone()))
        .merge(protected);

    let mut app = Router::new()
        .nest("/api", api)
        .merge(system_handler::system_router(app_state));

    // ローカルストレージの画像を配信
    if config.storage.provider == StorageProvider::Local {
        app = app.nest_service(
            &config.storage.public_upload_path,
            ServeDir::new(&config.storage.upload_dir),
        );
    }

    app.layer(DefaultBodyLimit::max(config.server.body_limit))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(inject_request_context))
}
