// src/main.rs
use eco_tracker::api::{build_app, AppState};
use eco_tracker::config::Config;
use eco_tracker::db::{create_db_pool, run_migrations};
use eco_tracker::error::set_expose_error_details;
use eco_tracker::logging::init_tracing;
use eco_tracker::service::storage_service::create_storage_service;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    tracing::info!("Starting EcoTracker server...");

    // 設定を読み込む
    let app_config = Config::from_env()?;
    set_expose_error_details(app_config.server.expose_error_details);
    tracing::info!(
        environment = %app_config.environment,
        storage = ?app_config.storage.provider,
        "Configuration loaded"
    );

    // データベース接続とマイグレーション
    let db_pool = create_db_pool(&app_config).await?;
    run_migrations(&db_pool).await?;
    tracing::info!("Database pool created and migrations applied.");

    let storage = create_storage_service(&app_config.storage);
    let app_state = AppState::with_config(db_pool, &app_config, storage)?;

    if let Some(initial_admin) = &app_config.initial_admin {
        app_state
            .auth_service
            .ensure_initial_admin(initial_admin)
            .await?;
    }

    let app_router = build_app(app_state);

    let server_addr = app_config.server_addr();
    let listener = TcpListener::bind(&server_addr).await?;
    tracing::info!("Router configured. Server listening on {}", server_addr);

    axum::serve(listener, app_router.into_make_service()).await?;

    Ok(())
}
