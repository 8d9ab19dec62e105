// tests/common/app_helper.rs

use axum::Router;
use eco_tracker::{
    api::{build_app, AppState},
    config::AppConfig,
};
use std::sync::Arc;

use crate::common::{self, mock_storage::MockStorageService};

/// テスト用アプリ一式
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub storage: MockStorageService,
    pub db: common::db::TestDatabase,
}

/// 全ルートを持つアプリのセットアップ
pub async fn setup_app() -> TestApp {
    common::init_test_env();

    let db = common::db::TestDatabase::new().await;
    let app_config = AppConfig::for_testing();
    let storage = MockStorageService::new();

    let state = AppState::with_config(
        db.connection.clone(),
        &app_config,
        Arc::new(storage.clone()),
    )
    .unwrap();
    let router = build_app(state.clone());

    TestApp {
        router,
        state,
        storage,
        db,
    }
}
