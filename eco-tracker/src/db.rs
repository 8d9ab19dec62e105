// src/db.rs
use crate::config::Config;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;

pub type DbPool = DatabaseConnection;

/// 設定に従って接続プールを作成
pub async fn create_db_pool(config: &Config) -> Result<DbPool, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    if config.database_url.starts_with("sqlite") {
        // インメモリDBは接続ごとに別DBになるため単一接続に固定
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(20)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(8 * 60))
            .max_lifetime(Duration::from_secs(30 * 60));
    }
    opt.sqlx_logging(false);

    Database::connect(opt).await
}

/// 未適用のマイグレーションを実行
pub async fn run_migrations(conn: &DbPool) -> Result<(), DbErr> {
    Migrator::up(conn, None).await
}

/// 疎通確認
pub async fn ping(conn: &DbPool) -> bool {
    let backend = conn.get_database_backend();
    conn.execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok()
}
