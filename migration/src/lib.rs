// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// ユーザー関連マイグレーション
mod m20250801_000001_create_users_table;

// インシデント関連マイグレーション
mod m20250801_000002_create_incidents_table;
mod m20250801_000003_add_incident_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 基本テーブル作成（依存関係なし）
            Box::new(m20250801_000001_create_users_table::Migration),
            // 2. 依存テーブル作成（usersテーブルに依存）
            Box::new(m20250801_000002_create_incidents_table::Migration),
            // 3. 新着順・位置検索用インデックス
            Box::new(m20250801_000003_add_incident_indexes::Migration),
        ]
    }
}
