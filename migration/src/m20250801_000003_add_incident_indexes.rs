use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 新着順一覧用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Incidents::Table)
                    .name("idx_incidents_created_at")
                    .col(Incidents::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 周辺検索（バウンディングボックス）用の複合インデックス
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Incidents::Table)
                    .name("idx_incidents_location")
                    .col(Incidents::Latitude)
                    .col(Incidents::Longitude)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Incidents::Table)
                    .name("idx_incidents_reported_by")
                    .col(Incidents::ReportedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Incidents::Table)
                    .name("idx_incidents_status")
                    .col(Incidents::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_incidents_status",
            "idx_incidents_reported_by",
            "idx_incidents_location",
            "idx_incidents_created_at",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .if_exists()
                        .table(Incidents::Table)
                        .name(name)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

/// Reference to the incidents table
#[derive(DeriveIden)]
enum Incidents {
    Table,
    CreatedAt,
    Latitude,
    Longitude,
    ReportedBy,
    Status,
}
