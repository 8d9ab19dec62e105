use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Incidents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Incidents::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Incidents::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Incidents::Description).text().not_null())
                    .col(ColumnDef::new(Incidents::Category).string_len(20).not_null())
                    .col(ColumnDef::new(Incidents::Severity).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Incidents::Status)
                            .string_len(20)
                            .not_null()
                            .default("reported"),
                    )
                    // GeoJSON Point は [経度, 緯度] の順で保持する
                    .col(ColumnDef::new(Incidents::Longitude).double().not_null())
                    .col(ColumnDef::new(Incidents::Latitude).double().not_null())
                    .col(ColumnDef::new(Incidents::Images).json_binary().not_null())
                    .col(ColumnDef::new(Incidents::ReportedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Incidents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Incidents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_incidents_reported_by")
                            .from(Incidents::Table, Incidents::ReportedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Incidents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Incidents {
    Table,
    Id,
    Title,
    Description,
    Category,
    Severity,
    Status,
    Longitude,
    Latitude,
    Images,
    ReportedBy,
    CreatedAt,
    UpdatedAt,
}

/// Reference to the users table
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
