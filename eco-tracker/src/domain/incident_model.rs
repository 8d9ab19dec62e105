// src/domain/incident_model.rs

use super::geo_point::GeoJsonPoint;
use super::incident_category::IncidentCategory;
use super::incident_severity::IncidentSeverity;
use super::incident_status::IncidentStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "incidents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub longitude: f64,
    pub latitude: f64,
    /// 画像URIの配列（JSON）
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,
    pub reported_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user_model::Entity",
        from = "Column::ReportedBy",
        to = "super::user_model::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl Related<super::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reporter.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            status: Set(IncidentStatus::Reported),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    pub fn location(&self) -> GeoJsonPoint {
        GeoJsonPoint {
            kind: "Point".to_string(),
            coordinates: [self.longitude, self.latitude],
        }
    }

    /// 画像URIの一覧（不正なJSONは空扱い）
    pub fn image_uris(&self) -> Vec<String> {
        serde_json::from_value(self.images.clone()).unwrap_or_default()
    }

    pub fn is_reported_by(&self, user_id: Uuid) -> bool {
        self.reported_by == user_id
    }
}
