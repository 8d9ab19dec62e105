// src/api/dto/incident_dto.rs

use crate::domain::geo_point::GeoJsonPoint;
use crate::domain::incident_category::IncidentCategory;
use crate::domain::incident_model;
use crate::domain::incident_severity::IncidentSeverity;
use crate::domain::incident_status::IncidentStatus;
use crate::domain::user_model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::domain::incident_validation::{IncidentDraft as CreateIncidentRequest, LocationInput};

/// インシデントのレスポンス表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDto {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub status: IncidentStatus,
    pub location: GeoJsonPoint,
    pub images: Vec<String>,
    pub reported_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<incident_model::Model> for IncidentDto {
    fn from(model: incident_model::Model) -> Self {
        Self {
            location: model.location(),
            images: model.image_uris(),
            id: model.id,
            title: model.title,
            description: model.description,
            category: model.category,
            severity: model.severity,
            status: model.status,
            reported_by: model.reported_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// 公開フィード用の最小表現
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIncidentDto {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub category: IncidentCategory,
    pub created_at: DateTime<Utc>,
}

impl From<incident_model::Model> for RecentIncidentDto {
    fn from(model: incident_model::Model) -> Self {
        Self {
            id: model.id,
            category: model.category,
            created_at: model.created_at,
        }
    }
}

/// 近隣検索の結果（距離付き）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyIncidentDto {
    #[serde(flatten)]
    pub incident: IncidentDto,
    pub distance_km: f64,
}

/// 管理画面に表示する報告者情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
}

impl From<user_model::Model> for ReporterSummary {
    fn from(user: user_model::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
        }
    }
}

/// 管理者向け一覧の要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIncidentDto {
    #[serde(flatten)]
    pub incident: IncidentDto,
    pub reporter: Option<ReporterSummary>,
}

/// 近隣検索のクエリ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub lng: Option<f64>,
    pub lat: Option<f64>,
    pub radius_km: Option<f64>,
}

/// 管理者向け一覧のクエリ
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminIncidentQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
}

/// ステータス更新リクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// 削除結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteIncidentResponse {
    pub message: String,
    pub id: Uuid,
}
