// src/service/incident_service.rs

use crate::api::dto::incident_dto::{
    AdminIncidentDto, AdminIncidentQuery, CreateIncidentRequest, DeleteIncidentResponse,
    IncidentDto, NearbyIncidentDto, NearbyQuery, RecentIncidentDto, UpdateStatusRequest,
};
use crate::db::DbPool;
use crate::domain::geo_point::GeoPoint;
use crate::domain::incident_category::IncidentCategory;
use crate::domain::incident_model;
use crate::domain::incident_status::IncidentStatus;
use crate::domain::incident_validation::validate_new_incident;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::repository::incident_repository::{IncidentFilter, IncidentRepository};
use crate::service::storage_service::StorageService;
use crate::utils::error_helper::{forbidden_error, not_found_error, validation_error};
use crate::utils::validation::incident::MAX_IMAGES;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 公開フィードの件数
pub const RECENT_INCIDENT_LIMIT: u64 = 5;
/// 近隣検索の既定半径（km）
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
/// 近隣検索の最大半径（km）
pub const MAX_NEARBY_RADIUS_KM: f64 = 100.0;

/// マルチパートで受け取った画像
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub struct IncidentService {
    repo: Arc<IncidentRepository>,
    storage: Arc<dyn StorageService>,
}

impl IncidentService {
    pub fn new(db_pool: DbPool, storage: Arc<dyn StorageService>) -> Self {
        Self {
            repo: Arc::new(IncidentRepository::new(db_pool)),
            storage,
        }
    }

    /// インシデントを登録（報告者は呼び出し元ユーザー）
    pub async fn create_incident(
        &self,
        reporter_id: Uuid,
        mut request: CreateIncidentRequest,
        uploads: Vec<ImageUpload>,
    ) -> AppResult<IncidentDto> {
        // ストレージ上のURIは直接指定不可（ファイルとして添付させる）
        if request
            .images
            .iter()
            .any(|uri| self.storage.owns(uri.trim()))
        {
            return Err(validation_error(
                "images",
                "Stored images cannot be referenced; attach the file instead",
            ));
        }

        let existing_images = request.images.len();

        // アップロード予定の画像も件数チェックに含める
        request
            .images
            .extend(uploads.iter().enumerate().map(|(i, upload)| {
                upload
                    .file_name
                    .clone()
                    .unwrap_or_else(|| format!("upload-{i}"))
            }));
        let mut validated = validate_new_incident(&request)?;
        validated.images.truncate(existing_images);

        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.storage.upload(upload.data, &upload.content_type).await {
                Ok(uri) => stored.push(uri),
                Err(e) => {
                    self.discard_images(&stored).await;
                    return Err(e);
                }
            }
        }
        validated.images.extend(stored.iter().cloned());

        let incident = match self.repo.create(validated, reporter_id).await {
            Ok(incident) => incident,
            Err(e) => {
                self.discard_images(&stored).await;
                return Err(e.into());
            }
        };

        info!(
            incident_id = %incident.id,
            user_id = %reporter_id,
            category = %incident.category,
            severity = %incident.severity,
            uploaded_images = stored.len(),
            "Incident reported"
        );

        Ok(incident.into())
    }

    /// 自分の報告一覧
    pub async fn list_my_incidents(&self, user_id: Uuid) -> AppResult<Vec<IncidentDto>> {
        let incidents = self.repo.find_by_reporter(user_id).await?;
        Ok(incidents.into_iter().map(IncidentDto::from).collect())
    }

    /// 1件取得（本人または管理者のみ）
    pub async fn get_incident(
        &self,
        user: &AuthenticatedUser,
        incident_id: Uuid,
    ) -> AppResult<IncidentDto> {
        let incident = self
            .repo
            .find_by_id(incident_id)
            .await?
            .filter(|incident| user.is_admin() || incident.is_reported_by(user.user_id()))
            .ok_or_else(|| {
                not_found_error("Incident", incident_id, "incident_service::get_incident")
            })?;

        Ok(incident.into())
    }

    /// 公開フィード（最新5件）
    pub async fn list_recent_incidents(&self) -> AppResult<Vec<RecentIncidentDto>> {
        let incidents = self.repo.find_recent(RECENT_INCIDENT_LIMIT).await?;
        Ok(incidents.into_iter().map(RecentIncidentDto::from).collect())
    }

    /// 近隣のインシデント（距離の近い順）
    pub async fn list_nearby_incidents(
        &self,
        query: NearbyQuery,
    ) -> AppResult<Vec<NearbyIncidentDto>> {
        let mut errors = Vec::new();
        if query.lng.is_none() {
            errors.push("lng: Longitude is required".to_string());
        }
        if query.lat.is_none() {
            errors.push("lat: Latitude is required".to_string());
        }
        let radius_km = query.radius_km.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
        if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > MAX_NEARBY_RADIUS_KM {
            errors.push(format!(
                "radiusKm: Radius must be greater than 0 and at most {} km",
                MAX_NEARBY_RADIUS_KM
            ));
        }

        let center = match (query.lng, query.lat) {
            (Some(lng), Some(lat)) => match GeoPoint::new(lng, lat) {
                Ok(point) => Some(point),
                Err(e) => {
                    errors.push(format!("location.coordinates: {}", e));
                    None
                }
            },
            _ => None,
        };

        let Some(center) = center.filter(|_| errors.is_empty()) else {
            return Err(AppError::ValidationErrors(errors));
        };

        let candidates = self
            .repo
            .find_within_bounds(center.bounding_box(radius_km))
            .await?;

        let mut nearby: Vec<NearbyIncidentDto> = candidates
            .into_iter()
            .filter_map(|incident| {
                let point = GeoPoint::new(incident.longitude, incident.latitude).ok()?;
                let distance_km = center.distance_km(&point);
                (distance_km <= radius_km).then(|| NearbyIncidentDto {
                    incident: incident.into(),
                    distance_km,
                })
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        Ok(nearby)
    }

    /// 全件（管理者向け、報告者情報付き）
    pub async fn list_all_incidents(
        &self,
        query: AdminIncidentQuery,
    ) -> AppResult<Vec<AdminIncidentDto>> {
        let mut errors = Vec::new();

        let status = non_empty(query.status.as_deref())
            .map(|s| s.parse::<IncidentStatus>())
            .transpose()
            .unwrap_or_else(|e| {
                errors.push(format!("status: {}", e));
                None
            });
        let category = non_empty(query.category.as_deref())
            .map(|c| c.parse::<IncidentCategory>())
            .transpose()
            .unwrap_or_else(|e| {
                errors.push(format!("category: {}", e));
                None
            });

        if !errors.is_empty() {
            return Err(AppError::ValidationErrors(errors));
        }

        let filter = IncidentFilter {
            status,
            category,
            search: query.q,
        };

        let rows = self.repo.find_all_with_reporter(&filter).await?;
        Ok(rows
            .into_iter()
            .map(|(incident, reporter)| AdminIncidentDto {
                incident: incident.into(),
                reporter: reporter.map(Into::into),
            })
            .collect())
    }

    /// ステータス更新（管理者のみ）
    pub async fn update_status(
        &self,
        admin_id: Uuid,
        incident_id: Uuid,
        request: UpdateStatusRequest,
    ) -> AppResult<IncidentDto> {
        let status = request
            .status
            .parse::<IncidentStatus>()
            .map_err(|e| validation_error("status", &e))?;

        let incident = self
            .repo
            .update_status(incident_id, status)
            .await?
            .ok_or_else(|| {
                not_found_error("Incident", incident_id, "incident_service::update_status")
            })?;

        info!(
            incident_id = %incident_id,
            admin_id = %admin_id,
            status = %status,
            "Incident status updated"
        );

        Ok(incident.into())
    }

    /// 削除（本人または管理者）
    pub async fn delete_incident(
        &self,
        user: &AuthenticatedUser,
        incident_id: Uuid,
    ) -> AppResult<DeleteIncidentResponse> {
        let incident = self.repo.find_by_id(incident_id).await?.ok_or_else(|| {
            not_found_error("Incident", incident_id, "incident_service::delete_incident")
        })?;

        if !user.is_admin() && !incident.is_reported_by(user.user_id()) {
            return Err(forbidden_error(
                "You can only delete your own incidents",
                "incident_service::delete_incident",
            ));
        }

        let deleted = self.repo.delete_by_id(incident_id).await?;
        if deleted == 0 {
            return Err(not_found_error(
                "Incident",
                incident_id,
                "incident_service::delete_incident",
            ));
        }

        self.discard_images(&incident.image_uris()).await;

        info!(
            incident_id = %incident_id,
            user_id = %user.user_id(),
            by_admin = user.is_admin() && !incident.is_reported_by(user.user_id()),
            "Incident deleted"
        );

        Ok(DeleteIncidentResponse {
            message: "Incident deleted successfully".to_string(),
            id: incident_id,
        })
    }

    /// 保存済み画像の後始末（失敗しても処理は続行）
    pub async fn discard_images(&self, uris: &[String]) {
        for uri in uris.iter().filter(|uri| self.storage.owns(uri)) {
            if let Err(e) = self.storage.delete(uri).await {
                warn!(uri = %uri, error = %e, "Failed to delete stored image");
            }
        }
    }

    /// 指定インシデント群の画像をまとめて削除
    pub async fn discard_images_of(&self, incidents: &[incident_model::Model]) {
        let uris: Vec<String> = incidents.iter().flat_map(|i| i.image_uris()).collect();
        self.discard_images(&uris).await;
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
