// src/extractors/incident_submission.rs

//! インシデント投稿ボディの抽出
//!
//! `application/json` の場合はそのまま、`multipart/form-data` の場合は
//! `payload` パート（JSON）と個別フィールド、`images` ファイルパートを読み取る。

use super::json::JsonBody;
use crate::api::dto::incident_dto::{CreateIncidentRequest, LocationInput};
use crate::error::{AppError, AppResult};
use crate::service::incident_service::ImageUpload;
use crate::utils::error_helper::validation_error;
use crate::utils::validation::incident::{MAX_IMAGES, MAX_IMAGE_BYTES};
use axum::{
    extract::{multipart::Field, multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header, HeaderMap, StatusCode},
};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct IncidentSubmission {
    pub request: CreateIncidentRequest,
    pub uploads: Vec<ImageUpload>,
}

impl<S> FromRequest<S> for IncidentSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(req.headers()) {
            let JsonBody(request) =
                JsonBody::<CreateIncidentRequest>::from_request(req, state).await?;
            return Ok(Self {
                request,
                uploads: Vec::new(),
            });
        }

        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_multipart(multipart).await
    }
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::MULTIPART && m.subtype() == mime::FORM_DATA)
}

/// `payload` 以外で受け付ける個別フィールド
#[derive(Debug, Default)]
struct FlatFields {
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    severity: Option<String>,
    location: Option<String>,
    longitude: Option<String>,
    latitude: Option<String>,
    images: Vec<String>,
}

impl FlatFields {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "category" | "type" => self.category = Some(value),
            "severity" => self.severity = Some(value),
            "location" => self.location = Some(value),
            "longitude" | "lng" => self.longitude = Some(value),
            "latitude" | "lat" => self.latitude = Some(value),
            "images" | "images[]" => self.images.push(value),
            other => debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    /// 個別フィールドで payload を上書き
    fn apply(self, request: &mut CreateIncidentRequest) -> AppResult<()> {
        if self.title.is_some() {
            request.title = self.title;
        }
        if self.description.is_some() {
            request.description = self.description;
        }
        if self.category.is_some() {
            request.category = self.category;
        }
        if self.severity.is_some() {
            request.severity = self.severity;
        }

        if let Some(raw) = self.location {
            let location = serde_json::from_str::<LocationInput>(&raw)
                .map_err(|_| validation_error("location", "Location must be a GeoJSON Point"))?;
            request.location = Some(location);
        } else if self.longitude.is_some() || self.latitude.is_some() {
            let coordinates = [self.longitude, self.latitude]
                .into_iter()
                .flatten()
                .map(|raw| coordinate_value(&raw))
                .collect();
            request.location = Some(LocationInput {
                kind: Some("Point".to_string()),
                coordinates: Some(coordinates),
            });
        }

        request.images.extend(self.images);
        Ok(())
    }
}

// 数値に変換できない値は文字列のまま残し、検証側で報告させる
fn coordinate_value(raw: &str) -> Value {
    raw.trim()
        .parse::<f64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(raw.to_string()))
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<IncidentSubmission> {
    let mut payload: Option<CreateIncidentRequest> = None;
    let mut fields = FlatFields::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if matches!(name.as_str(), "images" | "images[]") && field.file_name().is_some() {
            if uploads.len() >= MAX_IMAGES {
                return Err(validation_error(
                    "images",
                    &format!("At most {} images are allowed", MAX_IMAGES),
                ));
            }
            uploads.push(read_image(field).await?);
            continue;
        }

        let text = field.text().await.map_err(multipart_error)?;
        if name == "payload" {
            let parsed = serde_json::from_str(&text)
                .map_err(|e| AppError::BadRequest(format!("Invalid payload JSON: {}", e)))?;
            payload = Some(parsed);
        } else {
            fields.set(&name, text);
        }
    }

    let mut request = payload.unwrap_or_default();
    fields.apply(&mut request)?;

    debug!(
        uploads = uploads.len(),
        image_uris = request.images.len(),
        "Parsed multipart incident submission"
    );

    Ok(IncidentSubmission { request, uploads })
}

async fn read_image(field: Field<'_>) -> AppResult<ImageUpload> {
    let file_name = field.file_name().map(str::to_string);
    let content_type = field
        .content_type()
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .filter(|m| m.type_() == mime::IMAGE)
        .ok_or_else(|| validation_error("images", "Only image files are allowed"))?;

    let data = field.bytes().await.map_err(multipart_error)?;
    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::PayloadTooLarge(format!(
            "Each image must be at most {} MB",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(ImageUpload {
        file_name,
        content_type: content_type.essence_str().to_string(),
        data: data.to_vec(),
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("Request body is too large".to_string());
    }
    AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
}
