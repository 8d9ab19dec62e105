// src/domain/incident_validation.rs

//! インシデント入力の検証
//!
//! すべてのフィールドを検査し、失敗をまとめて `field: message` 形式で返す。

use super::geo_point::GeoPoint;
use super::incident_category::IncidentCategory;
use super::incident_severity::IncidentSeverity;
use crate::error::AppError;
use crate::utils::validation::incident::{DESCRIPTION_MAX_LENGTH, MAX_IMAGES, TITLE_MAX_LENGTH};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// クライアントから送られる未検証のインシデント
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "type")]
    pub category: Option<String>,
    pub severity: Option<String>,
    pub location: Option<LocationInput>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// GeoJSON Point の未検証表現
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInput {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub coordinates: Option<Vec<Value>>,
}

impl LocationInput {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: Some("Point".to_string()),
            coordinates: Some(vec![Value::from(longitude), Value::from(latitude)]),
        }
    }
}

/// 検証済みのインシデント
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIncident {
    pub title: String,
    pub description: String,
    pub category: IncidentCategory,
    pub severity: IncidentSeverity,
    pub location: GeoPoint,
    pub images: Vec<String>,
}

pub fn validate_new_incident(draft: &IncidentDraft) -> Result<ValidatedIncident, AppError> {
    let mut errors = Vec::new();

    let title = validate_title(draft.title.as_deref(), &mut errors);
    let description = validate_description(draft.description.as_deref(), &mut errors);

    let category = required_enum::<IncidentCategory>(
        draft.category.as_deref(),
        "category",
        "Category is required",
        &mut errors,
    );
    let severity = required_enum::<IncidentSeverity>(
        draft.severity.as_deref(),
        "severity",
        "Severity is required",
        &mut errors,
    );

    let location = validate_location(draft.location.as_ref(), &mut errors);
    let images = validate_images(&draft.images, &mut errors);

    match (title, description, category, severity, location, images) {
        (Some(title), Some(description), Some(category), Some(severity), Some(location), Some(images))
            if errors.is_empty() =>
        {
            Ok(ValidatedIncident {
                title,
                description,
                category,
                severity,
                location,
                images,
            })
        }
        _ => Err(AppError::ValidationErrors(errors)),
    }
}

fn validate_title(title: Option<&str>, errors: &mut Vec<String>) -> Option<String> {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        errors.push("title: Title is required".to_string());
        return None;
    }
    if title.chars().count() > TITLE_MAX_LENGTH {
        errors.push(format!(
            "title: Title must be at most {} characters",
            TITLE_MAX_LENGTH
        ));
        return None;
    }
    if title.contains(['\n', '\r']) {
        errors.push("title: Title must not contain line breaks".to_string());
        return None;
    }
    Some(title.to_string())
}

fn validate_description(description: Option<&str>, errors: &mut Vec<String>) -> Option<String> {
    let description = description.map(str::trim).unwrap_or_default();
    if description.is_empty() {
        errors.push("description: Description is required".to_string());
        return None;
    }
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        errors.push(format!(
            "description: Description must be at most {} characters",
            DESCRIPTION_MAX_LENGTH
        ));
        return None;
    }
    Some(description.to_string())
}

fn required_enum<T>(
    value: Option<&str>,
    field: &str,
    missing_message: &str,
    errors: &mut Vec<String>,
) -> Option<T>
where
    T: std::str::FromStr<Err = String>,
{
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => {
            errors.push(format!("{}: {}", field, missing_message));
            None
        }
        Some(raw) => match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                errors.push(format!("{}: {}", field, e));
                None
            }
        },
    }
}

fn validate_location(location: Option<&LocationInput>, errors: &mut Vec<String>) -> Option<GeoPoint> {
    let Some(location) = location else {
        errors.push("location: Location is required".to_string());
        return None;
    };

    if let Some(kind) = location.kind.as_deref() {
        if kind != "Point" {
            errors.push("location.type: Location type must be Point".to_string());
        }
    }

    let coordinates = match location.coordinates.as_deref() {
        Some(coordinates) if coordinates.len() == 2 => coordinates,
        _ => {
            errors.push(
                "location.coordinates: Coordinates must contain exactly [longitude, latitude]"
                    .to_string(),
            );
            return None;
        }
    };

    let (Some(longitude), Some(latitude)) = (coordinates[0].as_f64(), coordinates[1].as_f64())
    else {
        errors.push("location.coordinates: Coordinates must be numbers".to_string());
        return None;
    };

    match GeoPoint::new(longitude, latitude) {
        Ok(point) => Some(point),
        Err(e) => {
            errors.push(format!("location.coordinates: {}", e));
            None
        }
    }
}

fn validate_images(images: &[String], errors: &mut Vec<String>) -> Option<Vec<String>> {
    if images.len() > MAX_IMAGES {
        errors.push(format!("images: At most {} images are allowed", MAX_IMAGES));
        return None;
    }
    if images.iter().any(|uri| uri.trim().is_empty()) {
        errors.push("images: Image URIs must not be empty".to_string());
        return None;
    }
    Some(images.iter().map(|uri| uri.trim().to_string()).collect())
}
