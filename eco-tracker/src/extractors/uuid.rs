// src/extractors/uuid.rs

use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// パスパラメータからUUIDを抽出し、検証を行う
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidatedUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Missing path parameter 'id': {}", e)))?;

        let uuid = Uuid::parse_str(raw.trim()).map_err(|_| {
            AppError::BadRequest(format!("Invalid UUID format for 'id': '{}'", raw))
        })?;

        Ok(ValidatedUuid(uuid))
    }
}
