// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use validator::ValidationErrors;

/// 500系レスポンスに内部の詳細を含めるかどうか（起動時に設定から決定）
static EXPOSE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

pub fn set_expose_error_details(expose: bool) {
    EXPOSE_ERROR_DETAILS.store(expose, Ordering::Relaxed);
}

fn expose_error_details() -> bool {
    EXPOSE_ERROR_DETAILS.load(Ordering::Relaxed)
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl AppError {
    fn simple(status: StatusCode, message: String, error_type: &str) -> (StatusCode, ErrorResponse) {
        (
            status,
            ErrorResponse {
                success: false,
                error: message.clone(),
                message,
                details: None,
                validation_errors: None,
                errors: None,
                error_type: error_type.to_string(),
            },
        )
    }

    fn validation(field_errors: HashMap<String, Vec<String>>) -> (StatusCode, ErrorResponse) {
        let errors_array: Vec<serde_json::Value> = field_errors
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |msg| json!({"field": field, "message": format!("{}: {}", field, msg)}))
            })
            .collect();
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                success: false,
                error: "Validation failed".to_string(),
                message: "Validation failed".to_string(),
                details: None,
                validation_errors: Some(field_errors),
                errors: Some(errors_array),
                error_type: "validation_errors".to_string(),
            },
        )
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::DbErr(db_err) => {
                tracing::error!(error = ?db_err, "Database error");

                let status = match db_err {
                    DbErr::RecordNotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let message = match &db_err {
                    DbErr::RecordNotFound(_) => "The requested resource was not found",
                    _ => "A database error occurred",
                };

                // 詳細は設定で許可されている場合のみ返す
                let details = expose_error_details().then(|| json!({ "cause": db_err.to_string() }));

                (
                    status,
                    ErrorResponse {
                        success: false,
                        error: message.to_string(),
                        message: message.to_string(),
                        details,
                        validation_errors: None,
                        errors: None,
                        error_type: "database_error".to_string(),
                    },
                )
            }
            AppError::NotFound(message) => Self::simple(StatusCode::NOT_FOUND, message, "not_found"),
            AppError::ValidationError(message) => {
                Self::simple(StatusCode::BAD_REQUEST, message, "validation_error")
            }
            AppError::ValidationErrors(errors) => {
                let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
                for error in &errors {
                    let (field, message) = error
                        .split_once(": ")
                        .unwrap_or(("request", error.as_str()));
                    field_errors
                        .entry(field.to_string())
                        .or_default()
                        .push(message.to_string());
                }
                Self::validation(field_errors)
            }
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Invalid value".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                Self::validation(field_errors)
            }
            AppError::BadRequest(message) => {
                Self::simple(StatusCode::BAD_REQUEST, message, "bad_request")
            }
            AppError::Unauthorized(message) => {
                Self::simple(StatusCode::UNAUTHORIZED, message, "unauthorized")
            }
            AppError::Forbidden(message) => Self::simple(StatusCode::FORBIDDEN, message, "forbidden"),
            AppError::Conflict(message) => Self::simple(StatusCode::CONFLICT, message, "conflict"),
            AppError::PayloadTooLarge(message) => {
                Self::simple(StatusCode::PAYLOAD_TOO_LARGE, message, "payload_too_large")
            }
            AppError::InternalServerError(message) => {
                tracing::error!(message = %message, "Internal server error");
                let (status, mut response) = Self::simple(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    "internal_server_error",
                );
                if expose_error_details() {
                    response.details = Some(json!({ "cause": message }));
                }
                (status, response)
            }
            AppError::ExternalServiceError(message) => {
                tracing::error!(message = %message, "External service error");
                let (status, mut response) = Self::simple(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "External service error".to_string(),
                    "external_service_error",
                );
                if expose_error_details() {
                    response.details = Some(json!({ "cause": message }));
                }
                (status, response)
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}
