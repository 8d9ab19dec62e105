// src/utils/error_helper.rs

//! エラーハンドリングの共通ヘルパー

use crate::error::AppError;
use tracing::{error, warn};
use validator::ValidationErrors;

/// validatorのValidationErrorsを `field: message` 形式のAppErrorに変換
pub fn convert_validation_errors(validation_errors: ValidationErrors, context: &str) -> AppError {
    warn!(
        context = %context,
        error_count = validation_errors.field_errors().len(),
        "Validation failed"
    );

    let mut errors: Vec<String> = validation_errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| "Invalid value".to_string(), |cow| cow.to_string());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    errors.sort();

    AppError::ValidationErrors(errors)
}

/// 単一フィールドのバリデーションエラー
pub fn validation_error(field: &str, message: &str) -> AppError {
    AppError::ValidationErrors(vec![format!("{}: {}", field, message)])
}

/// 重複エラーをログ付きで生成
pub fn conflict_error(message: &str, context: &str) -> AppError {
    warn!(context = %context, message = %message, "Conflict detected");
    AppError::Conflict(message.to_string())
}

/// リソース未検出エラーをログ付きで生成
pub fn not_found_error(resource: &str, id: impl std::fmt::Display, context: &str) -> AppError {
    warn!(context = %context, resource = %resource, id = %id, "Resource not found");
    AppError::NotFound(format!("{} with id {} not found", resource, id))
}

/// 権限エラーをログ付きで生成
pub fn forbidden_error(message: &str, context: &str) -> AppError {
    warn!(context = %context, message = %message, "Forbidden access attempt");
    AppError::Forbidden(message.to_string())
}

/// 認証エラーをログ付きで生成
pub fn unauthorized_error(message: &str, context: &str) -> AppError {
    warn!(context = %context, message = %message, "Unauthorized access attempt");
    AppError::Unauthorized(message.to_string())
}

/// 内部サーバーエラーをログ付きで生成
pub fn internal_server_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
) -> AppError {
    error!(
        error = %error,
        context = %context,
        "Internal server error occurred"
    );
    AppError::InternalServerError(format!("{} ({})", user_message, error))
}

/// 外部サービスエラーをログ付きで生成
pub fn external_service_error<E: std::fmt::Display>(
    error: E,
    context: &str,
    user_message: &str,
) -> AppError {
    error!(
        error = %error,
        context = %context,
        "External service error occurred"
    );
    AppError::ExternalServiceError(format!("{} ({})", user_message, error))
}
