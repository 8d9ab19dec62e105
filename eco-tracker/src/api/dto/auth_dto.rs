// src/api/dto/auth_dto.rs

use crate::domain::user_model::SafeUser;
use crate::utils::validation::{self, password, username};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// ユーザー登録リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(
            min = username::MIN_LENGTH,
            max = username::MAX_LENGTH,
            message = "Username must be between 3 and 30 characters"
        ),
        custom(function = validation::validate_username)
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(
        length(
            min = password::MIN_LENGTH,
            max = password::MAX_LENGTH,
            message = "Password must be between 8 and 128 characters"
        ),
        custom(function = validation::validate_password_strength)
    )]
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,
}

/// ログインリクエスト（email にはユーザー名も指定可）
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// 登録・ログインのレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: SafeUser,
}
