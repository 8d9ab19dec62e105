// src/utils/validation.rs

//! 共通バリデーション定数と関数

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// ユーザー名の制約
pub mod username {
    pub const MIN_LENGTH: u64 = 3;
    pub const MAX_LENGTH: u64 = 30;
}

/// パスワードの制約
pub mod password {
    pub const MIN_LENGTH: u64 = 8;
    pub const MAX_LENGTH: u64 = 128;
}

/// インシデント関連の制約
pub mod incident {
    pub const TITLE_MAX_LENGTH: usize = 200;
    pub const DESCRIPTION_MAX_LENGTH: usize = 2000;
    pub const MAX_IMAGES: usize = 10;
    /// アップロード画像1枚あたりの上限（5MB）
    pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
}

/// ユーザー名の正規表現パターン
pub static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid username regex"));

/// ユーザー名の形式をバリデーション
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if !USERNAME_REGEX.is_match(username) {
        let mut error = ValidationError::new("invalid_username_format");
        error.message = Some(
            "Username may only contain letters, numbers, underscores and hyphens".into(),
        );
        return Err(error);
    }
    Ok(())
}

/// パスワードに英字と数字が含まれているか
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        let mut error = ValidationError::new("weak_password");
        error.message = Some("Password must contain at least one letter and one digit".into());
        return Err(error);
    }

    Ok(())
}

/// 空白のみの文字列を拒否
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Must not be blank".into());
        return Err(error);
    }
    Ok(())
}
