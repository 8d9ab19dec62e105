// src/utils/password.rs

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::env;
use thiserror::Error;

/// パスワード関連のエラー
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingError(#[from] argon2::password_hash::Error),

    #[error("Argon2 parameter error: {0}")]
    Argon2Error(#[from] argon2::Error),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Password configuration error: {0}")]
    ConfigurationError(String),
}

/// パスワード強度要件
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    /// 英字が必要
    pub require_letter: bool,
    /// 数字が必要
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_letter: true,
            require_digit: true,
        }
    }
}

impl PasswordPolicy {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> Self {
        let min_length = env::var("PASSWORD_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        let max_length = env::var("PASSWORD_MAX_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(128);

        Self {
            min_length,
            max_length,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), PasswordError> {
        if self.min_length < 4 {
            return Err(PasswordError::ConfigurationError(
                "Minimum password length must be at least 4".to_string(),
            ));
        }

        if self.max_length < self.min_length {
            return Err(PasswordError::ConfigurationError(
                "Maximum password length must be greater than minimum".to_string(),
            ));
        }

        Ok(())
    }
}

/// Argon2 設定
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// メモリコスト（KB）
    pub memory_cost: u32,
    /// 反復回数
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64MB
            time_cost: 3,
            parallelism: 4,
            output_length: 32,
        }
    }
}

impl Argon2Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: u32| -> u32 {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        Self {
            memory_cost: read("ARGON2_MEMORY_COST", defaults.memory_cost),
            time_cost: read("ARGON2_TIME_COST", defaults.time_cost),
            parallelism: read("ARGON2_PARALLELISM", defaults.parallelism),
            output_length: defaults.output_length,
        }
    }

    /// テスト用の軽量パラメータ
    pub fn for_testing() -> Self {
        Self {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
            output_length: 32,
        }
    }
}

/// パスワードハッシュマネージャー
pub struct PasswordManager {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
}

impl PasswordManager {
    pub fn new(argon2_config: Argon2Config, policy: PasswordPolicy) -> Result<Self, PasswordError> {
        policy.validate()?;

        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(
                argon2_config.memory_cost,
                argon2_config.time_cost,
                argon2_config.parallelism,
                Some(argon2_config.output_length),
            )
            .map_err(PasswordError::Argon2Error)?,
        );

        Ok(Self { argon2, policy })
    }

    /// パスワードをハッシュ化（強度チェック込み）
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.validate_password_strength(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::HashingError)?;

        Ok(password_hash.to_string())
    }

    /// パスワードを検証
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(PasswordError::HashingError)?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::HashingError(e)),
        }
    }

    /// パスワード強度をチェック
    pub fn validate_password_strength(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();

        if length < self.policy.min_length {
            return Err(PasswordError::WeakPassword(format!(
                "Password must be at least {} characters long",
                self.policy.min_length
            )));
        }

        if length > self.policy.max_length {
            return Err(PasswordError::WeakPassword(format!(
                "Password must not exceed {} characters",
                self.policy.max_length
            )));
        }

        if self.policy.require_letter && !password.chars().any(|c| c.is_alphabetic()) {
            return Err(PasswordError::WeakPassword(
                "Password must contain at least one letter".to_string(),
            ));
        }

        if self.policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordError::WeakPassword(
                "Password must contain at least one digit".to_string(),
            ));
        }

        Ok(())
    }
}
