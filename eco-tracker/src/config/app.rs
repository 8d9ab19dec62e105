// src/config/app.rs

use crate::service::storage_service::StorageConfig;
use crate::utils::jwt::JwtConfig;
use crate::utils::password::{Argon2Config, PasswordPolicy};
use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// リクエストボディの上限（バイト）
    pub body_limit: usize,
    /// 500系レスポンスに内部情報を含めるか
    pub expose_error_details: bool,
}

#[derive(Clone, Debug)]
pub struct PasswordConfig {
    pub argon2: Argon2Config,
    pub policy: PasswordPolicy,
}

/// 起動時に作成する管理者アカウント
#[derive(Clone, Debug)]
pub struct InitialAdminConfig {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub database_url: String,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub initial_admin: Option<InitialAdminConfig>,
}

const DEFAULT_BODY_LIMIT: usize = 25 * 1024 * 1024; // 25MB

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn cors_origins_from_env() -> Vec<String> {
    env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8081,http://localhost:19006".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok(); // .env が無くてもエラーにしない

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let is_development = environment == "development";

        let jwt = JwtConfig::from_env().map_err(|e| e.to_string())?;
        jwt.validate().map_err(|e| e.to_string())?;

        let initial_admin = match (
            env::var("INITIAL_ADMIN_EMAIL"),
            env::var("INITIAL_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(InitialAdminConfig {
                username: env::var("INITIAL_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| "Invalid PORT value")?,
            cors_allowed_origins: cors_origins_from_env(),
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            jwt,
            password: PasswordConfig {
                argon2: Argon2Config::from_env(),
                policy: PasswordPolicy::from_env(),
            },
            server: ServerConfig {
                body_limit: env::var("BODY_LIMIT_BYTES")
                    .ok()
                    .map(|v| v.parse().map_err(|_| "Invalid BODY_LIMIT_BYTES value"))
                    .transpose()?
                    .unwrap_or(DEFAULT_BODY_LIMIT),
                expose_error_details: env::var("EXPOSE_ERROR_DETAILS")
                    .map(|v| parse_bool(&v))
                    .unwrap_or(is_development),
            },
            storage: StorageConfig::from_env().map_err(|e| e.to_string())?,
            initial_admin,
            environment,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_test(&self) -> bool {
        self.environment == "test"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        let upload_dir = env::temp_dir().join("eco-tracker-test-uploads");

        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["http://localhost:8081".to_string()],
            database_url: "sqlite::memory:".to_string(),
            jwt: JwtConfig {
                secret_key: "test-secret-key-that-is-at-least-32-characters-long".to_string(),
                ..JwtConfig::default()
            },
            password: PasswordConfig {
                argon2: Argon2Config::for_testing(),
                policy: PasswordPolicy::default(),
            },
            server: ServerConfig {
                body_limit: DEFAULT_BODY_LIMIT,
                expose_error_details: true,
            },
            storage: StorageConfig::local(upload_dir, "/uploads"),
            initial_admin: None,
        }
    }
}
