// src/service/auth_service.rs

use crate::api::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::config::InitialAdminConfig;
use crate::db::DbPool;
use crate::domain::user_model;
use crate::domain::user_role::UserRole;
use crate::error::{AppError, AppResult};
use crate::repository::user_repository::{CreateUser, UserRepository};
use crate::utils::error_helper::{
    conflict_error, convert_validation_errors, internal_server_error, unauthorized_error,
    validation_error,
};
use crate::utils::jwt::{JwtError, JwtManager};
use crate::utils::password::{PasswordError, PasswordManager};
use sea_orm::{DbErr, SqlErr};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

pub struct AuthService {
    user_repo: Arc<UserRepository>,
    password_manager: Arc<PasswordManager>,
    jwt_manager: Arc<JwtManager>,
}

impl AuthService {
    pub fn new(
        db_pool: DbPool,
        password_manager: Arc<PasswordManager>,
        jwt_manager: Arc<JwtManager>,
    ) -> Self {
        Self {
            user_repo: Arc::new(UserRepository::new(db_pool)),
            password_manager,
            jwt_manager,
        }
    }

    /// ユーザー登録
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "auth_service::register"))?;

        let email = normalize_email(&request.email);
        let username = request.username.trim().to_string();
        let name = request
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if self.user_repo.is_email_taken(&email, None).await? {
            return Err(conflict_error(
                "Email address is already registered",
                "auth_service::register::email_check",
            ));
        }

        if self.user_repo.is_username_taken(&username, None).await? {
            return Err(conflict_error(
                "Username is already taken",
                "auth_service::register::username_check",
            ));
        }

        let password_hash = self.hash_password(&request.password)?;

        let user = self
            .user_repo
            .create(CreateUser {
                email,
                username,
                password_hash,
                name,
                role: UserRole::Reporter,
            })
            .await
            .map_err(map_unique_violation)?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        self.auth_response(user)
    }

    /// ログイン（メールアドレスまたはユーザー名）
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        request
            .validate()
            .map_err(|e| convert_validation_errors(e, "auth_service::login"))?;

        let identifier = request.email.trim();
        let Some(user) = self.user_repo.find_by_email_or_username(identifier).await? else {
            return Err(unauthorized_error(
                "Invalid credentials",
                "auth_service::login::unknown_user",
            ));
        };

        let password_ok = self
            .password_manager
            .verify_password(&request.password, &user.password_hash)
            .map_err(|e| {
                internal_server_error(e, "auth_service::login", "Failed to verify password")
            })?;

        if !password_ok {
            return Err(unauthorized_error(
                "Invalid credentials",
                "auth_service::login::wrong_password",
            ));
        }

        info!(user_id = %user.id, "User logged in");

        self.auth_response(user)
    }

    /// トークンを検証し、対応するユーザーを取得
    pub async fn authenticate(&self, token: &str) -> AppResult<user_model::Model> {
        let claims = self.jwt_manager.verify_access_token(token).map_err(|e| match e {
            JwtError::TokenExpired => AppError::Unauthorized("Token has expired".to_string()),
            _ => AppError::Unauthorized("Invalid token".to_string()),
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        self.user_repo.find_by_id(user_id).await?.ok_or_else(|| {
            unauthorized_error(
                "User no longer exists",
                "auth_service::authenticate::user_lookup",
            )
        })
    }

    /// 起動時に初期管理者を用意する（既存ユーザーなら管理者に昇格）
    pub async fn ensure_initial_admin(&self, admin: &InitialAdminConfig) -> AppResult<()> {
        let email = normalize_email(&admin.email);

        if let Some(user) = self.user_repo.find_by_email(&email).await? {
            if !user.is_admin() {
                self.user_repo.update_role(user.id, UserRole::Admin).await?;
                info!(user_id = %user.id, "Existing user promoted to admin");
            }
            return Ok(());
        }

        let password_hash = self.hash_password(&admin.password)?;
        let user = self
            .user_repo
            .create(CreateUser {
                email,
                username: admin.username.clone(),
                password_hash,
                name: None,
                role: UserRole::Admin,
            })
            .await
            .map_err(map_unique_violation)?;

        info!(user_id = %user.id, "Initial admin account created");
        Ok(())
    }

    fn hash_password(&self, password: &str) -> AppResult<String> {
        self.password_manager
            .hash_password(password)
            .map_err(|e| match e {
                PasswordError::WeakPassword(message) => validation_error("password", &message),
                other => internal_server_error(
                    other,
                    "auth_service::hash_password",
                    "Failed to process password",
                ),
            })
    }

    fn auth_response(&self, user: user_model::Model) -> AppResult<AuthResponse> {
        let token = self
            .jwt_manager
            .generate_access_token(user.to_claims())
            .map_err(|e| {
                internal_server_error(e, "auth_service::auth_response", "Failed to issue token")
            })?;

        Ok(AuthResponse {
            token,
            user: user.to_safe_user(),
        })
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 一意制約違反を 409 に変換
pub(crate) fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            warn!(detail = %detail, "Unique constraint violation");
            AppError::Conflict("Email address or username is already in use".to_string())
        }
        _ => AppError::DbErr(err),
    }
}
