// src/middleware/auth.rs

use crate::api::AppState;
use crate::config::AppConfig;
use crate::domain::user_model::UserClaims;
use crate::error::AppError;
use crate::logging::{RequestContext, ResolvedUserId};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};
use uuid::Uuid;

/// 認証済みユーザー情報を格納するエクステンション
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: UserClaims,
}

impl AuthenticatedUser {
    pub fn new(claims: UserClaims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> Uuid {
        self.claims.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.claims.role.is_admin()
    }
}

/// 管理者のみ通すエクストラクター
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl AdminUser {
    pub fn user_id(&self) -> Uuid {
        self.0.user_id()
    }
}

/// JWT認証ミドルウェア
///
/// トークン検証後にユーザーをDBから再取得するため、削除済みユーザーや
/// ロール変更は次のリクエストから反映される。
pub async fn jwt_auth_middleware(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let token = extract_bearer_token(&headers).ok_or_else(|| {
        warn!(path = %path, "Missing authentication token");
        AppError::Unauthorized("Authentication required".to_string())
    })?;

    let user = app_state.auth_service.authenticate(token).await?;
    let user_id = user.id;

    debug!(
        user_id = %user_id,
        role = %user.role,
        path = %path,
        "Authenticated request"
    );

    if let Some(context) = request.extensions_mut().get_mut::<RequestContext>() {
        context.user_id = Some(user_id);
    }
    request
        .extensions_mut()
        .insert(AuthenticatedUser::new(user.to_claims()));

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ResolvedUserId(user_id));
    Ok(response)
}

/// CORS 設定（`*` を含む場合は全オリジン許可）
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if config.cors_allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Authorization ヘッダーから Bearer トークンを抽出
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// --- Axum Extractors ---

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            warn!(
                user_id = %user.user_id(),
                path = %parts.uri.path(),
                "Access denied: Admin permission required"
            );
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminUser(user))
    }
}
