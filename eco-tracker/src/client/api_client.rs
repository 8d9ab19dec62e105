// src/client/api_client.rs

use super::error::{ClientError, ClientResult};
use super::session::Session;
use super::token_store::TokenStore;
use crate::api::dto::auth_dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::api::dto::incident_dto::{
    AdminIncidentDto, AdminIncidentQuery, CreateIncidentRequest, DeleteIncidentResponse,
    IncidentDto, NearbyIncidentDto, RecentIncidentDto, UpdateStatusRequest,
};
use crate::api::dto::user_dto::{
    ChangePasswordRequest, DeleteAccountResponse, LeaderboardEntry, MessageResponse,
    UpdateProfileRequest, UserStatistics,
};
use crate::domain::incident_status::IncidentStatus;
use crate::domain::user_model::SafeUser;
use crate::types::ApiResponse;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// 投稿に添付する画像
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    /// トークンが無ければ送信前に失敗
    Required,
    /// あれば付与
    Optional,
}

/// EcoTracker API クライアント
pub struct ApiClient<S: TokenStore> {
    http: Client,
    base_url: String,
    store: S,
}

impl<S: TokenStore> ApiClient<S> {
    /// `base_url` は `/api` を含まないサーバーのルート
    pub fn new(base_url: impl Into<String>, store: S) -> ClientResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|source| ClientError::Transport {
                action: "build HTTP client".to_string(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 保存済みセッション
    pub async fn session(&self) -> ClientResult<Option<Session>> {
        self.store.load().await
    }

    // --- 認証 ---

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<Session> {
        let builder = self.http.post(self.url("/auth/register")).json(request);
        let response: AuthResponse = self.fetch_json(builder, Auth::Optional, "register").await?;
        self.persist(response).await
    }

    /// `identifier` はメールアドレスまたはユーザー名
    pub async fn login(&self, identifier: &str, password: &str) -> ClientResult<Session> {
        let request = LoginRequest {
            email: identifier.to_string(),
            password: password.to_string(),
        };
        let builder = self.http.post(self.url("/auth/login")).json(&request);
        let response: AuthResponse = self.fetch_json(builder, Auth::Optional, "log in").await?;
        self.persist(response).await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.store.clear().await
    }

    // --- インシデント ---

    /// 添付画像があればマルチパート、無ければJSONで送信
    pub async fn create_incident(
        &self,
        request: &CreateIncidentRequest,
        attachments: Vec<ImageAttachment>,
    ) -> ClientResult<IncidentDto> {
        let builder = self.http.post(self.url("/incidents"));
        let builder = if attachments.is_empty() {
            builder.json(request)
        } else {
            builder.multipart(incident_form(request, attachments)?)
        };
        self.fetch_data(builder, Auth::Required, "create incident")
            .await
    }

    pub async fn list_my_incidents(&self) -> ClientResult<Vec<IncidentDto>> {
        let builder = self.http.get(self.url("/incidents"));
        self.fetch_data(builder, Auth::Required, "fetch incidents")
            .await
    }

    pub async fn get_incident(&self, id: Uuid) -> ClientResult<IncidentDto> {
        let builder = self.http.get(self.url(&format!("/incidents/{}", id)));
        self.fetch_data(builder, Auth::Required, "fetch incident")
            .await
    }

    pub async fn list_recent_incidents(&self) -> ClientResult<Vec<RecentIncidentDto>> {
        let builder = self.http.get(self.url("/incidents/recent"));
        self.fetch_data(builder, Auth::Optional, "fetch recent incidents")
            .await
    }

    pub async fn list_nearby_incidents(
        &self,
        longitude: f64,
        latitude: f64,
        radius_km: Option<f64>,
    ) -> ClientResult<Vec<NearbyIncidentDto>> {
        let mut query = vec![("lng", longitude.to_string()), ("lat", latitude.to_string())];
        if let Some(radius_km) = radius_km {
            query.push(("radiusKm", radius_km.to_string()));
        }
        let builder = self.http.get(self.url("/incidents/nearby")).query(&query);
        self.fetch_data(builder, Auth::Required, "fetch nearby incidents")
            .await
    }

    pub async fn list_all_incidents(
        &self,
        query: &AdminIncidentQuery,
    ) -> ClientResult<Vec<AdminIncidentDto>> {
        let builder = self.http.get(self.url("/incidents/admin/all")).query(query);
        self.fetch_data(builder, Auth::Required, "fetch all incidents")
            .await
    }

    pub async fn update_incident_status(
        &self,
        id: Uuid,
        status: IncidentStatus,
    ) -> ClientResult<IncidentDto> {
        let request = UpdateStatusRequest {
            status: status.to_string(),
        };
        let builder = self
            .http
            .patch(self.url(&format!("/incidents/{}/status", id)))
            .json(&request);
        self.fetch_data(builder, Auth::Required, "update incident status")
            .await
    }

    pub async fn delete_incident(&self, id: Uuid) -> ClientResult<DeleteIncidentResponse> {
        let builder = self.http.delete(self.url(&format!("/incidents/{}", id)));
        self.fetch_data(builder, Auth::Required, "delete incident")
            .await
    }

    // --- ユーザー ---

    pub async fn get_profile(&self) -> ClientResult<SafeUser> {
        let builder = self.http.get(self.url("/users/profile"));
        self.fetch_data(builder, Auth::Required, "fetch profile")
            .await
    }

    /// 更新後のユーザー情報で保存済みセッションも差し替える
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<SafeUser> {
        let builder = self.http.put(self.url("/users/profile")).json(request);
        let user: SafeUser = self
            .fetch_data(builder, Auth::Required, "update profile")
            .await?;

        if let Some(session) = self.store.load().await? {
            self.store
                .save(&Session {
                    token: session.token,
                    user: user.clone(),
                })
                .await?;
        }

        Ok(user)
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> ClientResult<MessageResponse> {
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let builder = self.http.put(self.url("/users/password")).json(&request);
        self.fetch_data(builder, Auth::Required, "change password")
            .await
    }

    /// サーバーが削除を確認してからローカルのセッションを消す
    pub async fn delete_account(&self) -> ClientResult<DeleteAccountResponse> {
        let builder = self.http.delete(self.url("/users/profile"));
        let response: DeleteAccountResponse = self
            .fetch_data(builder, Auth::Required, "delete account")
            .await?;
        self.store.clear().await?;
        Ok(response)
    }

    pub async fn get_leaderboard(&self) -> ClientResult<Vec<LeaderboardEntry>> {
        let builder = self.http.get(self.url("/users/leaderboard"));
        self.fetch_data(builder, Auth::Required, "fetch leaderboard")
            .await
    }

    pub async fn get_statistics(&self) -> ClientResult<UserStatistics> {
        let builder = self.http.get(self.url("/users/statistics"));
        self.fetch_data(builder, Auth::Required, "fetch statistics")
            .await
    }

    // --- 内部ヘルパー ---

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn persist(&self, response: AuthResponse) -> ClientResult<Session> {
        let session = Session {
            token: response.token,
            user: response.user,
        };
        self.store.save(&session).await?;
        Ok(session)
    }

    async fn execute(
        &self,
        builder: RequestBuilder,
        auth: Auth,
        action: &str,
    ) -> ClientResult<Response> {
        let builder = match (self.store.load().await?, auth) {
            (Some(session), _) => builder.bearer_auth(session.token),
            (None, Auth::Required) => return Err(ClientError::NotAuthenticated),
            (None, Auth::Optional) => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                action: action.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), action = %action, "API request failed");

        Err(ClientError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        auth: Auth,
        action: &str,
    ) -> ClientResult<T> {
        self.execute(builder, auth, action)
            .await?
            .json::<T>()
            .await
            .map_err(|source| ClientError::Transport {
                action: action.to_string(),
                source,
            })
    }

    /// `ApiResponse` エンベロープから `data` を取り出す
    async fn fetch_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        auth: Auth,
        action: &str,
    ) -> ClientResult<T> {
        let envelope: ApiResponse<T> = self.fetch_json(builder, auth, action).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::InvalidResponse(format!("{}: response has no data", action)))
    }
}

fn incident_form(
    request: &CreateIncidentRequest,
    attachments: Vec<ImageAttachment>,
) -> ClientResult<multipart::Form> {
    let payload = serde_json::to_string(request)
        .map_err(|e| ClientError::InvalidResponse(format!("failed to encode incident: {}", e)))?;

    let mut form = multipart::Form::new().text("payload", payload);
    for attachment in attachments {
        let part = multipart::Part::bytes(attachment.data)
            .file_name(attachment.file_name)
            .mime_str(&attachment.content_type)
            .map_err(|source| ClientError::Transport {
                action: "attach image".to_string(),
                source,
            })?;
        form = form.part("images", part);
    }
    Ok(form)
}

/// エラーボディから表示用メッセージを取り出す（`error` → `message` → 本文）
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["error", "message"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
    });

    from_json
        .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        })
}
