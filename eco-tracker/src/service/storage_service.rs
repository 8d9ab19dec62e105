// src/service/storage_service.rs

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, Config};
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::utils::error_helper::{external_service_error, internal_server_error};

/// ストレージプロバイダーの種類
#[derive(Debug, Clone, PartialEq)]
pub enum StorageProvider {
    /// ローカルディスク（`/uploads` で配信）
    Local,
    /// S3互換オブジェクトストレージ（MinIO, R2 など）
    S3,
}

impl StorageProvider {
    pub fn from_env() -> Self {
        match std::env::var("STORAGE_PROVIDER")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "s3" | "minio" | "r2" => Self::S3,
            _ => Self::Local,
        }
    }
}

/// ストレージサービスのトレイト定義
#[async_trait]
pub trait StorageService: Send + Sync {
    /// 画像をアップロードし、公開URIを返す
    async fn upload(&self, file_data: Vec<u8>, content_type: &str) -> AppResult<String>;

    /// 公開URIで示されるファイルを削除
    async fn delete(&self, uri: &str) -> AppResult<()>;

    /// このストレージが発行したURIか
    fn owns(&self, uri: &str) -> bool;
}

/// ストレージ設定
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub upload_dir: PathBuf,
    pub public_upload_path: String,
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_url: Option<String>,
}

impl StorageConfig {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> AppResult<Self> {
        let provider = StorageProvider::from_env();
        tracing::info!("Storage provider: {:?}", provider);

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
        let public_upload_path =
            std::env::var("PUBLIC_UPLOAD_PATH").unwrap_or_else(|_| "/uploads".to_string());

        if provider == StorageProvider::Local {
            return Ok(Self::local(upload_dir, public_upload_path));
        }

        let required = |key: &str| {
            std::env::var(key)
                .map_err(|_| AppError::InternalServerError(format!("{} not set", key)))
        };

        Ok(Self {
            provider,
            upload_dir,
            public_upload_path,
            endpoint: required("STORAGE_ENDPOINT")?,
            bucket: required("STORAGE_BUCKET")?,
            region: required("STORAGE_REGION")?,
            access_key: required("STORAGE_ACCESS_KEY")?,
            secret_key: required("STORAGE_SECRET_KEY")?,
            public_url: std::env::var("STORAGE_PUBLIC_URL").ok(),
        })
    }

    /// ローカルディスク用の設定
    pub fn local(upload_dir: impl Into<PathBuf>, public_upload_path: impl Into<String>) -> Self {
        Self {
            provider: StorageProvider::Local,
            upload_dir: upload_dir.into(),
            public_upload_path: public_upload_path.into(),
            endpoint: String::new(),
            bucket: String::new(),
            region: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            public_url: None,
        }
    }
}

/// 画像ファイル用のストレージキーを生成
fn generate_image_key(content_type: &str) -> String {
    format!(
        "incidents/{}/{}.{}",
        Utc::now().format("%Y/%m"),
        Uuid::new_v4(),
        extension_for(content_type)
    )
}

/// Content-Type からファイル拡張子を決定
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type.parse::<mime::Mime>() {
        Ok(m) if m == mime::IMAGE_JPEG => "jpg",
        Ok(m) if m == mime::IMAGE_PNG => "png",
        Ok(m) if m == mime::IMAGE_GIF => "gif",
        Ok(m) if m == mime::IMAGE_BMP => "bmp",
        Ok(m) if m.type_() == mime::IMAGE => match m.subtype().as_str() {
            "webp" => "webp",
            "heic" => "heic",
            "heif" => "heif",
            _ => "img",
        },
        _ => "bin",
    }
}

/// ローカルディスクへの保存
pub struct LocalStorageService {
    root: PathBuf,
    public_path: String,
}

impl LocalStorageService {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.upload_dir.clone(),
            public_path: config.public_upload_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 公開URIからディスク上のパスを解決（ルート外を指すものは拒否）
    fn resolve(&self, uri: &str) -> Option<PathBuf> {
        let key = uri.strip_prefix(&self.public_path)?.trim_start_matches('/');
        let relative = Path::new(key);
        if key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn upload(&self, file_data: Vec<u8>, content_type: &str) -> AppResult<String> {
        let key = generate_image_key(content_type);
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                internal_server_error(
                    e,
                    "local_storage_service::upload",
                    "Failed to prepare upload directory",
                )
            })?;
        }

        tokio::fs::write(&path, file_data).await.map_err(|e| {
            internal_server_error(e, "local_storage_service::upload", "Failed to store file")
        })?;

        Ok(format!("{}/{}", self.public_path, key))
    }

    async fn delete(&self, uri: &str) -> AppResult<()> {
        let Some(path) = self.resolve(uri) else {
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(internal_server_error(
                e,
                "local_storage_service::delete",
                "Failed to delete file",
            )),
        }
    }

    fn owns(&self, uri: &str) -> bool {
        self.resolve(uri).is_some()
    }
}

/// S3互換ストレージサービスの実装
pub struct S3StorageService {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3StorageService {
    pub fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "storage_service",
        );

        let s3_config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let public_base_url = config
            .public_url
            .clone()
            .unwrap_or_else(|| format!("{}/{}", config.endpoint.trim_end_matches('/'), config.bucket));

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn key_for(&self, uri: &str) -> Option<String> {
        uri.strip_prefix(&self.public_base_url)
            .map(|key| key.trim_start_matches('/').to_string())
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload(&self, file_data: Vec<u8>, content_type: &str) -> AppResult<String> {
        let key = generate_image_key(content_type);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file_data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                external_service_error(e, "s3_storage_service::upload", "Failed to upload file")
            })?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }

    async fn delete(&self, uri: &str) -> AppResult<()> {
        let Some(key) = self.key_for(uri) else {
            return Ok(());
        };

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                external_service_error(e, "s3_storage_service::delete", "Failed to delete file")
            })?;

        Ok(())
    }

    fn owns(&self, uri: &str) -> bool {
        self.key_for(uri).is_some()
    }
}

/// ストレージサービスのファクトリ関数
pub fn create_storage_service(config: &StorageConfig) -> Arc<dyn StorageService> {
    match config.provider {
        StorageProvider::Local => Arc::new(LocalStorageService::new(config)),
        StorageProvider::S3 => Arc::new(S3StorageService::new(config)),
    }
}
