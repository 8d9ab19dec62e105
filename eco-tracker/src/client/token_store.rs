// src/client/token_store.rs

use super::error::{ClientError, ClientResult};
use super::session::Session;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// セッションの永続化先
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> ClientResult<Option<Session>>;

    async fn save(&self, session: &Session) -> ClientResult<()>;

    async fn clear(&self) -> ClientResult<()>;
}

/// プロセス内だけで保持するストア
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: RwLock<Option<Session>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> ClientResult<()> {
        *self.session.write().await = None;
        Ok(())
    }
}

/// JSONファイルに保存するストア（端末ローカル保存の代替）
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

fn storage_error(action: &str, e: impl std::fmt::Display) -> ClientError {
    ClientError::Storage(format!("failed to {}: {}", action, e))
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> ClientResult<Option<Session>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error("read session file", e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| storage_error("parse session file", e))
    }

    async fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create session directory", e))?;
        }

        let contents = serde_json::to_string_pretty(session)
            .map_err(|e| storage_error("serialize session", e))?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| storage_error("write session file", e))
    }

    async fn clear(&self) -> ClientResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("remove session file", e)),
        }
    }
}
