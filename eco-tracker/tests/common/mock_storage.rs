// tests/common/mock_storage.rs

use async_trait::async_trait;
use eco_tracker::error::AppResult;
use eco_tracker::service::storage_service::{extension_for, StorageService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const MOCK_PREFIX: &str = "mock://incidents/";

/// テスト用のモックストレージサービス
#[derive(Clone, Default)]
pub struct MockStorageService {
    storage: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_count(&self) -> usize {
        self.storage.lock().unwrap().len()
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.storage.lock().unwrap().contains_key(uri)
    }

    pub fn content_type_of(&self, uri: &str) -> Option<String> {
        self.storage
            .lock()
            .unwrap()
            .get(uri)
            .map(|(_, content_type)| content_type.clone())
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn upload(&self, file_data: Vec<u8>, content_type: &str) -> AppResult<String> {
        let uri = format!(
            "{}{}.{}",
            MOCK_PREFIX,
            Uuid::new_v4(),
            extension_for(content_type)
        );
        self.storage
            .lock()
            .unwrap()
            .insert(uri.clone(), (file_data, content_type.to_string()));
        Ok(uri)
    }

    async fn delete(&self, uri: &str) -> AppResult<()> {
        self.storage.lock().unwrap().remove(uri);
        Ok(())
    }

    fn owns(&self, uri: &str) -> bool {
        uri.starts_with(MOCK_PREFIX)
    }
}
