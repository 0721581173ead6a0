// service/document_storage.rs
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::Config, db::StoreError};

/// Handle to a document pushed to durable object storage. The URL is stable
/// and is what gets persisted in profile and request rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredDocument {
    pub object_id: String,
    pub url: String,
}

/// Object-storage upload capability. Uploads happen synchronously, before
/// the referencing database write; a crash in between orphans the stored
/// object, which is an accepted storage leak, not a state-machine violation.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn upload_document(
        &self,
        file_name: &str,
        content_base64: &str,
    ) -> Result<StoredDocument, StoreError>;
}

/// HTTP client for the platform's object-storage collaborator.
pub struct HttpDocumentStorage {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl HttpDocumentStorage {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.object_storage_url.clone(),
            bucket: config.object_storage_bucket.clone(),
        }
    }
}

#[async_trait]
impl DocumentStorage for HttpDocumentStorage {
    async fn upload_document(
        &self,
        file_name: &str,
        content_base64: &str,
    ) -> Result<StoredDocument, StoreError> {
        let bytes = BASE64
            .decode(content_base64)
            .map_err(|e| StoreError::Unavailable(format!("document payload decode: {}", e)))?;

        let object_id = format!("{}-{}", Uuid::new_v4(), file_name);
        let url = format!("{}/{}/{}", self.base_url, self.bucket, object_id);

        let response = self
            .client
            .put(&url)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(format!("object storage: {}", e)))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "object storage returned {}",
                response.status()
            )));
        }

        Ok(StoredDocument { object_id, url })
    }
}
