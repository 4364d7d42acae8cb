//! Document store access.
//!
//! Notes live in an external document database addressed by database id,
//! collection id and document id. `DocumentStore` is the seam between the
//! note service and that database; `AppwriteStore` talks to the real service
//! over REST and `MemoryStore` keeps everything in process for development
//! and tests.

pub mod appwrite;
pub mod memory;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{StoreBackend, StoreConfig};

pub use appwrite::AppwriteStore;
pub use memory::MemoryStore;
pub use query::Query;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    Conflict(String),

    #[error("Store rejected request ({code} {kind}): {message}")]
    Api {
        code: u16,
        kind: String,
        message: String,
    },

    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid store credentials: {0}")]
    InvalidCredentials(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Malformed store payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A stored document: its id plus every other attribute the store returned,
/// system attributes (`$createdAt`, `$collectionId`, ...) included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Document {
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.data.get(attribute)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, StoreError>;

    /// Overwrites the attributes present in `data`; other attributes keep their values.
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError>;

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), StoreError>;
}

/// Fresh document id: 32 lowercase hex characters.
pub fn unique_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Build the store selected by configuration.
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Appwrite => Ok(Arc::new(AppwriteStore::new(
            &config.endpoint,
            &config.project_id,
            &config.api_key,
        )?)),
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
