use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use super::{Document, DocumentList, DocumentStore, Query, StoreError};
use crate::models::timestamp;

type CollectionKey = (String, String);

/// In-process document store.
///
/// Documents are kept per (database, collection) in insertion order. System
/// attributes mirror what the hosted service returns so callers see the same
/// shape from either backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<CollectionKey, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(database_id: &str, collection_id: &str) -> CollectionKey {
        (database_id.to_string(), collection_id.to_string())
    }

    /// Number of documents in a collection
    pub async fn len(&self, database_id: &str, collection_id: &str) -> usize {
        let collections = self.collections.read().await;
        collections
            .get(&Self::key(database_id, collection_id))
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        mut data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(Self::key(database_id, collection_id)).or_default();

        if documents.iter().any(|d| d.id == document_id) {
            return Err(StoreError::Conflict(document_id.to_string()));
        }

        let now = timestamp();
        data.insert("$databaseId".to_string(), json!(database_id));
        data.insert("$collectionId".to_string(), json!(collection_id));
        data.insert("$createdAt".to_string(), json!(now));
        data.insert("$updatedAt".to_string(), json!(now));
        data.insert("$permissions".to_string(), json!([]));

        let document = Document {
            id: document_id.to_string(),
            data,
        };
        documents.push(document.clone());

        Ok(document)
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError> {
        let collections = self.collections.read().await;
        let documents: Vec<Document> = collections
            .get(&Self::key(database_id, collection_id))
            .map(|docs| {
                docs.iter()
                    .filter(|d| queries.iter().all(|q| q.matches(d)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(&Self::key(database_id, collection_id))
            .and_then(|docs| docs.iter().find(|d| d.id == document_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(&Self::key(database_id, collection_id))
            .and_then(|docs| docs.iter_mut().find(|d| d.id == document_id))
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))?;

        for (attribute, value) in data {
            // System attributes are owned by the store
            if attribute.starts_with('$') {
                continue;
            }
            document.data.insert(attribute, value);
        }
        document.data.insert("$updatedAt".to_string(), json!(timestamp()));

        Ok(document.clone())
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections
            .get_mut(&Self::key(database_id, collection_id))
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))?;

        let position = documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| StoreError::NotFound(document_id.to_string()))?;
        documents.remove(position);

        Ok(())
    }
}
