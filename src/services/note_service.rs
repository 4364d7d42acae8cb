use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{timestamp, Note, NotePayload};
use crate::store::{unique_id, DocumentStore, Query, StoreError};

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("{message}")]
    Validation {
        message: String,
        missing: Vec<&'static str>,
    },

    #[error("Note {note_id} is owned by {owner}")]
    Forbidden { note_id: String, owner: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Stored note is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Owner-scoped note operations over a document store collection.
///
/// Update and delete fetch the note first and compare owners; the fetch and
/// the mutation are separate store calls.
pub struct NoteService {
    store: Arc<dyn DocumentStore>,
    database_id: String,
    collection_id: String,
}

impl NoteService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        database_id: impl Into<String>,
        collection_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            database_id: database_id.into(),
            collection_id: collection_id.into(),
        }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub async fn create(&self, user_id: &str, payload: NotePayload) -> Result<Note, NoteError> {
        let missing = payload.missing_required();
        if !missing.is_empty() {
            return Err(NoteError::Validation {
                message: "Title and description are required.".to_string(),
                missing,
            });
        }

        let now = timestamp();
        let mut data = Map::new();
        data.insert("title".to_string(), payload.title.map_or(Value::Null, Value::String));
        data.insert("content".to_string(), payload.content.map_or(Value::Null, Value::String));
        data.insert(
            "description".to_string(),
            payload.description.map_or(Value::Null, Value::String),
        );
        data.insert("userId".to_string(), Value::String(user_id.to_string()));
        data.insert("createdAt".to_string(), Value::String(now.clone()));
        data.insert("updatedAt".to_string(), Value::String(now));

        let document = self
            .store
            .create_document(&self.database_id, &self.collection_id, &unique_id(), data)
            .await?;

        tracing::info!("Created note {} for {}", document.id, user_id);
        Ok(Note::try_from(document)?)
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<Note>, NoteError> {
        let list = self
            .store
            .list_documents(
                &self.database_id,
                &self.collection_id,
                &[Query::equal("userId", user_id)],
            )
            .await?;

        tracing::debug!("Fetched {} notes for {}", list.documents.len(), user_id);
        list.documents
            .into_iter()
            .map(|d| Note::try_from(d).map_err(NoteError::from))
            .collect()
    }

    pub async fn update(&self, user_id: &str, note_id: &str, payload: NotePayload) -> Result<Note, NoteError> {
        self.fetch_owned(user_id, note_id).await?;

        let data = payload.into_update(&timestamp());
        let document = self
            .store
            .update_document(&self.database_id, &self.collection_id, note_id, data)
            .await?;

        tracing::info!("Updated note {} for {}", note_id, user_id);
        Ok(Note::try_from(document)?)
    }

    pub async fn delete(&self, user_id: &str, note_id: &str) -> Result<(), NoteError> {
        self.fetch_owned(user_id, note_id).await?;

        self.store
            .delete_document(&self.database_id, &self.collection_id, note_id)
            .await?;

        tracing::info!("Deleted note {} for {}", note_id, user_id);
        Ok(())
    }

    /// Fetch a note and check that `user_id` owns it.
    async fn fetch_owned(&self, user_id: &str, note_id: &str) -> Result<Note, NoteError> {
        let document = self
            .store
            .get_document(&self.database_id, &self.collection_id, note_id)
            .await?;
        let note = Note::try_from(document)?;

        if !note.is_owned_by(user_id) {
            return Err(NoteError::Forbidden {
                note_id: note_id.to_string(),
                owner: note.user_id,
            });
        }

        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::FailingStore;

    fn payload(title: &str, content: Option<&str>, description: &str) -> NotePayload {
        NotePayload {
            title: Some(title.to_string()),
            content: content.map(str::to_string),
            description: Some(description.to_string()),
        }
    }

    fn service(store: MemoryStore) -> NoteService {
        NoteService::new(Arc::new(store), "db", "notes")
    }

    #[tokio::test]
    async fn create_stamps_owner_and_timestamps() {
        let svc = service(MemoryStore::new());

        let note = svc.create("u1", payload("A", None, "d")).await.unwrap();

        assert_eq!(note.user_id, "u1");
        assert_eq!(note.title.as_deref(), Some("A"));
        assert_eq!(note.content, None);
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.id.len(), 32);
    }

    #[tokio::test]
    async fn create_without_description_persists_nothing() {
        let store = MemoryStore::new();
        let svc = service(store.clone());

        let err = svc
            .create("u1", NotePayload { title: Some("A".to_string()), ..Default::default() })
            .await
            .unwrap_err();

        assert!(matches!(err, NoteError::Validation { ref missing, .. } if missing == &vec!["description"]));
        assert_eq!(store.len("db", "notes").await, 0);
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let svc = service(MemoryStore::new());
        let mine = svc.create("u1", payload("A", Some("c"), "d")).await.unwrap();
        svc.create("u2", payload("B", None, "d")).await.unwrap();

        let notes = svc.list("u1").await.unwrap();
        assert_eq!(notes, vec![mine]);
        assert!(svc.list("u3").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_by_other_user_is_refused() {
        let svc = service(MemoryStore::new());
        let note = svc.create("u1", payload("A", None, "d")).await.unwrap();

        let err = svc.update("u2", &note.id, payload("X", None, "x")).await.unwrap_err();
        assert!(matches!(err, NoteError::Forbidden { ref owner, .. } if owner == "u1"));

        assert_eq!(svc.list("u1").await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn update_overwrites_content_fields() {
        let svc = service(MemoryStore::new());
        let note = svc.create("u1", payload("A", Some("old"), "d")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = svc
            .update("u1", &note.id, payload("B", Some("c"), "d2"))
            .await
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("B"));
        assert_eq!(updated.content.as_deref(), Some("c"));
        assert_eq!(updated.description.as_deref(), Some("d2"));
        assert_eq!(updated.created_at, note.created_at);
        assert_eq!(updated.user_id, "u1");
        assert_ne!(updated.updated_at, note.updated_at);

        let cleared = svc
            .update("u1", &note.id, NotePayload { title: Some("C".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(cleared.content, None);
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn delete_twice_surfaces_store_error() {
        let svc = service(MemoryStore::new());
        let note = svc.create("u1", payload("A", None, "d")).await.unwrap();

        assert!(matches!(
            svc.delete("u2", &note.id).await,
            Err(NoteError::Forbidden { .. })
        ));
        svc.delete("u1", &note.id).await.unwrap();
        assert!(matches!(
            svc.delete("u1", &note.id).await,
            Err(NoteError::Store(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let svc = NoteService::new(Arc::new(FailingStore), "db", "notes");

        assert!(matches!(svc.list("u1").await, Err(NoteError::Store(_))));
        assert!(matches!(
            svc.create("u1", payload("A", None, "d")).await,
            Err(NoteError::Store(_))
        ));
        assert!(matches!(svc.delete("u1", "n1").await, Err(NoteError::Store(_))));
    }
}
