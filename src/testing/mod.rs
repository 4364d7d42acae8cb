use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tower_http::normalize_path::NormalizePath;
use serde_json::{Map, Value};
use tower::ServiceExt;

use crate::app::{service, AppState};
use crate::auth::{generate_jwt, Claims, TokenVerifier};
use crate::config::AppConfig;
use crate::services::NoteService;
use crate::store::{Document, DocumentList, DocumentStore, MemoryStore, Query, StoreError};

pub const TEST_SECRET: &str = "test-secret";

/// Router wired to an in-memory store and an HS256 verifier
pub struct TestContext {
    pub store: MemoryStore,
    pub router: NormalizePath<Router>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub text: String,
}

impl TestResponse {
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        Self {
            status,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or_else(|e| panic!("body is not JSON ({}): {}", e, self.text))
    }
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let router = Self::router(Arc::new(store.clone()));
        Self { store, router }
    }

    /// Same router over a different store; `self.store` stays empty
    pub fn with_store(backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            store: MemoryStore::new(),
            router: Self::router(backend),
        }
    }

    fn router(backend: Arc<dyn DocumentStore>) -> NormalizePath<Router> {
        let config = AppConfig::development();
        let notes = NoteService::new(backend, &config.store.database_id, &config.store.collection_id);
        let state = AppState::new(notes, TokenVerifier::hmac(TEST_SECRET));
        service(state, &config)
    }

    pub fn token(&self, user_id: &str) -> String {
        let claims = Claims::new(user_id, 1).expect("one hour is a valid lifetime");
        generate_jwt(&claims, TEST_SECRET).expect("failed to sign test token")
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        self.send(request).await
    }

    /// Send `body` verbatim as `application/json`
    pub async fn raw_json(&self, method: Method, uri: &str, token: &str, body: &'static str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("failed to build request");

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        TestResponse::from_response(response).await
    }
}

/// Store whose every call fails as if the service were down
pub struct FailingStore;

impl FailingStore {
    fn unavailable() -> StoreError {
        StoreError::Api {
            code: 503,
            kind: "general_unavailable".to_string(),
            message: "Service unavailable".to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn create_document(&self, _: &str, _: &str, _: &str, _: Map<String, Value>) -> Result<Document, StoreError> {
        Err(Self::unavailable())
    }

    async fn list_documents(&self, _: &str, _: &str, _: &[Query]) -> Result<DocumentList, StoreError> {
        Err(Self::unavailable())
    }

    async fn get_document(&self, _: &str, _: &str, _: &str) -> Result<Document, StoreError> {
        Err(Self::unavailable())
    }

    async fn update_document(&self, _: &str, _: &str, _: &str, _: Map<String, Value>) -> Result<Document, StoreError> {
        Err(Self::unavailable())
    }

    async fn delete_document(&self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
        Err(Self::unavailable())
    }
}
