use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use super::{Document, DocumentList, DocumentStore, Query, StoreError};

const PROJECT_HEADER: &str = "x-appwrite-project";
const KEY_HEADER: &str = "x-appwrite-key";
const RESPONSE_FORMAT_HEADER: &str = "x-appwrite-response-format";
const RESPONSE_FORMAT: &str = "1.5.0";

/// Error body returned by the Appwrite REST API
#[derive(Debug, Default, Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

/// Document store backed by the Appwrite databases REST API.
///
/// One `reqwest::Client` is shared by all requests; it carries the project
/// and API key headers.
pub struct AppwriteStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl AppwriteStore {
    pub fn new(endpoint: &str, project_id: &str, api_key: &str) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint).map_err(|_| StoreError::InvalidUrl(endpoint.to_string()))?;
        if endpoint.cannot_be_a_base() {
            return Err(StoreError::InvalidUrl(endpoint.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(RESPONSE_FORMAT_HEADER),
            HeaderValue::from_static(RESPONSE_FORMAT),
        );
        headers.insert(
            HeaderName::from_static(PROJECT_HEADER),
            HeaderValue::from_str(project_id)
                .map_err(|_| StoreError::InvalidCredentials("project id".to_string()))?,
        );
        if !api_key.is_empty() {
            let mut key = HeaderValue::from_str(api_key)
                .map_err(|_| StoreError::InvalidCredentials("api key".to_string()))?;
            key.set_sensitive(true);
            headers.insert(HeaderName::from_static(KEY_HEADER), key);
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self { client, endpoint })
    }

    /// `{endpoint}/databases/{db}/collections/{coll}/documents[/{id}]`
    fn documents_url(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: Option<&str>,
    ) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::InvalidUrl(self.endpoint.to_string()))?;
            segments
                .pop_if_empty()
                .extend(["databases", database_id, "collections", collection_id, "documents"]);
            if let Some(id) = document_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Turn non-2xx responses into `StoreError`s.
    async fn check(response: Response, document_id: Option<&str>) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: AppwriteErrorBody = response.json().await.unwrap_or_default();
        let subject = document_id.map(str::to_string).unwrap_or_else(|| body.message.clone());

        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(subject)),
            StatusCode::CONFLICT => Err(StoreError::Conflict(subject)),
            _ => Err(StoreError::Api {
                code: status.as_u16(),
                kind: body.kind,
                message: body.message,
            }),
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, document_id: Option<&str>) -> Result<T, StoreError> {
        let response = Self::check(response, document_id).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl DocumentStore for AppwriteStore {
    fn name(&self) -> &'static str {
        "appwrite"
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let url = self.documents_url(database_id, collection_id, None)?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&json!({ "documentId": document_id, "data": data }))
            .send()
            .await?;

        Self::parse(response, Some(document_id)).await
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError> {
        let url = self.documents_url(database_id, collection_id, None)?;
        let params = queries
            .iter()
            .map(|q| q.to_query_string().map(|s| ("queries[]", s)))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("GET {} ({} queries)", url, params.len());

        let response = self.client.get(url).query(&params).send().await?;

        Self::parse(response, None).await
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, StoreError> {
        let url = self.documents_url(database_id, collection_id, Some(document_id))?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        Self::parse(response, Some(document_id)).await
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let url = self.documents_url(database_id, collection_id, Some(document_id))?;
        tracing::debug!("PATCH {}", url);

        let response = self
            .client
            .patch(url)
            .json(&json!({ "data": data }))
            .send()
            .await?;

        Self::parse(response, Some(document_id)).await
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), StoreError> {
        let url = self.documents_url(database_id, collection_id, Some(document_id))?;
        tracing::debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        Self::check(response, Some(document_id)).await?;

        Ok(())
    }
}
