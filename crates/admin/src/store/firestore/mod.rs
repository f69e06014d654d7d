//! Cloud Firestore REST client.
//!
//! Implements [`DocumentStore`] against the Firestore v1 REST API, or the
//! local emulator when `FIRESTORE_BASE_URL` points at it.
//!
//! # API Reference
//!
//! - Base URL: `https://firestore.googleapis.com`
//! - Documents: `/v1/projects/{project}/databases/{database}/documents`
//! - Authentication: Web API key via `key` query parameter, plus an optional
//!   bearer token (the emulator accepts `Bearer owner`)

mod value;

pub use value::{decode_fields, decode_value, encode_fields, encode_value};

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use bizdesk_core::SortDirection;

use super::{Document, DocumentStore, Fields, StoreError};
use crate::config::FirebaseConfig;

/// Documents requested per page when scanning a collection.
const PAGE_SIZE: u32 = 300;

/// Firestore document as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RawDocument {
    /// Full resource name; the document ID is the last segment.
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawDocument {
    fn into_document(self) -> Result<Document, StoreError> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::Decode(format!("bad document name: {}", self.name)))?
            .to_owned();
        Ok(Document::new(id, decode_fields(&self.fields)?))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    next_page_token: Option<String>,
}

/// One element of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<RawDocument>,
}

/// Error envelope used by Google APIs.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Firestore REST client.
#[derive(Clone)]
pub struct FirestoreStore {
    inner: Arc<FirestoreStoreInner>,
}

struct FirestoreStoreInner {
    client: reqwest::Client,
    /// `{base}/v1/projects/{project}/databases/{database}/documents`
    documents_url: String,
    api_key: SecretString,
}

impl FirestoreStore {
    /// Create a new Firestore client.
    ///
    /// # Errors
    ///
    /// Returns error if the access token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.access_token {
            let value = format!("Bearer {}", token.expose_secret());
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&value)
                    .map_err(|e| StoreError::Decode(format!("Invalid access token format: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let documents_url = format!(
            "{}/v1/projects/{}/databases/{}/documents",
            config.firestore_base_url.trim_end_matches('/'),
            config.project_id,
            config.database
        );

        Ok(Self {
            inner: Arc::new(FirestoreStoreInner {
                client,
                documents_url,
                api_key: config.api_key.clone(),
            }),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{collection}", self.inner.documents_url)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.inner.documents_url)
    }

    /// Attach the API key to a request.
    fn keyed(&self, request: RequestBuilder) -> RequestBuilder {
        request.query(&[("key", self.inner.api_key.expose_secret())])
    }

    /// Page through a collection, optionally ordered by one field.
    async fn scan(
        &self,
        collection: &str,
        order_by: Option<String>,
    ) -> Result<Vec<Document>, StoreError> {
        let url = self.collection_url(collection);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .keyed(self.inner.client.get(&url))
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(order_by) = &order_by {
                request = request.query(&[("orderBy", order_by)]);
            }
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListDocumentsResponse = self.handle_response(request.send().await?).await?;
            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(collection, count = documents.len(), "Scanned collection");
        Ok(documents)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| StoreError::Decode(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse an error response from the Firestore API.
    async fn parse_error(&self, response: reqwest::Response) -> StoreError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map_or(body, |envelope| envelope.error.message);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return StoreError::PermissionDenied(message);
        }

        StoreError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.scan(collection, None).await
    }

    async fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        let order_by = match direction {
            SortDirection::Asc => format!("{field} asc"),
            SortDirection::Desc => format!("{field} desc"),
        };
        self.scan(collection, Some(order_by)).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id);
        let response = self.keyed(self.inner.client.get(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let raw: RawDocument = self.handle_response(response).await?;
        raw.into_document().map(Some)
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        let url = self.collection_url(collection);
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .keyed(self.inner.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let raw: RawDocument = self.handle_response(response).await?;
        let document = raw.into_document()?;
        tracing::debug!(collection, id = %document.id, "Created document");
        Ok(document)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        if fields.is_empty() {
            return Ok(());
        }

        let url = self.document_url(collection, id);
        let mut params: Vec<(&str, &str)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", name.as_str()))
            .collect();
        params.push(("currentDocument.exists", "true"));

        let body = json!({ "fields": encode_fields(&fields) });
        let response = self
            .keyed(self.inner.client.patch(&url))
            .query(&params)
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::not_found(collection, id));
        }

        let _: RawDocument = self.handle_response(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(collection, id);
        let response = self.keyed(self.inner.client.delete(&url)).send().await?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        Err(self.parse_error(response).await)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}:runQuery", self.inner.documents_url);

        let mut query = json!({
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value)
                }
            }
        });
        if let (Some(limit), Some(map)) = (limit, query.as_object_mut()) {
            map.insert("limit".to_string(), json!(limit));
        }

        let response = self
            .keyed(self.inner.client.post(&url))
            .json(&json!({ "structuredQuery": query }))
            .send()
            .await?;

        let items: Vec<RunQueryItem> = self.handle_response(response).await?;
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(RawDocument::into_document)
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}:listCollectionIds", self.inner.documents_url);
        let response = self
            .keyed(self.inner.client.post(&url))
            .json(&json!({ "pageSize": 1 }))
            .send()
            .await?;

        let _: Value = self.handle_response(response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for FirestoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreStore")
            .field("documents_url", &self.inner.documents_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::to_fields;

    const DOCS: &str = "/v1/projects/demo-shop/databases/(default)/documents";

    fn config(base_url: &str) -> FirebaseConfig {
        FirebaseConfig {
            project_id: "demo-shop".to_string(),
            api_key: SecretString::from("test-key"),
            database: "(default)".to_string(),
            firestore_base_url: base_url.to_string(),
            auth_base_url: base_url.to_string(),
            access_token: Some(SecretString::from("owner")),
        }
    }

    fn doc_json(id: &str, fields: &Value) -> Value {
        json!({
            "name": format!("projects/demo-shop/databases/(default)/documents/customers/{id}"),
            "fields": fields,
        })
    }

    #[tokio::test]
    async fn test_list_follows_page_tokens() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/customers")))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [doc_json("b", &json!({"name": {"stringValue": "Ben"}}))]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/customers")))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [doc_json("a", &json!({"name": {"stringValue": "Ana"}}))],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        let docs = store.list("customers").await.unwrap();

        let names: Vec<&str> = docs.iter().filter_map(|d| d.str_field("name")).collect();
        assert_eq!(names, vec!["Ana", "Ben"]);
        assert_eq!(docs[0].id, "a");
    }

    #[tokio::test]
    async fn test_list_empty_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/customers")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        assert!(store.list("customers").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ordered_sends_order_by() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/customers")))
            .and(query_param("orderBy", "customerId desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [doc_json("z", &json!({"customerId": {"stringValue": "CUS-009"}}))]
            })))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        let docs = store
            .list_ordered("customers", "customerId", SortDirection::Desc)
            .await
            .unwrap();
        assert_eq!(docs[0].str_field("customerId"), Some("CUS-009"));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/customers/nope")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "Document not found", "status": "NOT_FOUND"}
            })))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        assert!(store.get("customers", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{DOCS}/customers")))
            .and(body_partial_json(json!({
                "fields": {"name": {"stringValue": "Juan"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
                "gen123",
                &json!({"name": {"stringValue": "Juan"}}),
            )))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        let doc = store
            .create("customers", to_fields(&json!({"name": "Juan"})).unwrap())
            .await
            .unwrap();
        assert_eq!(doc.id, "gen123");
    }

    #[tokio::test]
    async fn test_update_uses_field_mask_and_precondition() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{DOCS}/customers/c1")))
            .and(query_param("updateMask.fieldPaths", "contact"))
            .and(query_param("currentDocument.exists", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(doc_json(
                "c1",
                &json!({"contact": {"stringValue": "0918"}}),
            )))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        store
            .update("customers", "c1", to_fields(&json!({"contact": "0918"})).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{DOCS}/customers/gone")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": 404, "message": "No document to update"}
            })))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        let err = store
            .update("customers", "gone", to_fields(&json!({"name": "x"})).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_by_field_runs_structured_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("{DOCS}:runQuery")))
            .and(body_partial_json(json!({
                "structuredQuery": {
                    "from": [{"collectionId": "users"}],
                    "where": {"fieldFilter": {
                        "field": {"fieldPath": "username"},
                        "op": "EQUAL",
                        "value": {"stringValue": "juan.dc"}
                    }},
                    "limit": 1
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"readTime": "2024-01-01T00:00:00Z"},
                {"document": {
                    "name": "projects/demo-shop/databases/(default)/documents/users/u1",
                    "fields": {"username": {"stringValue": "juan.dc"}}
                }}
            ])))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        let docs = store
            .find_by_field("users", "username", &json!("juan.dc"), Some(1))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "u1");
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOCS}/customers")))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Missing or insufficient permissions."}
            })))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        let err = store.list("customers").await.unwrap_err();
        match err {
            StoreError::PermissionDenied(message) => {
                assert_eq!(message, "Missing or insufficient permissions.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{DOCS}/customers/gone")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = FirestoreStore::new(&config(&server.uri())).unwrap();
        store.delete("customers", "gone").await.unwrap();
    }
}
