//! Document store boundary.
//!
//! The application talks to its database through the narrow
//! [`DocumentStore`] interface: collection + ID CRUD, single-field equality
//! queries, and full or ordered collection scans. There are no transactions,
//! no retries and no client-side paging; every call is one logical round
//! trip to the backing store.
//!
//! # Implementations
//!
//! - [`FirestoreStore`] - Cloud Firestore REST API (or its emulator)
//! - [`MemoryStore`] - In-process maps, for tests and local runs

pub mod firestore;
pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use bizdesk_core::SortDirection;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// Field map of a document, as plain JSON.
///
/// Timestamps travel as RFC 3339 strings.
pub type Fields = Map<String, Value>;

/// A stored document: its store-assigned ID plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned document ID (last path segment).
    pub id: String,
    /// Document fields.
    pub fields: Fields,
}

impl Document {
    /// Create a document value.
    #[must_use]
    pub const fn new(id: String, fields: Fields) -> Self {
        Self { id, fields }
    }

    /// Deserialize the fields into `T`.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the fields do not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }

    /// String value of a field, if present and a string.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with an error status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document ID.
        id: String,
    },

    /// Credentials were rejected or lack access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A response or value could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Fields could not be serialized for writing.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_owned(),
            id: id.to_owned(),
        }
    }
}

/// Collection-scoped document CRUD and simple queries.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document in a collection.
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Fetch every document in a collection ordered by one field.
    ///
    /// Documents missing the field may be omitted by the backing store.
    async fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError>;

    /// Fetch one document by ID.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create a document with a store-assigned ID.
    async fn create(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Merge `fields` into an existing document. Fields not named are left
    /// untouched.
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Documents whose `field` equals `value`, optionally capped at `limit`.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, StoreError>;

    /// Cheap reachability check used by the readiness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Serialize a value into a document field map.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if the value fails to serialize, or
/// [`StoreError::Decode`] if it does not serialize to a JSON object.
pub fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Decode(format!(
            "expected an object for document fields, got {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_to_fields_requires_object() {
        let fields = to_fields(&Sample {
            name: "Juan".to_string(),
        })
        .unwrap();
        assert_eq!(fields.get("name"), Some(&json!("Juan")));

        assert!(matches!(to_fields(&"scalar"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_document_decode() {
        let doc = Document::new("d1".to_string(), to_fields(&json!({"name": "Ana"})).unwrap());
        let sample: Sample = doc.decode().unwrap();
        assert_eq!(sample.name, "Ana");
        assert_eq!(doc.str_field("name"), Some("Ana"));
        assert_eq!(doc.str_field("missing"), None);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::not_found("customers", "abc");
        assert_eq!(err.to_string(), "document not found: customers/abc");
    }
}
