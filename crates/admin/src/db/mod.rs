//! Typed repositories over the document store.
//!
//! # Collections
//!
//! - `users` - Application profiles linked to identity provider accounts
//! - `customers` - Customer records with soft-delete fields
//! - `passwordHelpRequests` - Append-only password help requests
//!
//! Each repository owns the document shape of its collection and converts
//! documents into [`crate::models`] types, reporting malformed documents as
//! [`RepositoryError::DataCorruption`].

pub mod customers;
pub mod password_help;
pub mod profiles;

use thiserror::Error;

use crate::store::{Document, StoreError};

pub use customers::CustomerRepository;
pub use password_help::PasswordHelpRepository;
pub use profiles::UserProfileRepository;

/// Collection names.
pub mod collections {
    /// User profiles.
    pub const USERS: &str = "users";
    /// Customer records.
    pub const CUSTOMERS: &str = "customers";
    /// Password help requests.
    pub const PASSWORD_HELP_REQUESTS: &str = "passwordHelpRequests";
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Document store error.
    #[error("store error: {0}")]
    Store(#[source] StoreError),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Deserialize a document's fields, reporting failures as corruption.
fn decode<T: serde::de::DeserializeOwned>(doc: &Document) -> Result<T, RepositoryError> {
    doc.decode().map_err(|e| {
        RepositoryError::DataCorruption(format!("malformed document {}: {e}", doc.id))
    })
}
