//! Password help request repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bizdesk_core::{PasswordHelpRequestId, SortDirection};

use super::{RepositoryError, collections, decode};
use crate::models::PasswordHelpRequest;
use crate::store::{Document, DocumentStore, to_fields};

/// Stored shape of a `passwordHelpRequests` document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordHelpDocument {
    username: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<&Document> for PasswordHelpRequest {
    type Error = RepositoryError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let raw: PasswordHelpDocument = decode(doc)?;
        Ok(Self {
            id: PasswordHelpRequestId::new(doc.id.clone()),
            username: raw.username,
            created_at: raw.created_at,
        })
    }
}

/// Repository for password help requests. Requests are never edited.
pub struct PasswordHelpRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> PasswordHelpRepository<'a> {
    /// Create a new password help repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Append a request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<PasswordHelpRequest, RepositoryError> {
        let fields = to_fields(&PasswordHelpDocument {
            username: username.to_owned(),
            created_at: at,
        })?;
        let doc = self
            .store
            .create(collections::PASSWORD_HELP_REQUESTS, fields)
            .await?;

        Ok(PasswordHelpRequest {
            id: PasswordHelpRequestId::new(doc.id),
            username: username.to_owned(),
            created_at: at,
        })
    }

    /// Every request, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan fails.
    /// Returns `RepositoryError::DataCorruption` if any document is invalid.
    pub async fn list_recent(&self) -> Result<Vec<PasswordHelpRequest>, RepositoryError> {
        self.store
            .list_ordered(
                collections::PASSWORD_HELP_REQUESTS,
                "createdAt",
                SortDirection::Desc,
            )
            .await?
            .iter()
            .map(PasswordHelpRequest::try_from)
            .collect()
    }
}
