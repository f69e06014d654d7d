//! User profile repository.
//!
//! Profiles are written by other tools as well as this application, so the
//! document shape is read leniently: every field is optional, and a legacy
//! single `role` string is accepted when `roles` is absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use bizdesk_core::{AuthUid, Email, ProfileId, ProfileStatus, Role};

use super::{RepositoryError, collections, decode};
use crate::models::{NewUserProfile, UserProfile};
use crate::store::{Document, DocumentStore, Fields, to_fields};

// =============================================================================
// Internal Document Types
// =============================================================================

/// Stored shape of a `users` document.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProfileDocument {
    username: String,
    email: Option<String>,
    full_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    roles: Vec<Role>,
    #[serde(skip_serializing)]
    role: Option<String>,
    status: Option<String>,
    auth_uid: Option<String>,
    last_login: Option<DateTime<Utc>>,
}

fn into_profile(doc: &Document) -> Result<UserProfile, RepositoryError> {
    let raw: ProfileDocument = decode(doc)?;

    let email = match raw.email.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(email) => Some(Email::parse(email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email on profile {}: {e}", doc.id))
        })?),
    };

    let roles = if raw.roles.is_empty() {
        raw.role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| vec![Role::new(r)])
            .unwrap_or_default()
    } else {
        raw.roles
    };

    Ok(UserProfile {
        id: ProfileId::new(doc.id.clone()),
        username: raw.username.trim().to_owned(),
        email,
        full_name: raw.full_name,
        roles,
        status: ProfileStatus::normalize(raw.status.as_deref().unwrap_or_default()),
        auth_uid: raw
            .auth_uid
            .filter(|uid| !uid.trim().is_empty())
            .map(AuthUid::new),
        last_login: raw.last_login,
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user profile documents.
pub struct UserProfileRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Get a profile by document ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    /// Returns `RepositoryError::DataCorruption` if the document is invalid.
    pub async fn get(&self, id: &ProfileId) -> Result<Option<UserProfile>, RepositoryError> {
        self.store
            .get(collections::USERS, id.as_str())
            .await?
            .as_ref()
            .map(into_profile)
            .transpose()
    }

    /// Find a profile by exact username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document is invalid.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        self.find_one("username", json!(username)).await
    }

    /// Find the profile linked to an identity provider account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document is invalid.
    pub async fn find_by_auth_uid(
        &self,
        uid: &AuthUid,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        self.find_one("authUid", json!(uid.as_str())).await
    }

    /// Find a profile by its sign-in email (exact match).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the document is invalid.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, RepositoryError> {
        self.find_one("email", json!(email)).await
    }

    async fn find_one(
        &self,
        field: &str,
        value: Value,
    ) -> Result<Option<UserProfile>, RepositoryError> {
        self.store
            .find_by_field(collections::USERS, field, &value, Some(1))
            .await?
            .first()
            .map(into_profile)
            .transpose()
    }

    /// Store the identity provider user ID on a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile no longer exists.
    pub async fn link_auth_uid(
        &self,
        id: &ProfileId,
        uid: &AuthUid,
    ) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("authUid".to_string(), json!(uid.as_str()));
        self.store
            .update(collections::USERS, id.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Record a completed login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile no longer exists.
    pub async fn record_login(
        &self,
        id: &ProfileId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut fields = Fields::new();
        fields.insert("lastLogin".to_string(), json!(at));
        self.store
            .update(collections::USERS, id.as_str(), fields)
            .await?;
        Ok(())
    }

    /// Create a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(&self, profile: &NewUserProfile) -> Result<UserProfile, RepositoryError> {
        let raw = ProfileDocument {
            username: profile.username.clone(),
            email: profile.email.as_ref().map(|e| e.as_str().to_owned()),
            full_name: profile.full_name.clone(),
            roles: profile.roles.clone(),
            role: None,
            status: Some(profile.status.as_str().to_owned()),
            auth_uid: profile.auth_uid.as_ref().map(|uid| uid.as_str().to_owned()),
            last_login: None,
        };

        let fields = to_fields(&raw)?;
        let doc = self.store.create(collections::USERS, fields).await?;
        tracing::info!(profile_id = %doc.id, username = %profile.username, "Created profile");
        into_profile(&doc)
    }
}
