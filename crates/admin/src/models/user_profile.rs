//! Application-level user profiles.

use chrono::{DateTime, Utc};

use bizdesk_core::{AuthUid, Email, ProfileId, ProfileStatus, Role};

/// A user profile (domain type).
///
/// Profiles are created outside the application. The identity provider owns
/// the password; the profile owns the username, display name, roles and
/// status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Profile document ID.
    pub id: ProfileId,
    /// Login name, matched exactly.
    pub username: String,
    /// Sign-in email at the identity provider.
    pub email: Option<Email>,
    /// Display name.
    pub full_name: String,
    /// Role IDs.
    pub roles: Vec<Role>,
    /// Account status; only `active` may log in.
    pub status: ProfileStatus,
    /// Identity provider user ID, once linked.
    pub auth_uid: Option<AuthUid>,
    /// When the user last completed a login.
    pub last_login: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Name shown in the UI and recorded as the archiving actor.
    ///
    /// Falls back to the username when no full name is set.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            &self.username
        } else {
            full_name
        }
    }

    /// Whether the stored provider link is missing or points elsewhere.
    #[must_use]
    pub fn needs_auth_link(&self, uid: &AuthUid) -> bool {
        self.auth_uid.as_ref() != Some(uid)
    }
}

/// Input for creating a profile (seeding only).
#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub username: String,
    pub email: Option<Email>,
    pub full_name: String,
    pub roles: Vec<Role>,
    pub status: ProfileStatus,
    pub auth_uid: Option<AuthUid>,
}
