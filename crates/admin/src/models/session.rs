//! Session-related types for authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use bizdesk_core::{ProfileId, Role};

use super::user_profile::UserProfile;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user and
/// answer permission checks without another profile lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Profile document ID.
    pub id: ProfileId,
    /// Display name, also used as the archiving actor.
    pub name: String,
    /// Role IDs from the profile.
    pub roles: Vec<Role>,
}

impl From<&UserProfile> for CurrentUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.display_name().to_owned(),
            roles: profile.roles.clone(),
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
