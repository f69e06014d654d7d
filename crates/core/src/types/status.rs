//! User profile status.

use serde::{Deserialize, Serialize};

/// Account status stored on a user profile.
///
/// Profiles are written by hand or by other tools, so the stored value is
/// free text ("Active", " active ", "INACTIVE", "suspended", ...). Only a
/// value that normalizes (trimmed, case-insensitive) to `active` lets a user
/// complete login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProfileStatus {
    /// Normalized `active`.
    Active,
    /// Any other value, kept verbatim (trimmed).
    Other(String),
}

impl ProfileStatus {
    /// Normalize a raw stored status.
    ///
    /// ```
    /// use bizdesk_core::ProfileStatus;
    ///
    /// assert!(ProfileStatus::normalize(" Active ").is_active());
    /// assert!(!ProfileStatus::normalize("INACTIVE").is_active());
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Other(trimmed.to_owned())
        }
    }

    /// Whether the status permits login.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The status as stored after normalization.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Other(s) => s,
        }
    }
}

impl Default for ProfileStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for ProfileStatus {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<ProfileStatus> for String {
    fn from(status: ProfileStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
