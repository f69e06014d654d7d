//! Roles and permission keys.
//!
//! Profiles carry a list of free-form role IDs. Whether a role grants a
//! permission is decided by the surrounding application through a
//! permission check; this module only names the keys the customer screens
//! ask about.

use serde::{Deserialize, Serialize};

/// A role ID as stored on a user profile (e.g. `admin`, `staff`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Create a role from its ID. Surrounding whitespace is dropped.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(id.trim().to_owned())
    }

    /// The role ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Role {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Permission keys checked by the customer operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// List and view customers.
    #[serde(rename = "customers.view")]
    ViewCustomers,
    /// Create customers.
    #[serde(rename = "customers.create")]
    CreateCustomers,
    /// Edit customer details.
    #[serde(rename = "customers.edit")]
    EditCustomers,
    /// Archive and unarchive customers.
    #[serde(rename = "customers.archive")]
    ArchiveCustomers,
    /// Permanently delete archived customers.
    #[serde(rename = "customers.delete")]
    DeleteCustomers,
}

impl Permission {
    /// Every permission key.
    pub const ALL: [Self; 5] = [
        Self::ViewCustomers,
        Self::CreateCustomers,
        Self::EditCustomers,
        Self::ArchiveCustomers,
        Self::DeleteCustomers,
    ];

    /// The permission key string.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ViewCustomers => "customers.view",
            Self::CreateCustomers => "customers.create",
            Self::EditCustomers => "customers.edit",
            Self::ArchiveCustomers => "customers.archive",
            Self::DeleteCustomers => "customers.delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| format!("invalid permission: {s}"))
    }
}
