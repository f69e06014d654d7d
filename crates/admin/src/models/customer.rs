//! Customer records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bizdesk_core::{ArchiveState, CustomerCode, CustomerId, Email, EmailError};

/// A customer record (domain type).
///
/// Serializes with the document's camelCase field names, the archival state
/// flattened into `isArchived` / `archivedAt` / `archivedBy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Store-assigned document ID.
    pub id: CustomerId,
    /// Business-facing code (`CUS-001`). Kept as stored; older records may
    /// not follow the pattern.
    pub customer_id: String,
    /// Customer or company name.
    pub name: String,
    /// Phone number or other contact detail.
    pub contact: String,
    /// Contact email, possibly empty.
    pub email: String,
    /// Postal address.
    pub address: String,
    /// Vehicle types serviced for this customer.
    pub vehicle_types: BTreeSet<String>,
    /// Archival state.
    #[serde(flatten)]
    pub archive: ArchiveState,
}

impl Customer {
    /// Parsed customer code, if the stored value follows `CUS-NNN`.
    #[must_use]
    pub fn code(&self) -> Option<CustomerCode> {
        CustomerCode::parse(&self.customer_id).ok()
    }

    /// Whether the record is archived.
    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archive.is_archived()
    }
}

/// Errors in customer input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CustomerValidationError {
    /// Name is empty.
    #[error("customer name is required")]
    MissingName,

    /// Email is set but malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Input for creating a customer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCustomer {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub address: String,
    pub vehicle_types: BTreeSet<String>,
}

impl NewCustomer {
    /// Trim every field and check the name and email.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or a non-blank email does not
    /// parse.
    pub fn validate(self) -> Result<Self, CustomerValidationError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CustomerValidationError::MissingName);
        }

        Ok(Self {
            name,
            contact: self.contact.trim().to_owned(),
            email: normalize_email(&self.email)?,
            address: self.address.trim().to_owned(),
            vehicle_types: normalize_vehicle_types(self.vehicle_types),
        })
    }
}

/// Partial update of a customer. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub vehicle_types: Option<BTreeSet<String>>,
}

impl CustomerChanges {
    /// Whether no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.contact.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.vehicle_types.is_none()
    }

    /// Trim present fields and check them like [`NewCustomer::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if a present name is blank or a present non-blank
    /// email does not parse.
    pub fn validate(self) -> Result<Self, CustomerValidationError> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(CustomerValidationError::MissingName);
            }
            other => other.map(|n| n.trim().to_owned()),
        };

        Ok(Self {
            name,
            contact: self.contact.map(|c| c.trim().to_owned()),
            email: self.email.as_deref().map(normalize_email).transpose()?,
            address: self.address.map(|a| a.trim().to_owned()),
            vehicle_types: self.vehicle_types.map(normalize_vehicle_types),
        })
    }

    /// Apply the changes to a loaded record.
    pub fn apply_to(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(contact) = self.contact {
            customer.contact = contact;
        }
        if let Some(email) = self.email {
            customer.email = email;
        }
        if let Some(address) = self.address {
            customer.address = address;
        }
        if let Some(vehicle_types) = self.vehicle_types {
            customer.vehicle_types = vehicle_types;
        }
    }
}

/// Blank stays blank; anything else must be a valid address.
fn normalize_email(raw: &str) -> Result<String, CustomerValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    Ok(Email::parse(trimmed)?.into_inner())
}

fn normalize_vehicle_types(types: BTreeSet<String>) -> BTreeSet<String> {
    types
        .into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}
