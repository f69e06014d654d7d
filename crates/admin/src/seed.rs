//! Development seed data.
//!
//! A YAML file lists profiles and customers to create:
//!
//! ```yaml
//! profiles:
//!   - username: maria
//!     email: maria@shop.ph
//!     fullName: Maria Santos
//!     roles: [admin]
//!     password: change-me     # creates the identity provider account
//! customers:
//!   - name: Juan Dela Cruz
//!     contact: "0917 555 0101"
//!     vehicleTypes: [Truck]
//! ```
//!
//! Profiles whose username already exists are skipped. Customers are always
//! created, each under the next free code.

use std::path::Path;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use bizdesk_core::{Email, EmailError, ProfileStatus, Role};

use crate::db::{CustomerRepository, RepositoryError, UserProfileRepository};
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{CustomerValidationError, NewCustomer, NewUserProfile};
use crate::store::DocumentStore;

/// Errors that can occur while loading or applying seed data.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Seed file could not be read.
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// Seed file is not valid YAML for the expected shape.
    #[error("invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A profile email does not parse.
    #[error("invalid email for profile {username}: {source}")]
    InvalidEmail {
        username: String,
        source: EmailError,
    },

    /// A profile has a password but no email to sign in with.
    #[error("profile {0} has a password but no email")]
    PasswordWithoutEmail(String),

    /// A customer entry failed validation.
    #[error("invalid customer: {0}")]
    Customer(#[from] CustomerValidationError),

    /// Identity provider rejected an account.
    #[error("identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// Repository/store error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// A profile entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default = "default_status")]
    pub status: String,
    /// Creates the identity provider account when set.
    #[serde(default)]
    pub password: Option<String>,
}

fn default_status() -> String {
    "active".to_string()
}

/// Parsed seed file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedFile {
    pub profiles: Vec<SeedProfile>,
    pub customers: Vec<NewCustomer>,
}

impl SeedFile {
    /// Parse seed YAML.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Yaml` if the document does not match the shape.
    pub fn parse(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a seed file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Io` or `SeedError::Yaml`.
    pub async fn load(path: &Path) -> Result<Self, SeedError> {
        let yaml = tokio::fs::read_to_string(path).await?;
        Self::parse(&yaml)
    }
}

/// What a seed run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub profiles_created: usize,
    pub profiles_skipped: usize,
    pub customers_created: usize,
}

/// Create the seed's profiles, accounts and customers.
///
/// # Errors
///
/// Stops at the first invalid entry or failed write; entries before it stay
/// created.
pub async fn apply_seed(
    store: &dyn DocumentStore,
    identity: &dyn IdentityProvider,
    seed: &SeedFile,
) -> Result<SeedSummary, SeedError> {
    let profiles = UserProfileRepository::new(store);
    let customers = CustomerRepository::new(store);
    let mut summary = SeedSummary::default();

    for entry in &seed.profiles {
        let username = entry.username.trim();
        if profiles.find_by_username(username).await?.is_some() {
            tracing::info!(username, "Profile exists, skipping");
            summary.profiles_skipped += 1;
            continue;
        }

        let email = entry
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(Email::parse)
            .transpose()
            .map_err(|source| SeedError::InvalidEmail {
                username: username.to_owned(),
                source,
            })?;

        let auth_uid = match (&entry.password, &email) {
            (None, _) => None,
            (Some(_), None) => return Err(SeedError::PasswordWithoutEmail(username.to_owned())),
            (Some(password), Some(email)) => {
                let password = SecretString::from(password.as_str());
                match identity.create_account(email.as_str(), &password).await {
                    Ok(uid) => Some(uid),
                    // Linked on first login instead
                    Err(IdentityError::EmailExists) => None,
                    Err(e) => return Err(e.into()),
                }
            }
        };

        profiles
            .create(&NewUserProfile {
                username: username.to_owned(),
                email,
                full_name: entry.full_name.trim().to_owned(),
                roles: entry.roles.clone(),
                status: ProfileStatus::normalize(&entry.status),
                auth_uid,
            })
            .await?;
        summary.profiles_created += 1;
    }

    for entry in &seed.customers {
        let input = entry.clone().validate()?;
        let code = customers.next_code().await?;
        let customer = customers.create(code, &input).await?;
        tracing::info!(code = %customer.customer_id, name = %customer.name, "Seeded customer");
        summary.customers_created += 1;
    }

    Ok(summary)
}
