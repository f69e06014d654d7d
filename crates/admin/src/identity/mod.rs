//! Identity provider boundary.
//!
//! Passwords are never seen by the application beyond being forwarded to the
//! provider. A successful sign-in yields the provider's stable user ID, which
//! profiles are linked to through their `authUid` field.
//!
//! # Implementations
//!
//! - [`FirebaseAuthClient`] - Firebase Auth (Identity Toolkit REST API)
//! - [`StaticIdentityProvider`] - In-memory accounts, for tests and local runs

mod firebase;
mod fixed;

pub use firebase::FirebaseAuthClient;
pub use fixed::StaticIdentityProvider;

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use bizdesk_core::AuthUid;

/// Errors that can occur when talking to the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Wrong password, unknown email or disabled account.
    ///
    /// The provider's reasons are deliberately collapsed into one variant.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Too many failed attempts for this account.
    #[error("too many attempts, try again later")]
    RateLimited,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailExists,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with an unexpected error.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// Provider user ID.
    pub uid: AuthUid,
    /// Email the provider has on file.
    pub email: String,
}

/// Email + password identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an email and password.
    async fn sign_in(&self, email: &str, password: &SecretString)
    -> Result<SignedIn, IdentityError>;

    /// Register a new email + password account, returning its user ID.
    ///
    /// Used by seeding; the application itself never creates accounts.
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUid, IdentityError>;
}
