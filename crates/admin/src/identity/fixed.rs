//! In-memory identity provider.
//!
//! Holds email + password accounts in a map. Emails match
//! case-insensitively, like the hosted provider. Used by tests and by
//! `BIZDESK_STORE=memory` local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

use bizdesk_core::AuthUid;

use super::{IdentityError, IdentityProvider, SignedIn};

#[derive(Debug)]
struct Account {
    uid: AuthUid,
    email: String,
    password: SecretString,
    disabled: bool,
}

/// Identity provider backed by a fixed set of accounts.
#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    unavailable: AtomicBool,
    sign_in_attempts: AtomicUsize,
}

impl StaticIdentityProvider {
    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account while building the provider.
    #[must_use]
    pub fn with_account(mut self, email: &str, password: &str, uid: &str) -> Self {
        self.accounts.get_mut().insert(
            email.to_lowercase(),
            Account {
                uid: AuthUid::new(uid),
                email: email.to_owned(),
                password: SecretString::from(password),
                disabled: false,
            },
        );
        self
    }

    /// Disable an account; sign-in is then rejected like a bad password.
    pub async fn disable(&self, email: &str) {
        if let Some(account) = self.accounts.write().await.get_mut(&email.to_lowercase()) {
            account.disabled = true;
        }
    }

    /// Simulate the provider being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of sign-in calls received so far.
    #[must_use]
    pub fn sign_in_attempts(&self) -> usize {
        self.sign_in_attempts.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Api {
                status: 503,
                message: "identity provider unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        self.sign_in_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| !a.disabled)
            .filter(|a| a.password.expose_secret() == password.expose_secret())
            .ok_or(IdentityError::InvalidCredentials)?;

        Ok(SignedIn {
            uid: account.uid.clone(),
            email: account.email.clone(),
        })
    }

    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUid, IdentityError> {
        self.check_available()?;

        let mut accounts = self.accounts.write().await;
        let key = email.trim().to_lowercase();
        if accounts.contains_key(&key) {
            return Err(IdentityError::EmailExists);
        }

        let uid = AuthUid::new(uuid::Uuid::new_v4().simple().to_string());
        accounts.insert(
            key,
            Account {
                uid: uid.clone(),
                email: email.trim().to_owned(),
                password: password.clone(),
                disabled: false,
            },
        );
        Ok(uid)
    }
}
