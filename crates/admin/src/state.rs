//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AdminConfig, StoreBackend};
use crate::identity::{FirebaseAuthClient, IdentityError, IdentityProvider, StaticIdentityProvider};
use crate::seed::{SeedError, SeedFile, apply_seed};
use crate::services::{PermissionCheck, RolePermissions};
use crate::store::{DocumentStore, FirestoreStore, MemoryStore, StoreError};

/// Error building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Document store client could not be built.
    #[error("store client error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider client could not be built.
    #[error("identity client error: {0}")]
    Identity(#[from] IdentityError),

    /// Seed file could not be applied.
    #[error("seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backends chosen at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    permissions: Arc<dyn PermissionCheck>,
}

impl AppState {
    /// Create application state from already-built backends.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        permissions: Arc<dyn PermissionCheck>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                identity,
                permissions,
            }),
        }
    }

    /// Build the backends named in `config`.
    ///
    /// The memory backend starts empty unless a seed file is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a REST client cannot be built or the seed file
    /// cannot be applied.
    pub async fn from_config(config: AdminConfig) -> Result<Self, StateError> {
        let (store, identity) = build_backends(&config.backend).await?;
        Ok(Self::new(
            config,
            store,
            identity,
            Arc::new(RolePermissions::default()),
        ))
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    /// Get a reference to the permission check.
    #[must_use]
    pub fn permissions(&self) -> &dyn PermissionCheck {
        self.inner.permissions.as_ref()
    }
}

/// Build the document store and identity provider for `backend`.
///
/// The memory backend starts empty unless a seed file is configured.
///
/// # Errors
///
/// Returns an error if a REST client cannot be built or the seed file
/// cannot be applied.
pub async fn build_backends(
    backend: &StoreBackend,
) -> Result<(Arc<dyn DocumentStore>, Arc<dyn IdentityProvider>), StateError> {
    let backends: (Arc<dyn DocumentStore>, Arc<dyn IdentityProvider>) = match backend {
        StoreBackend::Firestore(firebase) => (
            Arc::new(FirestoreStore::new(firebase)?),
            Arc::new(FirebaseAuthClient::new(firebase)?),
        ),
        StoreBackend::Memory { seed_file } => {
            let store = MemoryStore::new();
            let identity = StaticIdentityProvider::new();
            if let Some(path) = seed_file {
                let seed = SeedFile::load(path).await?;
                let summary = apply_seed(&store, &identity, &seed).await?;
                tracing::info!(
                    path = %path.display(),
                    profiles = summary.profiles_created,
                    customers = summary.customers_created,
                    "Applied seed file"
                );
            }
            (Arc::new(store), Arc::new(identity))
        }
    };

    tracing::info!(backend = backend.name(), "Backends ready");
    Ok(backends)
}
