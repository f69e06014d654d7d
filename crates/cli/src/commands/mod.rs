//! CLI command implementations.

pub mod customers;
pub mod help_requests;
pub mod seed;

use std::sync::Arc;

use bizdesk_admin::config::StoreBackend;
use bizdesk_admin::identity::IdentityProvider;
use bizdesk_admin::state::build_backends;
use bizdesk_admin::store::DocumentStore;

/// Load `.env` and connect to the configured backend.
async fn connect() -> Result<(Arc<dyn DocumentStore>, Arc<dyn IdentityProvider>), Box<dyn std::error::Error>>
{
    dotenvy::dotenv().ok();
    let backend = StoreBackend::from_env()?;
    if matches!(backend, StoreBackend::Memory { .. }) {
        tracing::warn!("BIZDESK_STORE=memory: nothing written by this command outlives it");
    }
    Ok(build_backends(&backend).await?)
}
