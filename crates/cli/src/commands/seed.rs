//! Seed profiles, sign-in accounts and customers from a YAML file.
//!
//! Profiles whose username already exists are skipped, so a seed file can be
//! applied to the same project more than once without duplicating people.
//! Customers are always created.

use std::path::Path;

use tracing::info;

use bizdesk_admin::seed::{SeedFile, apply_seed};

/// Apply a seed file to the configured backend.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML seed file
///
/// # Errors
///
/// Returns an error if the backend is misconfigured, the file cannot be read
/// or parsed, or a write fails.
pub async fn run(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let seed = SeedFile::load(file_path).await?;
    info!(
        path = %file_path.display(),
        profiles = seed.profiles.len(),
        customers = seed.customers.len(),
        "Loaded seed file"
    );

    let (store, identity) = super::connect().await?;
    let summary = apply_seed(store.as_ref(), identity.as_ref(), &seed).await?;

    info!(
        profiles_created = summary.profiles_created,
        profiles_skipped = summary.profiles_skipped,
        customers_created = summary.customers_created,
        "Seed complete"
    );

    Ok(())
}
