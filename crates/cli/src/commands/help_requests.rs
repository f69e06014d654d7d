//! Password help requests waiting for an administrator.

#![allow(clippy::print_stdout)]

use bizdesk_admin::db::PasswordHelpRepository;

/// Print every password help request, newest first.
///
/// # Errors
///
/// Returns an error if the backend is misconfigured or the store read fails.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let (store, _) = super::connect().await?;
    let requests = PasswordHelpRepository::new(store.as_ref())
        .list_recent()
        .await?;

    println!("REQUESTED AT\tUSERNAME");
    for request in &requests {
        println!(
            "{}\t{}",
            request.created_at.format("%Y-%m-%d %H:%M UTC"),
            request.username
        );
    }
    tracing::info!(count = requests.len(), "Listed password help requests");

    Ok(())
}
