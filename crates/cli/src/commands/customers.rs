//! Customer listing from the command line.
//!
//! Reads the store directly. Roles do not apply here; whoever holds the
//! backend credentials can already read every document.

#![allow(clippy::print_stdout)]

use bizdesk_admin::components::{CustomerListQuery, CustomerListView, SortField};
use bizdesk_admin::db::CustomerRepository;
use bizdesk_core::SortDirection;

/// Filters for `customers list`.
#[derive(Debug)]
pub struct ListOptions {
    pub search: Option<String>,
    pub vehicle: Option<String>,
    pub archived: bool,
    pub sort: SortField,
    pub desc: bool,
}

/// Print customers as a tab-separated table.
///
/// # Errors
///
/// Returns an error if the backend is misconfigured or the store read fails.
pub async fn list(options: ListOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (store, _) = super::connect().await?;
    let records = CustomerRepository::new(store.as_ref()).list_all().await?;

    let mut view = CustomerListView::new(records);
    CustomerListQuery {
        q: options.search,
        vehicle: options.vehicle,
        archived: options.archived,
        sort: Some(options.sort),
        dir: Some(if options.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }),
    }
    .apply(&mut view);

    let rows = view.visible();
    println!("CODE\tNAME\tCONTACT\tEMAIL\tVEHICLES\tARCHIVED BY");
    for customer in &rows {
        let vehicles: Vec<&str> = customer.vehicle_types.iter().map(String::as_str).collect();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            customer.customer_id,
            customer.name,
            customer.contact,
            customer.email,
            vehicles.join(", "),
            customer.archive.archived_by().unwrap_or("-"),
        );
    }
    tracing::info!(shown = rows.len(), total = view.records().len(), "Listed customers");

    Ok(())
}

/// Print the code the next created customer will get.
///
/// # Errors
///
/// Returns an error if the backend is misconfigured or the store read fails.
pub async fn next_id() -> Result<(), Box<dyn std::error::Error>> {
    let (store, _) = super::connect().await?;
    let code = CustomerRepository::new(store.as_ref()).next_code().await?;
    println!("{code}");
    Ok(())
}
