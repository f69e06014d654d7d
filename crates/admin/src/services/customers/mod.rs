//! Customer service.
//!
//! Every operation runs as the signed-in user and checks their permission
//! first. Archival goes through [`ArchiveState`] transitions, so archiving
//! twice keeps the first stamp and permanent deletion is refused for active
//! customers.
//!
//! Bulk operations run one write per customer, in request order. The first
//! failure stops the run; earlier writes stay applied.

mod error;

pub use error::CustomerError;

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use bizdesk_core::{ArchiveState, CustomerCode, CustomerId, Permission};

use super::permissions::PermissionCheck;
use crate::db::{CustomerRepository, RepositoryError};
use crate::models::{CurrentUser, Customer, CustomerChanges, NewCustomer};
use crate::store::DocumentStore;

/// Confirmations required before a bulk permanent delete runs.
pub const BULK_DELETE_CONFIRMATIONS: u8 = 2;

/// Bulk actions over a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Archive,
    Unarchive,
    Delete,
}

impl BulkAction {
    const fn permission(self) -> Permission {
        match self {
            Self::Archive | Self::Unarchive => Permission::ArchiveCustomers,
            Self::Delete => Permission::DeleteCustomers,
        }
    }
}

/// Result of a completed bulk operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// Customers written.
    pub applied: usize,
}

/// Customer service acting for one user.
pub struct CustomerService<'a> {
    customers: CustomerRepository<'a>,
    permissions: &'a dyn PermissionCheck,
    actor: &'a CurrentUser,
}

impl<'a> CustomerService<'a> {
    /// Create a customer service for `actor`.
    #[must_use]
    pub const fn new(
        store: &'a dyn DocumentStore,
        permissions: &'a dyn PermissionCheck,
        actor: &'a CurrentUser,
    ) -> Self {
        Self {
            customers: CustomerRepository::new(store),
            permissions,
            actor,
        }
    }

    /// Whether the actor holds `permission`.
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.can(&self.actor.roles, permission)
    }

    fn require(&self, permission: Permission) -> Result<(), CustomerError> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::warn!(user = %self.actor.id, %permission, "Permission denied");
            Err(CustomerError::Forbidden(permission))
        }
    }

    async fn load(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        self.customers
            .get(id)
            .await?
            .ok_or_else(|| CustomerError::NotFound(id.clone()))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All customers, archived included.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.view`.
    /// Returns `CustomerError::Repository` if the scan fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Customer>, CustomerError> {
        self.require(Permission::ViewCustomers)?;
        Ok(self.customers.list_all().await?)
    }

    /// One customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.view`.
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        self.require(Permission::ViewCustomers)?;
        self.load(id).await
    }

    /// The code the next created customer will get.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.create`.
    /// Returns `CustomerError::Repository` if the scan fails.
    #[instrument(skip(self))]
    pub async fn next_code(&self) -> Result<CustomerCode, CustomerError> {
        self.require(Permission::CreateCustomers)?;
        Ok(self.customers.next_code().await?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create an active customer under the next free code.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.create`.
    /// Returns `CustomerError::Validation` if the name is blank or the email
    /// is malformed; nothing is written.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewCustomer) -> Result<Customer, CustomerError> {
        self.require(Permission::CreateCustomers)?;
        let input = input.validate()?;

        let code = self.customers.next_code().await?;
        let customer = self.customers.create(code, &input).await?;
        tracing::info!(customer_id = %customer.id, code = %customer.customer_id, "Created customer");
        Ok(customer)
    }

    /// Change the fields present in `changes`.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.edit`.
    /// Returns `CustomerError::Validation` for a blank name or bad email.
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    #[instrument(skip(self, changes), fields(customer_id = %id))]
    pub async fn update(
        &self,
        id: &CustomerId,
        changes: CustomerChanges,
    ) -> Result<Customer, CustomerError> {
        self.require(Permission::EditCustomers)?;
        let changes = changes.validate()?;

        let mut customer = self.load(id).await?;
        if changes.is_empty() {
            return Ok(customer);
        }

        self.customers
            .update(id, &changes)
            .await
            .map_err(|e| not_found_as(e, id))?;
        changes.apply_to(&mut customer);
        tracing::info!(customer_id = %id, "Updated customer");
        Ok(customer)
    }

    /// Move a customer to the archive. Already archived customers are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.archive`.
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn archive(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        self.require(Permission::ArchiveCustomers)?;
        self.archive_one(id).await
    }

    /// Restore an archived customer. Active customers are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.archive`.
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn unarchive(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        self.require(Permission::ArchiveCustomers)?;
        self.unarchive_one(id).await
    }

    /// Permanently delete an archived customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` without `customers.delete`.
    /// Returns `CustomerError::NotFound` if the customer does not exist.
    /// Returns `CustomerError::NotArchived` if the customer is active.
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete(&self, id: &CustomerId) -> Result<(), CustomerError> {
        self.require(Permission::DeleteCustomers)?;
        self.delete_one(id).await
    }

    async fn archive_one(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        let mut customer = self.load(id).await?;
        if customer
            .archive
            .archive(self.actor.name.as_str(), Utc::now())
            .is_changed()
        {
            self.write_archive(id, &customer.archive).await?;
            tracing::info!(customer_id = %id, by = %self.actor.name, "Archived customer");
        }
        Ok(customer)
    }

    async fn unarchive_one(&self, id: &CustomerId) -> Result<Customer, CustomerError> {
        let mut customer = self.load(id).await?;
        if customer.archive.unarchive().is_changed() {
            self.write_archive(id, &customer.archive).await?;
            tracing::info!(customer_id = %id, "Restored customer");
        }
        Ok(customer)
    }

    async fn delete_one(&self, id: &CustomerId) -> Result<(), CustomerError> {
        let customer = self.load(id).await?;
        if !customer.archive.allows_hard_delete() {
            return Err(CustomerError::NotArchived(id.clone()));
        }
        self.customers.delete(id).await?;
        tracing::info!(customer_id = %id, code = %customer.customer_id, "Deleted customer");
        Ok(())
    }

    async fn write_archive(&self, id: &CustomerId, state: &ArchiveState) -> Result<(), CustomerError> {
        self.customers
            .set_archive(id, state)
            .await
            .map_err(|e| not_found_as(e, id))
    }

    // =========================================================================
    // Bulk
    // =========================================================================

    /// Archive every customer in `ids`.
    ///
    /// # Errors
    ///
    /// See [`CustomerService::bulk`].
    pub async fn bulk_archive(&self, ids: &[CustomerId]) -> Result<BulkOutcome, CustomerError> {
        self.bulk(BulkAction::Archive, ids, 0).await
    }

    /// Restore every customer in `ids`.
    ///
    /// # Errors
    ///
    /// See [`CustomerService::bulk`].
    pub async fn bulk_unarchive(&self, ids: &[CustomerId]) -> Result<BulkOutcome, CustomerError> {
        self.bulk(BulkAction::Unarchive, ids, 0).await
    }

    /// Permanently delete every customer in `ids`.
    ///
    /// # Errors
    ///
    /// See [`CustomerService::bulk`].
    pub async fn bulk_delete(
        &self,
        ids: &[CustomerId],
        confirmations: u8,
    ) -> Result<BulkOutcome, CustomerError> {
        self.bulk(BulkAction::Delete, ids, confirmations).await
    }

    /// Apply `action` to each customer in `ids`, in order, skipping repeats.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::Forbidden` if the actor lacks the action's
    /// permission.
    /// Returns `CustomerError::EmptySelection` if `ids` is empty.
    /// Returns `CustomerError::ConfirmationRequired` for a delete confirmed
    /// fewer than [`BULK_DELETE_CONFIRMATIONS`] times.
    /// Returns `CustomerError::BulkAborted` when a customer fails; the
    /// customers before it stay changed.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn bulk(
        &self,
        action: BulkAction,
        ids: &[CustomerId],
        confirmations: u8,
    ) -> Result<BulkOutcome, CustomerError> {
        self.require(action.permission())?;
        if ids.is_empty() {
            return Err(CustomerError::EmptySelection);
        }
        if action == BulkAction::Delete && confirmations < BULK_DELETE_CONFIRMATIONS {
            return Err(CustomerError::ConfirmationRequired {
                required: BULK_DELETE_CONFIRMATIONS,
                given: confirmations,
            });
        }

        let mut unique: Vec<&CustomerId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }

        let total = unique.len();
        for (applied, id) in unique.into_iter().enumerate() {
            let result = match action {
                BulkAction::Archive => self.archive_one(id).await.map(drop),
                BulkAction::Unarchive => self.unarchive_one(id).await.map(drop),
                BulkAction::Delete => self.delete_one(id).await,
            };
            if let Err(source) = result {
                tracing::error!(?action, applied, total, failed = %id, error = %source, "Bulk operation aborted");
                return Err(CustomerError::BulkAborted {
                    applied,
                    total,
                    source: Box::new(source),
                });
            }
        }

        tracing::info!(?action, applied = total, "Bulk operation completed");
        Ok(BulkOutcome { applied: total })
    }
}

/// A write that finds the document gone reports the customer as missing.
fn not_found_as(err: RepositoryError, id: &CustomerId) -> CustomerError {
    match err {
        RepositoryError::NotFound => CustomerError::NotFound(id.clone()),
        other => CustomerError::Repository(other),
    }
}
