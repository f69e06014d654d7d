//! Customer service error types.

use thiserror::Error;

use bizdesk_core::{CustomerId, Permission};

use crate::db::RepositoryError;
use crate::models::CustomerValidationError;

/// Errors that can occur during customer operations.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] CustomerValidationError),

    /// A bulk request named no customers.
    #[error("no customers selected")]
    EmptySelection,

    /// Permanent bulk delete was not confirmed enough times.
    #[error("permanent delete needs {required} confirmations, got {given}")]
    ConfirmationRequired {
        /// Confirmations needed.
        required: u8,
        /// Confirmations received.
        given: u8,
    },

    /// Customer not found.
    #[error("customer not found: {0}")]
    NotFound(CustomerId),

    /// Hard delete attempted on an active customer.
    #[error("customer {0} must be archived before it can be deleted")]
    NotArchived(CustomerId),

    /// The current user lacks the permission.
    #[error("missing permission: {0}")]
    Forbidden(Permission),

    /// Repository/store error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// A bulk operation stopped part way.
    #[error("bulk operation stopped after {applied} of {total}: {source}")]
    BulkAborted {
        /// Customers changed before the failure.
        applied: usize,
        /// Customers in the request.
        total: usize,
        /// The failure that stopped the run.
        source: Box<CustomerError>,
    },
}
