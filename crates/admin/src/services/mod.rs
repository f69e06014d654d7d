//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Username-or-email login and password help requests
//! - `customers` - Customer CRUD, archival and bulk operations
//! - `permissions` - Role-based permission checks

pub mod auth;
pub mod customers;
pub mod permissions;

pub use auth::{LoginError, LoginOutcome, LoginService};
pub use customers::{BulkAction, BulkOutcome, CustomerError, CustomerService};
pub use permissions::{PermissionCheck, RolePermissions};
