//! Core types for Bizdesk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod archive;
pub mod customer_code;
pub mod email;
pub mod id;
pub mod permission;
pub mod sort;
pub mod status;

pub use archive::{ArchiveFields, ArchiveState, ArchiveTransition};
pub use customer_code::{CustomerCode, CustomerCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use permission::{Permission, Role};
pub use sort::SortDirection;
pub use status::ProfileStatus;
