//! Bizdesk Core - Shared domain types.
//!
//! This crate provides the domain types used across all Bizdesk components:
//! - `admin` - Customer records and login API backed by Firestore
//! - `cli` - Command-line tools for seeding and inspecting the store
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no document
//! store access, no HTTP clients. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, emails, customer codes,
//!   profile statuses, archival state and permissions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
