//! Bizdesk admin library.
//!
//! Customer records and login for a small business, backed by a hosted
//! document store (Firestore) and identity provider (Firebase Auth).
//!
//! # Layers
//!
//! - [`store`] / [`identity`]: the two external boundaries, each with a REST
//!   client and an in-memory implementation
//! - [`db`]: typed repositories over the document store
//! - [`services`]: login, customer operations, permission checks
//! - [`components`]: the customer list view-model and table configuration
//! - [`routes`] / [`middleware`]: the axum JSON API and sessions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod components;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
