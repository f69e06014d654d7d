//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Session layer (tower-sessions, in-memory store)
//!
//! Authentication is enforced per handler through the [`RequireAuth`]
//! extractor rather than a blanket guard.

pub mod auth;
pub mod session;

pub use auth::{
    LOGIN_REQUIRED, OptionalAuth, RequireAuth, clear_current_user, set_current_user,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
