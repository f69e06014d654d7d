//! Password help requests.

use chrono::{DateTime, Utc};

use bizdesk_core::PasswordHelpRequestId;

/// A user asked an administrator to reset their password.
///
/// Requests are append-only; staff resolve them outside the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHelpRequest {
    /// Document ID.
    pub id: PasswordHelpRequestId,
    /// Username as typed by the requester.
    pub username: String,
    /// When the request was made.
    pub created_at: DateTime<Utc>,
}
