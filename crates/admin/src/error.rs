//! Unified error handling for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::CurrentUser;
use crate::services::{CustomerError, LoginError};

/// Message shown for any failure on our side.
pub const GENERIC_FAILURE: &str = "Operation failed, please try again";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Login failed.
    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    /// Customer operation failed.
    #[error("Customer error: {0}")]
    Customer(#[from] CustomerError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Login(LoginError::MissingFields) => StatusCode::BAD_REQUEST,
            Self::Login(LoginError::Repository(_)) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Login(_) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Customer(err) => match err {
                CustomerError::Validation(_)
                | CustomerError::EmptySelection
                | CustomerError::ConfirmationRequired { .. } => StatusCode::BAD_REQUEST,
                CustomerError::NotFound(_) => StatusCode::NOT_FOUND,
                CustomerError::NotArchived(_) => StatusCode::CONFLICT,
                CustomerError::Forbidden(_) => StatusCode::FORBIDDEN,
                CustomerError::Repository(_) | CustomerError::BulkAborted { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Whether the error is reported to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Login(err) => err.is_server_error(),
            Self::Customer(err) => matches!(
                err,
                CustomerError::Repository(_) | CustomerError::BulkAborted { .. }
            ),
            Self::Session(_) => true,
            Self::Unauthorized(_) => false,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Login(err) => err.user_message().to_string(),
            Self::Customer(
                err @ (CustomerError::Validation(_)
                | CustomerError::EmptySelection
                | CustomerError::ConfirmationRequired { .. }
                | CustomerError::NotFound(_)
                | CustomerError::NotArchived(_)
                | CustomerError::Forbidden(_)),
            ) => capitalize(&err.to_string()),
            Self::Unauthorized(msg) => msg.clone(),
            Self::Customer(_) | Self::Session(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let message = self.public_message();

        // Partial bulk runs report how far they got
        let body = match &self {
            Self::Customer(CustomerError::BulkAborted { applied, total, .. }) => {
                json!({ "error": message, "applied": applied, "total": total })
            }
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from the signed-in user.
pub fn set_sentry_user(user: &CurrentUser) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            username: Some(user.name.clone()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use bizdesk_core::{CustomerId, Permission};

    use super::*;
    use crate::db::RepositoryError;
    use crate::identity::IdentityError;
    use crate::models::CustomerValidationError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Unauthorized("Please log in.".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Please log in.");
    }

    #[test]
    fn test_unauthorized_is_client_error() {
        let err = AppError::Unauthorized("Please log in.".to_string());
        assert!(!err.is_server_error());
        assert_eq!(err.public_message(), "Please log in.");
        assert_eq!(get_status(err), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_login_error_status_codes() {
        assert_eq!(
            get_status(LoginError::MissingFields.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(LoginError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(LoginError::AccountInactive.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(LoginError::ProviderUnavailable(IdentityError::RateLimited).into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(LoginError::Repository(RepositoryError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_customer_error_status_codes() {
        let id = CustomerId::new("c1");
        assert_eq!(
            get_status(CustomerError::Validation(CustomerValidationError::MissingName).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CustomerError::NotFound(id.clone()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CustomerError::NotArchived(id).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CustomerError::Forbidden(Permission::DeleteCustomers).into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = AppError::Customer(CustomerError::Repository(RepositoryError::DataCorruption(
            "bad doc abc".to_string(),
        )));
        assert_eq!(err.public_message(), GENERIC_FAILURE);

        let err = AppError::Customer(CustomerError::BulkAborted {
            applied: 2,
            total: 5,
            source: Box::new(CustomerError::NotFound(CustomerId::new("x"))),
        });
        assert_eq!(err.public_message(), GENERIC_FAILURE);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_messages() {
        let err = AppError::Customer(CustomerError::EmptySelection);
        assert_eq!(err.public_message(), "No customers selected");

        let err = AppError::Login(LoginError::InvalidCredentials);
        assert_eq!(err.public_message(), "Invalid credentials.");
    }
}
