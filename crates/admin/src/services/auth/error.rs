//! Login error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::identity::IdentityError;

/// Errors that can occur while resolving a login.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Identifier or password left blank.
    #[error("identifier and password are required")]
    MissingFields,

    /// Unknown username, or the provider rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The username resolved to a profile without a sign-in email.
    #[error("profile has no email on file")]
    ProfileMissingEmail,

    /// Sign-in succeeded but no profile is linked to the account.
    #[error("no profile for signed-in account")]
    ProfileNotFound,

    /// The profile status is not `active`.
    #[error("account is not active")]
    AccountInactive,

    /// The provider is throttling this account.
    #[error("too many attempts")]
    TooManyAttempts,

    /// The provider failed for a reason other than bad credentials.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(#[source] IdentityError),

    /// Repository/store error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<IdentityError> for LoginError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::InvalidCredentials,
            IdentityError::RateLimited => Self::TooManyAttempts,
            other => Self::ProviderUnavailable(other),
        }
    }
}

impl LoginError {
    /// Message shown to the person logging in.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Please enter your username and password.",
            Self::InvalidCredentials => "Invalid credentials.",
            Self::ProfileMissingEmail => {
                "This account has no email address on file. Please contact an administrator."
            }
            Self::ProfileNotFound => {
                "No user profile is linked to this account. Please contact an administrator."
            }
            Self::AccountInactive => "Your account is inactive. Please contact an administrator.",
            Self::TooManyAttempts => "Too many login attempts. Please try again later.",
            Self::ProviderUnavailable(_) => {
                "The sign-in service is unavailable. Please try again later."
            }
            Self::Repository(_) => "Operation failed, please try again",
        }
    }

    /// Whether the failure is on our side rather than the user's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::Repository(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_map_to_login_errors() {
        assert!(matches!(
            LoginError::from(IdentityError::InvalidCredentials),
            LoginError::InvalidCredentials
        ));
        assert!(matches!(
            LoginError::from(IdentityError::RateLimited),
            LoginError::TooManyAttempts
        ));
        let err = LoginError::from(IdentityError::Api {
            status: 503,
            message: "down".to_string(),
        });
        assert!(err.is_server_error());
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            LoginError::MissingFields,
            LoginError::InvalidCredentials,
            LoginError::ProfileMissingEmail,
            LoginError::ProfileNotFound,
            LoginError::AccountInactive,
            LoginError::TooManyAttempts,
            LoginError::ProviderUnavailable(IdentityError::EmailExists),
            LoginError::Repository(RepositoryError::NotFound),
        ];
        let messages: std::collections::HashSet<_> =
            errors.iter().map(LoginError::user_message).collect();
        assert_eq!(messages.len(), errors.len());
    }
}
