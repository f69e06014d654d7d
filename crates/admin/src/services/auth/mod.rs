//! Login service.
//!
//! Users log in with either their username or their email. Usernames are
//! resolved to the profile's email before the provider sees them; emails go
//! to the provider as typed. Either way the provider verifies the password
//! and the profile decides whether the login may complete.

mod error;

pub use error::LoginError;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use bizdesk_core::Email;

use crate::db::{PasswordHelpRepository, UserProfileRepository};
use crate::identity::{IdentityProvider, SignedIn};
use crate::models::{CurrentUser, PasswordHelpRequest, UserProfile};
use crate::store::DocumentStore;

/// A completed login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The profile, with `auth_uid` and `last_login` as just written.
    pub profile: UserProfile,
    /// What to store in the session.
    pub session: CurrentUser,
}

/// Login service.
pub struct LoginService<'a> {
    profiles: UserProfileRepository<'a>,
    help_requests: PasswordHelpRepository<'a>,
    identity: &'a dyn IdentityProvider,
}

impl<'a> LoginService<'a> {
    /// Create a new login service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, identity: &'a dyn IdentityProvider) -> Self {
        Self {
            profiles: UserProfileRepository::new(store),
            help_requests: PasswordHelpRepository::new(store),
            identity,
        }
    }

    /// Resolve `identifier` (username or email) and `password` to a profile.
    ///
    /// On success the profile is linked to the provider account (if it was
    /// not already) and its `lastLogin` is stamped.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::MissingFields` if either input is blank.
    /// Returns `LoginError::InvalidCredentials` for an unknown username or a
    /// rejected password.
    /// Returns `LoginError::ProfileMissingEmail`, `ProfileNotFound` or
    /// `AccountInactive` when the profile cannot complete a login.
    /// Returns `LoginError::TooManyAttempts` or `ProviderUnavailable` for
    /// provider failures.
    #[instrument(skip(self, password), fields(identifier = %identifier.trim()))]
    pub async fn login(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, LoginError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.expose_secret().is_empty() {
            return Err(LoginError::MissingFields);
        }

        let (signed_in, known_profile) = if Email::looks_like_email(identifier) {
            (self.identity.sign_in(identifier, password).await?, None)
        } else {
            let profile = self
                .profiles
                .find_by_username(identifier)
                .await?
                .ok_or(LoginError::InvalidCredentials)?;
            let email = profile
                .email
                .as_ref()
                .ok_or(LoginError::ProfileMissingEmail)?;
            let signed_in = self.identity.sign_in(email.as_str(), password).await?;
            (signed_in, Some(profile))
        };

        let mut profile = match known_profile {
            Some(profile) => profile,
            None => self.profile_for_email_login(identifier, &signed_in).await?,
        };

        if profile.needs_auth_link(&signed_in.uid) {
            self.profiles
                .link_auth_uid(&profile.id, &signed_in.uid)
                .await?;
            tracing::info!(profile_id = %profile.id, "Linked profile to identity provider account");
            profile.auth_uid = Some(signed_in.uid.clone());
        }

        if !profile.status.is_active() {
            tracing::warn!(profile_id = %profile.id, status = %profile.status, "Login refused for inactive account");
            return Err(LoginError::AccountInactive);
        }

        let now = Utc::now();
        self.profiles.record_login(&profile.id, now).await?;
        profile.last_login = Some(now);

        tracing::info!(profile_id = %profile.id, username = %profile.username, "Login completed");
        let session = CurrentUser::from(&profile);
        Ok(LoginOutcome { profile, session })
    }

    /// Profile for an email login: the linked profile, else one whose email
    /// matches the provider's address or the identifier.
    ///
    /// Store equality is case-sensitive while the provider is not, so the
    /// identifier is also tried lowercased.
    async fn profile_for_email_login(
        &self,
        identifier: &str,
        signed_in: &SignedIn,
    ) -> Result<UserProfile, LoginError> {
        if let Some(profile) = self.profiles.find_by_auth_uid(&signed_in.uid).await? {
            return Ok(profile);
        }

        let lowercased = identifier.to_lowercase();
        let mut candidates: Vec<&str> = Vec::with_capacity(3);
        for email in [signed_in.email.trim(), identifier, lowercased.as_str()] {
            if !email.is_empty() && !candidates.contains(&email) {
                candidates.push(email);
            }
        }

        for email in candidates {
            if let Some(profile) = self.profiles.find_by_email(email).await? {
                return Ok(profile);
            }
        }
        Err(LoginError::ProfileNotFound)
    }

    /// Record that a user asked for help with their password.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::MissingFields` if `username` is blank.
    /// Returns `LoginError::Repository` if the write fails.
    #[instrument(skip(self))]
    pub async fn request_password_help(
        &self,
        username: &str,
    ) -> Result<PasswordHelpRequest, LoginError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginError::MissingFields);
        }

        let request = self.help_requests.create(username, Utc::now()).await?;
        tracing::info!(request_id = %request.id, "Password help requested");
        Ok(request)
    }
}
