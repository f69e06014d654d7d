//! Firebase Auth client (Identity Toolkit REST API).
//!
//! # API Reference
//!
//! - Base URL: `https://identitytoolkit.googleapis.com` (the emulator serves
//!   the same paths under `http://localhost:9099/identitytoolkit.googleapis.com`)
//! - Sign in: `POST /v1/accounts:signInWithPassword?key={api_key}`
//! - Sign up: `POST /v1/accounts:signUp?key={api_key}`
//!
//! Errors come back as HTTP 400 with `{"error": {"message": "CODE"}}`, where
//! the code may be followed by ` : ` and a human-readable explanation.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use bizdesk_core::AuthUid;

use super::{IdentityError, IdentityProvider, SignedIn};
use crate::config::FirebaseConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Firebase Auth REST client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    inner: Arc<FirebaseAuthClientInner>,
}

struct FirebaseAuthClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl FirebaseAuthClient {
    /// Create a new Firebase Auth client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            inner: Arc::new(FirebaseAuthClientInner {
                client,
                base_url: config.auth_base_url.trim_end_matches('/').to_owned(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    async fn post_account(
        &self,
        action: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<AccountResponse, IdentityError> {
        let url = format!("{}/v1/accounts:{action}", self.inner.base_url);
        let body = PasswordRequest {
            email,
            password: password.expose_secret(),
            return_secure_token: true,
        };

        let response = self
            .inner
            .client
            .post(&url)
            .query(&[("key", self.inner.api_key.expose_secret())])
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            return response.json().await.map_err(|e| IdentityError::Api {
                status: 200,
                message: format!("Failed to parse response: {e}"),
            });
        }

        Err(parse_error(response).await)
    }
}

/// Map a provider error response to [`IdentityError`].
async fn parse_error(response: reqwest::Response) -> IdentityError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) else {
        return IdentityError::Api {
            status,
            message: body,
        };
    };

    let code = error_code(&envelope.error.message);
    match code {
        "INVALID_PASSWORD"
        | "EMAIL_NOT_FOUND"
        | "INVALID_LOGIN_CREDENTIALS"
        | "INVALID_EMAIL"
        | "USER_DISABLED" => IdentityError::InvalidCredentials,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::RateLimited,
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        _ => IdentityError::Api {
            status,
            message: envelope.error.message,
        },
    }
}

/// Leading error code of a provider message (`"CODE : details"` -> `"CODE"`).
fn error_code(message: &str) -> &str {
    message
        .split_once(" : ")
        .map_or(message, |(code, _)| code)
        .trim()
}

#[async_trait]
impl IdentityProvider for FirebaseAuthClient {
    #[tracing::instrument(skip(self, password))]
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedIn, IdentityError> {
        let account = self
            .post_account("signInWithPassword", email, password)
            .await?;

        Ok(SignedIn {
            uid: AuthUid::new(account.local_id),
            email: account.email,
        })
    }

    #[tracing::instrument(skip(self, password))]
    async fn create_account(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthUid, IdentityError> {
        let account = self.post_account("signUp", email, password).await?;
        tracing::info!(uid = %account.local_id, "Created identity account");
        Ok(AuthUid::new(account.local_id))
    }
}

impl std::fmt::Debug for FirebaseAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuthClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(base_url: &str) -> FirebaseAuthClient {
        FirebaseAuthClient::new(&FirebaseConfig {
            project_id: "demo-shop".to_string(),
            api_key: SecretString::from("test-key"),
            database: "(default)".to_string(),
            firestore_base_url: base_url.to_string(),
            auth_base_url: base_url.to_string(),
            access_token: None,
        })
        .unwrap()
    }

    fn password() -> SecretString {
        SecretString::from("hunter22")
    }

    async fn mount_error(server: &MockServer, message: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": message, "errors": []}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_sign_in_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "email": "maria@shop.ph",
                "password": "hunter22",
                "returnSecureToken": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-maria",
                "email": "maria@shop.ph",
                "idToken": "token",
                "refreshToken": "refresh",
                "expiresIn": "3600"
            })))
            .mount(&server)
            .await;

        let signed_in = client(&server.uri())
            .sign_in("maria@shop.ph", &password())
            .await
            .unwrap();
        assert_eq!(signed_in.uid.as_str(), "uid-maria");
        assert_eq!(signed_in.email, "maria@shop.ph");
    }

    #[tokio::test]
    async fn test_rejections_collapse_to_invalid_credentials() {
        for code in [
            "INVALID_PASSWORD",
            "EMAIL_NOT_FOUND",
            "INVALID_LOGIN_CREDENTIALS",
            "USER_DISABLED",
        ] {
            let server = MockServer::start().await;
            mount_error(&server, code).await;

            let err = client(&server.uri())
                .sign_in("maria@shop.ph", &password())
                .await
                .unwrap_err();
            assert!(
                matches!(err, IdentityError::InvalidCredentials),
                "{code} mapped to {err}"
            );
        }
    }

    #[tokio::test]
    async fn test_too_many_attempts_with_details() {
        let server = MockServer::start().await;
        mount_error(
            &server,
            "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled",
        )
        .await;

        let err = client(&server.uri())
            .sign_in("maria@shop.ph", &password())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::RateLimited));
    }

    #[tokio::test]
    async fn test_unexpected_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .sign_in("maria@shop.ph", &password())
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_create_account() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/accounts:signUp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "localId": "uid-new",
                "email": "new@shop.ph",
                "idToken": "token"
            })))
            .mount(&server)
            .await;

        let uid = client(&server.uri())
            .create_account("new@shop.ph", &password())
            .await
            .unwrap();
        assert_eq!(uid.as_str(), "uid-new");
    }

    #[test]
    fn test_error_code() {
        assert_eq!(error_code("EMAIL_EXISTS"), "EMAIL_EXISTS");
        assert_eq!(
            error_code("TOO_MANY_ATTEMPTS_TRY_LATER : details here"),
            "TOO_MANY_ATTEMPTS_TRY_LATER"
        );
    }
}
