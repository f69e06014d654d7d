//! Integration tests for Bizdesk.
//!
//! The full admin router (sessions, headers, tracing, error mapping) is
//! driven in-process with `tower::ServiceExt::oneshot` over the in-memory
//! document store and identity provider. No network or Firebase project is
//! needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bizdesk-integration-tests
//! ```
//!
//! # Seeded Users
//!
//! | Username | Email               | Roles  | Notes                            |
//! |----------|---------------------|--------|----------------------------------|
//! | `maria`  | `maria@garage.ph`   | admin  |                                  |
//! | `pedro`  | `pedro@garage.ph`   | staff  | Cannot delete                    |
//! | `ana`    | `ana@garage.ph`     | viewer | Read-only                        |
//! | `luis`   | `luis@garage.ph`    | staff  | Status `suspended`               |
//! | `carla`  | `carla@garage.ph`   | admin  | Account exists, profile unlinked |
//! | `nomail` | -                   | staff  | No email on the profile          |
//!
//! Every password is [`PASSWORD`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use bizdesk_admin::config::AdminConfig;
use bizdesk_admin::identity::StaticIdentityProvider;
use bizdesk_admin::middleware::SESSION_COOKIE_NAME;
use bizdesk_admin::routes;
use bizdesk_admin::seed::{SeedFile, apply_seed};
use bizdesk_admin::services::RolePermissions;
use bizdesk_admin::state::AppState;
use bizdesk_admin::store::MemoryStore;

/// Password of every seeded account.
pub const PASSWORD: &str = "correct horse battery";

const SEED: &str = r"
profiles:
  - username: maria
    email: maria@garage.ph
    fullName: Maria Santos
    roles: [admin]
    password: correct horse battery
  - username: pedro
    email: pedro@garage.ph
    fullName: Pedro Reyes
    roles: [staff]
    password: correct horse battery
  - username: ana
    email: ana@garage.ph
    fullName: Ana Cruz
    roles: [viewer]
    password: correct horse battery
  - username: luis
    email: luis@garage.ph
    fullName: Luis Garcia
    roles: [staff]
    status: suspended
    password: correct horse battery
  - username: carla
    email: carla@garage.ph
    fullName: Carla Mendoza
    roles: [admin]
  - username: nomail
    fullName: No Mail
    roles: [staff]
customers:
  - name: Juan Dela Cruz
    contact: 0917 555 0101
    email: juan@example.ph
    address: 12 Rizal St, Quezon City
    vehicleTypes: [Truck, Van]
  - name: Acme Logistics
    contact: 0917 555 0202
    email: ops@acme.ph
    address: Pier 4, Manila
    vehicleTypes: [Truck]
  - name: Bituin Tours
    contact: 0917 555 0303
    address: Baguio City
    vehicleTypes: [Bus]
";

/// A running app plus handles to its backends.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<StaticIdentityProvider>,
}

/// Response with the body parsed as JSON (`Value::Null` when empty or not
/// JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` of the session cookie set by this response, if any.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(str::to_owned)
    }
}

impl TestApp {
    /// Build the app over seeded in-memory backends.
    ///
    /// # Panics
    ///
    /// Panics if the seed cannot be applied.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let identity = Arc::new(
            StaticIdentityProvider::new().with_account("carla@garage.ph", PASSWORD, "uid-carla"),
        );

        let seed = SeedFile::parse(SEED).expect("seed parses");
        apply_seed(store.as_ref(), identity.as_ref(), &seed)
            .await
            .expect("seed applies");

        let state = AppState::new(
            AdminConfig::in_memory("http://localhost:3001"),
            store.clone(),
            identity.clone(),
            Arc::new(RolePermissions::default()),
        );

        Self {
            router: routes::app(state),
            store,
            identity,
        }
    }

    /// Send a request through the whole middleware stack.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` with an optional session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, cookie, None).await
    }

    /// `POST` a JSON body with an optional session cookie.
    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    /// Attempt a login.
    pub async fn try_login(&self, identifier: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/login",
            None,
            serde_json::json!({ "identifier": identifier, "password": password }),
        )
        .await
    }

    /// Log in and return the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the login fails or sets no cookie.
    pub async fn login(&self, identifier: &str) -> String {
        let response = self.try_login(identifier, PASSWORD).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "login as {identifier} failed: {}",
            response.body
        );
        response
            .session_cookie()
            .expect("login sets a session cookie")
    }

    /// Customer record with the given business code, from the active or
    /// archived list.
    ///
    /// # Panics
    ///
    /// Panics if the listing fails or no record has that code.
    pub async fn customer_by_code(&self, cookie: &str, code: &str) -> Value {
        for archived in [false, true] {
            let response = self
                .get(&format!("/api/customers?archived={archived}"), Some(cookie))
                .await;
            assert_eq!(response.status, StatusCode::OK);
            if let Some(found) = response.body["customers"]
                .as_array()
                .and_then(|rows| rows.iter().find(|c| c["customerId"] == code))
            {
                return found.clone();
            }
        }
        panic!("no customer {code}");
    }
}
