//! Authentication route handlers.
//!
//! Username-or-email + password login, logout, and password help requests.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use bizdesk_core::Permission;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::LoginService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/password-help", post(password_help))
        .route("/api/me", get(me))
}

/// Login form body.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Log in.
///
/// POST /auth/login
#[instrument(skip(state, session, body))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<CurrentUser>, AppError> {
    let password = SecretString::from(body.password);
    let outcome = LoginService::new(state.store(), state.identity())
        .login(&body.identifier, &password)
        .await?;

    set_current_user(&session, &outcome.session).await?;
    set_sentry_user(&outcome.session);

    Ok(Json(outcome.session))
}

/// Log out and drop the session.
///
/// POST /auth/logout
async fn logout(
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<StatusCode, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    if let Some(user) = user {
        tracing::info!(profile_id = %user.id, "Logged out");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Password help form body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordHelpRequestBody {
    pub username: String,
}

/// Ask an administrator for password help.
///
/// POST /auth/password-help
async fn password_help(
    State(state): State<AppState>,
    Json(body): Json<PasswordHelpRequestBody>,
) -> Result<impl IntoResponse, AppError> {
    LoginService::new(state.store(), state.identity())
        .request_password_help(&body.username)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Your request has been sent. An administrator will contact you."
        })),
    ))
}

/// Signed-in user with what they may do.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: CurrentUser,
    pub permissions: Vec<Permission>,
}

/// Current user.
///
/// GET /api/me
async fn me(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Json<MeResponse> {
    let permissions = Permission::ALL
        .into_iter()
        .filter(|p| state.permissions().can(&user.roles, *p))
        .collect();
    Json(MeResponse { user, permissions })
}
