//! # Authentication Routes
//!
//! The login entry point, the Google OAuth2 round-trip, and logout.
//!
//! ## Callback contract
//!
//! Every path through the callback produces a terminal response:
//!
//! | Condition                          | Response                          |
//! |------------------------------------|-----------------------------------|
//! | provider error / missing code      | 303 `/resident-login?error=oauth` |
//! | unknown or reused `state` token    | 303 `/resident-login?error=oauth` |
//! | code exchange fails                | 303 `/resident-login?error=oauth` |
//! | directory write-through fails      | 303 `/resident-login?error=internal` |
//! | success, tenant role               | 303 `/tenant-dashboard` + cookie  |
//! | success, landlord role             | 303 `/landlord-dashboard` + cookie |

use axum::extract::{Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use reslet_core::Role;

use crate::auth::directory;
use crate::auth::session::{clear_session_cookie, parse_cookie, set_session_cookie, SESSION_COOKIE};
use crate::error::{AppError, LOGIN_PATH};
use crate::state::AppState;

/// Build the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resident-login", get(login_page))
        .route("/auth/google", get(start_google_login))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", post(logout))
}

/// Query parameters surfaced on the login entry point.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// Error flag set by a failed callback or a forbidden redirect.
    #[serde(default)]
    error: Option<String>,
}

/// Login entry point descriptor.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginDescriptor {
    /// Path that begins the Google sign-in flow, absent when the identity
    /// provider is not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_login: Option<&'static str>,
    /// Error flag from a previous failed attempt, echoed for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /resident-login — Login entry point.
#[utoipa::path(
    get,
    path = "/resident-login",
    responses(
        (status = 200, description = "Login descriptor", body = LoginDescriptor),
    ),
    tag = "auth"
)]
async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Json<LoginDescriptor> {
    Json(LoginDescriptor {
        google_login: state.google.as_ref().map(|_| "/auth/google"),
        error: query.error,
    })
}

/// GET /auth/google — Begin the Google sign-in flow.
#[utoipa::path(
    get,
    path = "/auth/google",
    responses(
        (status = 303, description = "Redirect to the Google consent screen"),
        (status = 503, description = "Identity provider not configured", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn start_google_login(State(state): State<AppState>) -> Result<Redirect, AppError> {
    let provider = state.google.as_ref().ok_or_else(|| {
        AppError::service_unavailable(
            "Google sign-in is not configured. Set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET.",
        )
    })?;
    let token = state.login_states.issue();
    Ok(Redirect::to(&provider.authorize_url(&token)))
}

/// Query parameters Google appends to the callback redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    /// Set by the provider when the user denied consent.
    #[serde(default)]
    error: Option<String>,
}

fn login_error_redirect(flag: &str) -> Response {
    Redirect::to(&format!("{LOGIN_PATH}?error={flag}")).into_response()
}

/// GET /auth/google/callback — Complete the Google sign-in flow.
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    responses(
        (status = 303, description = "Redirect to the role's dashboard, or back to the login page with an error flag"),
    ),
    tag = "auth"
)]
async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(provider) = state.google.as_ref() else {
        return login_error_redirect("oauth");
    };

    if let Some(err) = &query.error {
        tracing::info!(provider_error = %err, "google sign-in denied or failed at provider");
        return login_error_redirect("oauth");
    }
    let (Some(code), Some(state_token)) = (&query.code, &query.state) else {
        return login_error_redirect("oauth");
    };
    if !state.login_states.take(state_token) {
        tracing::warn!("google callback carried an unknown or expired state token");
        return login_error_redirect("oauth");
    }

    let profile = match provider.fetch_profile(code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "google code exchange failed");
            return login_error_redirect("oauth");
        }
    };

    let user = match directory::resolve_user(&state, &profile).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "identity resolution failed after provider exchange");
            return login_error_redirect("internal");
        }
    };

    let token = state.sessions.create(user.id);
    let target = match user.role {
        Role::Tenant => "/tenant-dashboard",
        Role::Landlord => "/landlord-dashboard",
    };
    let mut response = Redirect::to(target).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, set_session_cookie(&token));
    response
}

/// POST /logout — Destroy the session and clear the cookie.
///
/// Always succeeds: logging out with a dead or missing session is not an
/// error worth surfacing to a browser.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Redirect to the login page with the session destroyed"),
    ),
    tag = "auth"
)]
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = parse_cookie(&headers, SESSION_COOKIE) {
        state.sessions.destroy(&token);
    }
    let mut response = Redirect::to(LOGIN_PATH).into_response();
    response
        .headers_mut()
        .insert(SET_COOKIE, clear_session_cookie());
    response
}
