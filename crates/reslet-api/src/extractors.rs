//! # Request Extractors
//!
//! The access-control gate, expressed as composable extractors: a handler
//! declares the access it needs by the parameter it takes.
//!
//! - [`AuthUser`] — any authenticated session.
//! - [`TenantUser`] / [`LandlordUser`] — additionally require the role.
//!
//! Per request the state machine is: anonymous → (valid session cookie) →
//! authenticated → (role check) → authorized. A missing/invalid session
//! rejects with a redirect to the login entry point; a wrong role rejects
//! with the same redirect carrying a forbidden flag. A session whose user
//! id no longer resolves (deleted account) is treated as unauthenticated.
//!
//! [`Validate`] and [`extract_validated_json`] close the input-validation
//! gap: every request body is checked before a handler touches it, and
//! malformed JSON surfaces as a 422 instead of a framework default.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Json;

use reslet_core::Role;

use crate::auth::session::{parse_cookie, SESSION_COOKIE};
use crate::error::AppError;
use crate::state::{AppState, UserRecord};

/// Request-body validation, applied after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body extraction and run request validation.
///
/// Deserialization failures and validation failures both map to
/// [`AppError::Validation`] — the client sent syntactically valid HTTP
/// with semantically invalid content.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Any authenticated user, resolved from the session cookie.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserRecord);

/// An authenticated user with the tenant role.
#[derive(Debug, Clone)]
pub struct TenantUser(pub UserRecord);

/// An authenticated user with the landlord role.
#[derive(Debug, Clone)]
pub struct LandlordUser(pub UserRecord);

/// Shared session resolution for the three extractors.
fn resolve_session(parts: &Parts, state: &AppState) -> Result<UserRecord, AppError> {
    let token =
        parse_cookie(&parts.headers, SESSION_COOKIE).ok_or(AppError::AuthenticationRequired)?;
    let user_id = state
        .sessions
        .resolve(&token)
        .ok_or(AppError::AuthenticationRequired)?;
    // The id may no longer resolve to a user (deleted account). Drop the
    // orphaned session rather than leaving it to resolve-and-fail forever.
    match state.users.get(&user_id) {
        Some(user) => Ok(user),
        None => {
            state.sessions.destroy(&token);
            Err(AppError::AuthenticationRequired)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        resolve_session(parts, state).map(AuthUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for TenantUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user = resolve_session(parts, state)?;
        if user.role != Role::Tenant {
            return Err(AppError::RoleForbidden);
        }
        Ok(TenantUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for LandlordUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user = resolve_session(parts, state)?;
        if user.role != Role::Landlord {
            return Err(AppError::RoleForbidden);
        }
        Ok(LandlordUser(user))
    }
}
