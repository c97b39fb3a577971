//! # API Error Types
//!
//! One structured error type implementing `axum::response::IntoResponse`.
//! Browser-facing authentication failures redirect to the login entry
//! point; everything else returns a JSON error body with a machine-readable
//! code. Internal and upstream error details are logged server-side and
//! never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Login entry point that unauthenticated requests are sent to.
pub const LOGIN_PATH: &str = "/resident-login";

/// Structured JSON error response body.
///
/// All non-redirect error responses use this format. The `details` field
/// carries additional context for validation errors and is omitted for
/// 500-class errors to prevent information leakage.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type mapped onto HTTP semantics.
#[derive(Error, Debug)]
pub enum AppError {
    /// No valid authenticated session — 303 redirect to the login page.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Authenticated but the wrong role for this route — 303 redirect to
    /// the login page with a forbidden flag.
    #[error("role not permitted for this route")]
    RoleForbidden,

    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflict with current state, e.g. a duplicate link (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// External collaborator returned an error or is unreachable (502).
    /// Message is logged but not returned to the client.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A required collaborator is not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for the JSON variants.
    /// Redirect variants never reach this.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::AuthenticationRequired => (StatusCode::SEE_OTHER, "AUTHENTICATION_REQUIRED"),
            Self::RoleForbidden => (StatusCode::SEE_OTHER, "FORBIDDEN"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Construct a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Construct a service-unavailable error.
    pub fn service_unavailable(msg: &str) -> Self {
        Self::ServiceUnavailable(msg.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Authentication failures are browser flows: redirect, don't JSON.
        match self {
            Self::AuthenticationRequired => {
                return Redirect::to(LOGIN_PATH).into_response();
            }
            Self::RoleForbidden => {
                return Redirect::to(&format!("{LOGIN_PATH}?error=forbidden")).into_response();
            }
            _ => {}
        }

        let (status, code) = self.status_and_code();

        // Never expose internal/upstream error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::Upstream(_) => "An upstream service error occurred".to_string(),
            other => other.to_string(),
        };

        // Log server-side errors for operator visibility.
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Upstream(_) => tracing::error!(error = %self, "upstream collaborator error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert domain validation errors to API errors.
impl From<reslet_core::ValidationError> for AppError {
    fn from(err: reslet_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert upstream collaborator errors to API errors. Missing
/// configuration maps to 503; everything else is a 502.
impl From<reslet_upstream::UpstreamError> for AppError {
    fn from(err: reslet_upstream::UpstreamError) -> Self {
        match &err {
            reslet_upstream::UpstreamError::NotConfigured(_) => {
                Self::ServiceUnavailable(err.to_string())
            }
            _ => Self::Upstream(err.to_string()),
        }
    }
}

/// Database errors are internal: the pool and queries are ours, the
/// client can do nothing about them.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(format!("database error: {err}"))
    }
}
