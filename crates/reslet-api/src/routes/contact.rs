//! # Contact Form
//!
//! Public contact form relayed to the email collaborator. Delivery is
//! fire-and-forget: the send runs on a spawned task, failures are logged,
//! and the browser gets 202 as soon as the message is validated.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use reslet_core::EmailAddress;
use reslet_upstream::EmailMessage;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Build the contact-form router.
pub fn router() -> Router<AppState> {
    Router::new().route("/send-email", post(send_contact_email))
}

/// Contact-form submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ContactRequest {
    pub name: String,
    /// Submitter's email, used as the reply-to address.
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub subject: String,
    pub message: String,
}

impl Validate for ContactRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.name.len() > 255 {
            return Err("name must not exceed 255 characters".to_string());
        }
        if self.subject.trim().is_empty() {
            return Err("subject must not be empty".to_string());
        }
        if self.subject.len() > 255 {
            return Err("subject must not exceed 255 characters".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        if self.message.len() > 10_000 {
            return Err("message must not exceed 10000 characters".to_string());
        }
        Ok(())
    }
}

/// Acknowledgement returned once the message is queued.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContactAck {
    pub status: &'static str,
}

/// POST /send-email — Relay a contact-form message.
#[utoipa::path(
    post,
    path = "/send-email",
    request_body = ContactRequest,
    responses(
        (status = 202, description = "Message queued for delivery", body = ContactAck),
        (status = 503, description = "Email collaborator not configured", body = crate::error::ErrorBody),
    ),
    tag = "contact"
)]
async fn send_contact_email(
    State(state): State<AppState>,
    body: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactAck>), AppError> {
    let req = extract_validated_json(body)?;

    let sender = state.email.clone().ok_or_else(|| {
        AppError::service_unavailable(
            "Email relay not configured. Set EMAIL_RELAY_URL environment variable.",
        )
    })?;
    let inbox = state.config.contact_inbox.clone().ok_or_else(|| {
        AppError::service_unavailable(
            "Contact inbox not configured. Set CONTACT_INBOX environment variable.",
        )
    })?;

    let message = EmailMessage {
        to: inbox,
        reply_to: req.email.as_str().to_string(),
        subject: format!("[contact] {}", req.subject),
        text: format!("From {} <{}>\n\n{}", req.name, req.email, req.message),
    };

    // Fire-and-forget: delivery failure is an operator concern, not the
    // visitor's.
    tokio::spawn(async move {
        if let Err(e) = sender.send(&message).await {
            tracing::error!(error = %e, "contact-form email delivery failed");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(ContactAck { status: "accepted" })))
}
