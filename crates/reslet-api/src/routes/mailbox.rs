//! # Internal Mailbox
//!
//! Mail between platform users. Messages are immutable; both endpoints
//! require an authenticated session of either role. A send whose receiver
//! does not exist is rejected before any row is written.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use reslet_core::{MessageId, UserId};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, AuthUser, Validate};
use crate::state::{AppState, MessageRecord};

/// Build the mailbox router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mailbox", get(list_mail))
        .route("/mailbox/send", post(send_mail))
}

/// A message enriched with the display names of both parties.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    #[schema(value_type = String, format = Uuid)]
    pub id: MessageId,
    #[schema(value_type = String, format = Uuid)]
    pub sender_id: UserId,
    pub sender_name: String,
    #[schema(value_type = String, format = Uuid)]
    pub receiver_id: UserId,
    pub receiver_name: String,
    pub subject: String,
    pub body: String,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

/// Mailbox contents for the authenticated user.
#[derive(Debug, Serialize, ToSchema)]
pub struct MailboxView {
    /// Messages received, newest first.
    pub inbox: Vec<MessageView>,
    /// Messages sent, newest first.
    pub sent: Vec<MessageView>,
}

/// Resolve a record into a view, looking up party names. A missing user
/// (never expected — users are not deleted) renders as "unknown".
pub(crate) fn message_view(state: &AppState, record: MessageRecord) -> MessageView {
    let name_of = |id: &UserId| {
        state
            .users
            .get(id)
            .map(|u| u.name)
            .unwrap_or_else(|| "unknown".to_string())
    };
    MessageView {
        sender_name: name_of(&record.sender_id),
        receiver_name: name_of(&record.receiver_id),
        id: record.id,
        sender_id: record.sender_id,
        receiver_id: record.receiver_id,
        subject: record.subject,
        body: record.body,
        sent_at: record.sent_at,
    }
}

/// The user's inbox and sent messages, newest first, at most `limit` each.
pub(crate) fn messages_for(
    state: &AppState,
    user_id: UserId,
    limit: usize,
) -> (Vec<MessageView>, Vec<MessageView>) {
    let mut inbox: Vec<MessageRecord> = Vec::new();
    let mut sent: Vec<MessageRecord> = Vec::new();
    for record in state.messages.list() {
        if record.receiver_id == user_id {
            inbox.push(record);
        } else if record.sender_id == user_id {
            sent.push(record);
        }
    }
    inbox.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    sent.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
    inbox.truncate(limit);
    sent.truncate(limit);
    (
        inbox.into_iter().map(|r| message_view(state, r)).collect(),
        sent.into_iter().map(|r| message_view(state, r)).collect(),
    )
}

/// GET /mailbox — The authenticated user's mailbox, newest first.
#[utoipa::path(
    get,
    path = "/mailbox",
    responses(
        (status = 200, description = "Mailbox contents", body = MailboxView),
        (status = 303, description = "No valid session — redirect to login"),
    ),
    tag = "mailbox"
)]
async fn list_mail(State(state): State<AppState>, AuthUser(user): AuthUser) -> Json<MailboxView> {
    let (inbox, sent) = messages_for(&state, user.id, usize::MAX);
    Json(MailboxView { inbox, sent })
}

/// Request to send a mailbox message.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMailRequest {
    /// Receiver's user id.
    pub receiver_id: Uuid,
    pub subject: String,
    /// Message body.
    pub body: String,
}

impl Validate for SendMailRequest {
    fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("subject must not be empty".to_string());
        }
        if self.subject.len() > 255 {
            return Err("subject must not exceed 255 characters".to_string());
        }
        if self.body.trim().is_empty() {
            return Err("body must not be empty".to_string());
        }
        if self.body.len() > 10_000 {
            return Err("body must not exceed 10000 characters".to_string());
        }
        Ok(())
    }
}

/// POST /mailbox/send — Send a message to another user.
#[utoipa::path(
    post,
    path = "/mailbox/send",
    request_body = SendMailRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageView),
        (status = 404, description = "Receiver does not exist", body = crate::error::ErrorBody),
        (status = 303, description = "No valid session — redirect to login"),
    ),
    tag = "mailbox"
)]
async fn send_mail(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<SendMailRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageView>), AppError> {
    let req = extract_validated_json(body)?;

    let receiver_id = UserId::from_uuid(req.receiver_id);
    if !state.users.contains(&receiver_id) {
        return Err(AppError::not_found(format!(
            "receiver {receiver_id} does not exist"
        )));
    }

    let record = MessageRecord {
        id: MessageId::new(),
        sender_id: user.id,
        receiver_id,
        subject: req.subject,
        body: req.body,
        sent_at: Utc::now(),
    };
    state.messages.insert(record.id, record.clone());

    // Write-through. Failure is surfaced because an in-memory-only message
    // would silently vanish on restart.
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::mailbox::insert(pool, &record).await {
            tracing::error!(message_id = %record.id, error = %e, "failed to persist mailbox message");
            return Err(AppError::Internal(
                "message recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    Ok((StatusCode::CREATED, Json(message_view(&state, record))))
}
