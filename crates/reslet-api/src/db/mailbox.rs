//! Mailbox persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `mailbox` table.
//! Messages are immutable once created — there are no update operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use reslet_core::{MessageId, UserId};

use crate::state::MessageRecord;

/// Insert a new mailbox message.
pub async fn insert(pool: &PgPool, record: &MessageRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO mailbox (id, sender_id, receiver_id, subject, body, sent_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id.as_uuid())
    .bind(record.sender_id.as_uuid())
    .bind(record.receiver_id.as_uuid())
    .bind(&record.subject)
    .bind(&record.body)
    .bind(record.sent_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all mailbox messages from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<MessageRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        "SELECT id, sender_id, receiver_id, subject, body, sent_at
         FROM mailbox ORDER BY sent_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(MessageRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    subject: String,
    body: String,
    sent_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_record(self) -> MessageRecord {
        MessageRecord {
            id: MessageId::from_uuid(self.id),
            sender_id: UserId::from_uuid(self.sender_id),
            receiver_id: UserId::from_uuid(self.receiver_id),
            subject: self.subject,
            body: self.body,
            sent_at: self.sent_at,
        }
    }
}
