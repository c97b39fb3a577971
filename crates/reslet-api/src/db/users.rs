//! User persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `users` table. Users
//! are never hard-deleted; the only mutation after creation is attaching a
//! Google subject to an account that predates its first Google login.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use reslet_core::{EmailAddress, Role, UserId};

use crate::state::UserRecord;

/// Insert a new user record.
pub async fn insert(pool: &PgPool, record: &UserRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, google_id, name, email, role, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id.as_uuid())
    .bind(&record.google_id)
    .bind(&record.name)
    .bind(record.email.as_str())
    .bind(record.role.as_str())
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Attach a Google subject to an existing user.
pub async fn set_google_id(pool: &PgPool, id: Uuid, google_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET google_id = $1 WHERE id = $2")
        .bind(google_id)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all users from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<UserRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, google_id, name, email, role, created_at
         FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::error!("skipping users row with invalid role or email during load");
            }
        }
    }
    Ok(records)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    google_id: Option<String>,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> Option<UserRecord> {
        let role: Role = self.role.parse().ok()?;
        let email = EmailAddress::new(&self.email).ok()?;
        Some(UserRecord {
            id: UserId::from_uuid(self.id),
            google_id: self.google_id,
            name: self.name,
            email,
            role,
            created_at: self.created_at,
        })
    }
}
