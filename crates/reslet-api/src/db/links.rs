//! Tenant-landlord link persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `tenant_landlord`
//! table. Pair uniqueness is enforced both in [`crate::state::LinkStore`]
//! and by the table's composite primary key.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use reslet_core::UserId;

use crate::state::LinkRecord;

/// Insert a new tenant-landlord link.
pub async fn insert(pool: &PgPool, record: &LinkRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tenant_landlord (landlord_id, tenant_id, created_at)
         VALUES ($1, $2, $3)",
    )
    .bind(record.landlord_id.as_uuid())
    .bind(record.tenant_id.as_uuid())
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all links from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<LinkRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LinkRow>(
        "SELECT landlord_id, tenant_id, created_at
         FROM tenant_landlord ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(LinkRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct LinkRow {
    landlord_id: Uuid,
    tenant_id: Uuid,
    created_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_record(self) -> LinkRecord {
        LinkRecord {
            landlord_id: UserId::from_uuid(self.landlord_id),
            tenant_id: UserId::from_uuid(self.tenant_id),
            created_at: self.created_at,
        }
    }
}
