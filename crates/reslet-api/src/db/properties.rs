//! Property persistence operations.
//!
//! Properties are read-only through the HTTP surface — rows arrive via
//! migration seeds or operator inserts, so this module only loads.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use reslet_core::PropertyId;

use crate::state::PropertyRecord;

/// Load all properties from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<PropertyRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PropertyRow>(
        "SELECT id, address, price, bedrooms, bathrooms, image_url, created_at
         FROM properties ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PropertyRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PropertyRow {
    id: Uuid,
    address: String,
    price: i64,
    bedrooms: i32,
    bathrooms: i32,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl PropertyRow {
    fn into_record(self) -> PropertyRecord {
        PropertyRecord {
            id: PropertyId::from_uuid(self.id),
            address: self.address,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            image_url: self.image_url,
            created_at: self.created_at,
        }
    }
}
