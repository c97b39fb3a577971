//! Rental-application persistence operations.
//!
//! All functions take a `&PgPool` and operate on the
//! `property_applications` table. The only mutation after submission is
//! the landlord's status review.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use reslet_core::{ApplicationId, EmailAddress, PropertyId, UserId};

use crate::state::{ApplicationRecord, ApplicationStatus};

/// Insert a new application record.
pub async fn insert(pool: &PgPool, record: &ApplicationRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO property_applications (id, property_id, tenant_id, full_name,
         contact_number, email, employer_name, job_title, monthly_income,
         length_of_stay, number_of_occupants, pets, emergency_contact,
         emergency_contact_number, application_date, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(record.id.as_uuid())
    .bind(record.property_id.as_uuid())
    .bind(record.tenant_id.as_uuid())
    .bind(&record.full_name)
    .bind(&record.contact_number)
    .bind(record.email.as_str())
    .bind(&record.employer_name)
    .bind(&record.job_title)
    .bind(record.monthly_income)
    .bind(record.length_of_stay)
    .bind(record.number_of_occupants)
    .bind(record.pets)
    .bind(&record.emergency_contact)
    .bind(&record.emergency_contact_number)
    .bind(record.application_date)
    .bind(record.status.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an application's review status.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE property_applications SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all applications from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ApplicationRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        "SELECT id, property_id, tenant_id, full_name, contact_number, email,
         employer_name, job_title, monthly_income, length_of_stay,
         number_of_occupants, pets, emergency_contact, emergency_contact_number,
         application_date, status
         FROM property_applications ORDER BY application_date",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match row.into_record() {
            Some(record) => records.push(record),
            None => {
                tracing::error!(
                    "skipping property_applications row with invalid status or email during load"
                );
            }
        }
    }
    Ok(records)
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    property_id: Uuid,
    tenant_id: Uuid,
    full_name: String,
    contact_number: String,
    email: String,
    employer_name: String,
    job_title: String,
    monthly_income: i64,
    length_of_stay: i32,
    number_of_occupants: i32,
    pets: bool,
    emergency_contact: String,
    emergency_contact_number: String,
    application_date: DateTime<Utc>,
    status: String,
}

impl ApplicationRow {
    fn into_record(self) -> Option<ApplicationRecord> {
        let status = ApplicationStatus::parse(&self.status)?;
        let email = EmailAddress::new(&self.email).ok()?;
        Some(ApplicationRecord {
            id: ApplicationId::from_uuid(self.id),
            property_id: PropertyId::from_uuid(self.property_id),
            tenant_id: UserId::from_uuid(self.tenant_id),
            full_name: self.full_name,
            contact_number: self.contact_number,
            email,
            employer_name: self.employer_name,
            job_title: self.job_title,
            monthly_income: self.monthly_income,
            length_of_stay: self.length_of_stay,
            number_of_occupants: self.number_of_occupants,
            pets: self.pets,
            emergency_contact: self.emergency_contact,
            emergency_contact_number: self.emergency_contact_number,
            application_date: self.application_date,
            status,
        })
    }
}
