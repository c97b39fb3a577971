//! # Database Persistence Layer
//!
//! Postgres persistence via SQLx. The layer is **optional**: when
//! `DATABASE_URL` is set, every store mutation is written through to
//! Postgres and all tables are loaded back into the in-process stores at
//! boot. When absent, the API operates memory-only (development, tests).
//!
//! Tables: `users`, `properties`, `mailbox`, `tenant_landlord`,
//! `property_applications`. All access is single-statement parameterized
//! queries through the shared bounded pool — never string interpolation,
//! never a long-lived exclusive connection.

pub mod applications;
pub mod links;
pub mod mailbox;
pub mod properties;
pub mod users;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::state::AppState;

/// Initialize the database connection pool and run migrations.
///
/// Returns `None` if `DATABASE_URL` is not set (memory-only mode).
/// Returns `Err` if the URL is set but the connection or migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — running memory-only. \
                 State will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    // Run embedded migrations.
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Load every table into the in-process stores. Called once at boot, after
/// the pool is created and before the listener starts accepting.
pub async fn hydrate(pool: &PgPool, state: &AppState) -> Result<(), sqlx::Error> {
    for user in users::load_all(pool).await? {
        state.users.insert(user);
    }
    for property in properties::load_all(pool).await? {
        state.properties.insert(property.id, property);
    }
    for message in mailbox::load_all(pool).await? {
        state.messages.insert(message.id, message);
    }
    for link in links::load_all(pool).await? {
        state.links.insert(link);
    }
    for application in applications::load_all(pool).await? {
        state.applications.insert(application.id, application);
    }
    tracing::info!(
        users = state.users.len(),
        properties = state.properties.len(),
        messages = state.messages.len(),
        links = state.links.len(),
        applications = state.applications.len(),
        "hydrated stores from database"
    );
    Ok(())
}
