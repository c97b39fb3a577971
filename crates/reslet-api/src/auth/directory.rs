//! # User Directory
//!
//! Resolves a verified Google profile to a local user record. The actual
//! lookup-or-insert runs inside [`UserStore::find_or_create`] under a
//! single write lock; this module adds the database write-through and the
//! structured logging around it.
//!
//! Resolution order: Google subject first, then email. The email match is
//! deliberate account unification — an operator-provisioned landlord who
//! signs in with Google for the first time attaches to their existing
//! record instead of producing a duplicate tenant account.

use chrono::Utc;

use reslet_upstream::GoogleProfile;

use crate::error::AppError;
use crate::state::{AppState, DirectoryOutcome, UserRecord};

/// Resolve or create the local user for a Google profile.
///
/// Write-through failures surface as [`AppError::Internal`]: a user that
/// exists in memory but not in the database would silently vanish on
/// restart, taking their links and applications with them.
pub async fn resolve_user(
    state: &AppState,
    profile: &GoogleProfile,
) -> Result<UserRecord, AppError> {
    let (user, outcome) = state.users.find_or_create(
        &profile.subject,
        &profile.email,
        &profile.name,
        Utc::now(),
    );

    match outcome {
        DirectoryOutcome::Existing => {
            tracing::debug!(user_id = %user.id, "login resolved to existing user");
        }
        DirectoryOutcome::AttachedByEmail => {
            tracing::info!(user_id = %user.id, email = %user.email, "attached google identity to existing account by email");
            if let Some(pool) = &state.db_pool {
                crate::db::users::set_google_id(pool, *user.id.as_uuid(), &profile.subject)
                    .await
                    .map_err(|e| {
                        tracing::error!(user_id = %user.id, error = %e, "failed to persist google id");
                        AppError::Internal("user update failed to persist".into())
                    })?;
            }
        }
        DirectoryOutcome::Created => {
            tracing::info!(user_id = %user.id, role = %user.role, "created user on first login");
            if let Some(pool) = &state.db_pool {
                crate::db::users::insert(pool, &user).await.map_err(|e| {
                    tracing::error!(user_id = %user.id, error = %e, "failed to persist new user");
                    AppError::Internal("user record failed to persist".into())
                })?;
            }
        }
    }

    Ok(user)
}
