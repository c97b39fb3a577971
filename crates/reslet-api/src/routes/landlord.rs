//! # Landlord Dashboard
//!
//! Landlord-scoped routes: the dashboard aggregate, linking tenants by
//! email, and application review. Every handler takes a [`LandlordUser`],
//! so a missing session redirects to the login page and a tenant session
//! is turned away with the forbidden flag.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use reslet_core::{ApplicationId, EmailAddress, Role};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, LandlordUser, Validate};
use crate::routes::mailbox::{messages_for, MessageView};
use crate::state::{AppState, ApplicationRecord, ApplicationStatus, LinkRecord, UserRecord};

/// Number of recent messages shown on dashboards.
const DASHBOARD_MAIL_LIMIT: usize = 10;

/// Build the landlord router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/landlord-dashboard", get(dashboard))
        .route("/landlord-dashboard/tenants", post(link_tenant))
        .route(
            "/landlord-dashboard/applications/:id/status",
            post(review_application),
        )
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Landlord dashboard aggregate.
#[derive(Debug, Serialize, ToSchema)]
pub struct LandlordDashboard {
    pub user: UserRecord,
    /// Tenants linked to this landlord.
    pub tenants: Vec<UserRecord>,
    /// Recent received messages, newest first.
    pub recent_inbox: Vec<MessageView>,
    /// All applications, newest first, pending ones leading.
    pub applications: Vec<ApplicationRecord>,
}

/// GET /landlord-dashboard — Dashboard aggregate for the session's landlord.
#[utoipa::path(
    get,
    path = "/landlord-dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = LandlordDashboard),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "landlord"
)]
async fn dashboard(
    State(state): State<AppState>,
    LandlordUser(user): LandlordUser,
) -> Json<LandlordDashboard> {
    let tenants = state
        .links
        .tenants_of(user.id)
        .iter()
        .filter_map(|id| state.users.get(id))
        .collect();

    let (recent_inbox, _) = messages_for(&state, user.id, DASHBOARD_MAIL_LIMIT);

    // Listings carry no owner, so review spans all applications. Pending
    // ones lead, newest first within each group.
    let mut applications = state.applications.list();
    applications.sort_by(|a, b| {
        let a_pending = a.status == ApplicationStatus::Pending;
        let b_pending = b.status == ApplicationStatus::Pending;
        b_pending
            .cmp(&a_pending)
            .then(b.application_date.cmp(&a.application_date))
    });

    Json(LandlordDashboard {
        user,
        tenants,
        recent_inbox,
        applications,
    })
}

// ---------------------------------------------------------------------------
// Tenant linking
// ---------------------------------------------------------------------------

/// Request to link a tenant to the session's landlord.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkTenantRequest {
    /// The tenant's account email.
    #[schema(value_type = String)]
    pub email: EmailAddress,
}

impl Validate for LinkTenantRequest {
    fn validate(&self) -> Result<(), String> {
        // EmailAddress validated itself at deserialization.
        Ok(())
    }
}

/// POST /landlord-dashboard/tenants — Link a tenant by email.
#[utoipa::path(
    post,
    path = "/landlord-dashboard/tenants",
    request_body = LinkTenantRequest,
    responses(
        (status = 201, description = "Link created", body = LinkRecord),
        (status = 404, description = "No tenant with that email", body = crate::error::ErrorBody),
        (status = 409, description = "Already linked", body = crate::error::ErrorBody),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "landlord"
)]
async fn link_tenant(
    State(state): State<AppState>,
    LandlordUser(user): LandlordUser,
    body: Result<Json<LinkTenantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let tenant = state
        .users
        .find_by_email(&req.email)
        .ok_or_else(|| AppError::not_found(format!("no user with email {}", req.email)))?;
    if tenant.role != Role::Tenant {
        return Err(AppError::Validation(format!(
            "{} is not a tenant account",
            req.email
        )));
    }

    let record = state
        .links
        .link(user.id, tenant.id, Utc::now())
        .ok_or_else(|| {
            AppError::Conflict(format!("{} is already linked to this landlord", req.email))
        })?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::links::insert(pool, &record).await {
            tracing::error!(landlord_id = %user.id, tenant_id = %tenant.id, error = %e, "failed to persist tenant link");
            return Err(AppError::Internal(
                "link recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(landlord_id = %user.id, tenant_id = %tenant.id, "tenant linked");
    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// Application review
// ---------------------------------------------------------------------------

/// Review verdict for a pending application.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    /// `"Approved"` or `"Declined"`.
    pub status: String,
}

impl Validate for ReviewRequest {
    fn validate(&self) -> Result<(), String> {
        match ApplicationStatus::parse(&self.status) {
            Some(ApplicationStatus::Approved) | Some(ApplicationStatus::Declined) => Ok(()),
            Some(ApplicationStatus::Pending) => {
                Err("status must be a verdict, not Pending".to_string())
            }
            None => Err(format!(
                "unknown status {:?} (expected Approved or Declined)",
                self.status
            )),
        }
    }
}

/// POST /landlord-dashboard/applications/:id/status — Review an application.
#[utoipa::path(
    post,
    path = "/landlord-dashboard/applications/{id}/status",
    params(("id" = Uuid, Path, description = "Application ID")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Application updated", body = ApplicationRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "landlord"
)]
async fn review_application(
    State(state): State<AppState>,
    LandlordUser(user): LandlordUser,
    Path(id): Path<Uuid>,
    body: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Json<ApplicationRecord>, AppError> {
    let req = extract_validated_json(body)?;
    let status = ApplicationStatus::parse(&req.status)
        .expect("validate() only accepts known verdicts");

    let id = ApplicationId::from_uuid(id);
    let updated = state
        .applications
        .update(&id, |a| a.status = status)
        .ok_or_else(|| AppError::not_found(format!("application {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::applications::update_status(pool, *id.as_uuid(), status).await {
            tracing::error!(application_id = %id, error = %e, "failed to persist application status");
            return Err(AppError::Internal(
                "status updated in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(application_id = %id, reviewer = %user.id, status = status.as_str(), "application reviewed");
    Ok(Json(updated))
}
