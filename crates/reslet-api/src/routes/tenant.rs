//! # Tenant Dashboard
//!
//! Tenant-scoped routes: the dashboard aggregate, rental-application
//! intake, and rent payments through the external card-payment
//! collaborator. Every handler takes a [`TenantUser`], so a missing
//! session redirects to the login page and a landlord session is turned
//! away with the forbidden flag.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use reslet_core::{ApplicationId, EmailAddress, PropertyId};
use reslet_upstream::{CardPayment, CardPaymentRequest, PaymentAck, PaymentGateway};

use crate::error::AppError;
use crate::extractors::{extract_validated_json, TenantUser, Validate};
use crate::routes::mailbox::{messages_for, MessageView};
use crate::state::{AppState, ApplicationRecord, ApplicationStatus, UserRecord};

/// Number of recent messages shown on dashboards.
const DASHBOARD_MAIL_LIMIT: usize = 10;

/// Build the tenant router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tenant-dashboard", get(dashboard))
        .route("/tenant-dashboard/applications", post(submit_application))
        .route(
            "/tenant-dashboard/payments",
            get(list_payments).post(submit_payment),
        )
}

/// Helper: extract the payment gateway from AppState or return 503.
fn require_payments(state: &AppState) -> Result<&dyn PaymentGateway, AppError> {
    state
        .payments
        .as_deref()
        .ok_or_else(|| {
            AppError::service_unavailable(
                "Payment API not configured. Set PAYMENT_API_URL environment variable.",
            )
        })
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Tenant dashboard aggregate.
#[derive(Debug, Serialize, ToSchema)]
pub struct TenantDashboard {
    pub user: UserRecord,
    /// Landlords this tenant is linked to.
    pub landlords: Vec<UserRecord>,
    /// Recent received messages, newest first.
    pub recent_inbox: Vec<MessageView>,
    /// The tenant's applications, newest first.
    pub applications: Vec<ApplicationRecord>,
}

/// GET /tenant-dashboard — Dashboard aggregate for the session's tenant.
#[utoipa::path(
    get,
    path = "/tenant-dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = TenantDashboard),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "tenant"
)]
async fn dashboard(
    State(state): State<AppState>,
    TenantUser(user): TenantUser,
) -> Json<TenantDashboard> {
    let landlords = state
        .links
        .landlords_of(user.id)
        .iter()
        .filter_map(|id| state.users.get(id))
        .collect();

    let (recent_inbox, _) = messages_for(&state, user.id, DASHBOARD_MAIL_LIMIT);

    let mut applications: Vec<ApplicationRecord> = state
        .applications
        .list()
        .into_iter()
        .filter(|a| a.tenant_id == user.id)
        .collect();
    applications.sort_by(|a, b| b.application_date.cmp(&a.application_date));

    Json(TenantDashboard {
        user,
        landlords,
        recent_inbox,
        applications,
    })
}

// ---------------------------------------------------------------------------
// Applications
// ---------------------------------------------------------------------------

/// Rental application submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplicationRequest {
    /// Property being applied for.
    pub property_id: Uuid,
    pub full_name: String,
    pub contact_number: String,
    /// Contact email for the application (may differ from the account email).
    #[schema(value_type = String)]
    pub email: EmailAddress,
    pub employer_name: String,
    pub job_title: String,
    /// Monthly income in minor currency units.
    pub monthly_income: i64,
    /// Intended tenancy length in months.
    pub length_of_stay: i32,
    pub number_of_occupants: i32,
    #[serde(default)]
    pub pets: bool,
    pub emergency_contact: String,
    pub emergency_contact_number: String,
}

impl Validate for ApplicationRequest {
    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("full_name", &self.full_name),
            ("contact_number", &self.contact_number),
            ("employer_name", &self.employer_name),
            ("job_title", &self.job_title),
            ("emergency_contact", &self.emergency_contact),
            ("emergency_contact_number", &self.emergency_contact_number),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
            if value.len() > 255 {
                return Err(format!("{field} must not exceed 255 characters"));
            }
        }
        if self.monthly_income < 0 {
            return Err("monthly_income must not be negative".to_string());
        }
        if self.length_of_stay <= 0 {
            return Err("length_of_stay must be at least one month".to_string());
        }
        if self.number_of_occupants <= 0 {
            return Err("number_of_occupants must be at least one".to_string());
        }
        Ok(())
    }
}

/// POST /tenant-dashboard/applications — Submit a rental application.
///
/// The application binds to the session's tenant id, not anything in the
/// body, and always starts Pending.
#[utoipa::path(
    post,
    path = "/tenant-dashboard/applications",
    request_body = ApplicationRequest,
    responses(
        (status = 201, description = "Application created", body = ApplicationRecord),
        (status = 404, description = "Property does not exist", body = crate::error::ErrorBody),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "tenant"
)]
async fn submit_application(
    State(state): State<AppState>,
    TenantUser(user): TenantUser,
    body: Result<Json<ApplicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplicationRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let property_id = PropertyId::from_uuid(req.property_id);
    if !state.properties.contains(&property_id) {
        return Err(AppError::not_found(format!(
            "property {property_id} not found"
        )));
    }

    let record = ApplicationRecord {
        id: ApplicationId::new(),
        property_id,
        tenant_id: user.id,
        full_name: req.full_name,
        contact_number: req.contact_number,
        email: req.email,
        employer_name: req.employer_name,
        job_title: req.job_title,
        monthly_income: req.monthly_income,
        length_of_stay: req.length_of_stay,
        number_of_occupants: req.number_of_occupants,
        pets: req.pets,
        emergency_contact: req.emergency_contact,
        emergency_contact_number: req.emergency_contact_number,
        application_date: Utc::now(),
        status: ApplicationStatus::Pending,
    };
    state.applications.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::applications::insert(pool, &record).await {
            tracing::error!(application_id = %record.id, error = %e, "failed to persist application");
            return Err(AppError::Internal(
                "application recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    tracing::info!(application_id = %record.id, property_id = %record.property_id, "rental application submitted");
    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Payment history for the session's tenant.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentHistory {
    /// Card payments whose `customer_email` matches the account email.
    #[schema(value_type = Vec<Object>)]
    pub payments: Vec<CardPayment>,
}

/// GET /tenant-dashboard/payments — Payment history from the collaborator.
#[utoipa::path(
    get,
    path = "/tenant-dashboard/payments",
    responses(
        (status = 200, description = "Payment history", body = PaymentHistory),
        (status = 502, description = "Payment collaborator failed", body = crate::error::ErrorBody),
        (status = 503, description = "Payment collaborator not configured", body = crate::error::ErrorBody),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "tenant"
)]
async fn list_payments(
    State(state): State<AppState>,
    TenantUser(user): TenantUser,
) -> Result<Json<PaymentHistory>, AppError> {
    let gateway = require_payments(&state)?;
    let all = gateway.list_card_payments().await?;
    // The collaborator returns every customer's payments; filter to the
    // session's account email.
    let payments = all
        .into_iter()
        .filter(|p| p.customer_email.eq_ignore_ascii_case(user.email.as_str()))
        .collect();
    Ok(Json(PaymentHistory { payments }))
}

/// Card-payment submission. The customer email is taken from the session,
/// never from the body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentSubmitRequest {
    pub card_number: String,
    pub card_holder_name: String,
    /// Expiry in `MM/YY` form.
    pub expiry_date: String,
    pub cvv: String,
    /// Amount as a decimal string, e.g. `"950.00"`.
    pub amount: String,
    pub currency: String,
}

impl Validate for PaymentSubmitRequest {
    fn validate(&self) -> Result<(), String> {
        let digits: String = self
            .card_number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if !(12..=19).contains(&digits.len()) {
            return Err("card_number must contain 12 to 19 digits".to_string());
        }
        if self.card_holder_name.trim().is_empty() {
            return Err("card_holder_name must not be empty".to_string());
        }
        if self.expiry_date.len() != 5 || self.expiry_date.as_bytes()[2] != b'/' {
            return Err("expiry_date must be in MM/YY form".to_string());
        }
        if !(3..=4).contains(&self.cvv.len()) || !self.cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err("cvv must be 3 or 4 digits".to_string());
        }
        if self.amount.trim().is_empty() || self.amount.parse::<f64>().is_err() {
            return Err("amount must be a decimal number".to_string());
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err("currency must be a 3-letter code".to_string());
        }
        Ok(())
    }
}

/// POST /tenant-dashboard/payments — Submit a rent payment.
///
/// The collaborator's verdict is passed through as-is; a declined payment
/// is a successful HTTP exchange with `success: false`.
#[utoipa::path(
    post,
    path = "/tenant-dashboard/payments",
    request_body = PaymentSubmitRequest,
    responses(
        (status = 200, description = "Collaborator verdict (success flag passed through)"),
        (status = 502, description = "Payment collaborator failed", body = crate::error::ErrorBody),
        (status = 503, description = "Payment collaborator not configured", body = crate::error::ErrorBody),
        (status = 303, description = "No valid session or wrong role — redirect to login"),
    ),
    tag = "tenant"
)]
async fn submit_payment(
    State(state): State<AppState>,
    TenantUser(user): TenantUser,
    body: Result<Json<PaymentSubmitRequest>, JsonRejection>,
) -> Result<Json<PaymentAck>, AppError> {
    let req = extract_validated_json(body)?;
    let gateway = require_payments(&state)?;

    let submission = CardPaymentRequest {
        card_number: req.card_number,
        card_holder_name: req.card_holder_name,
        expiry_date: req.expiry_date,
        cvv: req.cvv,
        amount: req.amount,
        currency: req.currency.to_ascii_uppercase(),
        customer_email: user.email.as_str().to_string(),
    };
    let ack = gateway.submit_card_payment(&submission).await?;
    if !ack.success {
        tracing::info!(customer = %user.email, "card payment declined by collaborator");
    }
    Ok(Json(ack))
}
