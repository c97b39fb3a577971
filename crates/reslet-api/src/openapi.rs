//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
///
/// Registers all utoipa-documented routes, schemas, and tags. Serves as
/// the single source of truth for integrators.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "reslet API — Property Rental Platform",
        version = "0.3.1",
        description = "JSON API for the reslet rental platform.\n\nProvides:\n- **Google sign-in** (OAuth2 authorization-code flow) with server-side sessions\n- **Tenant dashboard**: rental applications and rent payments via the external card-payment API\n- **Landlord dashboard**: tenant linking and application review\n- **Internal mailbox** between tenants and landlords\n- **Public property listings** and a contact form\n\nAuthentication: `reslet_session` cookie established by the Google callback.\nUnauthenticated requests to protected routes are redirected to `/resident-login`.",
        license(name = "Apache-2.0"),
        contact(name = "reslet")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server"),
    ),
    paths(
        // ── Authentication ──────────────────────────────────────────────
        crate::routes::auth::login_page,
        crate::routes::auth::start_google_login,
        crate::routes::auth::google_callback,
        crate::routes::auth::logout,
        // ── Properties ──────────────────────────────────────────────────
        crate::routes::properties::list_properties,
        crate::routes::properties::get_property,
        // ── Tenant dashboard ────────────────────────────────────────────
        crate::routes::tenant::dashboard,
        crate::routes::tenant::submit_application,
        crate::routes::tenant::list_payments,
        crate::routes::tenant::submit_payment,
        // ── Landlord dashboard ──────────────────────────────────────────
        crate::routes::landlord::dashboard,
        crate::routes::landlord::link_tenant,
        crate::routes::landlord::review_application,
        // ── Mailbox ─────────────────────────────────────────────────────
        crate::routes::mailbox::list_mail,
        crate::routes::mailbox::send_mail,
        // ── Contact ─────────────────────────────────────────────────────
        crate::routes::contact::send_contact_email,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::state::UserRecord,
        crate::state::PropertyRecord,
        crate::state::MessageRecord,
        crate::state::LinkRecord,
        crate::state::ApplicationRecord,
        crate::state::ApplicationStatus,
        crate::routes::auth::LoginDescriptor,
        crate::routes::mailbox::MessageView,
        crate::routes::mailbox::MailboxView,
        crate::routes::mailbox::SendMailRequest,
        crate::routes::tenant::TenantDashboard,
        crate::routes::tenant::ApplicationRequest,
        crate::routes::tenant::PaymentHistory,
        crate::routes::tenant::PaymentSubmitRequest,
        crate::routes::landlord::LandlordDashboard,
        crate::routes::landlord::LinkTenantRequest,
        crate::routes::landlord::ReviewRequest,
        crate::routes::contact::ContactRequest,
        crate::routes::contact::ContactAck,
    )),
    tags(
        (name = "auth", description = "Login, Google OAuth flow, logout"),
        (name = "properties", description = "Public property listings"),
        (name = "tenant", description = "Tenant dashboard, applications, payments"),
        (name = "landlord", description = "Landlord dashboard, linking, review"),
        (name = "mailbox", description = "Internal mail"),
        (name = "contact", description = "Public contact form"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

/// GET /openapi.json — the assembled specification.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
