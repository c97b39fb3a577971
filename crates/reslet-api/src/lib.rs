//! # reslet-api — Axum API for the Rental Platform
//!
//! Tenant and landlord dashboards, Google OAuth login with server-side
//! sessions, an internal mailbox, rent-payment submission to the external
//! card-payment API, and rental-application intake.
//!
//! ## API Surface
//!
//! | Prefix                  | Module                  | Access        |
//! |-------------------------|-------------------------|---------------|
//! | `/resident-login`, `/auth/*`, `/logout` | [`routes::auth`] | public |
//! | `/properties*`          | [`routes::properties`]  | public        |
//! | `/tenant-dashboard*`    | [`routes::tenant`]      | tenant role   |
//! | `/landlord-dashboard*`  | [`routes::landlord`]    | landlord role |
//! | `/mailbox*`             | [`routes::mailbox`]     | authenticated |
//! | `/send-email`           | [`routes::contact`]     | public        |
//!
//! ## Access control
//!
//! No auth middleware layer: each protected handler declares its
//! requirement by taking an [`extractors::AuthUser`], `TenantUser`, or
//! `LandlordUser` parameter. Rejections redirect to `/resident-login`.
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler (with per-route extractors)
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use reslet_core::Role;

use crate::middleware::metrics::ApiMetrics;
use crate::state::{AppState, ApplicationStatus};

/// Check if metrics are enabled via the `RESLET_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other
/// than `"false"`.
fn metrics_enabled() -> bool {
    std::env::var("RESLET_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`), the service banner, and `/metrics` are
/// mounted beside the API routes; access control is enforced per route by
/// the extractors, so there is no separate authenticated router.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = metrics_enabled();

    let api = Router::new()
        .merge(routes::auth::router())
        .merge(routes::properties::router())
        .merge(routes::tenant::router())
        .merge(routes::landlord::router())
        .merge(routes::mailbox::router())
        .merge(routes::contact::router())
        .merge(openapi::router());

    // Body size limit: 256 KiB. The largest legitimate payload is a rental
    // application; there are no uploads on this surface.
    let mut api = api.layer(DefaultBodyLimit::max(256 * 1024));

    // Only register the metrics middleware when metrics are enabled.
    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut operational = Router::new()
        .route("/", axum::routing::get(root))
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    // Mount /metrics when metrics are enabled (unauthenticated, like the
    // health probes).
    if metrics_on {
        operational = operational
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let operational = operational.with_state(state);

    Router::new().merge(operational).merge(api)
}

/// GET / — Service banner.
async fn root() -> &'static str {
    "reslet rental platform"
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks:
/// - In-memory stores are accessible.
/// - Database connection is healthy (when configured).
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Verify stores are accessible (read lock acquirable).
    let _ = state.users.len();
    let _ = state.properties.len();
    let _ = state.sessions.active_count();

    // Verify database connection (when configured).
    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    // Collaborators are intentionally not probed: a zone may run without
    // Google/payments/email configured, and those routes already 503.
    (StatusCode::OK, "ready").into_response()
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Updates domain gauges from current `AppState` on each scrape (pull
/// model), then gathers and encodes all metrics in Prometheus text
/// exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    // -- Update domain gauges from AppState --

    metrics
        .users_total()
        .with_label_values(&["tenant"])
        .set(state.users.count_by_role(Role::Tenant) as f64);
    metrics
        .users_total()
        .with_label_values(&["landlord"])
        .set(state.users.count_by_role(Role::Landlord) as f64);

    metrics.properties_total().set(state.properties.len() as f64);

    let applications = state.applications.list();
    for status in [
        ApplicationStatus::Pending,
        ApplicationStatus::Approved,
        ApplicationStatus::Declined,
    ] {
        let count = applications.iter().filter(|a| a.status == status).count();
        metrics
            .applications_total()
            .with_label_values(&[status.as_str()])
            .set(count as f64);
    }

    metrics
        .mailbox_messages_total()
        .set(state.messages.len() as f64);
    metrics.tenant_links_total().set(state.links.len() as f64);
    metrics
        .sessions_active()
        .set(state.sessions.active_count() as f64);

    // -- Gather and encode --
    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
