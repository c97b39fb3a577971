//! Binary entry point: tracing setup, configuration, database pool and
//! store hydration, collaborator wiring, and the HTTP listener.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reslet_api::state::{AppConfig, AppState};
use reslet_upstream::{
    EmailRelayConfig, GoogleOAuthConfig, HttpEmailRelay, HttpGoogleProvider, HttpPaymentClient,
    PaymentApiConfig,
};

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let pool = reslet_api::db::init_pool()
        .await
        .expect("database initialization failed");

    let mut state = AppState::with_config(config.clone(), pool);
    wire_collaborators(&mut state);

    match state.db_pool.clone() {
        Some(pool) => {
            reslet_api::db::hydrate(&pool, &state)
                .await
                .expect("failed to hydrate stores from database");
        }
        None => state.seed_demo_properties(),
    }

    let app = reslet_api::app(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "reslet API listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}

/// Install the tracing subscriber: env-filtered, JSON when
/// `RESLET_LOG_JSON=true` (production), human-readable otherwise.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn"));

    let json = std::env::var("RESLET_LOG_JSON")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Construct the external collaborator clients from the environment.
/// A missing collaborator is logged and left unset — the corresponding
/// routes answer 503 instead of the process refusing to start.
fn wire_collaborators(state: &mut AppState) {
    match (
        std::env::var("GOOGLE_CLIENT_ID"),
        std::env::var("GOOGLE_CLIENT_SECRET"),
    ) {
        (Ok(client_id), Ok(client_secret)) => {
            let redirect_url = std::env::var("GOOGLE_REDIRECT_URL").unwrap_or_else(|_| {
                format!(
                    "http://localhost:{}/auth/google/callback",
                    state.config.port
                )
            });
            match HttpGoogleProvider::new(GoogleOAuthConfig::new(
                client_id,
                client_secret,
                redirect_url,
            )) {
                Ok(provider) => state.google = Some(Arc::new(provider)),
                Err(e) => tracing::error!(error = %e, "google sign-in disabled"),
            }
        }
        _ => tracing::warn!(
            "GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set — google sign-in disabled"
        ),
    }

    match std::env::var("PAYMENT_API_URL") {
        Ok(base_url) => {
            let token = std::env::var("PAYMENT_API_TOKEN").ok();
            match HttpPaymentClient::new(PaymentApiConfig::new(base_url, token)) {
                Ok(client) => state.payments = Some(Arc::new(client)),
                Err(e) => tracing::error!(error = %e, "payment API disabled"),
            }
        }
        Err(_) => tracing::warn!("PAYMENT_API_URL not set — payment routes disabled"),
    }

    match std::env::var("EMAIL_RELAY_URL") {
        Ok(relay_url) => {
            let token = std::env::var("EMAIL_RELAY_TOKEN").ok();
            match HttpEmailRelay::new(EmailRelayConfig::new(relay_url, token)) {
                Ok(relay) => state.email = Some(Arc::new(relay)),
                Err(e) => tracing::error!(error = %e, "email relay disabled"),
            }
        }
        Err(_) => tracing::warn!("EMAIL_RELAY_URL not set — contact form disabled"),
    }
}
