//! # Prometheus Metrics
//!
//! HTTP-level metrics (request counts, latency, errors) are recorded in
//! middleware. Domain-level gauges (users, properties, applications,
//! mailbox volume, live sessions) are updated on each `/metrics` scrape
//! (pull model) — see the metrics handler in `lib.rs`.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    core::Collector, Encoder, GaugeVec, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Shared metrics state backed by a Prometheus registry.
#[derive(Clone)]
pub struct ApiMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,

    // -- HTTP middleware metrics (push model) --
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    http_errors_total: IntCounterVec,

    // -- Domain gauges (pull model, updated on /metrics scrape) --
    users_total: GaugeVec,
    properties_total: prometheus::Gauge,
    applications_total: GaugeVec,
    mailbox_messages_total: prometheus::Gauge,
    tenant_links_total: prometheus::Gauge,
    sessions_active: prometheus::Gauge,
}

impl std::fmt::Debug for ApiMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMetrics")
            .field("requests", &self.requests())
            .field("errors", &self.errors())
            .finish()
    }
}

impl ApiMetrics {
    /// Create a new metrics instance with a fresh Prometheus registry.
    pub fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("reslet_http_requests_total", "Total HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "reslet_http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "path"],
        )
        .expect("metric can be created");

        let http_errors_total = IntCounterVec::new(
            Opts::new(
                "reslet_http_errors_total",
                "Total HTTP errors (4xx and 5xx)",
            ),
            &["method", "path", "status"],
        )
        .expect("metric can be created");

        let users_total = GaugeVec::new(
            Opts::new("reslet_users_total", "Total users by role"),
            &["role"],
        )
        .expect("metric can be created");

        let properties_total =
            prometheus::Gauge::new("reslet_properties_total", "Total property listings")
                .expect("metric can be created");

        let applications_total = GaugeVec::new(
            Opts::new(
                "reslet_applications_total",
                "Total rental applications by status",
            ),
            &["status"],
        )
        .expect("metric can be created");

        let mailbox_messages_total =
            prometheus::Gauge::new("reslet_mailbox_messages_total", "Total mailbox messages")
                .expect("metric can be created");

        let tenant_links_total =
            prometheus::Gauge::new("reslet_tenant_links_total", "Total landlord-tenant links")
                .expect("metric can be created");

        let sessions_active =
            prometheus::Gauge::new("reslet_sessions_active", "Live authenticated sessions")
                .expect("metric can be created");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(http_errors_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(users_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(properties_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(applications_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(mailbox_messages_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(tenant_links_total.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(sessions_active.clone()))
            .expect("metric can be registered");

        Self {
            inner: Arc::new(Inner {
                registry,
                http_requests_total,
                http_request_duration_seconds,
                http_errors_total,
                users_total,
                properties_total,
                applications_total,
                mailbox_messages_total,
                tenant_links_total,
                sessions_active,
            }),
        }
    }

    /// Current total request count (sum across all labels).
    pub fn requests(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_requests_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Current total error count (sum across all labels).
    pub fn errors(&self) -> u64 {
        let mut total = 0u64;
        let families = self.inner.http_errors_total.collect();
        for mf in &families {
            for m in mf.get_metric() {
                total += m.get_counter().get_value() as u64;
            }
        }
        total
    }

    /// Record an HTTP request (called by the middleware).
    fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.inner
            .http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();

        self.inner
            .http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);

        if status >= 400 {
            self.inner
                .http_errors_total
                .with_label_values(&[method, path, &status_str])
                .inc();
        }
    }

    // -- Domain gauge accessors (used by the /metrics handler) --

    pub fn users_total(&self) -> &GaugeVec {
        &self.inner.users_total
    }

    pub fn properties_total(&self) -> &prometheus::Gauge {
        &self.inner.properties_total
    }

    pub fn applications_total(&self) -> &GaugeVec {
        &self.inner.applications_total
    }

    pub fn mailbox_messages_total(&self) -> &prometheus::Gauge {
        &self.inner.mailbox_messages_total
    }

    pub fn tenant_links_total(&self) -> &prometheus::Gauge {
        &self.inner.tenant_links_total
    }

    pub fn sessions_active(&self) -> &prometheus::Gauge {
        &self.inner.sessions_active
    }

    /// Gather all metrics and encode to Prometheus text format.
    pub fn gather_and_encode(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| format!("failed to encode metrics: {e}"))?;
        String::from_utf8(buffer)
            .map_err(|e| format!("metrics encoding produced invalid UTF-8: {e}"))
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize a request path by replacing UUID segments with `{id}`.
///
/// Prevents cardinality explosion in Prometheus labels. UUIDs are detected
/// as 32-hex-char strings with optional hyphens (standard UUID format).
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            // Match standard UUID: 8-4-4-4-12 hex chars with hyphens
            if segment.len() == 36
                && segment.chars().enumerate().all(|(i, c)| {
                    if i == 8 || i == 13 || i == 18 || i == 23 {
                        c == '-'
                    } else {
                        c.is_ascii_hexdigit()
                    }
                })
            {
                "{id}"
            } else if segment.len() == 32 && segment.chars().all(|c| c.is_ascii_hexdigit()) {
                // UUID without hyphens
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records HTTP request metrics via Prometheus.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<ApiMetrics>().cloned();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        let duration = start.elapsed().as_secs_f64();
        let status = response.status().as_u16();
        m.record_request(&method, &path, status, duration);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_metrics_new_starts_at_zero() {
        let m = ApiMetrics::new();
        assert_eq!(m.requests(), 0);
        assert_eq!(m.errors(), 0);
    }

    #[test]
    fn requests_and_errors_increment_independently() {
        let m = ApiMetrics::new();
        for _ in 0..5 {
            m.record_request("GET", "/properties", 200, 0.01);
        }
        m.record_request("GET", "/missing", 404, 0.05);
        m.record_request("POST", "/mailbox/send", 500, 0.1);
        assert_eq!(m.requests(), 7);
        assert_eq!(m.errors(), 2);
    }

    #[test]
    fn clone_shares_underlying_counters() {
        let m = ApiMetrics::new();
        let clone = m.clone();
        m.record_request("GET", "/properties", 200, 0.01);
        assert_eq!(clone.requests(), 1, "clone should see the same counter");
    }

    #[test]
    fn gather_and_encode_produces_text() {
        let m = ApiMetrics::new();
        m.record_request("GET", "/properties", 200, 0.01);
        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("reslet_http_requests_total"));
        assert!(output.contains("reslet_http_request_duration_seconds"));
    }

    #[test]
    fn normalize_path_replaces_uuid_segments() {
        let path = "/landlord-dashboard/applications/550e8400-e29b-41d4-a716-446655440000/status";
        assert_eq!(
            normalize_path(path),
            "/landlord-dashboard/applications/{id}/status"
        );
    }

    #[test]
    fn normalize_path_preserves_plain_segments() {
        assert_eq!(normalize_path("/tenant-dashboard"), "/tenant-dashboard");
    }

    #[test]
    fn domain_gauges_update() {
        let m = ApiMetrics::new();
        m.users_total().with_label_values(&["tenant"]).set(3.0);
        m.users_total().with_label_values(&["landlord"]).set(1.0);
        m.properties_total().set(7.0);
        m.sessions_active().set(2.0);

        let output = m.gather_and_encode().unwrap();
        assert!(output.contains("reslet_users_total"));
        assert!(output.contains("reslet_properties_total"));
        assert!(output.contains("reslet_sessions_active"));
    }
}
