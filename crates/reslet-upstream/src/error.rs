//! Upstream collaborator error types.

/// Errors from external collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The collaborator returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The client is missing required configuration.
    #[error("not configured: {0}")]
    NotConfigured(String),
    /// The provider response was structurally valid but unusable.
    #[error("unusable response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl UpstreamError {
    /// Map a non-success `reqwest::Response` into [`UpstreamError::Api`],
    /// capping the captured body at 2 KiB so log lines stay bounded.
    pub(crate) async fn from_response(endpoint: &str, resp: reqwest::Response) -> Self {
        let status = resp.status().as_u16();
        let mut body = resp.text().await.unwrap_or_default();
        body.truncate(2048);
        Self::Api {
            endpoint: endpoint.to_string(),
            status,
            body,
        }
    }
}
