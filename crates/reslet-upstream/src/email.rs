//! # Transactional Email Relay
//!
//! Outbound email for the contact form. The relay is an opaque HTTP
//! collaborator accepting a JSON message; delivery is fire-and-forget from
//! the platform's point of view — the caller spawns the send and logs
//! failures without surfacing them to the browser.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use crate::error::UpstreamError;
use crate::retry::retry_send;

/// An outbound email message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Reply-to address (the contact-form submitter).
    pub reply_to: String,
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

/// Email collaborator seam. Production uses [`HttpEmailRelay`]; tests use
/// [`crate::stub::StubEmailSender`].
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one message. Errors are for the caller to log, not retry.
    async fn send(&self, message: &EmailMessage) -> Result<(), UpstreamError>;
}

/// Configuration for the HTTP email relay.
#[derive(Debug, Clone)]
pub struct EmailRelayConfig {
    /// Relay endpoint accepting a JSON [`EmailMessage`] via POST.
    pub relay_url: String,
    /// Optional bearer token.
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl EmailRelayConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(relay_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            api_token,
            timeout_secs: crate::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Production HTTP relay client.
#[derive(Debug)]
pub struct HttpEmailRelay {
    client: reqwest::Client,
    relay_url: String,
    api_token: Option<String>,
}

impl HttpEmailRelay {
    /// Create a new relay client from configuration.
    pub fn new(config: EmailRelayConfig) -> Result<Self, UpstreamError> {
        if config.relay_url.is_empty() {
            return Err(UpstreamError::NotConfigured(
                "email relay URL missing".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::NotConfigured(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            relay_url: config.relay_url,
            api_token: config.api_token,
        })
    }
}

#[async_trait]
impl EmailSender for HttpEmailRelay {
    async fn send(&self, message: &EmailMessage) -> Result<(), UpstreamError> {
        let req = || {
            let mut r = self.client.post(&self.relay_url).json(message);
            if let Some(token) = &self.api_token {
                r = r.bearer_auth(token);
            }
            r.send()
        };
        let resp = retry_send(req).await.map_err(|e| UpstreamError::Http {
            endpoint: self.relay_url.clone(),
            source: e,
        })?;
        if !resp.status().is_success() {
            return Err(UpstreamError::from_response(&self.relay_url, resp).await);
        }
        Ok(())
    }
}
