//! # Card-Payment API Client
//!
//! Client for the external payment collaborator. The API is treated as an
//! opaque, best-effort, synchronous boundary:
//!
//! - `GET {base}/api/v1/payment/card` → `{success, data: {data: [..]}}`,
//!   a doubly-nested list of card payments, each carrying a
//!   `customer_email` the caller can filter on.
//! - `POST {base}/api/v1/payment/card` → success/failure envelope.
//!
//! Unknown payload fields are preserved in [`CardPayment::extra`] rather
//! than dropped — the collaborator's schema is not under our control.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::UpstreamError;
use crate::retry::retry_send;

/// A single card payment as reported by the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPayment {
    /// Email of the paying customer; the platform filters on this.
    pub customer_email: String,
    /// Payment amount as reported (string-typed upstream).
    #[serde(default)]
    pub amount: Option<String>,
    /// ISO currency code, when present.
    #[serde(default)]
    pub currency: Option<String>,
    /// Any remaining fields the collaborator sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Payload for submitting a card payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardPaymentRequest {
    pub card_number: String,
    pub card_holder_name: String,
    /// Expiry in `MM/YY` form.
    pub expiry_date: String,
    pub cvv: String,
    pub amount: String,
    pub currency: String,
    pub customer_email: String,
}

/// Success/failure envelope returned for submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// List envelope: `{success, data: {data: [..]}}`.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<ListInner>,
}

#[derive(Debug, Deserialize)]
struct ListInner {
    #[serde(default)]
    data: Vec<CardPayment>,
}

/// Payment collaborator seam. Production uses [`HttpPaymentClient`]; tests
/// use [`crate::stub::StubPaymentGateway`].
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Fetch all card payments known to the collaborator.
    async fn list_card_payments(&self) -> Result<Vec<CardPayment>, UpstreamError>;

    /// Submit a card payment.
    async fn submit_card_payment(
        &self,
        request: &CardPaymentRequest,
    ) -> Result<PaymentAck, UpstreamError>;
}

/// Configuration for the payment API client.
#[derive(Debug, Clone)]
pub struct PaymentApiConfig {
    /// Base URL of the payment API (e.g. `https://pay.example.com`).
    pub base_url: String,
    /// Optional bearer token.
    pub api_token: Option<String>,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl PaymentApiConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token,
            timeout_secs: crate::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Production HTTP client for the payment collaborator.
#[derive(Debug)]
pub struct HttpPaymentClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpPaymentClient {
    /// Create a new client from configuration.
    pub fn new(config: PaymentApiConfig) -> Result<Self, UpstreamError> {
        if config.base_url.is_empty() {
            return Err(UpstreamError::NotConfigured(
                "payment API base URL missing".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::NotConfigured(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    fn card_endpoint(&self) -> String {
        format!("{}/api/v1/payment/card", self.base_url)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentClient {
    async fn list_card_payments(&self) -> Result<Vec<CardPayment>, UpstreamError> {
        let endpoint = self.card_endpoint();
        let resp = retry_send(|| self.authorize(self.client.get(&endpoint)).send())
            .await
            .map_err(|e| UpstreamError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        if !resp.status().is_success() {
            return Err(UpstreamError::from_response(&endpoint, resp).await);
        }
        let envelope: ListEnvelope =
            resp.json().await.map_err(|e| UpstreamError::Deserialization {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        if !envelope.success {
            return Err(UpstreamError::InvalidResponse {
                endpoint,
                reason: "collaborator reported success=false on list".into(),
            });
        }
        Ok(envelope.data.map(|d| d.data).unwrap_or_default())
    }

    async fn submit_card_payment(
        &self,
        request: &CardPaymentRequest,
    ) -> Result<PaymentAck, UpstreamError> {
        let endpoint = self.card_endpoint();
        let resp = retry_send(|| self.authorize(self.client.post(&endpoint).json(request)).send())
            .await
            .map_err(|e| UpstreamError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        if !resp.status().is_success() {
            return Err(UpstreamError::from_response(&endpoint, resp).await);
        }
        resp.json().await.map_err(|e| UpstreamError::Deserialization {
            endpoint,
            source: e,
        })
    }
}
