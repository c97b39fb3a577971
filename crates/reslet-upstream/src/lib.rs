//! # reslet-upstream — External Collaborator Clients
//!
//! Every system boundary the rental platform depends on lives here, behind
//! a trait seam with a production HTTP implementation and an in-memory stub
//! for tests:
//!
//! - [`google`] — Google OAuth2 identity provider: authorization URL
//!   construction, authorization-code exchange, and userinfo retrieval.
//! - [`payments`] — the card-payment HTTP API (`/api/v1/payment/card`):
//!   listing payments and submitting new ones.
//! - [`email`] — outbound transactional email relay (contact form).
//!
//! ## Error Handling
//!
//! HTTP failures are mapped to [`UpstreamError`] with diagnostic context
//! including the endpoint, HTTP status, and response body excerpt.
//!
//! ## Timeout & Retry
//!
//! Each client uses a per-request timeout (default 10s). Transport errors
//! are retried with exponential backoff via the [`retry`] module; non-2xx
//! responses and deserialization failures are returned immediately.

pub mod email;
pub mod error;
pub mod google;
pub mod payments;
pub mod stub;

pub(crate) mod retry;

pub use email::{EmailMessage, EmailRelayConfig, EmailSender, HttpEmailRelay};
pub use error::UpstreamError;
pub use google::{GoogleOAuthConfig, GoogleProfile, HttpGoogleProvider, IdentityProvider};
pub use payments::{
    CardPayment, CardPaymentRequest, HttpPaymentClient, PaymentAck, PaymentApiConfig,
    PaymentGateway,
};

/// Default per-request timeout for all upstream calls, in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;
