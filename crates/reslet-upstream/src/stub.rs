//! # In-Memory Collaborator Stubs
//!
//! Deterministic stand-ins for the three upstream boundaries, used by the
//! API integration tests and by memory-only development mode. Each stub
//! records the calls it receives so tests can assert on them, and can be
//! switched into a failing mode to exercise error paths.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::email::{EmailMessage, EmailSender};
use crate::error::UpstreamError;
use crate::google::{GoogleProfile, IdentityProvider};
use crate::payments::{CardPayment, CardPaymentRequest, PaymentAck, PaymentGateway};

/// Identity provider stub: a fixed table of authorization codes → profiles.
#[derive(Debug, Default)]
pub struct StubIdentityProvider {
    profiles: Mutex<HashMap<String, GoogleProfile>>,
}

impl StubIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile to be returned for the given authorization code.
    pub fn register_code(&self, code: impl Into<String>, profile: GoogleProfile) {
        self.profiles.lock().insert(code.into(), profile);
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn authorize_url(&self, state: &str) -> String {
        format!("https://accounts.google.com/o/oauth2/v2/auth?stub=1&state={state}")
    }

    async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, UpstreamError> {
        self.profiles
            .lock()
            .get(code)
            .cloned()
            .ok_or_else(|| UpstreamError::Api {
                endpoint: "stub://google/token".into(),
                status: 400,
                body: format!("unknown authorization code {code}"),
            })
    }
}

/// Payment gateway stub: a canned payment list plus a record of submissions.
#[derive(Debug, Default)]
pub struct StubPaymentGateway {
    payments: Mutex<Vec<CardPayment>>,
    submissions: Mutex<Vec<CardPaymentRequest>>,
    fail: Mutex<bool>,
}

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the canned payment list.
    pub fn push_payment(&self, payment: CardPayment) {
        self.payments.lock().push(payment);
    }

    /// All submissions received so far.
    pub fn submissions(&self) -> Vec<CardPaymentRequest> {
        self.submissions.lock().clone()
    }

    /// Make every subsequent call fail with an upstream error.
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock() = failing;
    }

    fn check_failing(&self) -> Result<(), UpstreamError> {
        if *self.fail.lock() {
            return Err(UpstreamError::Api {
                endpoint: "stub://payments/api/v1/payment/card".into(),
                status: 502,
                body: "stub configured to fail".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn list_card_payments(&self) -> Result<Vec<CardPayment>, UpstreamError> {
        self.check_failing()?;
        Ok(self.payments.lock().clone())
    }

    async fn submit_card_payment(
        &self,
        request: &CardPaymentRequest,
    ) -> Result<PaymentAck, UpstreamError> {
        self.check_failing()?;
        self.submissions.lock().push(request.clone());
        Ok(PaymentAck {
            success: true,
            message: Some("recorded by stub".into()),
        })
    }
}

/// Email sender stub: records messages instead of delivering them.
#[derive(Debug, Default)]
pub struct StubEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail: Mutex<bool>,
}

impl StubEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages "delivered" so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }

    /// Make every subsequent send fail.
    pub fn set_failing(&self, failing: bool) {
        *self.fail.lock() = failing;
    }
}

#[async_trait]
impl EmailSender for StubEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), UpstreamError> {
        if *self.fail.lock() {
            return Err(UpstreamError::Api {
                endpoint: "stub://email".into(),
                status: 500,
                body: "stub configured to fail".into(),
            });
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
