//! # Google OAuth2 Identity Provider
//!
//! Authorization-code flow against Google's OAuth2 endpoints:
//!
//! 1. [`IdentityProvider::authorize_url`] — build the consent-screen URL the
//!    login route redirects the browser to, carrying an anti-forgery `state`.
//! 2. [`IdentityProvider::fetch_profile`] — exchange the code returned to the
//!    callback for an access token, then fetch the OpenID userinfo document.
//!
//! Only three profile fields are consumed: the stable subject identifier,
//! the primary email, and the display name. Token refresh is out of scope —
//! the platform needs the profile once per login, after which its own
//! session takes over.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use reslet_core::EmailAddress;

use crate::error::UpstreamError;
use crate::retry::retry_send;

/// Google's OAuth2 consent screen.
const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Google's authorization-code exchange endpoint.
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
/// OpenID Connect userinfo endpoint.
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// The external identity assertion consumed by the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleProfile {
    /// Google's stable subject identifier (`sub` claim).
    pub subject: String,
    /// Primary email address.
    pub email: EmailAddress,
    /// Display name, falling back to the email's local part when Google
    /// returns no name.
    pub name: String,
}

/// Identity provider seam. Production uses [`HttpGoogleProvider`]; tests use
/// [`crate::stub::StubIdentityProvider`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the consent-screen URL for the given anti-forgery state token.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user's profile.
    async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, UpstreamError>;
}

/// Configuration for the Google OAuth client.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    /// OAuth client id from the Google Cloud console.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URL registered for this client; must match the mounted
    /// callback route (`/auth/google/callback`).
    pub redirect_url: String,
    /// Request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl GoogleOAuthConfig {
    /// Create a new configuration with the default timeout.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            timeout_secs: crate::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Token-exchange response. Only the access token is consumed.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Userinfo document. `email` arrives as a raw string and is validated
/// into an [`EmailAddress`] before the profile is handed to the caller.
#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    sub: String,
    email: Option<String>,
    name: Option<String>,
}

/// Production Google OAuth2 client.
#[derive(Debug)]
pub struct HttpGoogleProvider {
    client: reqwest::Client,
    config: GoogleOAuthConfig,
}

impl HttpGoogleProvider {
    /// Create a new provider from configuration.
    pub fn new(config: GoogleOAuthConfig) -> Result<Self, UpstreamError> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(UpstreamError::NotConfigured(
                "google oauth client id/secret missing".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::NotConfigured(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl IdentityProvider for HttpGoogleProvider {
    fn authorize_url(&self, state: &str) -> String {
        let mut url = Url::parse(AUTH_ENDPOINT).expect("static endpoint URL is valid");
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state);
        url.into()
    }

    async fn fetch_profile(&self, code: &str) -> Result<GoogleProfile, UpstreamError> {
        // Step 1: authorization-code exchange.
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_url.as_str()),
            ("grant_type", "authorization_code"),
        ];
        let resp = retry_send(|| self.client.post(TOKEN_ENDPOINT).form(&params).send())
            .await
            .map_err(|e| UpstreamError::Http {
                endpoint: TOKEN_ENDPOINT.into(),
                source: e,
            })?;
        if !resp.status().is_success() {
            return Err(UpstreamError::from_response(TOKEN_ENDPOINT, resp).await);
        }
        let token: TokenResponse =
            resp.json().await.map_err(|e| UpstreamError::Deserialization {
                endpoint: TOKEN_ENDPOINT.into(),
                source: e,
            })?;

        // Step 2: userinfo retrieval.
        let resp = retry_send(|| {
            self.client
                .get(USERINFO_ENDPOINT)
                .bearer_auth(&token.access_token)
                .send()
        })
        .await
        .map_err(|e| UpstreamError::Http {
            endpoint: USERINFO_ENDPOINT.into(),
            source: e,
        })?;
        if !resp.status().is_success() {
            return Err(UpstreamError::from_response(USERINFO_ENDPOINT, resp).await);
        }
        let info: UserinfoResponse =
            resp.json().await.map_err(|e| UpstreamError::Deserialization {
                endpoint: USERINFO_ENDPOINT.into(),
                source: e,
            })?;

        profile_from_userinfo(info)
    }
}

/// Assemble a [`GoogleProfile`] from a raw userinfo document, rejecting
/// documents without a usable email (the directory keys on it).
fn profile_from_userinfo(info: UserinfoResponse) -> Result<GoogleProfile, UpstreamError> {
    let raw_email = info.email.ok_or_else(|| UpstreamError::InvalidResponse {
        endpoint: USERINFO_ENDPOINT.into(),
        reason: "userinfo document has no email claim".into(),
    })?;
    let email = EmailAddress::new(&raw_email).map_err(|e| UpstreamError::InvalidResponse {
        endpoint: USERINFO_ENDPOINT.into(),
        reason: format!("userinfo email is invalid: {e}"),
    })?;
    let name = match info.name {
        Some(n) if !n.trim().is_empty() => n,
        _ => raw_email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
    };
    Ok(GoogleProfile {
        subject: info.sub,
        email,
        name,
    })
}
