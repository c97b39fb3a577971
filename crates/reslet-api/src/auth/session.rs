//! # Session Manager
//!
//! Opaque session tokens tied to local user ids. Sessions are created only
//! after a successful login — anonymous requests never allocate state — and
//! expire 24 hours after creation. Tokens are 32 random bytes, hex-encoded,
//! carried in the `reslet_session` cookie (HttpOnly, SameSite=Lax).
//!
//! [`LoginStates`] holds the anti-forgery `state` tokens minted when a
//! login is initiated and consumed exactly once by the OAuth callback.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, HeaderValue};
use getrandom::getrandom;
use parking_lot::RwLock;

use reslet_core::UserId;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "reslet_session";

/// Session lifetime.
const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Lifetime of a pending-login state token.
const LOGIN_STATE_TTL: Duration = Duration::from_secs(10 * 60);

/// Generate a hex token from `N` random bytes.
fn random_token<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    // getrandom only fails when the OS entropy source is unavailable, in
    // which case issuing sessions at all would be unsafe.
    getrandom(&mut bytes).expect("OS entropy source unavailable");
    let mut out = String::with_capacity(N * 2);
    use std::fmt::Write as _;
    for b in &bytes {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}

struct SessionEntry {
    user_id: UserId,
    created_at: Instant,
}

/// Server-side session store: token → user id, with expiry.
#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for the user and return the opaque token.
    pub fn create(&self, user_id: UserId) -> String {
        let token = random_token::<32>();
        let mut guard = self.inner.write();
        // Opportunistic sweep keeps the map bounded without a reaper task.
        guard.retain(|_, e| e.created_at.elapsed() < SESSION_TTL);
        guard.insert(
            token.clone(),
            SessionEntry {
                user_id,
                created_at: Instant::now(),
            },
        );
        token
    }

    /// Resolve a token to a user id. Expired tokens are removed and resolve
    /// to `None`.
    pub fn resolve(&self, token: &str) -> Option<UserId> {
        {
            let guard = self.inner.read();
            match guard.get(token) {
                Some(entry) if entry.created_at.elapsed() < SESSION_TTL => {
                    return Some(entry.user_id)
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Token exists but is expired — drop it.
        self.inner.write().remove(token);
        None
    }

    /// Destroy a session. Unknown tokens are a no-op.
    pub fn destroy(&self, token: &str) {
        self.inner.write().remove(token);
    }

    /// Number of live (non-expired) sessions.
    pub fn active_count(&self) -> usize {
        self.inner
            .read()
            .values()
            .filter(|e| e.created_at.elapsed() < SESSION_TTL)
            .count()
    }
}

/// Pending-login anti-forgery tokens for the OAuth round-trip.
#[derive(Default)]
pub struct LoginStates {
    inner: RwLock<HashMap<String, Instant>>,
}

impl LoginStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a state token for a new login attempt.
    pub fn issue(&self) -> String {
        let token = random_token::<16>();
        let mut guard = self.inner.write();
        guard.retain(|_, t| t.elapsed() < LOGIN_STATE_TTL);
        guard.insert(token.clone(), Instant::now());
        token
    }

    /// Consume a state token. Returns `false` for unknown, reused, or
    /// expired tokens.
    pub fn take(&self, token: &str) -> bool {
        match self.inner.write().remove(token) {
            Some(created) => created.elapsed() < LOGIN_STATE_TTL,
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Cookie plumbing
// ---------------------------------------------------------------------------

/// Extract a cookie value from request headers.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie")?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some((k, v)) = p.split_once('=') {
            if k == name {
                return Some(v.to_string());
            }
        }
    }
    None
}

/// `Set-Cookie` value establishing a session.
pub fn set_session_cookie(token: &str) -> HeaderValue {
    // SameSite=Lax so the cookie survives the top-level redirect back from
    // the identity provider.
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/"
    ))
    .expect("hex token is always a valid header value")
}

/// `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static(concat!(
        "reslet_session=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; ",
        "HttpOnly; SameSite=Lax; Path=/"
    ))
}
