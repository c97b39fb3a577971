//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the platform.
//! Each identifier is a distinct type — you cannot pass a [`PropertyId`]
//! where a [`UserId`] is expected.
//!
//! UUID-based identifiers ([`UserId`], [`PropertyId`], [`ApplicationId`],
//! [`MessageId`]) are always valid by construction. [`EmailAddress`]
//! validates its contents at construction time and at deserialization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor so that invalid values are
/// rejected at deserialization time — not silently accepted.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Helper macro for UUID-backed identifier newtypes.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $ty:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// A unique identifier for a platform user (tenant or landlord).
    UserId
}

uuid_id! {
    /// A unique identifier for a rental property listing.
    PropertyId
}

uuid_id! {
    /// A unique identifier for a rental application.
    ApplicationId
}

uuid_id! {
    /// A unique identifier for a mailbox message.
    MessageId
}

// ---------------------------------------------------------------------------
// EmailAddress (validated string newtype)
// ---------------------------------------------------------------------------

/// A normalized, minimally-validated email address.
///
/// Validation is deliberately shallow — one `@` with non-empty local and
/// domain parts, no whitespace. Deliverability is the email relay's problem.
/// Addresses are lowercased so that lookups by email are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Maximum accepted length, matching the `users.email` column width.
    pub const MAX_LEN: usize = 320;

    /// Validate and normalize an email address.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyField { field: "email" });
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: Self::MAX_LEN,
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidEmail(raw));
        }
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(ValidationError::InvalidEmail(raw));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ValidationError::InvalidEmail(raw));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Access the normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EmailAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl_validating_deserialize!(EmailAddress);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_roundtrips_through_display() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn distinct_id_types_have_distinct_values() {
        // Two fresh ids must never collide, even across types.
        let a = UserId::new();
        let b = PropertyId::new();
        assert_ne!(a.as_uuid(), b.as_uuid());
    }

    #[test]
    fn email_normalizes_case_and_whitespace() {
        let email = EmailAddress::new("  Jane.Doe@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "jane.doe@example.com");
    }

    #[test]
    fn email_rejects_missing_at() {
        assert!(matches!(
            EmailAddress::new("not-an-email"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn email_rejects_empty_parts() {
        assert!(EmailAddress::new("@example.com").is_err());
        assert!(EmailAddress::new("jane@").is_err());
        assert!(EmailAddress::new("").is_err());
    }

    #[test]
    fn email_rejects_embedded_whitespace() {
        assert!(EmailAddress::new("jane doe@example.com").is_err());
    }

    #[test]
    fn email_deserialize_rejects_invalid() {
        let ok: Result<EmailAddress, _> = serde_json::from_str("\"jane@example.com\"");
        assert!(ok.is_ok());
        let bad: Result<EmailAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }
}
