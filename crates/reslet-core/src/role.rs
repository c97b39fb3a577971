//! User roles gating route access.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Classification of a platform user.
///
/// The role decides which dashboard a user lands on after login and which
/// role-scoped routes they may reach. New accounts default to [`Role::Tenant`];
/// the landlord role is assigned out-of-band (operator action in the
/// database), matching the upstream deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A renter: applies to properties, pays rent, messages their landlord.
    Tenant,
    /// A property owner: reviews applications, links tenants, messages them.
    Landlord,
}

impl Role {
    /// Canonical lowercase string form, as stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tenant => "tenant",
            Self::Landlord => "landlord",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tenant" => Ok(Self::Tenant),
            "landlord" => Ok(Self::Landlord),
            other => Err(ValidationError::InvalidRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_forms_roundtrip() {
        for role in [Role::Tenant, Role::Landlord] {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            "admin".parse::<Role>(),
            Err(ValidationError::InvalidRole(_))
        ));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Tenant).unwrap(), "\"tenant\"");
        assert_eq!(
            serde_json::to_string(&Role::Landlord).unwrap(),
            "\"landlord\""
        );
    }
}
