//! Validation errors for domain primitive construction.

use thiserror::Error;

/// Errors raised when a domain primitive is constructed from invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value is not a plausible email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The value is not a recognized role.
    #[error("invalid role: {0} (expected \"tenant\" or \"landlord\")")]
    InvalidRole(String),

    /// A required field was empty or whitespace-only.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A field exceeded its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
    },
}
