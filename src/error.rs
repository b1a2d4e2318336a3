//! Error types
//!
//! Every public operation reports through [`Error`]. Sink and alert-source
//! failures have their own types because they are recovered where they occur
//! and never reach the caller of `publish` or the heartbeat owner.

use thiserror::Error;

use crate::registry::RegistryError;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input to a public operation; no state was changed
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending argument
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Registry lookup failure for an operation that needs the session
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An event could not be encoded for the wire
    #[error("event serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error came from input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }
}

/// Reject empty or whitespace-only identifiers
pub(crate) fn require_id(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = Error::validation("user_id", "must not be empty");
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid user_id: must not be empty");
    }

    #[test]
    fn test_require_id() {
        assert!(require_id("user_id", "u1").is_ok());
        assert!(require_id("user_id", "").is_err());
        assert!(require_id("user_id", "   ").is_err());
    }
}
