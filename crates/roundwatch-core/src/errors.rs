//! Unified error type for Roundwatch
//!
//! Assertion violations are not errors in this sense; they are reported by
//! the verification layer through its own `Violation` type. This type covers
//! misuse and infrastructure failures around the checks.

use serde::{Deserialize, Serialize};

/// Unified error type for all Roundwatch operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RoundwatchError {
    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// An assertion was set up on missing or unusable input
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Error message describing the broken precondition
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl RoundwatchError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for Roundwatch operations
pub type Result<T> = std::result::Result<T, RoundwatchError>;

impl From<std::io::Error> for RoundwatchError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::config(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for RoundwatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<serde_json::Error> for RoundwatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RoundwatchError::precondition("no nodes");
        assert!(matches!(err, RoundwatchError::Precondition { .. }));
        assert_eq!(err.to_string(), "Precondition failed: no nodes");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = RoundwatchError::from(io_err);
        assert!(matches!(err, RoundwatchError::Config { .. }));
    }
}
