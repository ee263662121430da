//! Configuration validation utilities

use crate::RoundwatchError;
use std::fmt;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Value is out of acceptable range
    OutOfRange {
        /// Offending field
        field: String,
        /// Inclusive lower bound
        min: Option<f64>,
        /// Inclusive upper bound
        max: Option<f64>,
        /// Value found
        actual: f64,
    },
    /// Custom validation failed
    Custom {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => {
                let range = match (min, max) {
                    (Some(min), Some(max)) => format!("between {min} and {max}"),
                    (Some(min), None) => format!("at least {min}"),
                    (None, Some(max)) => format!("at most {max}"),
                    (None, None) => "in valid range".to_string(),
                };
                write!(f, "Field '{field}' must be {range} (got {actual})")
            }
            ValidationError::Custom { field, message } => write!(f, "Field '{field}': {message}"),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for RoundwatchError {
    fn from(err: ValidationError) -> Self {
        RoundwatchError::config(err.to_string())
    }
}

/// Accumulates validation failures so that all of them are reported at once.
#[derive(Debug, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `value >= min`
    pub fn at_least(&mut self, field: &str, value: f64, min: f64) -> &mut Self {
        if value < min {
            self.errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                min: Some(min),
                max: None,
                actual: value,
            });
        }
        self
    }

    /// Record a custom failure when `ok` is false
    pub fn ensure(&mut self, field: &str, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(ValidationError::Custom {
                field: field.to_string(),
                message: message.into(),
            });
        }
        self
    }

    /// Errors collected so far
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Finish validation, joining all failures into one error
    pub fn finish(self) -> Result<(), RoundwatchError> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let joined: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        Err(RoundwatchError::config(joined.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_failure() {
        let mut validator = ConfigValidator::new();
        validator
            .at_least("a", 0.0, 1.0)
            .ensure("b", false, "must be set")
            .at_least("c", 5.0, 1.0);
        assert_eq!(validator.errors().len(), 2);

        let err = validator.finish().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Field 'a' must be at least 1"));
        assert!(message.contains("Field 'b': must be set"));
    }
}
