//! Validation error types.
//!
//! These are the errors raised by rewritten programs at execution time, not
//! by the weaver itself. The two variants let callers distinguish "wrong kind
//! of value" from "right kind, wrong content".

use thiserror::Error;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised when a value fails its constraint tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The value's runtime type is outside the tag's restriction set.
    #[error("value is required to be {expected} but {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The value has an admissible type but fails the tag's predicate.
    #[error("invalid value: {message}")]
    InvalidValue { message: String },
}

impl ValidationError {
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }

    /// Returns true if this is a value-level rejection rather than a type mismatch.
    pub fn is_value_rejection(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }
}
