//! Validator capability traits and combinators.
//!
//! A [`Validate`] checks one value. Custom validators implement
//! [`TagValidator`] instead, which receives the tag's per-use parameters;
//! [`bind`] fixes those parameters to produce a [`Validate`]. Composition is
//! by [`and_then`]: the first failure wins and the (possibly normalized)
//! value threads through each stage.

use crate::{TagParams, ValidationError, ValidationResult, Value, ValueType};
use std::sync::Arc;

/// A capability object performing a value check.
pub trait Validate: Send + Sync {
    /// Validate the value, returning it (or an equivalent normalized value)
    /// on success.
    ///
    /// Implementations should return the value unmodified to preserve
    /// composability, but may return a different, equivalent value. Callers
    /// must use the returned value when they use anything.
    fn validate(&self, value: &Value) -> ValidationResult<Value>;

    /// Whether the value is valid: true iff [`validate`](Self::validate)
    /// does not fail with a type or value rejection.
    fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}

/// Author-facing validator for a constraint tag.
///
/// Receives the tag's per-use parameters on every call; the runtime binds a
/// concrete parameter set via [`bind`] before caching.
pub trait TagValidator: Send + Sync {
    /// Validate the value under the given tag parameters.
    fn validate(&self, params: &TagParams, value: &Value) -> ValidationResult<Value>;
}

struct AlwaysValid;

impl Validate for AlwaysValid {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        Ok(value.clone())
    }
}

/// A validator that accepts every value unchanged.
pub fn always_valid() -> Arc<dyn Validate> {
    Arc::new(AlwaysValid)
}

struct RestrictTo {
    allowed: Vec<ValueType>,
}

impl Validate for RestrictTo {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        if self.allowed.iter().any(|t| t.admits(value)) {
            return Ok(value.clone());
        }
        let expected = if self.allowed.len() == 1 {
            self.allowed[0].name().to_string()
        } else {
            let names: Vec<&str> = self.allowed.iter().map(ValueType::name).collect();
            format!("one of {}", names.join(", "))
        };
        let actual = if value.is_null() {
            "is null".to_string()
        } else {
            format!("has type {}", value.type_name())
        };
        Err(ValidationError::type_mismatch(expected, actual))
    }
}

/// A validator that requires values to be instances of one of the given types.
///
/// Null is rejected (it is an instance of nothing). An empty slice means
/// "unrestricted" in the tag data model and yields [`always_valid`].
pub fn restrict_to(allowed: &[ValueType]) -> Arc<dyn Validate> {
    if allowed.is_empty() {
        return always_valid();
    }
    Arc::new(RestrictTo {
        allowed: allowed.to_vec(),
    })
}

struct AndThen {
    first: Arc<dyn Validate>,
    next: Arc<dyn Validate>,
}

impl Validate for AndThen {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        self.next.validate(&self.first.validate(value)?)
    }
}

/// Compose two validators: `first`, then `next`, threading the value through.
pub fn and_then(first: Arc<dyn Validate>, next: Arc<dyn Validate>) -> Arc<dyn Validate> {
    Arc::new(AndThen { first, next })
}

struct Bound {
    inner: Arc<dyn TagValidator>,
    params: TagParams,
}

impl Validate for Bound {
    fn validate(&self, value: &Value) -> ValidationResult<Value> {
        self.inner.validate(&self.params, value)
    }
}

/// Fix a [`TagValidator`]'s parameters, producing a plain [`Validate`].
pub fn bind(inner: Arc<dyn TagValidator>, params: TagParams) -> Arc<dyn Validate> {
    Arc::new(Bound { inner, params })
}
