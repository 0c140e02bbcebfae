//! Tagweave Core
//!
//! Data model shared by the weaver and the runtime.
//!
//! Responsibilities:
//! - Runtime values and the value-type restriction universe
//! - The compiled-unit instruction model the weaver transforms
//! - Validator capability traits and combinators
//! - Validation error types raised by rewritten programs

mod error;
mod unit;
mod validator;
mod value;

pub use error::{ValidationError, ValidationResult};
pub use unit::{
    AnnotationTarget, CalloutOp, CalloutRef, CodeElement, CompiledUnit, Instruction, Label,
    MethodBody, Retention, TypeAnnotation,
};
pub use validator::{always_valid, and_then, bind, restrict_to, TagValidator, Validate};
pub use value::{ParamValue, TagParams, Value, ValueType};
