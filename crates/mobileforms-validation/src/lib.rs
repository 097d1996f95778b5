//! Mobileforms Validation
//!
//! Evaluates a [`FieldValues`] mapping against a [`FormDefinition`].
//!
//! Failures come in two independent kinds:
//! - *require errors*: a required field is empty
//! - *validation errors*: a declared rule rejected the value
//!
//! The engine is pure: the same definition and values always produce the same
//! [`ValidationResult`]. Nothing is cached between calls.
//!
//! [`FieldValues`]: mobileforms_schema::FieldValues
//! [`FormDefinition`]: mobileforms_schema::FormDefinition

mod engine;
mod result;
mod rules;

pub use engine::{evaluate, evaluate_field, is_empty, is_valid};
pub use result::{FieldError, ValidationResult};
