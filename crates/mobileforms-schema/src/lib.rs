//! Mobileforms Schema
//!
//! This crate contains the typed form model for mobileforms. A host hands over
//! a JSON form description; [`parse`] turns it into an immutable
//! [`FormDefinition`] or fails with a [`SchemaError`]. No partial definitions
//! are ever returned.
//!
//! Two layouts are accepted:
//!
//! ```json
//! { "fields": [ { "name": "age", "type": "number", "required": true,
//!                 "rules": [ { "kind": "range", "min": 0, "max": 120 } ] } ],
//!   "submit": "Send" }
//! ```
//!
//! ```json
//! { "sections": [ { "title": "Personal", "fields": [ ... ] } ],
//!   "submit": "Send" }
//! ```
//!
//! The second one is the sectioned layout older form files use. Legacy field
//! keys (`filter`/`error`, `min`/`max`, `maxlength`, pipe-separated `values`)
//! are folded into regular [`Rule`]s while parsing.

mod definition;
mod error;
mod field;
mod parse;
mod rule;
mod values;

pub use definition::{FormDefinition, Section};
pub use error::SchemaError;
pub use field::{ChoiceOption, FieldDefinition, FieldType};
pub use parse::{parse, parse_date, parse_time};
pub use rule::{Pattern, Rule, RuleKind};
pub use values::FieldValues;
