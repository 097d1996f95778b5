use thiserror::Error;

/// Errors produced while turning schema text into a [`FormDefinition`].
///
/// [`FormDefinition`]: crate::FormDefinition
#[derive(Debug, Error)]
pub enum SchemaError {
  /// The input is not well-formed JSON, or not shaped like a form schema.
  #[error("malformed schema: {0}")]
  Malformed(#[from] serde_json::Error),

  /// A field entry has no name, or an empty one.
  #[error("field at position {index} has no name")]
  MissingName { index: usize },

  /// Two fields share a name.
  #[error("duplicate field name: {field}")]
  DuplicateName { field: String },

  /// A field entry has no `type` tag.
  #[error("field '{field}' has no type")]
  MissingType { field: String },

  /// The `type` tag is not one of the supported field types.
  #[error("field '{field}' has unknown type '{type_name}'")]
  UnknownFieldType { field: String, type_name: String },

  /// A rule's parameters do not match its declared kind.
  #[error("invalid rule on field '{field}': {reason}")]
  InvalidRule { field: String, reason: String },

  /// The top-level layout is inconsistent (e.g. both `fields` and `sections`).
  #[error("invalid schema layout: {message}")]
  Layout { message: String },
}

impl SchemaError {
  pub(crate) fn invalid_rule(field: &str, reason: impl Into<String>) -> Self {
    Self::InvalidRule {
      field: field.to_string(),
      reason: reason.into(),
    }
  }

  /// Name of the field that caused the failure, when one can be pinned down.
  pub fn offending_field(&self) -> Option<&str> {
    match self {
      Self::DuplicateName { field }
      | Self::MissingType { field }
      | Self::UnknownFieldType { field, .. }
      | Self::InvalidRule { field, .. } => Some(field),
      Self::Malformed(_) | Self::MissingName { .. } | Self::Layout { .. } => None,
    }
  }
}
