use serde::Serialize;

use crate::field::FieldDefinition;
use crate::values::FieldValues;

/// A parsed, validated form.
///
/// Immutable once built: loading a new schema produces a new definition
/// rather than editing this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
  fields: Vec<FieldDefinition>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  sections: Vec<Section>,
  #[serde(rename = "submit", skip_serializing_if = "Option::is_none")]
  submit_label: Option<String>,
}

/// A titled group of fields, as laid out by the sectioned schema format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  /// Names of the fields in this section, in order.
  pub fields: Vec<String>,
}

impl FormDefinition {
  pub(crate) fn new(
    fields: Vec<FieldDefinition>,
    sections: Vec<Section>,
    submit_label: Option<String>,
  ) -> Self {
    Self {
      fields,
      sections,
      submit_label,
    }
  }

  /// Fields in declaration order.
  pub fn fields(&self) -> &[FieldDefinition] {
    &self.fields
  }

  pub fn sections(&self) -> &[Section] {
    &self.sections
  }

  pub fn submit_label(&self) -> Option<&str> {
    self.submit_label.as_deref()
  }

  /// Get a field by name.
  pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
    self.fields.iter().find(|f| f.name == name)
  }

  /// Whether `name` is a field that holds a value.
  pub fn accepts(&self, name: &str) -> bool {
    self
      .field(name)
      .is_some_and(|f| f.field_type.carries_value())
  }

  /// Values every field starts with (schema defaults only).
  pub fn defaults(&self) -> FieldValues {
    self
      .fields
      .iter()
      .filter(|f| f.field_type.carries_value())
      .filter_map(|f| f.default_value.clone().map(|v| (f.name.clone(), v)))
      .collect()
  }
}
