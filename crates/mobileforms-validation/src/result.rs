use serde::{Deserialize, Serialize};

/// Outcome of evaluating a form.
///
/// Serializes with both lists always present, empty when there is nothing to
/// report:
///
/// ```json
/// { "requireErrors": ["age"], "validationErrors": [{ "name": "zip", "message": "five digits" }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  /// Names of required fields that are empty.
  pub require_errors: Vec<String>,
  /// First failing rule per field.
  pub validation_errors: Vec<FieldError>,
}

/// A rule failure on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub name: String,
  pub message: String,
}

impl ValidationResult {
  pub fn is_valid(&self) -> bool {
    self.require_errors.is_empty() && self.validation_errors.is_empty()
  }

  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_else(|_| {
      r#"{"requireErrors":[],"validationErrors":[]}"#.to_string()
    })
  }
}
