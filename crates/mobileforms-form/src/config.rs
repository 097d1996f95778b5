use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// When the session evaluates validation rules on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
  /// Only when asked (`get_errors`, `is_valid`) and on submit.
  #[default]
  OnDemand,
  /// Also after every applied change; a failing field raises a local
  /// `ValidateError` event.
  OnChange,
}

/// Per-session settings.
///
/// ```json
/// { "forms_dir": "assets/forms", "validation_policy": "on_change" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
  /// Directory that named schemas and injected assets are read from.
  pub forms_dir: PathBuf,
  pub validation_policy: ValidationPolicy,
}

impl Default for FormConfig {
  fn default() -> Self {
    Self {
      forms_dir: PathBuf::from("forms"),
      validation_policy: ValidationPolicy::default(),
    }
  }
}

impl FormConfig {
  pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(text)
  }
}
