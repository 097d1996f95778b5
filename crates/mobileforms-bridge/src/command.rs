use std::fmt;
use std::sync::Arc;

use mobileforms_schema::{FieldValues, FormDefinition};
use serde::{Deserialize, Serialize};

/// Epoch of one `load`. Starts at 0 (never loaded) and increases by one per
/// load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
  pub fn new(value: u64) -> Self {
    Self(value)
  }

  pub fn value(&self) -> u64 {
    self.0
  }

  pub(crate) fn next(self) -> Self {
    Self(self.0 + 1)
  }
}

impl fmt::Display for Generation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A fire-and-forget instruction for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
  #[serde(rename_all = "camelCase")]
  SetReadOnly { read_only: bool },
  /// Replace every value shown by the renderer.
  Populate { values: FieldValues },
  /// Add a stylesheet. With `override_all` the renderer drops every style
  /// added before it.
  #[serde(rename_all = "camelCase")]
  AddStyle { css: String, override_all: bool },
  AddScript { source: String },
}

impl Command {
  pub fn name(&self) -> &'static str {
    match self {
      Command::SetReadOnly { .. } => "set_read_only",
      Command::Populate { .. } => "populate",
      Command::AddStyle { .. } => "add_style",
      Command::AddScript { .. } => "add_script",
    }
  }

  pub(crate) fn is_style(&self) -> bool {
    matches!(self, Command::AddStyle { .. })
  }
}

/// A command stamped with the generation it was issued for.
///
/// ```json
/// {"generation": 2, "command": "add_style", "css": "body {}", "overrideAll": false}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
  pub generation: Generation,
  #[serde(flatten)]
  pub command: Command,
}

impl Envelope {
  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_default()
  }
}

/// Everything the renderer needs to paint a form from scratch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bootstrap {
  pub generation: Generation,
  pub definition: Arc<FormDefinition>,
  pub values: FieldValues,
  pub read_only: bool,
}

impl Bootstrap {
  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_default()
  }
}
