use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::rule::{Rule, RuleKind};

/// The widget kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
  Text,
  Password,
  Number,
  Tel,
  Email,
  Hidden,
  Date,
  Time,
  File,
  Textarea,
  Range,
  Select,
  Radio,
  Checkbox,
  PhoneItem,
  Link,
}

impl FieldType {
  pub fn as_str(&self) -> &'static str {
    match self {
      FieldType::Text => "text",
      FieldType::Password => "password",
      FieldType::Number => "number",
      FieldType::Tel => "tel",
      FieldType::Email => "email",
      FieldType::Hidden => "hidden",
      FieldType::Date => "date",
      FieldType::Time => "time",
      FieldType::File => "file",
      FieldType::Textarea => "textarea",
      FieldType::Range => "range",
      FieldType::Select => "select",
      FieldType::Radio => "radio",
      FieldType::Checkbox => "checkbox",
      FieldType::PhoneItem => "phoneitem",
      FieldType::Link => "link",
    }
  }

  /// Whether the field holds a value at all. Links only navigate.
  pub fn carries_value(&self) -> bool {
    !matches!(self, FieldType::Link)
  }

  /// Whether the field picks from a fixed set of options.
  pub fn is_choice(&self) -> bool {
    matches!(self, FieldType::Select | FieldType::Radio)
  }

  pub fn is_numeric(&self) -> bool {
    matches!(self, FieldType::Number | FieldType::Range)
  }
}

impl fmt::Display for FieldType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FieldType {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let field_type = match s {
      "text" => FieldType::Text,
      "password" => FieldType::Password,
      "number" => FieldType::Number,
      "tel" => FieldType::Tel,
      "email" => FieldType::Email,
      "hidden" => FieldType::Hidden,
      "date" => FieldType::Date,
      "time" => FieldType::Time,
      "file" => FieldType::File,
      "textarea" => FieldType::Textarea,
      "range" => FieldType::Range,
      "select" | "choice" => FieldType::Select,
      "radio" => FieldType::Radio,
      "checkbox" => FieldType::Checkbox,
      "phoneitem" => FieldType::PhoneItem,
      "link" => FieldType::Link,
      _ => return Err(()),
    };
    Ok(field_type)
  }
}

/// One field of a form: its key, widget kind, required flag and rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
  pub name: String,
  #[serde(rename = "type")]
  pub field_type: FieldType,
  pub required: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub placeholder: Option<String>,
  /// Value the field starts with and resets to.
  #[serde(rename = "value", skip_serializing_if = "Option::is_none")]
  pub default_value: Option<serde_json::Value>,
  /// Allowed values for choice fields, with their display labels.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub options: Vec<ChoiceOption>,
  /// Rules in declaration order.
  pub rules: Vec<Rule>,
}

impl FieldDefinition {
  /// Whether a rule of the given kind is declared on this field.
  pub fn has_rule(&self, kind: &str) -> bool {
    self.rules.iter().any(|r| r.kind.name() == kind)
  }

  pub(crate) fn push_implicit(&mut self, kind: RuleKind) {
    if !self.has_rule(kind.name()) {
      self.rules.push(Rule::new(kind));
    }
  }
}

/// An option of a select or radio field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
  pub value: String,
  pub label: String,
}
