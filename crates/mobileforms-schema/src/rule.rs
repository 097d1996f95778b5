use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Serialize, Serializer};

/// A validation rule attached to a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
  #[serde(flatten)]
  pub kind: RuleKind,
  /// Message recorded when the rule fails.
  pub message: String,
  /// Run the rule even when the field is empty.
  pub apply_when_empty: bool,
}

impl Rule {
  /// Build a rule with its kind's default message.
  pub fn new(kind: RuleKind) -> Self {
    let message = kind.default_message().to_string();
    Self {
      kind,
      message,
      apply_when_empty: false,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = message.into();
    self
  }
}

/// The check a rule performs, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
  /// Numeric value within `[min, max]`. A missing bound is open.
  Range {
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
  },
  /// Character count within `[min, max]`.
  Length { min: usize, max: usize },
  /// Value matches a regular expression (unanchored search).
  Pattern { pattern: Pattern },
  Email,
  /// `YYYY-MM-DD` date, optionally bounded.
  Date {
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<NaiveDate>,
  },
  /// `HH:MM` time of day, optionally bounded.
  Time {
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<NaiveTime>,
  },
  /// Value is one of a fixed set.
  OneOf { values: Vec<String> },
}

impl RuleKind {
  pub fn name(&self) -> &'static str {
    match self {
      RuleKind::Range { .. } => "range",
      RuleKind::Length { .. } => "length",
      RuleKind::Pattern { .. } => "pattern",
      RuleKind::Email => "email",
      RuleKind::Date { .. } => "date",
      RuleKind::Time { .. } => "time",
      RuleKind::OneOf { .. } => "one_of",
    }
  }

  pub fn default_message(&self) -> &'static str {
    match self {
      RuleKind::Range { .. } => "out of range",
      RuleKind::Length { .. } => "invalid length",
      RuleKind::Pattern { .. } => "invalid format",
      RuleKind::Email => "invalid email",
      RuleKind::Date { .. } => "invalid date",
      RuleKind::Time { .. } => "invalid time",
      RuleKind::OneOf { .. } => "invalid option",
    }
  }
}

/// A compiled regular expression that compares and serializes by its source.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
  pub fn new(source: &str) -> Result<Self, regex::Error> {
    Regex::new(source).map(Self)
  }

  pub fn as_str(&self) -> &str {
    self.0.as_str()
  }

  pub fn is_match(&self, text: &str) -> bool {
    self.0.is_match(text)
  }
}

impl PartialEq for Pattern {
  fn eq(&self, other: &Self) -> bool {
    self.as_str() == other.as_str()
  }
}

impl fmt::Debug for Pattern {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Pattern").field(&self.as_str()).finish()
  }
}

impl Serialize for Pattern {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_rule_serializes_flat() {
    let rule = Rule::new(RuleKind::Range {
      min: Some(0.0),
      max: Some(120.0),
    });
    let value = serde_json::to_value(&rule).unwrap();
    assert_eq!(
      value,
      json!({"kind": "range", "min": 0.0, "max": 120.0, "message": "out of range", "applyWhenEmpty": false})
    );
  }

  #[test]
  fn test_pattern_compares_by_source() {
    let a = Pattern::new("^[0-9]+$").unwrap();
    let b = Pattern::new("^[0-9]+$").unwrap();
    assert_eq!(a, b);
    assert!(a.is_match("123"));
    assert!(!a.is_match("12a"));
  }

  #[test]
  fn test_with_message_overrides_default() {
    let rule = Rule::new(RuleKind::Email).with_message("check your email");
    assert_eq!(rule.message, "check your email");
  }
}
