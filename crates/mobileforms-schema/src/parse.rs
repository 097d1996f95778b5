//! Schema parsing.
//!
//! The JSON is first deserialized into loose `Raw*` shapes, then checked and
//! converted field by field into the typed model. Every check happens before
//! the [`FormDefinition`] is built, so a failure never leaves a half-built
//! definition behind.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::Value;

use crate::definition::{FormDefinition, Section};
use crate::error::SchemaError;
use crate::field::{ChoiceOption, FieldDefinition, FieldType};
use crate::rule::{Pattern, Rule, RuleKind};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

#[derive(Debug, Deserialize)]
struct RawSchema {
  #[serde(default)]
  fields: Option<Vec<RawField>>,
  #[serde(default)]
  sections: Option<Vec<RawSection>>,
  #[serde(default)]
  submit: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
  #[serde(default)]
  title: Option<String>,
  #[serde(default)]
  fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
  #[serde(default)]
  name: Option<String>,
  #[serde(rename = "type", default)]
  field_type: Option<String>,
  #[serde(default)]
  label: Option<String>,
  #[serde(default)]
  placeholder: Option<String>,
  #[serde(default)]
  required: Option<Flag>,
  #[serde(default)]
  value: Option<Value>,
  #[serde(default)]
  options: Option<Vec<Value>>,
  /// Pipe-separated option values.
  #[serde(default)]
  values: Option<String>,
  /// Pipe-separated option labels, aligned with `values`.
  #[serde(default)]
  labels: Option<String>,
  #[serde(default)]
  rules: Vec<RawRule>,
  #[serde(default)]
  filter: Option<String>,
  #[serde(default)]
  error: Option<String>,
  #[serde(default)]
  min: Option<Value>,
  #[serde(default)]
  max: Option<Value>,
  #[serde(default)]
  maxlength: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
  kind: String,
  #[serde(default)]
  min: Option<Value>,
  #[serde(default)]
  max: Option<Value>,
  #[serde(default)]
  pattern: Option<String>,
  #[serde(default)]
  values: Option<Vec<Value>>,
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  apply_when_empty: bool,
}

/// Boolean flags show up as `true`, `1` or `"true"` in form files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
  Bool(bool),
  Int(i64),
  Text(String),
}

impl Flag {
  fn is_set(&self) -> bool {
    match self {
      Flag::Bool(b) => *b,
      Flag::Int(n) => *n != 0,
      Flag::Text(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
    }
  }
}

/// Parse schema text into a [`FormDefinition`].
pub fn parse(schema: &str) -> Result<FormDefinition, SchemaError> {
  let raw: RawSchema = serde_json::from_str(schema)?;

  let raw_sections = match (raw.fields, raw.sections) {
    (Some(_), Some(_)) => {
      return Err(SchemaError::Layout {
        message: "schema defines both 'fields' and 'sections'".to_string(),
      });
    }
    (Some(fields), None) => vec![RawSection {
      title: None,
      fields,
    }],
    (None, Some(sections)) => sections,
    (None, None) => Vec::new(),
  };
  let sectioned = raw_sections.iter().any(|s| s.title.is_some()) || raw_sections.len() > 1;

  let mut seen = HashSet::new();
  let mut fields = Vec::new();
  let mut sections = Vec::with_capacity(raw_sections.len());

  for raw_section in raw_sections {
    let mut names = Vec::with_capacity(raw_section.fields.len());
    for raw_field in raw_section.fields {
      let field = build_field(fields.len(), raw_field)?;
      if !seen.insert(field.name.clone()) {
        return Err(SchemaError::DuplicateName { field: field.name });
      }
      names.push(field.name.clone());
      fields.push(field);
    }
    sections.push(Section {
      title: raw_section.title,
      fields: names,
    });
  }

  if !sectioned {
    sections.clear();
  }

  Ok(FormDefinition::new(fields, sections, raw.submit))
}

fn build_field(index: usize, raw: RawField) -> Result<FieldDefinition, SchemaError> {
  let name = match raw.name {
    Some(name) if !name.trim().is_empty() => name,
    _ => return Err(SchemaError::MissingName { index }),
  };

  let type_name = raw
    .field_type
    .ok_or_else(|| SchemaError::MissingType {
      field: name.clone(),
    })?;
  let field_type: FieldType =
    type_name
      .parse()
      .map_err(|_| SchemaError::UnknownFieldType {
        field: name.clone(),
        type_name: type_name.clone(),
      })?;

  let options = match (raw.options, raw.values) {
    (Some(options), _) => options
      .iter()
      .map(|o| build_option(&name, o))
      .collect::<Result<Vec<_>, _>>()?,
    (None, Some(values)) => split_options(&values, raw.labels.as_deref()),
    (None, None) => Vec::new(),
  };

  let mut rules = legacy_rules(
    &name,
    field_type,
    raw.filter.as_deref(),
    raw.error.as_deref(),
    raw.min.as_ref(),
    raw.max.as_ref(),
    raw.maxlength.as_ref(),
  )?;
  for raw_rule in raw.rules {
    rules.push(build_rule(&name, raw_rule)?);
  }

  let mut field = FieldDefinition {
    name,
    field_type,
    required: raw.required.is_some_and(|f| f.is_set()),
    label: raw.label,
    placeholder: raw.placeholder,
    default_value: raw.value,
    options,
    rules,
  };

  let field_type = field.field_type;
  match field_type {
    FieldType::Date => field.push_implicit(RuleKind::Date {
      min: None,
      max: None,
    }),
    FieldType::Time => field.push_implicit(RuleKind::Time {
      min: None,
      max: None,
    }),
    t if t.is_choice() && !field.options.is_empty() => {
      let values = field.options.iter().map(|o| o.value.clone()).collect();
      field.push_implicit(RuleKind::OneOf { values });
    }
    _ => {}
  }

  Ok(field)
}

fn build_option(field: &str, raw: &Value) -> Result<ChoiceOption, SchemaError> {
  match raw {
    Value::Object(map) => {
      let value = map
        .get("value")
        .and_then(scalar_text)
        .ok_or_else(|| SchemaError::invalid_rule(field, "option object has no 'value'"))?;
      let label = map
        .get("label")
        .and_then(scalar_text)
        .unwrap_or_else(|| value.clone());
      Ok(ChoiceOption { value, label })
    }
    other => {
      let value = scalar_text(other)
        .ok_or_else(|| SchemaError::invalid_rule(field, "options must be scalars or objects"))?;
      Ok(ChoiceOption {
        label: value.clone(),
        value,
      })
    }
  }
}

fn split_options(values: &str, labels: Option<&str>) -> Vec<ChoiceOption> {
  let labels: Vec<&str> = labels.map(|l| l.split('|').collect()).unwrap_or_default();
  values
    .split('|')
    .enumerate()
    .map(|(i, value)| ChoiceOption {
      value: value.to_string(),
      label: labels.get(i).unwrap_or(&value).to_string(),
    })
    .collect()
}

/// Fold the attribute-style validation keys into rules.
///
/// All of them share the field's `error` message, matching how the old
/// renderer showed a single message per field.
fn legacy_rules(
  field: &str,
  field_type: FieldType,
  filter: Option<&str>,
  error: Option<&str>,
  min: Option<&Value>,
  max: Option<&Value>,
  maxlength: Option<&Value>,
) -> Result<Vec<Rule>, SchemaError> {
  let mut rules = Vec::new();
  let with_message = |kind: RuleKind| match error {
    Some(message) if !message.is_empty() => Rule::new(kind).with_message(message),
    _ => Rule::new(kind),
  };

  if let Some(filter) = filter.filter(|f| !f.is_empty()) {
    rules.push(with_message(RuleKind::Pattern {
      pattern: compile(field, filter)?,
    }));
  }

  if min.is_some() || max.is_some() {
    let kind = match field_type {
      t if t.is_numeric() => {
        let min = min.map(|v| number(field, "min", v)).transpose()?;
        let max = max.map(|v| number(field, "max", v)).transpose()?;
        check_order(field, min, max)?;
        Some(RuleKind::Range { min, max })
      }
      FieldType::Date => {
        let min = min.map(|v| date(field, "min", v)).transpose()?;
        let max = max.map(|v| date(field, "max", v)).transpose()?;
        check_order(field, min, max)?;
        Some(RuleKind::Date { min, max })
      }
      FieldType::Time => {
        let min = min.map(|v| time(field, "min", v)).transpose()?;
        let max = max.map(|v| time(field, "max", v)).transpose()?;
        check_order(field, min, max)?;
        Some(RuleKind::Time { min, max })
      }
      _ => None,
    };
    rules.extend(kind.map(with_message));
  }

  if let Some(maxlength) = maxlength {
    let max = count(field, "maxlength", maxlength)?;
    rules.push(with_message(RuleKind::Length { min: 0, max }));
  }

  Ok(rules)
}

fn build_rule(field: &str, raw: RawRule) -> Result<Rule, SchemaError> {
  let kind = match raw.kind.as_str() {
    "range" => {
      let min = number(field, "min", required(field, "range", "min", &raw.min)?)?;
      let max = number(field, "max", required(field, "range", "max", &raw.max)?)?;
      check_order(field, Some(min), Some(max))?;
      RuleKind::Range {
        min: Some(min),
        max: Some(max),
      }
    }
    "length" => {
      let min = count(field, "min", required(field, "length", "min", &raw.min)?)?;
      let max = count(field, "max", required(field, "length", "max", &raw.max)?)?;
      check_order(field, Some(min), Some(max))?;
      RuleKind::Length { min, max }
    }
    "max_length" => {
      let max = count(field, "max", required(field, "max_length", "max", &raw.max)?)?;
      RuleKind::Length { min: 0, max }
    }
    "pattern" => {
      let source = raw
        .pattern
        .as_deref()
        .ok_or_else(|| SchemaError::invalid_rule(field, "pattern rule requires 'pattern'"))?;
      RuleKind::Pattern {
        pattern: compile(field, source)?,
      }
    }
    "email" => RuleKind::Email,
    "date" => {
      let min = raw.min.as_ref().map(|v| date(field, "min", v)).transpose()?;
      let max = raw.max.as_ref().map(|v| date(field, "max", v)).transpose()?;
      check_order(field, min, max)?;
      RuleKind::Date { min, max }
    }
    "time" => {
      let min = raw.min.as_ref().map(|v| time(field, "min", v)).transpose()?;
      let max = raw.max.as_ref().map(|v| time(field, "max", v)).transpose()?;
      check_order(field, min, max)?;
      RuleKind::Time { min, max }
    }
    "one_of" => {
      let values: Vec<String> = raw
        .values
        .unwrap_or_default()
        .iter()
        .filter_map(scalar_text)
        .collect();
      if values.is_empty() {
        return Err(SchemaError::invalid_rule(
          field,
          "one_of rule requires a non-empty 'values' list",
        ));
      }
      RuleKind::OneOf { values }
    }
    other => {
      return Err(SchemaError::invalid_rule(
        field,
        format!("unknown rule kind '{}'", other),
      ));
    }
  };

  let mut rule = Rule::new(kind);
  if let Some(message) = raw.message {
    rule.message = message;
  }
  rule.apply_when_empty = raw.apply_when_empty;
  Ok(rule)
}

fn required<'a>(
  field: &str,
  kind: &str,
  key: &str,
  value: &'a Option<Value>,
) -> Result<&'a Value, SchemaError> {
  value.as_ref().ok_or_else(|| {
    SchemaError::invalid_rule(field, format!("{} rule requires '{}'", kind, key))
  })
}

fn check_order<T: PartialOrd>(
  field: &str,
  min: Option<T>,
  max: Option<T>,
) -> Result<(), SchemaError> {
  match (min, max) {
    (Some(min), Some(max)) if min > max => Err(SchemaError::invalid_rule(
      field,
      "min must not be greater than max",
    )),
    _ => Ok(()),
  }
}

fn compile(field: &str, source: &str) -> Result<Pattern, SchemaError> {
  Pattern::new(source)
    .map_err(|e| SchemaError::invalid_rule(field, format!("invalid pattern: {}", e)))
}

fn number(field: &str, key: &str, value: &Value) -> Result<f64, SchemaError> {
  let parsed = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  parsed
    .filter(|n| n.is_finite())
    .ok_or_else(|| SchemaError::invalid_rule(field, format!("'{}' must be a number", key)))
}

fn count(field: &str, key: &str, value: &Value) -> Result<usize, SchemaError> {
  let parsed = match value {
    Value::Number(n) => n.as_u64(),
    Value::String(s) => s.trim().parse::<u64>().ok(),
    _ => None,
  };
  parsed
    .and_then(|n| usize::try_from(n).ok())
    .ok_or_else(|| {
      SchemaError::invalid_rule(field, format!("'{}' must be a non-negative integer", key))
    })
}

fn date(field: &str, key: &str, value: &Value) -> Result<NaiveDate, SchemaError> {
  value
    .as_str()
    .and_then(parse_date)
    .ok_or_else(|| SchemaError::invalid_rule(field, format!("'{}' must be a YYYY-MM-DD date", key)))
}

fn time(field: &str, key: &str, value: &Value) -> Result<NaiveTime, SchemaError> {
  value
    .as_str()
    .and_then(parse_time)
    .ok_or_else(|| SchemaError::invalid_rule(field, format!("'{}' must be a HH:MM time", key)))
}

/// Parse a `YYYY-MM-DD` calendar date, ignoring surrounding whitespace.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Parse a time of day in any of the accepted formats.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
  TIME_FORMATS
    .iter()
    .find_map(|format| NaiveTime::parse_from_str(text.trim(), format).ok())
}

fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}
