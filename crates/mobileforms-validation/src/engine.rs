use mobileforms_schema::{FieldDefinition, FieldType, FieldValues, FormDefinition};
use serde_json::Value;

use crate::result::{FieldError, ValidationResult};
use crate::rules::check;

/// Evaluate every field of `definition` against `values`.
///
/// For each value-carrying field, in declaration order:
/// 1. a required field that is empty is listed in `require_errors`;
/// 2. independently, its rules run in declaration order and the first failure
///    is recorded in `validation_errors`. Empty values skip every rule that
///    does not opt in with `apply_when_empty`.
pub fn evaluate(definition: &FormDefinition, values: &FieldValues) -> ValidationResult {
  let mut result = ValidationResult::default();

  for field in definition.fields() {
    if !field.field_type.carries_value() {
      continue;
    }

    let value = values.get(&field.name);
    if field.required && is_empty(field, value) {
      result.require_errors.push(field.name.clone());
    }

    if let Some(message) = evaluate_field(field, value) {
      result.validation_errors.push(FieldError {
        name: field.name.clone(),
        message,
      });
    }
  }

  result
}

/// Run one field's rules and return the message of the first one that fails.
pub fn evaluate_field(field: &FieldDefinition, value: Option<&Value>) -> Option<String> {
  let empty = is_empty(field, value);
  let value = value.unwrap_or(&Value::Null);

  field
    .rules
    .iter()
    .filter(|rule| !empty || rule.apply_when_empty)
    .find(|rule| !check(&rule.kind, value))
    .map(|rule| rule.message.clone())
}

/// `evaluate(definition, values).is_valid()`.
pub fn is_valid(definition: &FormDefinition, values: &FieldValues) -> bool {
  evaluate(definition, values).is_valid()
}

/// Whether a value counts as "not filled in" for `field`.
///
/// Absent, `null`, `""` and empty arrays/objects are empty for every field; an
/// unchecked checkbox (`false`) is empty too.
pub fn is_empty(field: &FieldDefinition, value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(Value::Array(items)) => items.is_empty(),
    Some(Value::Object(map)) => map.is_empty(),
    Some(Value::Bool(checked)) => field.field_type == FieldType::Checkbox && !checked,
    Some(Value::Number(_)) => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mobileforms_schema::parse;
  use serde_json::json;

  fn age_form() -> FormDefinition {
    parse(
      r#"{"fields": [{"name": "age", "type": "number", "required": true,
        "rules": [{"kind": "range", "min": 0, "max": 120}]}]}"#,
    )
    .unwrap()
  }

  fn values(value: serde_json::Value) -> FieldValues {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn test_required_missing() {
    let result = evaluate(&age_form(), &FieldValues::new());
    assert_eq!(result.require_errors, vec!["age".to_string()]);
    assert!(result.validation_errors.is_empty());
    assert!(!result.is_valid());
  }

  #[test]
  fn test_rule_failure() {
    let result = evaluate(&age_form(), &values(json!({"age": -5})));
    assert!(result.require_errors.is_empty());
    assert_eq!(
      result.validation_errors,
      vec![FieldError {
        name: "age".to_string(),
        message: "out of range".to_string()
      }]
    );
  }

  #[test]
  fn test_valid_value() {
    let form = age_form();
    let result = evaluate(&form, &values(json!({"age": 30})));
    assert!(result.is_valid());
    assert!(is_valid(&form, &values(json!({"age": "30"}))));
  }

  #[test]
  fn test_first_failing_rule_wins() {
    let form = parse(
      r#"{"fields": [{"name": "code", "type": "text", "rules": [
        {"kind": "length", "min": 3, "max": 3, "message": "three characters"},
        {"kind": "pattern", "pattern": "^[0-9]+$", "message": "digits only"}
      ]}]}"#,
    )
    .unwrap();

    let result = evaluate(&form, &values(json!({"code": "abcd"})));
    assert_eq!(result.validation_errors.len(), 1);
    assert_eq!(result.validation_errors[0].message, "three characters");

    let result = evaluate(&form, &values(json!({"code": "abc"})));
    assert_eq!(result.validation_errors[0].message, "digits only");
  }

  #[test]
  fn test_field_in_both_lists() {
    let form = parse(
      r#"{"fields": [{"name": "agree", "type": "text", "required": true,
        "rules": [{"kind": "pattern", "pattern": "^yes$", "applyWhenEmpty": true}]}]}"#,
    )
    .unwrap();

    let result = evaluate(&form, &FieldValues::new());
    assert_eq!(result.require_errors, vec!["agree".to_string()]);
    assert_eq!(result.validation_errors[0].name, "agree");
  }

  #[test]
  fn test_empty_optional_field_skips_rules() {
    let form = parse(
      r#"{"fields": [{"name": "zip", "type": "text", "filter": "^[0-9]{5}$"}]}"#,
    )
    .unwrap();
    assert!(evaluate(&form, &values(json!({"zip": ""}))).is_valid());
    assert!(evaluate(&form, &FieldValues::new()).is_valid());
    assert!(!evaluate(&form, &values(json!({"zip": "12"}))).is_valid());
  }

  #[test]
  fn test_checkbox_false_is_empty() {
    let form = parse(r#"{"fields": [{"name": "terms", "type": "checkbox", "required": true}]}"#)
      .unwrap();
    assert_eq!(
      evaluate(&form, &values(json!({"terms": false}))).require_errors,
      vec!["terms".to_string()]
    );
    assert!(evaluate(&form, &values(json!({"terms": true}))).is_valid());
  }

  #[test]
  fn test_links_and_unknown_names_ignored() {
    let form = parse(
      r#"{"fields": [
        {"name": "help", "type": "link", "required": true},
        {"name": "name", "type": "text"}
      ]}"#,
    )
    .unwrap();
    assert!(evaluate(&form, &values(json!({"other": 1}))).is_valid());
  }

  #[test]
  fn test_declaration_order_of_errors() {
    let form = parse(
      r#"{"fields": [
        {"name": "b", "type": "text", "required": true},
        {"name": "a", "type": "text", "required": true}
      ]}"#,
    )
    .unwrap();
    let result = evaluate(&form, &FieldValues::new());
    assert_eq!(result.require_errors, vec!["b".to_string(), "a".to_string()]);
  }
}
