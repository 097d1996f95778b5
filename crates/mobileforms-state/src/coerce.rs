use mobileforms_schema::{FieldDefinition, FieldType};
use serde_json::Value;

/// Coerce a value reported by the renderer to the field's JSON type.
///
/// Renderers report edits as text. Numeric fields become numbers when the text
/// parses, checkboxes become booleans. Anything that does not parse is kept
/// as-is so validation can report it.
pub fn coerce_change(field: &FieldDefinition, value: Value) -> Value {
  let Value::String(text) = value else {
    return value;
  };

  if field.field_type.is_numeric() {
    return number(&text).unwrap_or(Value::String(text));
  }

  if field.field_type == FieldType::Checkbox {
    return match text.trim().to_lowercase().as_str() {
      "true" | "1" | "on" | "yes" => Value::Bool(true),
      "false" | "0" | "off" | "no" | "" => Value::Bool(false),
      _ => Value::String(text),
    };
  }

  Value::String(text)
}

fn number(text: &str) -> Option<Value> {
  let trimmed = text.trim();
  if let Ok(n) = trimmed.parse::<i64>() {
    return Some(Value::Number(n.into()));
  }
  trimmed
    .parse::<f64>()
    .ok()
    .and_then(serde_json::Number::from_f64)
    .map(Value::Number)
}

#[cfg(test)]
mod tests {
  use super::*;
  use mobileforms_schema::parse;
  use serde_json::json;

  fn field(field_type: &str) -> FieldDefinition {
    let schema = format!(r#"{{"fields": [{{"name": "f", "type": "{field_type}"}}]}}"#);
    parse(&schema).unwrap().fields()[0].clone()
  }

  #[test]
  fn test_numeric_text_becomes_number() {
    assert_eq!(coerce_change(&field("number"), json!("30")), json!(30));
    assert_eq!(coerce_change(&field("range"), json!(" 2.5 ")), json!(2.5));
  }

  #[test]
  fn test_unparseable_text_is_kept() {
    assert_eq!(coerce_change(&field("number"), json!("abc")), json!("abc"));
    assert_eq!(coerce_change(&field("number"), json!("")), json!(""));
    assert_eq!(coerce_change(&field("number"), json!("NaN")), json!("NaN"));
  }

  #[test]
  fn test_checkbox_text_becomes_bool() {
    assert_eq!(coerce_change(&field("checkbox"), json!("on")), json!(true));
    assert_eq!(coerce_change(&field("checkbox"), json!("false")), json!(false));
    assert_eq!(coerce_change(&field("checkbox"), json!(true)), json!(true));
  }

  #[test]
  fn test_text_fields_untouched() {
    assert_eq!(coerce_change(&field("tel"), json!("0123")), json!("0123"));
    assert_eq!(coerce_change(&field("text"), json!(5)), json!(5));
  }
}
