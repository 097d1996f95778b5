//! Individual rule checks.

use std::sync::LazyLock;

use mobileforms_schema::{RuleKind, parse_date, parse_time};
use regex::Regex;
use serde_json::Value;

static EMAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

/// Whether `value` satisfies the rule.
pub(crate) fn check(kind: &RuleKind, value: &Value) -> bool {
  match kind {
    RuleKind::Range { min, max } => as_number(value)
      .is_some_and(|n| min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max)),
    RuleKind::Length { min, max } => {
      let len = length(value);
      len >= *min && len <= *max
    }
    RuleKind::Pattern { pattern } => texts(value).iter().all(|t| pattern.is_match(t)),
    RuleKind::Email => texts(value).iter().all(|t| EMAIL.is_match(t)),
    RuleKind::Date { min, max } => as_text(value)
      .and_then(|t| parse_date(&t))
      .is_some_and(|d| within(d, *min, *max)),
    RuleKind::Time { min, max } => as_text(value)
      .and_then(|t| parse_time(&t))
      .is_some_and(|t| within(t, *min, *max)),
    RuleKind::OneOf { values } => {
      let texts = texts(value);
      !texts.is_empty() && texts.iter().all(|t| values.contains(t))
    }
  }
}

fn within<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
  min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

/// Numbers and numeric strings.
fn as_number(value: &Value) -> Option<f64> {
  match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
    _ => None,
  }
}

/// Scalar rendered as text; `null` is the empty string.
fn as_text(value: &Value) -> Option<String> {
  match value {
    Value::Null => Some(String::new()),
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Array(_) | Value::Object(_) => None,
  }
}

/// Every text a value holds: one for scalars, one per element for arrays
/// (multi-select answers).
fn texts(value: &Value) -> Vec<String> {
  match value {
    Value::Array(items) => items.iter().filter_map(as_text).collect(),
    other => as_text(other).into_iter().collect(),
  }
}

fn length(value: &Value) -> usize {
  match value {
    Value::Array(items) => items.len(),
    Value::Object(map) => map.len(),
    other => as_text(other).map(|t| t.chars().count()).unwrap_or(0),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{NaiveDate, NaiveTime};
  use mobileforms_schema::Pattern;
  use serde_json::json;

  fn range(min: f64, max: f64) -> RuleKind {
    RuleKind::Range {
      min: Some(min),
      max: Some(max),
    }
  }

  #[test]
  fn test_range_accepts_numbers_and_numeric_strings() {
    assert!(check(&range(0.0, 120.0), &json!(30)));
    assert!(check(&range(0.0, 120.0), &json!(" 120 ")));
    assert!(!check(&range(0.0, 120.0), &json!(-5)));
    assert!(!check(&range(0.0, 120.0), &json!("thirty")));
    assert!(!check(&range(0.0, 120.0), &json!(true)));
  }

  #[test]
  fn test_open_range() {
    let at_least_one = RuleKind::Range {
      min: Some(1.0),
      max: None,
    };
    assert!(check(&at_least_one, &json!(1_000_000)));
    assert!(!check(&at_least_one, &json!(0.5)));
  }

  #[test]
  fn test_length_counts_characters() {
    let kind = RuleKind::Length { min: 2, max: 3 };
    assert!(check(&kind, &json!("ñuñ")));
    assert!(!check(&kind, &json!("a")));
    assert!(check(&kind, &json!(["a", "b"])));
    assert!(check(&kind, &json!(12)));
  }

  #[test]
  fn test_pattern_is_unanchored() {
    let kind = RuleKind::Pattern {
      pattern: Pattern::new("[0-9]").unwrap(),
    };
    assert!(check(&kind, &json!("abc1")));
    assert!(!check(&kind, &json!("abc")));
  }

  #[test]
  fn test_email() {
    assert!(check(&RuleKind::Email, &json!("ana@example.com")));
    assert!(!check(&RuleKind::Email, &json!("ana@example")));
    assert!(!check(&RuleKind::Email, &json!("ana example@x.com")));
  }

  #[test]
  fn test_date_bounds() {
    let kind = RuleKind::Date {
      min: NaiveDate::from_ymd_opt(2020, 1, 1),
      max: NaiveDate::from_ymd_opt(2020, 12, 31),
    };
    assert!(check(&kind, &json!("2020-06-15")));
    assert!(!check(&kind, &json!("2021-01-01")));
    assert!(!check(&kind, &json!("2020-02-30")));
    assert!(!check(&kind, &json!("15/06/2020")));
  }

  #[test]
  fn test_time_bounds() {
    let kind = RuleKind::Time {
      min: NaiveTime::from_hms_opt(8, 0, 0),
      max: NaiveTime::from_hms_opt(18, 0, 0),
    };
    assert!(check(&kind, &json!("08:00")));
    assert!(check(&kind, &json!("17:59:59")));
    assert!(!check(&kind, &json!("18:01")));
    assert!(!check(&kind, &json!("25:00")));
  }

  #[test]
  fn test_one_of() {
    let kind = RuleKind::OneOf {
      values: vec!["r".to_string(), "g".to_string(), "1".to_string()],
    };
    assert!(check(&kind, &json!("r")));
    assert!(check(&kind, &json!(1)));
    assert!(check(&kind, &json!(["r", "g"])));
    assert!(!check(&kind, &json!(["r", "x"])));
    assert!(!check(&kind, &json!([])));
  }
}
