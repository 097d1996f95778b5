use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::definition::FormDefinition;

/// Current values of a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(BTreeMap<String, serde_json::Value>);

impl FieldValues {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a JSON object of values. Anything other than an object fails.
  pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(text)
  }

  pub fn to_json(&self) -> String {
    // A map of strings to JSON values always serializes.
    serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
  }

  pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
    self.0.get(name)
  }

  pub fn insert(
    &mut self,
    name: impl Into<String>,
    value: serde_json::Value,
  ) -> Option<serde_json::Value> {
    self.0.insert(name.into(), value)
  }

  pub fn remove(&mut self, name: &str) -> Option<serde_json::Value> {
    self.0.remove(name)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.contains_key(name)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
    self.0.iter()
  }

  /// Keep only names that are value-carrying fields of `definition`.
  pub fn restrict_to(mut self, definition: &FormDefinition) -> Self {
    self.0.retain(|name, _| definition.accepts(name));
    self
  }

  /// Copy every entry of `other` over this mapping.
  pub fn merge(&mut self, other: FieldValues) {
    self.0.extend(other.0);
  }
}

impl FromIterator<(String, serde_json::Value)> for FieldValues {
  fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl IntoIterator for FieldValues {
  type Item = (String, serde_json::Value);
  type IntoIter = std::collections::btree_map::IntoIter<String, serde_json::Value>;

  fn into_iter(self) -> Self::IntoIter {
    self.0.into_iter()
  }
}
