use std::sync::Arc;

use mobileforms_schema::{FieldValues, FormDefinition};
use serde_json::Value;
use tracing::debug;

use crate::coerce::coerce_change;
use crate::error::StateError;

/// How [`FormState::set_values`] combines a payload with the current values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
  /// Pre-load population: payload entries are copied over the current values.
  Merge,
  /// Post-load population: the payload replaces every value, and fields it
  /// omits fall back to their schema default.
  Overwrite,
}

#[derive(Debug, Default)]
pub struct FormState {
  definition: Option<Arc<FormDefinition>>,
  values: FieldValues,
  read_only: bool,
  loaded: bool,
  dirty: bool,
}

impl FormState {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the active definition.
  ///
  /// Values for fields that still exist are kept, removed fields are dropped,
  /// new fields start at their default. The form goes back to not loaded.
  pub fn set_definition(&mut self, definition: Arc<FormDefinition>) {
    let retained = std::mem::take(&mut self.values).restrict_to(&definition);
    let mut values = definition.defaults();
    values.merge(retained);

    debug!(
      fields = definition.fields().len(),
      retained = values.len(),
      "definition_set"
    );

    self.values = values;
    self.definition = Some(definition);
    self.loaded = false;
    self.dirty = false;
  }

  pub fn definition(&self) -> Result<&Arc<FormDefinition>, StateError> {
    self.definition.as_ref().ok_or(StateError::NoDefinition)
  }

  /// Write a payload of values. Unknown names are ignored.
  pub fn set_values(&mut self, values: FieldValues, mode: WriteMode) -> Result<(), StateError> {
    let definition = self.definition.as_ref().ok_or(StateError::NoDefinition)?;
    let values = values.restrict_to(definition);

    match mode {
      WriteMode::Merge => {
        if self.loaded {
          return Err(StateError::AlreadyLoaded {
            operation: "pre_populate",
          });
        }
        self.values.merge(values);
      }
      WriteMode::Overwrite => {
        if !self.loaded {
          return Err(StateError::NotLoaded {
            operation: "populate",
          });
        }
        let mut next = definition.defaults();
        next.merge(values);
        self.values = next;
      }
    }

    Ok(())
  }

  /// Apply one edit reported by the renderer.
  ///
  /// Returns `false` when `name` is not a value-carrying field of the active
  /// definition; the state is left untouched in that case.
  pub fn apply_change(&mut self, name: &str, value: Value) -> Result<bool, StateError> {
    let definition = self.definition.as_ref().ok_or(StateError::NoDefinition)?;
    if !self.loaded {
      return Err(StateError::NotLoaded {
        operation: "apply_change",
      });
    }

    let Some(field) = definition
      .field(name)
      .filter(|f| f.field_type.carries_value())
    else {
      debug!(field = %name, "change_for_unknown_field");
      return Ok(false);
    };

    let value = coerce_change(field, value);
    self.values.insert(name, value);
    self.dirty = true;
    Ok(true)
  }

  /// Idempotent; never touches values.
  pub fn set_read_only(&mut self, read_only: bool) {
    self.read_only = read_only;
  }

  pub fn mark_loaded(&mut self) -> Result<(), StateError> {
    if self.definition.is_none() {
      return Err(StateError::NoDefinition);
    }
    self.loaded = true;
    Ok(())
  }

  pub fn values(&self) -> &FieldValues {
    &self.values
  }

  pub fn is_read_only(&self) -> bool {
    self.read_only
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  /// Whether the renderer has reported an edit since the definition was set.
  pub fn is_dirty(&self) -> bool {
    self.dirty
  }
}
