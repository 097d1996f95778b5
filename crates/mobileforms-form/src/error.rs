use std::path::PathBuf;

use mobileforms_schema::SchemaError;
use mobileforms_state::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
  #[error(transparent)]
  Schema(#[from] SchemaError),

  #[error(transparent)]
  State(#[from] StateError),

  #[error("cannot bind to host view: {reason}")]
  Bind { reason: String },

  #[error("invalid values payload: {0}")]
  Payload(#[from] serde_json::Error),

  #[error("failed to read resource {}: {source}", path.display())]
  Resource {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid resource name '{name}'")]
  ResourceName { name: String },
}

impl FormError {
  pub(crate) fn bind(reason: impl Into<String>) -> Self {
    Self::Bind {
      reason: reason.into(),
    }
  }

  /// The call needs a schema or a load that has not happened yet.
  pub fn is_not_loaded(&self) -> bool {
    matches!(
      self,
      Self::State(StateError::NoDefinition | StateError::NotLoaded { .. })
    )
  }
}
