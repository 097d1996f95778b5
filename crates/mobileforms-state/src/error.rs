use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
  #[error("no form definition has been set")]
  NoDefinition,

  #[error("{operation} requires the form to be loaded")]
  NotLoaded { operation: &'static str },

  #[error("{operation} is only allowed before the form is loaded")]
  AlreadyLoaded { operation: &'static str },
}
