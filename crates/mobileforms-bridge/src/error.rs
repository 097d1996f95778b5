use thiserror::Error;

/// Errors decoding a renderer message.
#[derive(Debug, Error)]
pub enum MessageError {
  #[error("invalid message JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid message URL: {0}")]
  Url(#[from] url::ParseError),

  #[error("unsupported message scheme '{scheme}'")]
  UnsupportedScheme { scheme: String },

  #[error("unknown message kind '{kind}'")]
  UnknownKind { kind: String },

  #[error("message is missing parameter '{name}'")]
  MissingParameter { name: &'static str },

  #[error("invalid generation '{value}'")]
  InvalidGeneration { value: String },
}
