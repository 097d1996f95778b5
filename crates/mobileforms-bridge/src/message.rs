use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::command::Generation;
use crate::error::MessageError;

const SCHEME: &str = "mobileforms";

/// A decoded message from the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RendererMessage {
  pub generation: Generation,
  pub body: MessageBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
  /// The renderer finished painting the bootstrap of `generation`.
  Ready,
  Event(RawEvent),
}

/// A user interaction as the renderer reports it, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
  pub event_type: String,
  pub element: String,
  pub value: Value,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireMessage {
  Ready {
    generation: Generation,
  },
  Event {
    generation: Generation,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    element: String,
    #[serde(default)]
    value: Value,
  },
}

impl RendererMessage {
  pub fn ready(generation: Generation) -> Self {
    Self {
      generation,
      body: MessageBody::Ready,
    }
  }

  pub fn event(
    generation: Generation,
    event_type: impl Into<String>,
    element: impl Into<String>,
    value: Value,
  ) -> Self {
    Self {
      generation,
      body: MessageBody::Event(RawEvent {
        event_type: event_type.into(),
        element: element.into(),
        value,
      }),
    }
  }

  /// Decode either wire format.
  ///
  /// JSON objects:
  ///
  /// ```json
  /// {"kind": "event", "generation": 1, "type": "change", "element": "age", "value": 30}
  /// {"kind": "ready", "generation": 1}
  /// ```
  ///
  /// or navigation URLs, with percent-encoded query parameters:
  ///
  /// ```text
  /// mobileforms://event/?gen=1&type=change&element=age&value=30
  /// mobileforms://ready/?gen=1
  /// ```
  ///
  /// URL values always arrive as strings.
  pub fn parse(text: &str) -> Result<Self, MessageError> {
    let text = text.trim();
    if text.starts_with('{') {
      Self::from_json(text)
    } else {
      Self::from_url(text)
    }
  }

  fn from_json(text: &str) -> Result<Self, MessageError> {
    let message = match serde_json::from_str::<WireMessage>(text)? {
      WireMessage::Ready { generation } => Self::ready(generation),
      WireMessage::Event {
        generation,
        event_type,
        element,
        value,
      } => Self::event(generation, event_type, element, value),
    };
    Ok(message)
  }

  fn from_url(text: &str) -> Result<Self, MessageError> {
    let url = Url::parse(text)?;
    if url.scheme() != SCHEME {
      return Err(MessageError::UnsupportedScheme {
        scheme: url.scheme().to_string(),
      });
    }

    // Plain percent-decoding: a literal `+` is data, not a space.
    let query = url.query().unwrap_or_default();
    let param = |name: &str| {
      query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode(key) == name)
        .map(|(_, value)| decode(value))
    };

    let generation = param("gen").ok_or(MessageError::MissingParameter { name: "gen" })?;
    let generation = generation
      .parse::<u64>()
      .map(Generation::new)
      .map_err(|_| MessageError::InvalidGeneration { value: generation })?;

    match url.host_str().unwrap_or_default() {
      "ready" => Ok(Self::ready(generation)),
      "event" => {
        let event_type = param("type").ok_or(MessageError::MissingParameter { name: "type" })?;
        let element = param("element").unwrap_or_default();
        let value = param("value").map(Value::String).unwrap_or(Value::Null);
        Ok(Self::event(generation, event_type, element, value))
      }
      other => Err(MessageError::UnknownKind {
        kind: other.to_string(),
      }),
    }
  }
}

fn decode(text: &str) -> String {
  percent_decode_str(text).decode_utf8_lossy().into_owned()
}
