//! Classification of renderer events and delivery to the host.

use mobileforms_bridge::RawEvent;
use mobileforms_schema::FieldValues;
use mobileforms_state::FormState;
use mobileforms_validation::{evaluate, evaluate_field};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ValidationPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
  /// A submit that passed validation.
  Submit,
  /// A submit that failed validation. No submit result is sent.
  SubmitInvalid,
  FocusIn,
  FocusOut,
  Change,
  ValidateError,
  Link,
  /// Anything the renderer reports that has no variant of its own.
  Other,
}

impl EventType {
  /// Map a renderer event name. `submit` maps to [`EventType::Submit`]; the
  /// dispatcher decides whether it stays one.
  pub fn from_renderer(name: &str) -> Self {
    match name {
      "submit" => EventType::Submit,
      "focus" | "focusin" => EventType::FocusIn,
      "focusout" | "blur" => EventType::FocusOut,
      "change" => EventType::Change,
      "validateerror" => EventType::ValidateError,
      "link" => EventType::Link,
      _ => EventType::Other,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      EventType::Submit => "submit",
      EventType::SubmitInvalid => "submit_invalid",
      EventType::FocusIn => "focus_in",
      EventType::FocusOut => "focus_out",
      EventType::Change => "change",
      EventType::ValidateError => "validate_error",
      EventType::Link => "link",
      EventType::Other => "other",
    }
  }
}

/// A classified interaction, as the host sees it.
///
/// `element` is the originating field, empty for form-level events (submits,
/// links). `value` depends on the type:
///
/// | type | value |
/// |---|---|
/// | `Submit` | submitted values |
/// | `SubmitInvalid` | the validation result |
/// | `Change` | the value as stored |
/// | `ValidateError` | the failure message |
/// | others | whatever the renderer reported |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub event_type: EventType,
  pub element: String,
  pub value: Value,
}

impl Event {
  pub fn new(event_type: EventType, element: impl Into<String>, value: Value) -> Self {
    Self {
      event_type,
      element: element.into(),
      value,
    }
  }
}

/// Host callbacks. Both methods default to doing nothing.
pub trait FormDelegate: Send + Sync {
  /// A valid submit. `result` is the JSON object of submitted values.
  fn on_submit_result(&self, _result: &str) {}

  /// Every classified event. `state` already reflects the event.
  fn on_event(&self, _event: &Event, _state: &FormState) {}
}

#[derive(Debug, Clone, Default)]
pub struct NoopDelegate;

impl FormDelegate for NoopDelegate {}

/// What a [`ChannelDelegate`] forwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
  SubmitResult(String),
  /// An event with the values as they were when it was dispatched.
  Event { event: Event, values: FieldValues },
}

/// Forwards notifications to an unbounded channel for async consumers.
#[derive(Debug, Clone)]
pub struct ChannelDelegate {
  sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelDelegate {
  pub fn new(sender: mpsc::UnboundedSender<Notification>) -> Self {
    Self { sender }
  }
}

impl FormDelegate for ChannelDelegate {
  fn on_submit_result(&self, result: &str) {
    let _ = self.sender.send(Notification::SubmitResult(result.to_string()));
  }

  fn on_event(&self, event: &Event, state: &FormState) {
    let _ = self.sender.send(Notification::Event {
      event: event.clone(),
      values: state.values().clone(),
    });
  }
}

/// Turns accepted renderer events into state updates and host notifications.
pub struct EventDispatcher {
  delegate: Box<dyn FormDelegate>,
  policy: ValidationPolicy,
}

impl EventDispatcher {
  pub fn new(delegate: Box<dyn FormDelegate>, policy: ValidationPolicy) -> Self {
    Self { delegate, policy }
  }

  pub(crate) fn set_delegate(&mut self, delegate: Box<dyn FormDelegate>) {
    self.delegate = delegate;
  }

  /// Process one event and return the event delivered to the host, if any.
  ///
  /// A `change` is applied to `state` before the host hears about it. The
  /// read-only flag only guards host writes, so renderer changes still land.
  pub fn dispatch(&self, raw: RawEvent, state: &mut FormState) -> Option<Event> {
    let event_type = EventType::from_renderer(&raw.event_type);
    if event_type == EventType::Other {
      debug!(event_type = %raw.event_type, "unrecognized renderer event");
    }

    match event_type {
      EventType::Change => self.change(raw, state),
      EventType::Submit => Some(self.submit(state)),
      EventType::Link => {
        let value = match raw.value {
          Value::Null => Value::String(raw.element),
          value => value,
        };
        Some(self.notify(Event::new(EventType::Link, "", value), state))
      }
      event_type => Some(self.notify(Event::new(event_type, raw.element, raw.value), state)),
    }
  }

  fn change(&self, raw: RawEvent, state: &mut FormState) -> Option<Event> {
    let known = match state.apply_change(&raw.element, raw.value.clone()) {
      Ok(known) => known,
      Err(e) => {
        warn!(element = %raw.element, error = %e, "change not applied, dropping");
        return None;
      }
    };
    let value = state
      .values()
      .get(&raw.element)
      .filter(|_| known)
      .cloned()
      .unwrap_or(raw.value);

    let event = self.notify(Event::new(EventType::Change, raw.element, value), state);

    if known
      && self.policy == ValidationPolicy::OnChange
      && let Ok(definition) = state.definition()
      && let Some(field) = definition.field(&event.element)
      && let Some(message) = evaluate_field(field, state.values().get(&event.element))
    {
      self.notify(
        Event::new(EventType::ValidateError, event.element.clone(), Value::String(message)),
        state,
      );
    }

    Some(event)
  }

  fn submit(&self, state: &FormState) -> Event {
    let result = match state.definition() {
      Ok(definition) => evaluate(definition, state.values()),
      Err(_) => Default::default(),
    };

    if result.is_valid() {
      let values = state.values();
      info!(fields = values.len(), "form submitted");
      self.delegate.on_submit_result(&values.to_json());
      let values = serde_json::to_value(values).unwrap_or(Value::Null);
      self.notify(Event::new(EventType::Submit, "", values), state)
    } else {
      info!(
        require_errors = result.require_errors.len(),
        validation_errors = result.validation_errors.len(),
        "submit rejected"
      );
      let errors = serde_json::to_value(&result).unwrap_or(Value::Null);
      self.notify(Event::new(EventType::SubmitInvalid, "", errors), state)
    }
  }

  fn notify(&self, event: Event, state: &FormState) -> Event {
    debug!(
      event_type = event.event_type.as_str(),
      element = %event.element,
      "dispatching event"
    );
    self.delegate.on_event(&event, state);
    event
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mobileforms_schema::parse;
  use serde_json::json;
  use std::sync::Arc;

  fn loaded_state() -> FormState {
    let mut state = FormState::new();
    state.set_definition(Arc::new(
      parse(
        r#"{"fields": [{"name": "age", "type": "number", "required": true, "min": 0, "max": 120}]}"#,
      )
      .unwrap(),
    ));
    state.mark_loaded().unwrap();
    state
  }

  fn raw(event_type: &str, element: &str, value: Value) -> RawEvent {
    RawEvent {
      event_type: event_type.to_string(),
      element: element.to_string(),
      value,
    }
  }

  fn channel(policy: ValidationPolicy) -> (EventDispatcher, mpsc::UnboundedReceiver<Notification>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventDispatcher::new(Box::new(ChannelDelegate::new(tx)), policy), rx)
  }

  #[test]
  fn test_renderer_names() {
    assert_eq!(EventType::from_renderer("focus"), EventType::FocusIn);
    assert_eq!(EventType::from_renderer("focusout"), EventType::FocusOut);
    assert_eq!(EventType::from_renderer("validateerror"), EventType::ValidateError);
    assert_eq!(EventType::from_renderer("swipe"), EventType::Other);
  }

  #[test]
  fn test_change_updates_state_before_notify() {
    let (dispatcher, mut rx) = channel(ValidationPolicy::OnDemand);
    let mut state = loaded_state();

    let event = dispatcher
      .dispatch(raw("change", "age", json!("30")), &mut state)
      .unwrap();
    assert_eq!(event, Event::new(EventType::Change, "age", json!(30)));

    match rx.try_recv().unwrap() {
      Notification::Event { event, values } => {
        assert_eq!(event.event_type, EventType::Change);
        assert_eq!(values.get("age"), Some(&json!(30)));
      }
      other => panic!("unexpected notification: {other:?}"),
    }
  }

  #[test]
  fn test_change_for_unknown_field_still_dispatched() {
    let (dispatcher, mut rx) = channel(ValidationPolicy::OnChange);
    let mut state = loaded_state();

    let event = dispatcher
      .dispatch(raw("change", "nickname", json!("x")), &mut state)
      .unwrap();
    assert_eq!(event.value, json!("x"));
    assert!(!state.values().contains("nickname"));
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn test_read_only_still_applies_renderer_changes() {
    let (dispatcher, mut rx) = channel(ValidationPolicy::OnDemand);
    let mut state = loaded_state();
    state.set_read_only(true);

    let event = dispatcher.dispatch(raw("change", "age", json!("3")), &mut state).unwrap();
    assert_eq!(event.event_type, EventType::Change);
    assert_eq!(state.values().get("age"), Some(&json!(3)));
    assert!(rx.try_recv().is_ok());

    let focus = dispatcher.dispatch(raw("focus", "age", Value::Null), &mut state);
    assert_eq!(focus.unwrap().event_type, EventType::FocusIn);
  }

  #[test]
  fn test_on_change_policy_raises_validate_error() {
    let (dispatcher, mut rx) = channel(ValidationPolicy::OnChange);
    let mut state = loaded_state();

    dispatcher.dispatch(raw("change", "age", json!("-5")), &mut state);
    assert!(matches!(rx.try_recv().unwrap(), Notification::Event { .. }));
    match rx.try_recv().unwrap() {
      Notification::Event { event, .. } => {
        assert_eq!(
          event,
          Event::new(EventType::ValidateError, "age", json!("out of range"))
        );
      }
      other => panic!("unexpected notification: {other:?}"),
    }

    dispatcher.dispatch(raw("change", "age", json!("5")), &mut state);
    assert!(rx.try_recv().is_ok());
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn test_submit_invalid_sends_no_result() {
    let (dispatcher, mut rx) = channel(ValidationPolicy::OnDemand);
    let mut state = loaded_state();

    let event = dispatcher
      .dispatch(raw("submit", "form", json!("valid")), &mut state)
      .unwrap();
    assert_eq!(event.event_type, EventType::SubmitInvalid);
    assert_eq!(event.element, "");
    assert_eq!(event.value["requireErrors"], json!(["age"]));

    assert!(matches!(rx.try_recv().unwrap(), Notification::Event { .. }));
    assert!(rx.try_recv().is_err());
  }

  #[test]
  fn test_valid_submit_sends_result_then_event() {
    let (dispatcher, mut rx) = channel(ValidationPolicy::OnDemand);
    let mut state = loaded_state();
    dispatcher.dispatch(raw("change", "age", json!(30)), &mut state);
    rx.try_recv().unwrap();

    let event = dispatcher
      .dispatch(raw("submit", "", json!("invalid")), &mut state)
      .unwrap();
    assert_eq!(event, Event::new(EventType::Submit, "", json!({"age": 30})));

    assert_eq!(
      rx.try_recv().unwrap(),
      Notification::SubmitResult(r#"{"age":30}"#.to_string())
    );
    assert!(matches!(rx.try_recv().unwrap(), Notification::Event { .. }));
  }

  #[test]
  fn test_link_and_other() {
    let (dispatcher, _rx) = channel(ValidationPolicy::OnDemand);
    let mut state = loaded_state();

    let link = dispatcher
      .dispatch(raw("link", "terms", Value::Null), &mut state)
      .unwrap();
    assert_eq!(link, Event::new(EventType::Link, "", json!("terms")));

    let other = dispatcher
      .dispatch(raw("swipe", "age", json!("left")), &mut state)
      .unwrap();
    assert_eq!(other, Event::new(EventType::Other, "age", json!("left")));
  }
}
