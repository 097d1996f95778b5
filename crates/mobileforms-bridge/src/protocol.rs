use std::collections::VecDeque;
use std::sync::Arc;

use mobileforms_schema::{FieldValues, FormDefinition};
use tracing::{debug, info, warn};

use crate::command::{Bootstrap, Command, Envelope, Generation};
use crate::message::{MessageBody, RawEvent, RendererMessage};
use crate::renderer::{Rect, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
  Unloaded,
  /// Bootstrap sent, waiting for the renderer's `Ready`.
  Loading,
  Loaded,
}

/// One form's channel to its renderer.
pub struct Bridge<R> {
  renderer: R,
  state: BridgeState,
  generation: Generation,
  queue: VecDeque<Command>,
}

impl<R: Renderer> Bridge<R> {
  pub fn new(renderer: R) -> Self {
    Self {
      renderer,
      state: BridgeState::Unloaded,
      generation: Generation::default(),
      queue: VecDeque::new(),
    }
  }

  pub fn state(&self) -> BridgeState {
    self.state
  }

  /// Generation of the latest load (0 before the first one).
  pub fn generation(&self) -> Generation {
    self.generation
  }

  /// Number of commands waiting for `Ready`.
  pub fn queued(&self) -> usize {
    self.queue.len()
  }

  pub fn renderer(&self) -> &R {
    &self.renderer
  }

  /// Go back to `Unloaded` because a new definition replaced the current one.
  ///
  /// Commands queued for a load that was already issued belonged to that
  /// generation and are discarded. Commands issued before any load stay queued.
  pub fn reset(&mut self) {
    if self.state != BridgeState::Unloaded && !self.queue.is_empty() {
      debug!(
        generation = %self.generation,
        discarded = self.queue.len(),
        "discarding queued commands"
      );
      self.queue.clear();
    }
    self.state = BridgeState::Unloaded;
  }

  /// Start a new generation and bootstrap the renderer with it.
  pub fn load(
    &mut self,
    definition: Arc<FormDefinition>,
    values: FieldValues,
    read_only: bool,
  ) -> Generation {
    self.generation = self.generation.next();
    self.state = BridgeState::Loading;

    info!(
      generation = %self.generation,
      fields = definition.fields().len(),
      queued = self.queue.len(),
      "bootstrapping renderer"
    );

    self.renderer.bootstrap(&Bootstrap {
      generation: self.generation,
      definition,
      values,
      read_only,
    });
    self.generation
  }

  /// Deliver a command now when loaded, otherwise queue it for `Ready`.
  pub fn send(&mut self, command: Command) {
    if self.state == BridgeState::Loaded {
      self.deliver(command);
      return;
    }

    if let Command::AddStyle {
      override_all: true, ..
    } = command
    {
      self.queue.retain(|queued| !queued.is_style());
    }
    debug!(command = command.name(), state = ?self.state, "queueing command");
    self.queue.push_back(command);
  }

  /// Run the protocol checks on an inbound message.
  ///
  /// Returns the event when it should be processed. `Ready` completes the load
  /// and flushes the queue; everything unexpected is dropped with a warning.
  pub fn accept(&mut self, message: RendererMessage) -> Option<RawEvent> {
    if self.state == BridgeState::Unloaded {
      warn!(generation = %message.generation, "renderer message before load, dropping");
      return None;
    }

    if message.generation != self.generation {
      warn!(
        generation = %message.generation,
        current = %self.generation,
        "stale renderer message, dropping"
      );
      return None;
    }

    match message.body {
      MessageBody::Ready if self.state == BridgeState::Loading => {
        self.state = BridgeState::Loaded;
        info!(
          generation = %self.generation,
          flushed = self.queue.len(),
          "renderer ready"
        );
        while let Some(command) = self.queue.pop_front() {
          self.deliver(command);
        }
        None
      }
      MessageBody::Ready => {
        warn!(generation = %self.generation, "duplicate ready, dropping");
        None
      }
      MessageBody::Event(event) if self.state == BridgeState::Loading => {
        warn!(
          generation = %self.generation,
          event_type = %event.event_type,
          "event before ready, dropping"
        );
        None
      }
      MessageBody::Event(event) => Some(event),
    }
  }

  /// Layout hint, passed straight through.
  pub fn set_frame(&self, frame: Rect) {
    self.renderer.set_frame(frame);
  }

  fn deliver(&self, command: Command) {
    self.renderer.deliver(&Envelope {
      generation: self.generation,
      command,
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mobileforms_schema::parse;
  use serde_json::json;
  use std::sync::Mutex;

  #[derive(Debug, PartialEq)]
  enum Sent {
    Bootstrap(Generation),
    Command(Generation, &'static str),
  }

  #[derive(Default)]
  struct Recorder(Mutex<Vec<Sent>>);

  impl Renderer for Recorder {
    fn bootstrap(&self, bootstrap: &Bootstrap) {
      self.0.lock().unwrap().push(Sent::Bootstrap(bootstrap.generation));
    }

    fn deliver(&self, envelope: &Envelope) {
      self
        .0
        .lock()
        .unwrap()
        .push(Sent::Command(envelope.generation, envelope.command.name()));
    }
  }

  fn definition() -> Arc<FormDefinition> {
    Arc::new(parse(r#"{"fields": [{"name": "age", "type": "number"}]}"#).unwrap())
  }

  fn style(css: &str, override_all: bool) -> Command {
    Command::AddStyle {
      css: css.to_string(),
      override_all,
    }
  }

  fn sent(bridge: &Bridge<Recorder>) -> Vec<Sent> {
    std::mem::take(&mut *bridge.renderer().0.lock().unwrap())
  }

  fn g(n: u64) -> Generation {
    Generation::new(n)
  }

  #[test]
  fn test_commands_queue_until_ready() {
    let mut bridge = Bridge::new(Recorder::default());
    bridge.send(style("a", false));
    assert_eq!(bridge.load(definition(), FieldValues::new(), false), g(1));
    bridge.send(Command::AddScript {
      source: "x".to_string(),
    });
    assert_eq!(bridge.queued(), 2);
    assert_eq!(sent(&bridge), vec![Sent::Bootstrap(g(1))]);

    assert_eq!(bridge.accept(RendererMessage::ready(g(1))), None);
    assert_eq!(bridge.state(), BridgeState::Loaded);
    assert_eq!(
      sent(&bridge),
      vec![
        Sent::Command(g(1), "add_style"),
        Sent::Command(g(1), "add_script")
      ]
    );

    bridge.send(Command::SetReadOnly { read_only: true });
    assert_eq!(sent(&bridge), vec![Sent::Command(g(1), "set_read_only")]);
  }

  #[test]
  fn test_override_style_purges_queued_styles() {
    let mut bridge = Bridge::new(Recorder::default());
    bridge.send(style("a", false));
    bridge.send(Command::AddScript {
      source: "x".to_string(),
    });
    bridge.send(style("b", true));
    assert_eq!(bridge.queued(), 2);
  }

  #[test]
  fn test_events_only_after_ready() {
    let mut bridge = Bridge::new(Recorder::default());
    let change = RendererMessage::event(g(1), "change", "age", json!("3"));
    assert_eq!(bridge.accept(change.clone()), None);

    bridge.load(definition(), FieldValues::new(), false);
    assert_eq!(bridge.accept(change.clone()), None);

    bridge.accept(RendererMessage::ready(g(1)));
    let event = bridge.accept(change).unwrap();
    assert_eq!(event.element, "age");

    assert_eq!(bridge.accept(RendererMessage::ready(g(1))), None);
    assert_eq!(bridge.state(), BridgeState::Loaded);
  }

  #[test]
  fn test_stale_generation_dropped() {
    let mut bridge = Bridge::new(Recorder::default());
    bridge.load(definition(), FieldValues::new(), false);
    bridge.accept(RendererMessage::ready(g(1)));

    bridge.reset();
    bridge.load(definition(), FieldValues::new(), false);
    assert_eq!(bridge.generation(), g(2));

    assert_eq!(bridge.accept(RendererMessage::ready(g(1))), None);
    assert_eq!(bridge.state(), BridgeState::Loading);
    bridge.accept(RendererMessage::ready(g(2)));
    assert_eq!(
      bridge.accept(RendererMessage::event(g(1), "change", "age", json!("9"))),
      None
    );
    assert!(
      bridge
        .accept(RendererMessage::event(g(2), "change", "age", json!("9")))
        .is_some()
    );
  }

  #[test]
  fn test_reset_discards_commands_of_issued_load() {
    let mut bridge = Bridge::new(Recorder::default());
    bridge.load(definition(), FieldValues::new(), false);
    bridge.send(style("a", false));
    bridge.reset();
    assert_eq!(bridge.queued(), 0);
    assert_eq!(bridge.state(), BridgeState::Unloaded);

    bridge.send(style("b", false));
    bridge.reset();
    assert_eq!(bridge.queued(), 1);
  }
}
