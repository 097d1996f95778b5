use std::path::Path;
use std::sync::Arc;

use mobileforms_bridge::{Bridge, BridgeState, Command, Generation, Rect, Renderer, RendererMessage};
use mobileforms_schema::{FieldValues, FormDefinition, parse};
use mobileforms_state::{FormState, WriteMode};
use mobileforms_validation::{ValidationResult, evaluate};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::FormConfig;
use crate::dispatch::{Event, EventDispatcher, FormDelegate, NoopDelegate};
use crate::error::FormError;
use crate::host::HostView;
use crate::resource::{FsResourceLoader, ResourceLoader, schema_file};

#[derive(Debug)]
enum Inbound {
  Text(String),
  Message(RendererMessage),
}

/// Entry point for renderer messages. Cheap to clone and usable from any
/// thread; messages wait until the session owner pumps them.
#[derive(Debug, Clone)]
pub struct RendererLink {
  sender: mpsc::UnboundedSender<Inbound>,
}

impl RendererLink {
  /// Post a raw message (URL or JSON form). Returns `false` once the session
  /// is gone.
  pub fn post(&self, text: impl Into<String>) -> bool {
    self.sender.send(Inbound::Text(text.into())).is_ok()
  }

  /// Post an already decoded message.
  pub fn post_message(&self, message: RendererMessage) -> bool {
    self.sender.send(Inbound::Message(message)).is_ok()
  }
}

/// One embedded form: its state, its renderer channel and its host delegate.
pub struct FormSession<R> {
  instance_id: Uuid,
  view: HostView,
  config: FormConfig,
  loader: Box<dyn ResourceLoader>,
  state: FormState,
  bridge: Bridge<R>,
  dispatcher: EventDispatcher,
  link: RendererLink,
  inbox: mpsc::UnboundedReceiver<Inbound>,
}

impl<R: Renderer> FormSession<R> {
  /// Bind a new form to `view`, drawn by `renderer`.
  ///
  /// Fails with [`FormError::Bind`] when the view has no id or no drawable
  /// area.
  pub fn initialize(view: HostView, renderer: R, config: FormConfig) -> Result<Self, FormError> {
    view.validate()?;

    let instance_id = Uuid::new_v4();
    let (sender, inbox) = mpsc::unbounded_channel();
    let bridge = Bridge::new(renderer);
    bridge.set_frame(view.bounds);

    info!(
      instance_id = %instance_id,
      view = %view.id,
      forms_dir = %config.forms_dir.display(),
      policy = ?config.validation_policy,
      "form initialized"
    );

    Ok(Self {
      instance_id,
      loader: Box::new(FsResourceLoader::new(config.forms_dir.clone())),
      dispatcher: EventDispatcher::new(Box::new(NoopDelegate), config.validation_policy),
      view,
      config,
      state: FormState::new(),
      bridge,
      link: RendererLink { sender },
      inbox,
    })
  }

  pub fn with_delegate(mut self, delegate: impl FormDelegate + 'static) -> Self {
    self.dispatcher.set_delegate(Box::new(delegate));
    self
  }

  pub fn with_loader(mut self, loader: impl ResourceLoader + 'static) -> Self {
    self.loader = Box::new(loader);
    self
  }

  pub fn instance_id(&self) -> Uuid {
    self.instance_id
  }

  pub fn view(&self) -> &HostView {
    &self.view
  }

  pub fn config(&self) -> &FormConfig {
    &self.config
  }

  pub fn state(&self) -> &FormState {
    &self.state
  }

  pub fn bridge_state(&self) -> BridgeState {
    self.bridge.state()
  }

  pub fn generation(&self) -> Generation {
    self.bridge.generation()
  }

  pub fn renderer(&self) -> &R {
    self.bridge.renderer()
  }

  pub fn link(&self) -> RendererLink {
    self.link.clone()
  }

  /// Parse and install a schema. On failure the previous schema stays active.
  #[instrument(name = "set_schema", skip(self, schema), fields(instance_id = %self.instance_id))]
  pub fn set_schema(&mut self, schema: &str) -> Result<(), FormError> {
    let definition = parse(schema).inspect_err(|e| {
      warn!(error = %e, field = e.offending_field().unwrap_or_default(), "schema rejected");
    })?;
    self.install(definition);
    Ok(())
  }

  /// Load `<forms_dir>/<name>.json` and install it.
  pub fn set_schema_by_name(&mut self, name: &str) -> Result<(), FormError> {
    let schema = self.loader.read(&schema_file(name)?)?;
    debug!(instance_id = %self.instance_id, name = %name, "schema read");
    self.set_schema(&schema)
  }

  fn install(&mut self, definition: FormDefinition) {
    info!(fields = definition.fields().len(), "schema installed");
    self.state.set_definition(Arc::new(definition));
    self.bridge.reset();
  }

  /// Merge values into the form before it is loaded.
  pub fn pre_populate(&mut self, values: &str) -> Result<(), FormError> {
    let values = FieldValues::from_json(values)?;
    self.state.set_values(values, WriteMode::Merge)?;
    Ok(())
  }

  /// Layout hint for the renderer. Has no effect on the form's data.
  pub fn set_display_region(&mut self, frame: Rect) {
    self.view.bounds = frame;
    self.bridge.set_frame(frame);
  }

  /// Bootstrap the renderer with the current schema and values.
  #[instrument(name = "load", skip(self), fields(instance_id = %self.instance_id))]
  pub fn load(&mut self) -> Result<Generation, FormError> {
    let definition = self.state.definition()?.clone();
    self.state.mark_loaded()?;
    let generation = self.bridge.load(
      definition,
      self.state.values().clone(),
      self.state.is_read_only(),
    );
    Ok(generation)
  }

  /// Takes effect locally at once; the renderer is told when it has been
  /// bootstrapped (the bootstrap itself carries the flag).
  pub fn set_read_only(&mut self, read_only: bool) {
    self.state.set_read_only(read_only);
    if self.bridge.state() != BridgeState::Unloaded {
      self.bridge.send(Command::SetReadOnly { read_only });
    }
  }

  /// Replace every value of a loaded form. Fields missing from `values` go
  /// back to their default.
  pub fn populate_async(&mut self, values: &str) -> Result<(), FormError> {
    let values = FieldValues::from_json(values)?;
    self.state.set_values(values, WriteMode::Overwrite)?;
    self.bridge.send(Command::Populate {
      values: self.state.values().clone(),
    });
    Ok(())
  }

  pub fn values(&self) -> Result<&FieldValues, FormError> {
    self.state.definition()?;
    Ok(self.state.values())
  }

  pub fn get_values(&self) -> Result<String, FormError> {
    Ok(self.values()?.to_json())
  }

  pub fn errors(&self) -> Result<ValidationResult, FormError> {
    let definition = self.state.definition()?;
    Ok(evaluate(definition, self.state.values()))
  }

  pub fn get_errors(&self) -> Result<String, FormError> {
    Ok(self.errors()?.to_json())
  }

  pub fn is_valid(&self) -> Result<bool, FormError> {
    Ok(self.errors()?.is_valid())
  }

  /// Read a stylesheet through the resource loader and send it to the
  /// renderer. `override_all` drops previously injected styles.
  pub fn inject_style(&mut self, path: impl AsRef<Path>, override_all: bool) -> Result<(), FormError> {
    let css = self.loader.read(path.as_ref())?;
    self.bridge.send(Command::AddStyle { css, override_all });
    Ok(())
  }

  pub fn inject_script(&mut self, path: impl AsRef<Path>) -> Result<(), FormError> {
    let source = self.loader.read(path.as_ref())?;
    self.bridge.send(Command::AddScript { source });
    Ok(())
  }

  /// Handle a raw renderer message right away, on the calling thread.
  pub fn receive(&mut self, text: &str) -> Option<Event> {
    self.handle(Inbound::Text(text.to_string()))
  }

  /// Apply every message posted through the link so far.
  ///
  /// Returns the number of messages taken from the link.
  pub fn pump(&mut self) -> usize {
    let mut handled = 0;
    while let Ok(inbound) = self.inbox.try_recv() {
      self.handle(inbound);
      handled += 1;
    }
    handled
  }

  /// Apply linked messages as they arrive until `cancel` fires.
  pub async fn run(&mut self, cancel: CancellationToken) {
    info!(instance_id = %self.instance_id, "form session running");

    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!(instance_id = %self.instance_id, "form session cancelled");
          break;
        }
        inbound = self.inbox.recv() => {
          match inbound {
            Some(inbound) => {
              self.handle(inbound);
            }
            None => break,
          }
        }
      }
    }
  }

  fn handle(&mut self, inbound: Inbound) -> Option<Event> {
    let message = match inbound {
      Inbound::Message(message) => message,
      Inbound::Text(text) => match RendererMessage::parse(&text) {
        Ok(message) => message,
        Err(e) => {
          warn!(instance_id = %self.instance_id, error = %e, "unreadable renderer message, dropping");
          return None;
        }
      },
    };

    let raw = self.bridge.accept(message)?;
    self.dispatcher.dispatch(raw, &mut self.state)
  }
}
