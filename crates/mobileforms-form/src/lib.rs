//! Mobileforms Form
//!
//! The host-facing surface of mobileforms. A [`FormSession`] binds a form to a
//! host view and a [`Renderer`], and keeps the form state, the renderer and the
//! host's [`FormDelegate`] consistent.
//!
//! # Architecture
//!
//! ```text
//!  host ──set_schema / load / populate_async──► FormSession ──► Bridge ──► Renderer
//!                                                   │                        │
//!  FormDelegate ◄── EventDispatcher ◄── FormState ◄─┘◄── pump() ◄── RendererLink
//! ```
//!
//! Renderer messages may be posted from any thread through a [`RendererLink`].
//! They are applied only when the session owner calls [`FormSession::pump`] or
//! awaits [`FormSession::run`], so the session is the only writer of its state.
//! For a `change` event, the state is updated before the delegate is notified.
//!
//! # Usage
//!
//! ```ignore
//! let view = HostView::new("checkout", Rect::new(0.0, 0.0, 320.0, 480.0));
//! let mut form = FormSession::initialize(view, renderer, FormConfig::default())?
//!   .with_delegate(delegate);
//!
//! form.set_schema_by_name("checkout")?;
//! form.pre_populate(r#"{"country": "PE"}"#)?;
//! form.load()?;
//!
//! // hand `form.link()` to the renderer, then on the owning thread:
//! form.pump();
//! let errors = form.get_errors()?;
//! ```
//!
//! [`Renderer`]: mobileforms_bridge::Renderer

mod config;
mod dispatch;
mod error;
mod host;
mod resource;
mod session;

pub use config::{FormConfig, ValidationPolicy};
pub use dispatch::{
  ChannelDelegate, Event, EventDispatcher, EventType, FormDelegate, NoopDelegate, Notification,
};
pub use error::FormError;
pub use host::HostView;
pub use resource::{FsResourceLoader, ResourceLoader};
pub use session::{FormSession, RendererLink};

pub use mobileforms_bridge::{
  Bootstrap, BridgeState, Command, Envelope, Generation, Rect, Renderer, RendererMessage,
};
pub use mobileforms_schema::FieldValues;
pub use mobileforms_state::FormState;
pub use mobileforms_validation::ValidationResult;
