//! Mobileforms Bridge
//!
//! The asynchronous channel between a host and the surface that renders a
//! form. Outbound, the host bootstraps the renderer and sends [`Command`]s;
//! inbound, the renderer reports readiness and user interaction as
//! [`RendererMessage`]s.
//!
//! # Protocol
//!
//! ```text
//!              load()                    Ready(gen)
//!  Unloaded ──────────► Loading ─────────────────────► Loaded
//!     ▲     bootstrap     │  commands are queued        │ commands delivered
//!     │     gen += 1      │                             │ events accepted
//!     └─────────── reset() (new definition) ◄───────────┘
//! ```
//!
//! Every message carries the generation of the load it belongs to. Messages
//! from any other generation, events that arrive before `Ready`, and repeated
//! `Ready`s are protocol warnings: logged and dropped, never surfaced.

mod command;
mod error;
mod message;
mod protocol;
mod renderer;

pub use command::{Bootstrap, Command, Envelope, Generation};
pub use error::MessageError;
pub use message::{MessageBody, RawEvent, RendererMessage};
pub use protocol::{Bridge, BridgeState};
pub use renderer::{Rect, Renderer};
