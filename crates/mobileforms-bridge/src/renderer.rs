use serde::{Deserialize, Serialize};

use crate::command::{Bootstrap, Envelope};

/// The surface that paints a form and runs its scripts.
///
/// Calls are fire-and-forget: nothing is returned, and anything the renderer
/// has to say comes back later as a [`RendererMessage`].
///
/// [`RendererMessage`]: crate::RendererMessage
pub trait Renderer: Send {
  /// Paint the form described by `bootstrap`, replacing whatever was shown.
  fn bootstrap(&self, bootstrap: &Bootstrap);

  fn deliver(&self, envelope: &Envelope);

  /// Layout hint for the region the form occupies.
  fn set_frame(&self, _frame: Rect) {}
}

/// A rectangle in host view coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl Rect {
  pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// Finite coordinates and a positive area.
  pub fn is_drawable(&self) -> bool {
    [self.x, self.y, self.width, self.height]
      .iter()
      .all(|v| v.is_finite())
      && self.width > 0.0
      && self.height > 0.0
  }
}
