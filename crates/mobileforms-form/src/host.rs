use mobileforms_bridge::Rect;

use crate::error::FormError;

/// The host-owned display region a form is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct HostView {
  pub id: String,
  pub bounds: Rect,
}

impl HostView {
  pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
    Self {
      id: id.into(),
      bounds,
    }
  }

  pub(crate) fn validate(&self) -> Result<(), FormError> {
    if self.id.trim().is_empty() {
      return Err(FormError::bind("host view has no id"));
    }
    if !self.bounds.is_drawable() {
      return Err(FormError::bind(format!(
        "host view '{}' has no drawable area ({}x{})",
        self.id, self.bounds.width, self.bounds.height
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate() {
    assert!(HostView::new("main", Rect::new(0.0, 0.0, 10.0, 10.0)).validate().is_ok());
    assert!(matches!(
      HostView::new(" ", Rect::new(0.0, 0.0, 10.0, 10.0)).validate(),
      Err(FormError::Bind { .. })
    ));
    assert!(matches!(
      HostView::new("main", Rect::default()).validate(),
      Err(FormError::Bind { .. })
    ));
  }
}
