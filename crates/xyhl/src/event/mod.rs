//! Input events delivered to the interactive controller.

pub mod key;
pub mod mouse;

/// An input event in widget-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// A keystroke while the widget has focus.
    Key(key::Key),
    /// A mouse action over the widget, or captured by it.
    Mouse(mouse::MouseEvent),
    /// The pointer left the widget.
    MouseLeave,
}

impl From<key::Key> for Event {
    fn from(k: key::Key) -> Self {
        Self::Key(k)
    }
}

impl From<mouse::MouseEvent> for Event {
    fn from(m: mouse::MouseEvent) -> Self {
        Self::Mouse(m)
    }
}
