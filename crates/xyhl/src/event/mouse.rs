use geom::Point;

use crate::event::key;

/// Mouse button codes.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Button {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
    /// No button (for moves).
    None,
}

/// Mouse action kinds.
#[derive(Debug, PartialOrd, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Action {
    /// Button press.
    Down,
    /// Button release.
    Up,
    /// Pointer motion, with or without a button held.
    Moved,
}

/// A mouse input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// Mouse action type.
    pub action: Action,
    /// Mouse button.
    pub button: Button,
    /// Keyboard modifiers.
    pub modifiers: key::Mods,
    /// Pointer location relative to the widget's top-left corner.
    pub location: Point,
}

impl MouseEvent {
    /// A left-button press at `(x, y)`.
    pub fn down(x: i32, y: i32) -> Self {
        Self::new(Action::Down, Button::Left, x, y)
    }

    /// A left-button release at `(x, y)`.
    pub fn up(x: i32, y: i32) -> Self {
        Self::new(Action::Up, Button::Left, x, y)
    }

    /// Pointer motion to `(x, y)`.
    pub fn moved(x: i32, y: i32) -> Self {
        Self::new(Action::Moved, Button::None, x, y)
    }

    /// An event with no modifiers.
    pub fn new(action: Action, button: Button, x: i32, y: i32) -> Self {
        Self {
            action,
            button,
            modifiers: key::Empty,
            location: Point::new(x, y),
        }
    }
}
