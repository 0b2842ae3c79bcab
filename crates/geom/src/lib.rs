//! Pixel geometry primitives shared by the xyhl crates.

/// Width/height size type.
mod expanse;
/// Per-side padding thickness.
mod padding;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;

pub use expanse::Expanse;
pub use padding::Padding;
pub use point::Point;
pub use rect::Rect;

/// Cardinal directions.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Direction {
    /// Upward direction.
    Up,
    /// Downward direction.
    Down,
    /// Leftward direction.
    Left,
    /// Rightward direction.
    Right,
}

impl Direction {
    /// Unit offset for this direction, with y growing downward.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}
