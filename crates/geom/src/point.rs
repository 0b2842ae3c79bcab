/// A signed point in pixel coordinates. Client-relative pointer positions can
/// fall outside the widget while a drag is captured, so both axes are signed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the origin point.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Shift the point by an offset, saturating instead of overflowing.
    pub fn scroll(&self, x: i32, y: i32) -> Self {
        Self {
            x: self.x.saturating_add(x),
            y: self.y.saturating_add(y),
        }
    }

    /// Offset from `other` to this point.
    pub fn delta(&self, other: Self) -> (i32, i32) {
        (
            self.x.saturating_sub(other.x),
            self.y.saturating_sub(other.y),
        )
    }
}
