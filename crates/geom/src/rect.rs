use super::{Expanse, Point};

/// A rectangle with a signed origin and unsigned size, in pixels.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

/// Clamp a wide intermediate value into the `i32` range.
fn narrow(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// A zero-sized rectangle at the origin.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The x coordinate one past the right edge.
    pub fn right(&self) -> i32 {
        narrow(self.tl.x as i64 + self.w as i64)
    }

    /// The y coordinate one past the bottom edge.
    pub fn bottom(&self) -> i32 {
        narrow(self.tl.y as i64 + self.h as i64)
    }

    /// Size of this rectangle, without location.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// Move the rectangle by an offset, keeping its size.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            tl: self.tl.scroll(dx, dy),
            w: self.w,
            h: self.h,
        }
    }

    /// Same origin, new size.
    pub fn with_size(&self, w: u32, h: u32) -> Self {
        Self { tl: self.tl, w, h }
    }

    /// Same size, new origin.
    pub fn with_origin(&self, tl: Point) -> Self {
        Self {
            tl,
            w: self.w,
            h: self.h,
        }
    }

    /// Grow the size to at least `min`, keeping the origin.
    pub fn at_least(&self, min: Expanse) -> Self {
        let e = self.expanse().at_least(min);
        self.with_size(e.w, e.h)
    }

    /// Pull a negative origin back to zero on each axis, keeping the size.
    pub fn clamp_origin(&self) -> Self {
        self.with_origin(Point::new(self.tl.x.max(0), self.tl.y.max(0)))
    }
}
