/// Padding thickness on each side of a widget. The interactive geometry code
/// uses it as the hit-test margin for edge detection.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Padding {
    /// Left thickness.
    pub left: u32,
    /// Top thickness.
    pub top: u32,
    /// Right thickness.
    pub right: u32,
    /// Bottom thickness.
    pub bottom: u32,
}

impl Padding {
    /// Construct padding from explicit sides.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same thickness on every side.
    pub fn all(v: u32) -> Self {
        Self::new(v, v, v, v)
    }

    /// Combined left and right thickness.
    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    /// Combined top and bottom thickness.
    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    /// Raise every side to at least `min`.
    pub fn at_least(&self, min: u32) -> Self {
        Self {
            left: self.left.max(min),
            top: self.top.max(min),
            right: self.right.max(min),
            bottom: self.bottom.max(min),
        }
    }
}
