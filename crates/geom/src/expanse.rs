/// An `Expanse` is a rectangle that has a width and height but no location.
/// Screen resolutions and parent client sizes are expressed this way.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Expanse {
    /// Width.
    pub w: u32,
    /// Height.
    pub h: u32,
}

impl Expanse {
    /// Construct a new expanse.
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Grow each dimension to at least the matching dimension of `min`.
    pub fn at_least(&self, min: Self) -> Self {
        Self {
            w: self.w.max(min.w),
            h: self.h.max(min.h),
        }
    }
}
