//! The persisted geometry of a single widget.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use geom::{Expanse, Point, Rect};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{Error, Result},
    scale::ratio,
};

/// Reference width assumed for records that do not carry one.
pub const DEFAULT_REFERENCE_WIDTH: u32 = 1920;
/// Reference height assumed for records that do not carry one.
pub const DEFAULT_REFERENCE_HEIGHT: u32 = 1080;

/// Default for `ReferenceWidth` when absent from the file.
fn default_reference_width() -> u32 {
    DEFAULT_REFERENCE_WIDTH
}

/// Default for `ReferenceHeight` when absent from the file.
fn default_reference_height() -> u32 {
    DEFAULT_REFERENCE_HEIGHT
}

/// Read a `null` or missing name as the empty string.
fn null_as_empty<'de, D>(d: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

/// Position and size of one widget, measured at a reference screen
/// resolution.
///
/// Identity is the `(name, form)` pair: two records are equal when they name
/// the same widget on the same form, whatever their geometry. The store relies
/// on this to replace records by key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeometryRecord {
    /// Owning window, if any.
    #[serde(rename = "Form", default)]
    pub form: Option<String>,
    /// Widget name.
    #[serde(rename = "Nome", default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Name of the containing control, informational.
    #[serde(rename = "ParentControl", default)]
    pub parent_control: Option<String>,
    /// Horizontal offset within the parent.
    #[serde(rename = "X", default)]
    pub x: f64,
    /// Vertical offset within the parent.
    #[serde(rename = "Y", default)]
    pub y: f64,
    /// Height.
    #[serde(rename = "H", default)]
    pub height: f64,
    /// Width.
    #[serde(rename = "L", default)]
    pub width: f64,
    /// Screen width the values were measured at.
    #[serde(rename = "ReferenceWidth", default = "default_reference_width")]
    pub reference_width: u32,
    /// Screen height the values were measured at.
    #[serde(rename = "ReferenceHeight", default = "default_reference_height")]
    pub reference_height: u32,
}

impl GeometryRecord {
    /// An empty record for `name` on `form` at the default reference
    /// resolution.
    pub fn new(name: impl Into<String>, form: Option<&str>) -> Self {
        Self {
            form: form.map(str::to_string),
            name: name.into(),
            parent_control: None,
            x: 0.0,
            y: 0.0,
            height: 0.0,
            width: 0.0,
            reference_width: DEFAULT_REFERENCE_WIDTH,
            reference_height: DEFAULT_REFERENCE_HEIGHT,
        }
    }

    /// Set position and size. Sizes must be finite and non-negative.
    pub fn with_geometry(mut self, x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
            return Err(Error::Invalid(format!(
                "{}: non-finite geometry",
                self.name
            )));
        }
        if width < 0.0 || height < 0.0 {
            return Err(Error::Invalid(format!(
                "{}: negative size {width}x{height}",
                self.name
            )));
        }
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        Ok(self)
    }

    /// Take position and size from a rectangle.
    pub fn with_bounds(mut self, r: Rect) -> Self {
        self.x = f64::from(r.tl.x);
        self.y = f64::from(r.tl.y);
        self.width = f64::from(r.w);
        self.height = f64::from(r.h);
        self
    }

    /// Set the reference resolution. Both dimensions must be non-zero.
    pub fn with_reference(mut self, reference: Expanse) -> Result<Self> {
        if reference.w == 0 || reference.h == 0 {
            return Err(Error::Invalid(format!(
                "{}: zero reference resolution",
                self.name
            )));
        }
        self.reference_width = reference.w;
        self.reference_height = reference.h;
        Ok(self)
    }

    /// Set the parent control name.
    pub fn with_parent(mut self, parent: Option<&str>) -> Self {
        self.parent_control = parent.map(str::to_string);
        self
    }

    /// Rescale in place from the reference resolution to `current_w` x
    /// `current_h`. Width and height both use the horizontal factor. Calling
    /// this twice compounds the scaling.
    pub fn rescale_for_resolution(&mut self, current_w: u32, current_h: u32) {
        let fx = ratio(current_w, self.reference_width);
        let fy = ratio(current_h, self.reference_height);
        self.width *= fx;
        self.height *= fx;
        self.x *= fx;
        self.y *= fy;
    }

    /// The reference resolution as an expanse.
    pub fn reference(&self) -> Expanse {
        Expanse::new(self.reference_width, self.reference_height)
    }

    /// Integer location, truncating fractional pixels.
    pub fn location(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }

    /// Integer size, truncating fractional pixels.
    pub fn size(&self) -> Expanse {
        Expanse::new(self.width.max(0.0) as u32, self.height.max(0.0) as u32)
    }

    /// Integer bounds, truncating fractional pixels.
    pub fn bounds(&self) -> Rect {
        let sz = self.size();
        Rect::new(self.location().x, self.location().y, sz.w, sz.h)
    }

    /// Does this record describe `name` on `form`?
    pub fn is_key(&self, name: &str, form: Option<&str>) -> bool {
        self.name == name && self.form.as_deref() == form
    }
}

impl PartialEq for GeometryRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.form == other.form
    }
}

impl Eq for GeometryRecord {}

impl Hash for GeometryRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.form.hash(state);
    }
}

impl fmt::Display for GeometryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: {}, {}, {}, {}",
            self.form.as_deref().unwrap_or_default(),
            self.name,
            self.x,
            self.y,
            self.height,
            self.width
        )
    }
}
