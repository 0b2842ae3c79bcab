//! The capabilities the controller needs from a concrete widget.

use geom::{Expanse, Padding, Rect};

/// Pointer shapes used as feedback during interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorKind {
    /// The toolkit's normal pointer.
    #[default]
    Default,
    /// Four-way move arrows.
    SizeAll,
    /// Diagonal resize, top-left to bottom-right.
    SizeNwse,
    /// Vertical splitter, for the left and right edges.
    VSplit,
    /// Horizontal splitter, for the top and bottom edges.
    HSplit,
    /// West-east resize, for horizontal lines.
    SizeWe,
    /// North-south resize, for vertical lines.
    SizeNs,
}

/// What the controller needs to know about a widget's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentInfo {
    /// Client size of the parent.
    pub size: Expanse,
    /// Is the parent a top-level window in the maximized state?
    pub maximized_top_level: bool,
}

impl ParentInfo {
    /// A parent of the given size that is not a maximized window.
    pub fn new(size: Expanse) -> Self {
        Self {
            size,
            maximized_top_level: false,
        }
    }

    /// A maximized top-level window of the given size.
    pub fn maximized(size: Expanse) -> Self {
        Self {
            size,
            maximized_top_level: true,
        }
    }
}

/// A widget the interactive controller can drive.
///
/// Implementations wrap a concrete toolkit widget. Every method is called on
/// the UI thread.
pub trait GeometryHost {
    /// Widget name, half of the persistence key.
    fn name(&self) -> &str;

    /// Name of the owning window, the other half of the key.
    fn form(&self) -> Option<&str>;

    /// Name of the containing control.
    fn parent_control(&self) -> Option<&str> {
        None
    }

    /// Current bounds in parent coordinates.
    fn bounds(&self) -> Rect;

    /// Move and resize the widget.
    fn set_bounds(&mut self, bounds: Rect);

    /// Current padding.
    fn padding(&self) -> Padding;

    /// Change the pointer shape shown over the widget.
    fn set_cursor(&mut self, cursor: CursorKind);

    /// Request a repaint of the widget.
    fn invalidate(&mut self);

    /// Request a repaint of sibling widgets overlapping `area`.
    fn invalidate_siblings(&mut self, _area: Rect) {}

    /// The container, if the widget has one.
    fn parent(&self) -> Option<ParentInfo>;

    /// Resolution of the screen the widget is shown on.
    fn screen(&self) -> Expanse;

    /// Is the widget currently visible?
    fn is_visible(&self) -> bool {
        true
    }

    /// Give the widget keyboard focus.
    fn focus(&mut self) {}
}
