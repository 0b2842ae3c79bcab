//! Test utilities: a scriptable [`GeometryHost`] that records what the
//! controller asks of it.

use geom::{Expanse, Padding, Rect};

use crate::{
    host::{CursorKind, GeometryHost, ParentInfo},
    record::{DEFAULT_REFERENCE_HEIGHT, DEFAULT_REFERENCE_WIDTH},
};

/// A mutating call made on a [`MockHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    /// `set_bounds`
    SetBounds(Rect),
    /// `set_cursor`
    SetCursor(CursorKind),
    /// `invalidate`
    Invalidate,
    /// `invalidate_siblings`
    InvalidateSiblings(Rect),
    /// `focus`
    Focus,
}

/// An in-memory widget.
#[derive(Debug, Clone)]
pub struct MockHost {
    /// Widget name.
    pub name: String,
    /// Owning form.
    pub form: Option<String>,
    /// Containing control.
    pub parent_control: Option<String>,
    /// Current bounds.
    pub bounds: Rect,
    /// Padding.
    pub padding: Padding,
    /// Last cursor set.
    pub cursor: CursorKind,
    /// Container, if any.
    pub parent: Option<ParentInfo>,
    /// Screen resolution.
    pub screen: Expanse,
    /// Visibility.
    pub visible: bool,
    /// Has focus been requested?
    pub focused: bool,
    /// Every mutating call, in order.
    pub calls: Vec<Call>,
}

impl MockHost {
    /// A visible widget with no parent on a 1920x1080 screen.
    pub fn new(name: &str, form: Option<&str>, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            form: form.map(str::to_string),
            parent_control: None,
            bounds,
            padding: Padding::default(),
            cursor: CursorKind::Default,
            parent: None,
            screen: Expanse::new(DEFAULT_REFERENCE_WIDTH, DEFAULT_REFERENCE_HEIGHT),
            visible: true,
            focused: false,
            calls: Vec::new(),
        }
    }

    /// Set the screen resolution.
    pub fn with_screen(mut self, screen: Expanse) -> Self {
        self.screen = screen;
        self
    }

    /// Set the container.
    pub fn with_parent(mut self, parent: ParentInfo) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the containing control name.
    pub fn with_parent_control(mut self, name: &str) -> Self {
        self.parent_control = Some(name.into());
        self
    }

    /// Set the padding.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Make the widget invisible.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Number of repaint requests so far.
    pub fn invalidations(&self) -> usize {
        self.calls.iter().filter(|c| **c == Call::Invalidate).count()
    }
}

impl GeometryHost for MockHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    fn parent_control(&self) -> Option<&str> {
        self.parent_control.as_deref()
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.calls.push(Call::SetBounds(bounds));
    }

    fn padding(&self) -> Padding {
        self.padding
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.cursor = cursor;
        self.calls.push(Call::SetCursor(cursor));
    }

    fn invalidate(&mut self) {
        self.calls.push(Call::Invalidate);
    }

    fn invalidate_siblings(&mut self, area: Rect) {
        self.calls.push(Call::InvalidateSiblings(area));
    }

    fn parent(&self) -> Option<ParentInfo> {
        self.parent
    }

    fn screen(&self) -> Expanse {
        self.screen
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn focus(&mut self) {
        self.focused = true;
        self.calls.push(Call::Focus);
    }
}
