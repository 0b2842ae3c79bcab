//! The interactive geometry state machine.
//!
//! A controller is attached to one widget. In the `Moving` mode, dragging the
//! widget moves it. In the `Resizing` mode, dragging an edge resizes it. Arrow
//! keys nudge in either mode, and Escape rolls back to the bounds the gesture
//! started from. Leaving a mode through its toggle persists the result.

use std::{fmt, marker::PhantomData, rc::Rc};

use geom::{Expanse, Point, Rect};
use tracing::debug;

use crate::{
    config::{ControllerConfig, Orientation, Profile},
    error::Result,
    event::{
        Event,
        key::{Key, KeyCode},
        mouse::{Action, Button, MouseEvent},
    },
    host::{CursorKind, GeometryHost},
    record::GeometryRecord,
    scale::ScreenScaler,
    store::GeometryStore,
};

/// Keyboard nudge step with no modifier.
const STEP: i64 = 10;
/// Keyboard nudge step with Shift held.
const STEP_FINE: i64 = 1;
/// Keyboard nudge step with Control held.
const STEP_MEDIUM: i64 = 3;

/// The result of offering an event to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event was processed and changed state.
    Handle,
    /// The event was processed without a state change and should not reach
    /// the widget.
    Consume,
    /// The event was not for the controller; the widget handles it.
    Ignore,
}

/// Interaction mode. The two runtime modes exclude each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal widget behaviour.
    #[default]
    Idle,
    /// Dragging moves the widget.
    Moving,
    /// Dragging an edge resizes the widget.
    Resizing,
}

/// The part of the widget under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Edge {
    /// No active edge.
    #[default]
    None,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
    /// Top-left corner. Dragging it translates the widget.
    TopLeft,
    /// Bottom-right corner.
    BottomRight,
}

/// Notification raised after a widget's geometry has been saved.
#[derive(Debug, Clone)]
pub struct GeometryChanged {
    /// Name of the widget.
    pub name: String,
    /// The record as persisted, at its reference resolution.
    pub record: GeometryRecord,
}

/// Boxed geometry-changed listener.
type Listener = Box<dyn FnMut(&GeometryChanged)>;

/// Clamp a signed length into a size.
fn span(v: i64) -> u32 {
    v.clamp(0, i64::from(u32::MAX)) as u32
}

/// Clamp a signed offset into a coordinate.
fn coord(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Drives one widget through move, resize and keyboard nudging.
///
/// The controller lives on the UI thread and is not `Send`. Other threads
/// reach it through a [`UiHandle`](crate::UiHandle).
pub struct InteractiveGeometryController {
    /// Capabilities and limits.
    config: ControllerConfig,
    /// Current mode.
    mode: Mode,
    /// Edge under the pointer, or being dragged.
    edge: Edge,
    /// Pointer position at mouse down, widget-relative.
    anchor: Point,
    /// Is a drag in progress?
    captured: bool,
    /// Bounds to roll back to on Escape.
    origin: Rect,
    /// Geometry-changed listeners.
    listeners: Vec<Listener>,
    /// Pins the controller to the thread that created it.
    _ui: PhantomData<Rc<()>>,
}

impl fmt::Debug for InteractiveGeometryController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveGeometryController")
            .field("mode", &self.mode)
            .field("edge", &self.edge)
            .field("captured", &self.captured)
            .field("origin", &self.origin)
            .finish()
    }
}

impl InteractiveGeometryController {
    /// Create an idle controller.
    pub fn new(config: ControllerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mode: Mode::Idle,
            edge: Edge::None,
            anchor: Point::zero(),
            captured: false,
            origin: Rect::zero(),
            listeners: Vec::new(),
            _ui: PhantomData,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current edge.
    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Is a drag in progress?
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Bounds Escape would restore.
    pub fn origin(&self) -> Rect {
        self.origin
    }

    /// Is the widget in the moving mode?
    pub fn is_moving(&self) -> bool {
        self.mode == Mode::Moving
    }

    /// Is the widget in the resizing mode?
    pub fn is_resizing(&self) -> bool {
        self.mode == Mode::Resizing
    }

    /// Is an interactive mode active and permitted?
    pub fn is_runtime(&self) -> bool {
        (self.config.allow_resize && self.mode == Mode::Resizing)
            || (self.config.allow_move && self.mode == Mode::Moving)
    }

    /// Register a listener for saved geometry.
    pub fn on_geometry_changed<F>(&mut self, f: F)
    where
        F: FnMut(&GeometryChanged) + 'static,
    {
        self.listeners.push(Box::new(f));
    }

    /// Grant or revoke the move capability. Revoking it while moving drops
    /// back to idle without saving.
    pub fn set_allow_move(&mut self, v: bool) {
        self.config.allow_move = v;
        if !v && self.mode == Mode::Moving {
            self.reset();
        }
    }

    /// Grant or revoke the resize capability. Revoking it while resizing
    /// drops back to idle without saving.
    pub fn set_allow_resize(&mut self, v: bool) {
        self.config.allow_resize = v;
        if !v && self.mode == Mode::Resizing {
            self.reset();
        }
    }

    /// Back to idle with no drag state.
    fn reset(&mut self) {
        self.mode = Mode::Idle;
        self.edge = Edge::None;
        self.captured = false;
    }

    /// Enter `mode`, capturing the rollback point when coming from idle.
    fn enter(&mut self, host: &mut dyn GeometryHost, mode: Mode) {
        if self.mode == Mode::Idle {
            self.origin = host.bounds();
        }
        debug!("{}: {:?} -> {:?}", host.name(), self.mode, mode);
        self.mode = mode;
        self.edge = Edge::None;
        self.captured = false;
        host.focus();
        host.invalidate();
    }

    /// Leave the current runtime mode and persist the geometry.
    fn leave(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore) -> bool {
        debug!("{}: {:?} -> Idle", host.name(), self.mode);
        self.reset();
        host.set_cursor(CursorKind::Default);
        let saved = self.save(host, store);
        host.invalidate();
        saved
    }

    /// Toggle the moving mode. Ignored when moving is not allowed. Turning
    /// it off saves the geometry. Returns whether the widget is now moving.
    pub fn toggle_move(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore) -> bool {
        if !self.config.allow_move {
            return false;
        }
        if self.mode == Mode::Moving {
            self.leave(host, store);
        } else {
            self.enter(host, Mode::Moving);
        }
        self.is_moving()
    }

    /// Toggle the resizing mode. Ignored when resizing is not allowed.
    /// Turning it off saves the geometry. Returns whether the widget is now
    /// resizing.
    pub fn toggle_resize(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore) -> bool {
        if !self.config.allow_resize {
            return false;
        }
        if self.mode == Mode::Resizing {
            self.leave(host, store);
        } else {
            self.enter(host, Mode::Resizing);
        }
        self.is_resizing()
    }

    /// Programmatic form of [`toggle_move`](Self::toggle_move).
    pub fn set_moving(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore, v: bool) {
        if v != self.is_moving() {
            self.toggle_move(host, store);
        }
    }

    /// Programmatic form of [`toggle_resize`](Self::toggle_resize).
    pub fn set_resizing(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore, v: bool) {
        if v != self.is_resizing() {
            self.toggle_resize(host, store);
        }
    }

    /// Abandon the current gesture: restore the rollback bounds and go idle
    /// without saving. Returns false when no runtime mode was active.
    pub fn cancel(&mut self, host: &mut dyn GeometryHost) -> bool {
        if !self.is_runtime() {
            return false;
        }
        debug!("{}: cancel, restoring {:?}", host.name(), self.origin);
        self.reset();
        host.set_cursor(CursorKind::Default);
        if host.bounds() != self.origin {
            host.set_bounds(self.origin);
            self.invalidate_siblings(host, self.origin);
        }
        host.invalidate();
        true
    }

    /// Route an input event.
    pub fn handle_event(
        &mut self,
        host: &mut dyn GeometryHost,
        event: &Event,
    ) -> EventOutcome {
        match event {
            Event::Key(k) => self.on_key(host, *k),
            Event::Mouse(m) => match m.action {
                Action::Down => self.on_mouse_down(m),
                Action::Up => self.on_mouse_up(m),
                Action::Moved => self.on_mouse_move(host, m),
            },
            Event::MouseLeave => self.on_mouse_leave(),
        }
    }

    /// Start a drag on a left press in a runtime mode.
    pub fn on_mouse_down(&mut self, m: &MouseEvent) -> EventOutcome {
        if m.button != Button::Left || !self.is_runtime() {
            return EventOutcome::Ignore;
        }
        self.captured = true;
        self.anchor = m.location;
        EventOutcome::Handle
    }

    /// End a drag. The edge is cleared and nothing is saved.
    pub fn on_mouse_up(&mut self, m: &MouseEvent) -> EventOutcome {
        if m.button != Button::Left || !self.is_runtime() {
            return EventOutcome::Ignore;
        }
        self.captured = false;
        self.edge = Edge::None;
        EventOutcome::Handle
    }

    /// Forget the edge when the pointer leaves the widget.
    pub fn on_mouse_leave(&mut self) -> EventOutcome {
        if !self.is_runtime() {
            return EventOutcome::Ignore;
        }
        self.edge = Edge::None;
        EventOutcome::Consume
    }

    /// Track the pointer. Outside a drag this updates the edge and cursor;
    /// during a drag on an edge it mutates the bounds.
    pub fn on_mouse_move(&mut self, host: &mut dyn GeometryHost, m: &MouseEvent) -> EventOutcome {
        if self.captured && self.edge != Edge::None {
            return if self.drag(host, m.location) {
                EventOutcome::Handle
            } else {
                EventOutcome::Consume
            };
        }
        let (edge, cursor) = self.hit_test(host, m.location);
        self.edge = edge;
        host.set_cursor(cursor);
        if self.is_runtime() {
            EventOutcome::Consume
        } else {
            EventOutcome::Ignore
        }
    }

    /// Classify a widget-relative point. Corners take priority over edges.
    pub fn hit_test(&self, host: &dyn GeometryHost, p: Point) -> (Edge, CursorKind) {
        if !self.is_runtime() {
            return (Edge::None, CursorKind::Default);
        }
        if self.mode == Mode::Moving {
            return (Edge::TopLeft, CursorKind::SizeAll);
        }
        let pad = host.padding().at_least(self.config.min_padding);
        let mh = i64::from(pad.horizontal());
        let mv = i64::from(pad.vertical());
        let b = host.bounds();
        let (w, h) = (i64::from(b.w), i64::from(b.h));
        let (x, y) = (i64::from(p.x), i64::from(p.y));
        let left = x <= mh;
        let right = x > w - (mh + 1);
        let top = y <= mv;
        let bottom = y > h - (mv + 1);
        match self.config.profile {
            Profile::Line {
                orientation: Orientation::Horizontal,
                ..
            } => {
                if left {
                    (Edge::Left, CursorKind::SizeWe)
                } else if x >= w - (mh + 1) {
                    (Edge::Right, CursorKind::SizeWe)
                } else {
                    (Edge::None, CursorKind::Default)
                }
            }
            Profile::Line {
                orientation: Orientation::Vertical,
                ..
            } => {
                if top {
                    (Edge::Top, CursorKind::SizeNs)
                } else if y >= h - (mv + 1) {
                    (Edge::Bottom, CursorKind::SizeNs)
                } else {
                    (Edge::None, CursorKind::Default)
                }
            }
            Profile::Standard => {
                if left && top {
                    (Edge::TopLeft, CursorKind::SizeAll)
                } else if x >= w - (mh + 1) && y >= h - (mv + 1) {
                    (Edge::BottomRight, CursorKind::SizeNwse)
                } else if left {
                    (Edge::Left, CursorKind::VSplit)
                } else if right {
                    (Edge::Right, CursorKind::VSplit)
                } else if top {
                    (Edge::Top, CursorKind::HSplit)
                } else if bottom {
                    (Edge::Bottom, CursorKind::HSplit)
                } else {
                    (Edge::None, CursorKind::Default)
                }
            }
        }
    }

    /// Mutate the bounds for a drag to widget-relative point `p`.
    fn drag(&mut self, host: &mut dyn GeometryHost, p: Point) -> bool {
        let b = host.bounds();
        let (x, y) = (i64::from(b.tl.x), i64::from(b.tl.y));
        let (w, h) = (i64::from(b.w), i64::from(b.h));
        let (ex, ey) = (i64::from(p.x), i64::from(p.y));
        let next = match self.mode {
            Mode::Idle => return false,
            Mode::Moving => {
                let (dx, dy) = p.delta(self.anchor);
                b.translate(dx, dy)
            }
            Mode::Resizing => match (self.config.profile, self.edge) {
                (_, Edge::None) => return false,
                (
                    Profile::Line {
                        orientation: Orientation::Horizontal,
                        ..
                    },
                    _,
                ) => b.with_size(span(ex), b.h),
                (
                    Profile::Line {
                        orientation: Orientation::Vertical,
                        ..
                    },
                    _,
                ) => b.with_size(b.w, span(ey)),
                (Profile::Standard, Edge::TopLeft) => b.translate(p.x, p.y),
                (Profile::Standard, Edge::Left) => {
                    let right = x + w;
                    let nx = (x + ex).min(right - i64::from(self.config.min_width)).max(0);
                    Rect::new(coord(nx), b.tl.y, span(right - nx), b.h)
                }
                (Profile::Standard, Edge::Right) => b.with_size(span(ex), b.h),
                (Profile::Standard, Edge::Top) => {
                    let bottom = y + h;
                    let ny = (y + ey).min(bottom - i64::from(self.config.min_height)).max(0);
                    Rect::new(b.tl.x, coord(ny), b.w, span(bottom - ny))
                }
                (Profile::Standard, Edge::Bottom) => b.with_size(b.w, span(ey)),
                (Profile::Standard, Edge::BottomRight) => b.with_size(span(ex), span(ey)),
            },
        };
        self.apply_bounds(host, next)
    }

    /// Nudge or grow the widget with the arrow keys; Escape cancels.
    pub fn on_key(&mut self, host: &mut dyn GeometryHost, key: Key) -> EventOutcome {
        if !self.is_runtime() {
            return EventOutcome::Ignore;
        }
        if key.code() == KeyCode::Esc {
            self.cancel(host);
            return EventOutcome::Handle;
        }
        let Some(dir) = key.code().direction() else {
            return EventOutcome::Ignore;
        };
        let mods = key.mods();
        let step = if mods.shift {
            STEP_FINE
        } else if mods.ctrl {
            STEP_MEDIUM
        } else {
            STEP
        };
        let (ox, oy) = dir.offset();
        let (dx, dy) = (i64::from(ox) * step, i64::from(oy) * step);
        let b = host.bounds();
        let (w, h) = (i64::from(b.w), i64::from(b.h));
        let next = match (self.mode, self.config.profile) {
            (Mode::Moving, _) => b.translate(coord(dx), coord(dy)),
            (
                Mode::Resizing,
                Profile::Line {
                    orientation: Orientation::Horizontal,
                    ..
                },
            ) => {
                if dx == 0 {
                    return EventOutcome::Consume;
                }
                b.with_size(span(w + dx), b.h)
            }
            (
                Mode::Resizing,
                Profile::Line {
                    orientation: Orientation::Vertical,
                    ..
                },
            ) => {
                if dy == 0 {
                    return EventOutcome::Consume;
                }
                b.with_size(b.w, span(h + dy))
            }
            (Mode::Resizing, Profile::Standard) => b.with_size(span(w + dx), span(h + dy)),
            (Mode::Idle, _) => return EventOutcome::Ignore,
        };
        if self.apply_bounds(host, next) {
            EventOutcome::Handle
        } else {
            EventOutcome::Consume
        }
    }

    /// Clamp `next` to a non-negative origin and the minimum size, then push it
    /// to the widget if it differs from the current bounds.
    fn apply_bounds(&mut self, host: &mut dyn GeometryHost, next: Rect) -> bool {
        let next = next.clamp_origin().at_least(self.config.minimum());
        let current = host.bounds();
        if next == current {
            return false;
        }
        host.set_bounds(next);
        host.invalidate();
        self.invalidate_siblings(host, current);
        self.invalidate_siblings(host, next);
        true
    }

    /// Separator lines repaint whatever they overlapped.
    fn invalidate_siblings(&self, host: &mut dyn GeometryHost, area: Rect) {
        if matches!(self.config.profile, Profile::Line { .. }) {
            host.invalidate_siblings(area);
        }
    }

    /// Force the cross dimension of a separator line.
    fn line_size(&self, host: &dyn GeometryHost, size: Expanse) -> Expanse {
        match self.config.profile {
            Profile::Standard => size,
            Profile::Line {
                orientation: Orientation::Horizontal,
                thickness,
            } => Expanse::new(size.w, thickness.saturating_add(host.padding().vertical())),
            Profile::Line {
                orientation: Orientation::Vertical,
                thickness,
            } => Expanse::new(thickness.saturating_add(host.padding().horizontal()), size.h),
        }
    }

    /// Apply a live-resolution record to the widget.
    ///
    /// Negative coordinates become zero. Unless the parent is a maximized
    /// top-level window, the widget is first translated and then shrunk so it
    /// ends within `clamp_ratio` of the parent on each axis. The size is only
    /// taken from the record when resizing is allowed. Returns whether the
    /// bounds changed.
    pub fn apply_geometry(&mut self, host: &mut dyn GeometryHost, record: &GeometryRecord) -> bool {
        let current = host.bounds();
        let loc = record.location();
        let (mut x, mut y) = (i64::from(loc.x.max(0)), i64::from(loc.y.max(0)));
        let size = if self.config.allow_resize {
            record.size()
        } else {
            current.expanse()
        };
        let size = self.line_size(host, size).at_least(self.config.minimum());
        let (mut w, mut h) = (i64::from(size.w), i64::from(size.h));

        if let Some(parent) = host.parent()
            && !parent.maximized_top_level
        {
            let ratio = self.config.clamp_ratio;
            let lw = (f64::from(parent.size.w) * ratio).floor() as i64;
            let lh = (f64::from(parent.size.h) * ratio).floor() as i64;
            if x + w > lw {
                x = (lw - w).max(0);
                if self.config.allow_resize && x + w > lw {
                    w = (lw - x).max(i64::from(self.config.min_width));
                }
            }
            if y + h > lh {
                y = (lh - h).max(0);
                if self.config.allow_resize && y + h > lh {
                    h = (lh - y).max(i64::from(self.config.min_height));
                }
            }
        }

        let next = Rect::new(coord(x), coord(y), span(w), span(h));
        if next == current {
            return false;
        }
        debug!("{}: apply {:?}", host.name(), next);
        host.set_bounds(next);
        host.invalidate();
        self.invalidate_siblings(host, current);
        self.invalidate_siblings(host, next);
        true
    }

    /// Restore the widget's persisted geometry.
    ///
    /// Skipped for invisible widgets. The stored record is scaled for the
    /// widget's screen; with no stored record the live bounds are used. The
    /// rollback point is refreshed afterwards. Returns whether the bounds
    /// changed.
    pub fn restore(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore) -> bool {
        if !host.is_visible() {
            debug!("{}: invisible, restore skipped", host.name());
            return false;
        }
        let record = match store.lookup(host.name(), host.form()) {
            Some(r) => ScreenScaler::scale_for_screen(&r, host.screen()),
            None => GeometryRecord::new(host.name(), host.form()).with_bounds(host.bounds()),
        };
        let changed = self.apply_geometry(host, &record);
        self.origin = host.bounds();
        changed
    }

    /// Persist the widget's live bounds at the record's reference resolution,
    /// then notify listeners. Returns whether the write was scheduled.
    pub fn save(&mut self, host: &mut dyn GeometryHost, store: &GeometryStore) -> bool {
        let bounds = host.bounds();
        let reference = store
            .lookup(host.name(), host.form())
            .map(|r| r.reference())
            .unwrap_or_else(|| store.reference());
        let mut live = GeometryRecord::new(host.name(), host.form())
            .with_parent(host.parent_control())
            .with_bounds(bounds);
        live.reference_width = reference.w;
        live.reference_height = reference.h;
        let record = ScreenScaler::to_reference(&live, host.screen());
        let scheduled = store.save(record.clone());

        self.origin = bounds;
        self.edge = Edge::None;
        let ev = GeometryChanged {
            name: host.name().to_string(),
            record,
        };
        for l in &mut self.listeners {
            l(&ev);
        }
        scheduled
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use proptest::prelude::*;

    use super::*;
    use crate::{
        config::{PersistMode, StoreConfig},
        event::key::{Ctrl, Empty, Shift},
        host::ParentInfo,
        tutils::{Call, MockHost},
    };

    fn store(dir: &tempfile::TempDir) -> Result<GeometryStore> {
        GeometryStore::open(
            &StoreConfig::new(dir.path().join("ControlesXYHL.json")).persist(PersistMode::Inline),
        )
    }

    fn host() -> MockHost {
        MockHost::new("btn1", Some("Main"), Rect::new(100, 100, 100, 50))
            .with_padding(geom::Padding::all(3))
    }

    fn resizing(h: &mut MockHost, s: &GeometryStore) -> Result<InteractiveGeometryController> {
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        c.toggle_resize(h, s);
        Ok(c)
    }

    #[test]
    fn toggles_are_exclusive() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        assert!(c.toggle_move(&mut h, &s));
        assert_eq!(c.mode(), Mode::Moving);
        assert!(h.focused);
        assert!(c.toggle_resize(&mut h, &s));
        assert_eq!(c.mode(), Mode::Resizing);
        assert!(s.is_empty());
        assert!(!c.toggle_resize(&mut h, &s));
        assert_eq!(c.mode(), Mode::Idle);
        assert_eq!(s.len(), 1);
        Ok(())
    }

    #[test]
    fn disabled_capability_ignores_toggle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c =
            InteractiveGeometryController::new(ControllerConfig::default().allow_move(false))?;
        assert!(!c.toggle_move(&mut h, &s));
        assert_eq!(c.mode(), Mode::Idle);
        assert!(h.calls.is_empty());
        Ok(())
    }

    #[test]
    fn revoking_capability_goes_idle() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = resizing(&mut h, &s)?;
        c.set_allow_resize(false);
        assert_eq!(c.mode(), Mode::Idle);
        assert!(!c.is_runtime());
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn edge_priority() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let c = resizing(&mut h, &s)?;
        // Padding of 3 on each side gives margins of 6.
        let cases = [
            ((0, 0), Edge::TopLeft, CursorKind::SizeAll),
            ((6, 6), Edge::TopLeft, CursorKind::SizeAll),
            ((99, 49), Edge::BottomRight, CursorKind::SizeNwse),
            ((93, 43), Edge::BottomRight, CursorKind::SizeNwse),
            ((3, 25), Edge::Left, CursorKind::VSplit),
            ((3, 49), Edge::Left, CursorKind::VSplit),
            ((95, 25), Edge::Right, CursorKind::VSplit),
            ((50, 2), Edge::Top, CursorKind::HSplit),
            ((99, 2), Edge::Right, CursorKind::VSplit),
            ((50, 45), Edge::Bottom, CursorKind::HSplit),
            ((50, 25), Edge::None, CursorKind::Default),
        ];
        for ((x, y), edge, cursor) in cases {
            assert_eq!(c.hit_test(&h, Point::new(x, y)), (edge, cursor), "at {x},{y}");
        }
        Ok(())
    }

    #[test]
    fn moving_hit_test() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        assert_eq!(
            c.hit_test(&h, Point::new(50, 25)),
            (Edge::None, CursorKind::Default)
        );
        c.toggle_move(&mut h, &s);
        assert_eq!(
            c.hit_test(&h, Point::new(50, 25)),
            (Edge::TopLeft, CursorKind::SizeAll)
        );
        Ok(())
    }

    #[test]
    fn drag_move() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        c.toggle_move(&mut h, &s);
        c.handle_event(&mut h, &MouseEvent::moved(20, 20).into());
        assert_eq!(h.cursor, CursorKind::SizeAll);
        assert_eq!(
            c.handle_event(&mut h, &MouseEvent::down(20, 20).into()),
            EventOutcome::Handle
        );
        c.handle_event(&mut h, &MouseEvent::moved(30, 15).into());
        assert_eq!(h.bounds, Rect::new(110, 95, 100, 50));
        c.handle_event(&mut h, &MouseEvent::up(30, 15).into());
        assert!(!c.is_captured());
        assert_eq!(c.edge(), Edge::None);
        assert!(c.is_moving());
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn drag_edges() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let cases = [
            ((95, 25), (120, 25), Rect::new(100, 100, 120, 50)),
            ((50, 45), (50, 70), Rect::new(100, 100, 100, 70)),
            ((95, 45), (80, 40), Rect::new(100, 100, 80, 40)),
            ((2, 25), (10, 25), Rect::new(110, 100, 90, 50)),
            ((50, 2), (50, -10), Rect::new(100, 90, 100, 60)),
            ((1, 1), (5, 4), Rect::new(105, 104, 100, 50)),
        ];
        for (start, to, want) in cases {
            let mut h = host();
            let mut c = resizing(&mut h, &s)?;
            c.handle_event(&mut h, &MouseEvent::moved(start.0, start.1).into());
            c.handle_event(&mut h, &MouseEvent::down(start.0, start.1).into());
            c.handle_event(&mut h, &MouseEvent::moved(to.0, to.1).into());
            assert_eq!(h.bounds, want, "from {start:?} to {to:?}");
        }
        Ok(())
    }

    #[test]
    fn drag_respects_minimum() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = InteractiveGeometryController::new(
            ControllerConfig::default().min_size(Expanse::new(20, 10)),
        )?;
        c.toggle_resize(&mut h, &s);
        c.handle_event(&mut h, &MouseEvent::moved(95, 45).into());
        c.handle_event(&mut h, &MouseEvent::down(95, 45).into());
        c.handle_event(&mut h, &MouseEvent::moved(-40, -40).into());
        assert_eq!(h.bounds, Rect::new(100, 100, 20, 10));
        Ok(())
    }

    #[test]
    fn near_edge_drags_keep_far_edge() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let cfg = ControllerConfig::default().min_size(Expanse::new(20, 10));
        let cases = [
            ((2, 25), (-40, 25), Rect::new(0, 100, 110, 50)),
            ((2, 25), (85, 25), Rect::new(90, 100, 20, 50)),
            ((50, 2), (50, -120), Rect::new(10, 0, 100, 150)),
            ((50, 2), (50, 45), Rect::new(10, 140, 100, 10)),
        ];
        for (start, to, want) in cases {
            let mut h = MockHost::new("btn1", Some("Main"), Rect::new(10, 100, 100, 50))
                .with_padding(geom::Padding::all(3));
            let mut c = InteractiveGeometryController::new(cfg)?;
            c.toggle_resize(&mut h, &s);
            c.handle_event(&mut h, &MouseEvent::moved(start.0, start.1).into());
            c.handle_event(&mut h, &MouseEvent::down(start.0, start.1).into());
            c.handle_event(&mut h, &MouseEvent::moved(to.0, to.1).into());
            assert_eq!(h.bounds, want, "from {start:?} to {to:?}");
        }
        Ok(())
    }

    #[test]
    fn mouse_ignored_when_idle() -> Result<()> {
        let mut h = host();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        assert_eq!(
            c.handle_event(&mut h, &MouseEvent::down(5, 5).into()),
            EventOutcome::Ignore
        );
        assert_eq!(
            c.handle_event(&mut h, &MouseEvent::moved(5, 5).into()),
            EventOutcome::Ignore
        );
        assert_eq!(h.cursor, CursorKind::Default);
        assert_eq!(c.handle_event(&mut h, &Event::MouseLeave), EventOutcome::Ignore);
        Ok(())
    }

    #[test]
    fn leave_clears_edge() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = resizing(&mut h, &s)?;
        c.handle_event(&mut h, &MouseEvent::moved(95, 25).into());
        assert_eq!(c.edge(), Edge::Right);
        c.handle_event(&mut h, &Event::MouseLeave);
        assert_eq!(c.edge(), Edge::None);
        Ok(())
    }

    #[test]
    fn arrow_steps() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        assert_eq!(
            c.handle_event(&mut h, &Event::Key(KeyCode::Right.into())),
            EventOutcome::Ignore
        );
        c.toggle_move(&mut h, &s);
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Right));
        assert_eq!(h.bounds.tl, Point::new(110, 100));
        c.handle_event(&mut h, &Event::Key(Shift + KeyCode::Up));
        assert_eq!(h.bounds.tl, Point::new(110, 99));
        c.handle_event(&mut h, &Event::Key(Ctrl + KeyCode::Left));
        assert_eq!(h.bounds.tl, Point::new(107, 99));
        c.handle_event(&mut h, &Event::Key((Shift + Ctrl) + KeyCode::Down));
        assert_eq!(h.bounds.tl, Point::new(107, 100));

        c.toggle_resize(&mut h, &s);
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Right));
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Up));
        assert_eq!(h.bounds, Rect::new(107, 100, 110, 40));
        Ok(())
    }

    #[test]
    fn escape_rolls_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host();
        let start = h.bounds;
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        c.toggle_move(&mut h, &s);
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Right));
        c.toggle_resize(&mut h, &s);
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Down));
        assert_ne!(h.bounds, start);
        assert_eq!(
            c.handle_event(&mut h, &Event::Key(KeyCode::Esc.into())),
            EventOutcome::Handle
        );
        assert_eq!(h.bounds, start);
        assert_eq!(c.mode(), Mode::Idle);
        assert!(s.is_empty());
        assert!(!c.cancel(&mut h));
        Ok(())
    }

    #[test]
    fn save_notifies_and_refreshes_origin() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = host()
            .with_screen(Expanse::new(960, 540))
            .with_parent_control("panel1");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        let sink = seen.clone();
        c.on_geometry_changed(move |e| sink.borrow_mut().push(e.clone()));

        c.toggle_move(&mut h, &s);
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Right));
        assert!(!c.toggle_move(&mut h, &s));
        assert_eq!(c.origin(), Rect::new(110, 100, 100, 50));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, "btn1");
        // Stored at the 1920x1080 reference: live values are doubled.
        assert_eq!(seen[0].record.x, 220.0);
        assert_eq!(seen[0].record.width, 200.0);
        let stored = s.lookup("btn1", Some("Main"));
        assert_eq!(stored.as_ref().map(|r| (r.x, r.y)), Some((220.0, 200.0)));
        assert_eq!(
            stored.and_then(|r| r.parent_control),
            Some("panel1".to_string())
        );
        Ok(())
    }

    #[test]
    fn apply_clamps_to_parent() -> Result<()> {
        let mut h = host().with_parent(ParentInfo::new(Expanse::new(1000, 500)));
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        let r = GeometryRecord::new("btn1", Some("Main")).with_geometry(-5.0, 800.0, 300.0, 600.0)?;
        assert!(c.apply_geometry(&mut h, &r));
        // 0.88 of 1000x500 is 880x440; the height also has to shrink.
        assert_eq!(h.bounds, Rect::new(0, 0, 300, 440));
        assert_eq!(h.invalidations(), 1);
        // Same bounds again: nothing to repaint.
        assert!(!c.apply_geometry(&mut h, &r));
        assert_eq!(h.invalidations(), 1);
        Ok(())
    }

    #[test]
    fn apply_skips_clamp_for_maximized() -> Result<()> {
        let mut h = host().with_parent(ParentInfo::maximized(Expanse::new(1000, 500)));
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        let r = GeometryRecord::new("btn1", Some("Main")).with_geometry(900.0, 10.0, 300.0, 60.0)?;
        c.apply_geometry(&mut h, &r);
        assert_eq!(h.bounds, Rect::new(900, 10, 300, 60));
        Ok(())
    }

    #[test]
    fn apply_keeps_size_without_resize() -> Result<()> {
        let mut h = host();
        let mut c =
            InteractiveGeometryController::new(ControllerConfig::default().allow_resize(false))?;
        let r = GeometryRecord::new("btn1", Some("Main")).with_geometry(5.0, 6.0, 300.0, 60.0)?;
        c.apply_geometry(&mut h, &r);
        assert_eq!(h.bounds, Rect::new(5, 6, 100, 50));
        Ok(())
    }

    #[test]
    fn apply_unchanged_does_not_invalidate() -> Result<()> {
        let mut h = host();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        let r = GeometryRecord::new("btn1", Some("Main")).with_bounds(h.bounds);
        assert!(!c.apply_geometry(&mut h, &r));
        assert!(h.calls.is_empty());
        Ok(())
    }

    #[test]
    fn restore_scales_stored_record() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        s.save(GeometryRecord::new("btn1", Some("Main")).with_geometry(100.0, 60.0, 80.0, 30.0)?);
        let mut h = host().with_screen(Expanse::new(960, 540));
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        assert!(c.restore(&mut h, &s));
        assert_eq!(h.bounds, Rect::new(50, 30, 40, 15));
        assert_eq!(c.origin(), h.bounds);
        Ok(())
    }

    #[test]
    fn restore_skips_invisible() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        s.save(GeometryRecord::new("btn1", Some("Main")).with_geometry(1.0, 1.0, 8.0, 3.0)?);
        let mut h = host().hidden();
        let mut c = InteractiveGeometryController::new(ControllerConfig::default())?;
        assert!(!c.restore(&mut h, &s));
        assert!(h.calls.is_empty());
        Ok(())
    }

    #[test]
    fn line_profile() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let s = store(&dir)?;
        let mut h = MockHost::new("line1", Some("Main"), Rect::new(10, 10, 200, 20))
            .with_padding(geom::Padding::all(1));
        let mut c = InteractiveGeometryController::new(
            ControllerConfig::default().line(Orientation::Horizontal, 2),
        )?;
        c.restore(&mut h, &s);
        assert_eq!(h.bounds, Rect::new(10, 10, 200, 4));

        c.toggle_resize(&mut h, &s);
        assert_eq!(
            c.hit_test(&h, Point::new(1, 1)),
            (Edge::Left, CursorKind::SizeWe)
        );
        assert_eq!(
            c.hit_test(&h, Point::new(100, 1)),
            (Edge::None, CursorKind::Default)
        );
        // Margins are 2 here; the far edge includes its boundary pixel.
        assert_eq!(
            c.hit_test(&h, Point::new(197, 1)),
            (Edge::Right, CursorKind::SizeWe)
        );
        assert_eq!(
            c.hit_test(&h, Point::new(196, 1)),
            (Edge::None, CursorKind::Default)
        );
        c.handle_event(&mut h, &MouseEvent::moved(198, 1).into());
        c.handle_event(&mut h, &MouseEvent::down(198, 1).into());
        c.handle_event(&mut h, &MouseEvent::moved(150, 30).into());
        assert_eq!(h.bounds, Rect::new(10, 10, 150, 4));
        assert!(
            h.calls
                .iter()
                .any(|c| matches!(c, Call::InvalidateSiblings(_)))
        );

        c.handle_event(&mut h, &MouseEvent::up(150, 30).into());
        assert_eq!(
            c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Down)),
            EventOutcome::Consume
        );
        c.handle_event(&mut h, &Event::Key(Empty + KeyCode::Right));
        assert_eq!(h.bounds, Rect::new(10, 10, 160, 4));
        Ok(())
    }

    proptest! {
        #[test]
        fn clamp_invariant(
            x in -2000.0f64..4000.0,
            y in -2000.0f64..4000.0,
            w in 0.0f64..4000.0,
            h in 0.0f64..4000.0,
            pw in 10u32..4000,
            ph in 10u32..4000,
        ) {
            let mut host = MockHost::new("p", None, Rect::new(0, 0, 10, 10))
                .with_parent(ParentInfo::new(Expanse::new(pw, ph)));
            let mut c = InteractiveGeometryController::new(ControllerConfig::default()).unwrap();
            let r = GeometryRecord::new("p", None).with_geometry(x, y, w, h).unwrap();
            c.apply_geometry(&mut host, &r);
            let b = host.bounds;
            prop_assert!(b.tl.x >= 0 && b.tl.y >= 0);
            prop_assert!(b.w >= 2 && b.h >= 2);
            prop_assert!(f64::from(b.right()) <= 0.88 * f64::from(pw));
            prop_assert!(f64::from(b.bottom()) <= 0.88 * f64::from(ph));
        }

        #[test]
        fn drag_sequences_stay_clamped(
            start in (0i32..100, 0i32..100),
            moves in proptest::collection::vec((-300i32..300, -300i32..300), 1..20),
        ) {
            let s = GeometryStore::open(
                &StoreConfig::new("/nonexistent/xyhl.json").persist(PersistMode::Inline),
            ).unwrap();
            let mut h = MockHost::new("p", None, Rect::new(50, 50, 100, 100));
            let mut c = InteractiveGeometryController::new(
                ControllerConfig::default().min_size(Expanse::new(8, 8)),
            ).unwrap();
            c.toggle_resize(&mut h, &s);
            c.handle_event(&mut h, &MouseEvent::moved(start.0, start.1).into());
            c.handle_event(&mut h, &MouseEvent::down(start.0, start.1).into());
            for (x, y) in moves {
                c.handle_event(&mut h, &MouseEvent::moved(x, y).into());
                let b = h.bounds;
                prop_assert!(b.tl.x >= 0 && b.tl.y >= 0);
                prop_assert!(b.w >= 8 && b.h >= 8);
            }
        }
    }
}
