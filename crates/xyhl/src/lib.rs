//! Interactive widget geometry: drag to move, drag to resize, nudge with the
//! keyboard, roll back with Escape, and persist the result across runs and
//! screens of different resolutions.
//!
//! The crate never talks to a concrete toolkit. Widgets are reached through
//! the [`GeometryHost`] capability trait, geometry is persisted through an
//! injected [`GeometryStore`], and work originating off the UI thread is
//! marshalled back through a [`Dispatcher`].

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod host;
pub mod menu;
pub mod record;
pub mod scale;
pub mod store;
pub mod tutils;

pub use config::{ControllerConfig, Orientation, PersistMode, Profile, StoreConfig};
pub use controller::{
    Edge, EventOutcome, GeometryChanged, InteractiveGeometryController, Mode,
};
pub use dispatch::{Command, Dispatcher, UiHandle};
pub use error::{Error, Result};
pub use host::{CursorKind, GeometryHost, ParentInfo};
pub use menu::{Capabilities, ContextMenu, MenuAction, MenuBinder, MenuItem};
pub use record::GeometryRecord;
pub use scale::ScreenScaler;
pub use store::{GeometryStore, WriteStats};

pub use geom;
pub use geom::{Direction, Expanse, Padding, Point, Rect};
