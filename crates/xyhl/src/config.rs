//! Configuration for the geometry store and the interactive controller.

use std::path::{Path, PathBuf};

use geom::Expanse;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    record::{DEFAULT_REFERENCE_HEIGHT, DEFAULT_REFERENCE_WIDTH},
};

/// File name of the persisted geometry collection.
pub const STORE_FILE: &str = "ControlesXYHL.json";

/// How the store writes the collection back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// A dedicated writer thread. Pending snapshots are coalesced so only the
    /// newest is written.
    #[default]
    Background,
    /// Write on the caller's thread before `save` returns.
    Inline,
}

/// Configuration for [`GeometryStore`](crate::GeometryStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Location of the JSON file.
    pub path: PathBuf,
    /// Write strategy.
    #[serde(default)]
    pub persist: PersistMode,
    /// Reference width given to records captured fresh from a live widget.
    #[serde(default = "default_reference_width")]
    pub reference_width: u32,
    /// Reference height given to records captured fresh from a live widget.
    #[serde(default = "default_reference_height")]
    pub reference_height: u32,
}

/// Serde default for `reference_width`.
fn default_reference_width() -> u32 {
    DEFAULT_REFERENCE_WIDTH
}

/// Serde default for `reference_height`.
fn default_reference_height() -> u32 {
    DEFAULT_REFERENCE_HEIGHT
}

impl StoreConfig {
    /// A background-writing store at `path` with a 1920x1080 reference.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            persist: PersistMode::default(),
            reference_width: DEFAULT_REFERENCE_WIDTH,
            reference_height: DEFAULT_REFERENCE_HEIGHT,
        }
    }

    /// The store file inside the user's configuration directory for `app`.
    /// Falls back to the current directory when the platform has none.
    pub fn default_location(app: &str) -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app)
            .join(STORE_FILE)
    }

    /// Configuration rooted at [`default_location`](Self::default_location).
    pub fn for_app(app: &str) -> Self {
        Self::new(Self::default_location(app))
    }

    /// Set the write strategy.
    pub fn persist(mut self, mode: PersistMode) -> Self {
        self.persist = mode;
        self
    }

    /// Set the reference resolution for freshly captured records.
    pub fn reference(mut self, reference: Expanse) -> Self {
        self.reference_width = reference.w;
        self.reference_height = reference.h;
        self
    }

    /// The reference resolution for freshly captured records.
    pub fn default_reference(&self) -> Expanse {
        Expanse::new(self.reference_width, self.reference_height)
    }

    /// Reject configurations the store cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.reference_width == 0 || self.reference_height == 0 {
            return Err(Error::Invalid(format!(
                "zero reference resolution {}x{}",
                self.reference_width, self.reference_height
            )));
        }
        if self.path.as_os_str().is_empty() {
            return Err(Error::Invalid("empty store path".into()));
        }
        Ok(())
    }
}

/// Axis of a separator line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// The line runs left to right and is resized by its width.
    Horizontal,
    /// The line runs top to bottom and is resized by its height.
    Vertical,
}

/// Interaction profile of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    /// An ordinary widget resized from any edge.
    #[default]
    Standard,
    /// A separator line: the cross dimension is fixed to `thickness` plus
    /// padding and only the main dimension can be resized.
    Line {
        /// Line direction.
        orientation: Orientation,
        /// Stroke thickness.
        thickness: u32,
    },
}

/// Configuration for an
/// [`InteractiveGeometryController`](crate::InteractiveGeometryController).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// May the widget be moved at runtime?
    pub allow_move: bool,
    /// May the widget be resized at runtime?
    pub allow_resize: bool,
    /// Smallest width any bounds change may produce.
    pub min_width: u32,
    /// Smallest height any bounds change may produce.
    pub min_height: u32,
    /// Lower bound for each side of the hit-test padding. Plain widgets use
    /// 1, composite widgets 3.
    pub min_padding: u32,
    /// Fraction of the parent a restored widget may extend to.
    pub clamp_ratio: f64,
    /// Interaction profile.
    pub profile: Profile,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            allow_move: true,
            allow_resize: true,
            min_width: 2,
            min_height: 2,
            min_padding: 1,
            clamp_ratio: 0.88,
            profile: Profile::Standard,
        }
    }
}

impl ControllerConfig {
    /// Enable or disable runtime moving.
    pub fn allow_move(mut self, v: bool) -> Self {
        self.allow_move = v;
        self
    }

    /// Enable or disable runtime resizing.
    pub fn allow_resize(mut self, v: bool) -> Self {
        self.allow_resize = v;
        self
    }

    /// Set the minimum size.
    pub fn min_size(mut self, min: Expanse) -> Self {
        self.min_width = min.w;
        self.min_height = min.h;
        self
    }

    /// Set the minimum hit-test padding.
    pub fn min_padding(mut self, v: u32) -> Self {
        self.min_padding = v;
        self
    }

    /// Set the restore clamp ratio.
    pub fn clamp_ratio(mut self, v: f64) -> Self {
        self.clamp_ratio = v;
        self
    }

    /// Use the separator-line profile.
    pub fn line(mut self, orientation: Orientation, thickness: u32) -> Self {
        self.profile = Profile::Line {
            orientation,
            thickness,
        };
        self
    }

    /// The minimum size as an expanse.
    pub fn minimum(&self) -> Expanse {
        Expanse::new(self.min_width, self.min_height)
    }

    /// Reject configurations the controller cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(self.clamp_ratio > 0.0 && self.clamp_ratio <= 1.0) {
            return Err(Error::Invalid(format!(
                "clamp ratio {} outside (0, 1]",
                self.clamp_ratio
            )));
        }
        Ok(())
    }
}
