//! The beam entity and its styling.

use serde::{Deserialize, Serialize};

use crate::keys::PianoKey;

/// Unique identifier of a beam. Never reused within an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeamId(pub u64);

/// Lifecycle phase of a beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeamKind {
    /// Key held: grows upward from the key, bottom edge anchored.
    LiveGrow,
    /// Key released: scrolls upward until it leaves the surface.
    LiveFallAway,
    /// Upcoming note: grows downward from the start line.
    PredictiveGrow,
    /// Upcoming note: glides down to the touch line.
    PredictiveRelease,
}

impl BeamKind {
    pub fn is_live(self) -> bool {
        matches!(self, BeamKind::LiveGrow | BeamKind::LiveFallAway)
    }
}

/// RGBA color, serialized as `[r, g, b, a]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn r(&self) -> u8 {
        self.0[0]
    }

    pub fn g(&self) -> u8 {
        self.0[1]
    }

    pub fn b(&self) -> u8 {
        self.0[2]
    }

    pub fn a(&self) -> u8 {
        self.0[3]
    }
}

/// Which ends of a beam are drawn rounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Corners {
    pub top: bool,
    pub bottom: bool,
}

/// Geometry constants applied when beams are created.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeamStyle {
    /// Gap between a live beam's bottom edge and the key's top edge.
    pub live_gap_px: f64,
    /// Height a beam starts with.
    pub initial_height_px: f64,
    /// Radius used for rounded ends.
    pub corner_radius_px: f64,
}

impl Default for BeamStyle {
    fn default() -> Self {
        Self {
            live_gap_px: 7.0,
            initial_height_px: 5.0,
            corner_radius_px: 5.0,
        }
    }
}

/// A transient visual bar for one note.
///
/// Only the beam's own task mutates its geometry; the render pass reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct Beam {
    pub id: BeamId,
    pub key: PianoKey,
    pub kind: BeamKind,
    pub left_px: f64,
    pub width_px: f64,
    pub top_px: f64,
    pub height_px: f64,
    /// Vertical offset applied on top of `top_px` during a glide.
    pub translate_y_px: f64,
    pub color: Rgba,
    pub corners: Corners,
}

impl Beam {
    /// Rendered top edge.
    #[inline]
    pub fn visual_top(&self) -> f64 {
        self.top_px + self.translate_y_px
    }

    /// Rendered bottom edge.
    #[inline]
    pub fn visual_bottom(&self) -> f64 {
        self.visual_top() + self.height_px
    }
}
