//! Render surface binding: where each key sits on screen.
//!
//! Coordinates are surface pixels with the origin at the top-left and y
//! growing downward. The keyboard occupies the bottom `keyboard_fraction`
//! of the viewport.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::keys::PianoKey;

/// Black key width relative to a white key slot.
const BLACK_KEY_WIDTH_RATIO: f64 = 0.6;
/// Black key height relative to the keyboard height.
const BLACK_KEY_HEIGHT_RATIO: f64 = 0.6;
/// Gap between white keys relative to a white key slot.
const WHITE_KEY_GAP_RATIO: f64 = 0.07;

/// Screen rectangle of one key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyRect {
    pub left: f64,
    pub width: f64,
    pub top: f64,
    pub height: f64,
}

impl KeyRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }
}

/// Fixed insets that shape the beam travel area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceInsets {
    /// Line predictive beams start from.
    pub header_px: f64,
    /// Fraction of the viewport height taken by the keyboard.
    pub keyboard_fraction: f64,
    /// Extra inset subtracted from the predictive travel distance.
    pub footer_px: f64,
}

impl Default for SurfaceInsets {
    fn default() -> Self {
        Self {
            header_px: 64.0,
            keyboard_fraction: 0.122,
            footer_px: 92.0,
        }
    }
}

/// Key rectangles for the current viewport, plus mount state per key.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    width: f64,
    viewport_height: f64,
    insets: SurfaceInsets,
    rects: [KeyRect; PianoKey::COUNT],
    mounted: [bool; PianoKey::COUNT],
}

impl KeyboardLayout {
    /// Lay out all 88 keys across `width`, all mounted.
    pub fn new(width: f64, viewport_height: f64, insets: SurfaceInsets) -> Self {
        let mut layout = Self {
            width: 0.0,
            viewport_height: 0.0,
            insets,
            rects: [KeyRect {
                left: 0.0,
                width: 0.0,
                top: 0.0,
                height: 0.0,
            }; PianoKey::COUNT],
            mounted: [true; PianoKey::COUNT],
        };
        layout.resize(width, viewport_height);
        layout
    }

    /// Recompute key rectangles for a new viewport. Mount state is kept.
    pub fn resize(&mut self, width: f64, viewport_height: f64) {
        let width = width.max(0.0);
        let viewport_height = viewport_height.max(0.0);
        if width == self.width && viewport_height == self.viewport_height {
            return;
        }
        self.width = width;
        self.viewport_height = viewport_height;

        let keyboard_top = self.keyboard_top();
        let keyboard_height = viewport_height - keyboard_top;
        let slot = width / PianoKey::WHITE_COUNT as f64;

        for key in PianoKey::all() {
            let white_index = key.white_index() as f64;
            self.rects[key.index()] = if key.is_black() {
                let black_width = slot * BLACK_KEY_WIDTH_RATIO;
                KeyRect {
                    left: white_index * slot - black_width / 2.0,
                    width: black_width,
                    top: keyboard_top,
                    height: keyboard_height * BLACK_KEY_HEIGHT_RATIO,
                }
            } else {
                KeyRect {
                    left: white_index * slot,
                    width: slot * (1.0 - WHITE_KEY_GAP_RATIO),
                    top: keyboard_top,
                    height: keyboard_height,
                }
            };
        }
        debug!("Keyboard laid out at {:.0}x{:.0}", width, viewport_height);
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn insets(&self) -> SurfaceInsets {
        self.insets
    }

    /// Top edge of the keyboard.
    pub fn keyboard_top(&self) -> f64 {
        self.viewport_height * (1.0 - self.insets.keyboard_fraction)
    }

    /// Line predictive beams start from.
    pub fn predictive_start_px(&self) -> f64 {
        self.insets.header_px
    }

    /// Distance a predictive beam travels to the touch line:
    /// viewport height minus the keyboard and the footer inset.
    pub fn distance_to_touch(&self) -> f64 {
        (self.viewport_height - self.viewport_height * self.insets.keyboard_fraction
            - self.insets.footer_px)
            .max(0.0)
    }

    /// Rectangle of a mounted key.
    pub fn key_rect(&self, key: PianoKey) -> Option<KeyRect> {
        if self.mounted[key.index()] {
            Some(self.rects[key.index()])
        } else {
            None
        }
    }

    pub fn is_mounted(&self, key: PianoKey) -> bool {
        self.mounted[key.index()]
    }

    /// Detach a key element. Returns false if it was already detached.
    pub fn unmount(&mut self, key: PianoKey) -> bool {
        std::mem::replace(&mut self.mounted[key.index()], false)
    }

    /// Reattach a key element. Returns false if it was already attached.
    pub fn mount(&mut self, key: PianoKey) -> bool {
        !std::mem::replace(&mut self.mounted[key.index()], true)
    }

    /// Key under a surface point. Black keys sit on top of white keys.
    pub fn key_at(&self, x: f64, y: f64) -> Option<PianoKey> {
        let hit = |black: bool| {
            PianoKey::all()
                .filter(|k| k.is_black() == black)
                .find(|k| self.key_rect(*k).is_some_and(|r| r.contains(x, y)))
        };
        hit(true).or_else(|| hit(false))
    }
}
