//! Widgets module
//!
//! Custom painters for the visualizer: the 88-key keyboard and the beams
//! above it.

pub mod beams;
pub mod keyboard;

pub use beams::{beam_rect, beam_rounding, paint_beams};
pub use keyboard::{keyboard_input, paint_keys, KeyboardConfig, KeyboardOutput, KeyboardPointer};

use egui::Color32;

use crate::beam::Rgba;

/// Convert an engine color to an egui color.
pub fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}
