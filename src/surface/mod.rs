//! Surface module
//!
//! Maps keys to screen rectangles and composes the per-frame scene.

pub mod layout;
pub mod scene;

pub use layout::{KeyRect, KeyboardLayout, SurfaceInsets};
pub use scene::{KeyVisual, Palette, Scene};
