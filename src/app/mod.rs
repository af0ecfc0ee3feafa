//! Application module
//!
//! Contains the egui viewer application and theme definitions.

pub mod theme;
pub mod viewer_app;

pub use viewer_app::ViewerApp;
