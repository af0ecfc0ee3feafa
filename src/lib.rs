//! Key Beam Library
//!
//! A virtual piano keyboard that mirrors live and scheduled note events as
//! light beams, with playback triggers timed to the beams' arrival.

pub mod app;
pub mod beam;
pub mod config;
pub mod engine;
pub mod keys;
pub mod protocol;
pub mod surface;
pub mod sync;
pub mod timing;
pub mod widgets;
