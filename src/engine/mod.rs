//! Engine module
//!
//! The visualizer engine, the clock-paced loop that drives it, and the
//! thread that runs that loop behind the viewer.

pub mod runner;
pub mod visualizer;
pub mod worker;

pub use runner::{run_headless, run_loop, FrameReport, RunStats, HEADLESS_FRAME_MS};
pub use visualizer::{DrainStats, VisualizerEngine};
pub use worker::{EngineWorker, FrameSnapshot, SnapshotPublisher, SnapshotReceiver};
