//! Beam module
//!
//! Beam entities and the cooperative tasks that animate them: live beams
//! for keys being played, predictive beams for notes about to sound, and
//! the registry the frame clock iterates.

pub mod beam;
pub mod live;
pub mod predictive;
pub mod registry;

pub use beam::{Beam, BeamId, BeamKind, BeamStyle, Corners, Rgba};
pub use live::LiveBeamTask;
pub use predictive::PredictiveBeamTask;
pub use registry::{BeamRegistry, BeamTask, FrameContext, FrameStats, StepOutcome};
