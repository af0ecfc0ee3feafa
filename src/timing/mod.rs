//! Timing module
//!
//! Speed control, the shared beam timing computation, and time sources.

pub mod beam_timing;
pub mod clock;
pub mod speed;

pub use beam_timing::{pixels_for_elapsed, BeamTiming, DEFAULT_PIXELS_PER_SECOND};
pub use clock::{Clock, ManualClock, SystemClock};
pub use speed::{
    speed_percent, SpeedController, SpeedMultiplier, DEFAULT_SPEED_VALUE, MIN_SPEED_PERCENT,
};
