//! Sync module
//!
//! Schedules predictive notes: falling beams plus the playback triggers
//! timed to their arrival.

pub mod synchronizer;
pub mod trigger;

pub use synchronizer::{FutureEventSynchronizer, ScheduledNote};
pub use trigger::{TriggerPolicy, TriggerScheduler};
