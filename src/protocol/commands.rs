//! Engine Inputs and Outputs
//!
//! Messages flowing into the visualizer engine from event sources, and the
//! playback requests flowing out of it. All types are Send + 'static so they
//! can cross the SPSC queues.

use super::events::{LiveNoteEvent, PredictiveNoteEvent, WireEvent};
use crate::keys::{PianoKey, PointerAction};

/// Everything that can change engine state.
#[derive(Debug, Clone)]
pub enum EngineInput {
    /// Live note-on/off from a device or the host.
    Live(LiveNoteEvent),

    /// Raw MIDI bytes, classified by status byte.
    Midi(Vec<u8>),

    /// A note announced ahead of time.
    Predictive(PredictiveNoteEvent),

    /// Pointer interaction on a key element.
    Pointer {
        key: PianoKey,
        action: PointerAction,
    },

    /// New speed slider position.
    SetSpeed(f64),

    /// Remove a key element from the surface.
    Unmount(PianoKey),

    /// Put a key element back on the surface.
    Mount(PianoKey),

    /// The drawing surface changed size.
    Resize { width: f64, height: f64 },
}

impl From<WireEvent> for EngineInput {
    fn from(event: WireEvent) -> Self {
        match event {
            WireEvent::Live(e) => EngineInput::Live(e),
            WireEvent::Predictive(e) => EngineInput::Predictive(e),
            WireEvent::Midi { bytes } => EngineInput::Midi(bytes),
            WireEvent::Speed { value } => EngineInput::SetSpeed(value),
        }
    }
}

/// Identifier of a scheduled playback trigger.
pub type TriggerId = u64;

/// A playback command whose delay has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    /// Trigger that produced this request.
    pub id: TriggerId,
    /// The original predictive payload, passed through untouched.
    pub payload: PredictiveNoteEvent,
    /// When the trigger was scheduled (engine clock, ms).
    pub scheduled_at_ms: f64,
    /// When it was due.
    pub due_ms: f64,
    /// When it actually fired.
    pub fired_at_ms: f64,
}

/// Receiver of playback commands. Fire-and-forget: nothing is returned.
pub trait PlaybackSink {
    fn trigger_playback(&mut self, request: PlaybackRequest);
}

impl PlaybackSink for Vec<PlaybackRequest> {
    fn trigger_playback(&mut self, request: PlaybackRequest) {
        self.push(request);
    }
}
