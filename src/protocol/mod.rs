//! Protocol module
//!
//! Boundary types: raw MIDI classification, host wire payloads, engine
//! input/output messages, and the SPSC queues that carry them.

pub mod channels;
pub mod commands;
pub mod error;
pub mod events;
pub mod midi;

pub use channels::{
    ChannelError, EngineHandle, EventChannels, InputSender, PlaybackReceiver,
    DEFAULT_INPUT_BUFFER_SIZE, DEFAULT_PLAYBACK_BUFFER_SIZE,
};
pub use commands::{EngineInput, PlaybackRequest, PlaybackSink, TriggerId};
pub use error::ProtocolError;
pub use events::{LiveNoteEvent, PredictiveNoteEvent, WireEvent};
pub use midi::{NoteMessage, NoteStatus};
