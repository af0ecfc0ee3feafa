//! Wire payloads exchanged with the host process.
//!
//! Live events report a press or release happening now. Predictive events
//! announce a note that will sound `time_length_ms` from now; the same
//! payload is handed back to the playback subsystem when it is due.

use serde::{Deserialize, Serialize};

use super::error::ProtocolError;
use super::midi::{NoteMessage, NoteStatus};
use crate::keys::PianoKey;

/// A live note event from a device or the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveNoteEvent {
    pub channel: u8,
    /// 144 for note-on, 128 for note-off.
    pub event_type: NoteStatus,
    /// Note number as sent by the host. Checked against the keyboard range
    /// when the event is applied.
    pub key: i64,
    pub velocity: u8,
}

impl LiveNoteEvent {
    pub fn note_on(key: i64, velocity: u8) -> Self {
        Self {
            channel: 0,
            event_type: NoteStatus::On,
            key,
            velocity,
        }
    }

    pub fn note_off(key: i64) -> Self {
        Self {
            channel: 0,
            event_type: NoteStatus::Off,
            key,
            velocity: 0,
        }
    }

    /// Build from a raw three-byte MIDI message.
    pub fn from_midi(data: &[u8]) -> Result<Self, ProtocolError> {
        let msg = NoteMessage::from_bytes(data)?;
        Ok(Self {
            channel: msg.channel,
            event_type: msg.status,
            key: msg.note as i64,
            velocity: msg.velocity,
        })
    }

    /// The key this event targets.
    pub fn piano_key(&self) -> Result<PianoKey, ProtocolError> {
        PianoKey::from_i64(self.key).ok_or(ProtocolError::KeyOutOfRange(self.key))
    }
}

/// A note announced ahead of time by the playback scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveNoteEvent {
    /// Raw MIDI message `[status, key, velocity]` to play when due.
    pub message: [u8; 3],
    /// Milliseconds until the note must sound.
    pub time_length_ms: f64,
    /// Explicit on/off flag. When absent it is derived from the status byte.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_note_on: Option<bool>,
}

impl PredictiveNoteEvent {
    pub fn new(message: [u8; 3], time_length_ms: f64) -> Self {
        Self {
            message,
            time_length_ms,
            is_note_on: None,
        }
    }

    /// Decode the carried MIDI message.
    pub fn note(&self) -> Result<NoteMessage, ProtocolError> {
        NoteMessage::from_bytes(&self.message)
    }

    /// Whether this announces a note onset.
    pub fn is_note_on(&self) -> bool {
        match self.is_note_on {
            Some(flag) => flag,
            None => self.note().map(|m| m.is_note_on()).unwrap_or(false),
        }
    }

    /// The key this event targets.
    pub fn piano_key(&self) -> Result<PianoKey, ProtocolError> {
        let note = self.message[1] as i64;
        PianoKey::from_i64(note).ok_or(ProtocolError::KeyOutOfRange(note))
    }
}

/// One line of the host event stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WireEvent {
    Live(LiveNoteEvent),
    Predictive(PredictiveNoteEvent),
    /// Raw MIDI bytes from a device.
    Midi { bytes: Vec<u8> },
    /// Speed slider position.
    Speed { value: f64 },
}

impl WireEvent {
    /// Decode one JSON line.
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(line)?)
    }
}
