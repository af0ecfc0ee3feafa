//! Errors raised while decoding external event payloads.

use thiserror::Error;

/// A payload from the host or device layer that could not be decoded.
///
/// The engine never propagates these past the boundary: the offending event
/// is logged and dropped.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("MIDI message too short: expected 3 bytes, got {0}")]
    ShortMessage(usize),

    #[error("Unsupported MIDI status byte: {0:#04x}")]
    UnsupportedStatus(u8),

    #[error("Invalid note status code: {0}")]
    InvalidNoteStatus(u8),

    #[error("Key {0} is outside the piano range 21-108")]
    KeyOutOfRange(i64),

    #[error("Malformed event payload: {0}")]
    Json(#[from] serde_json::Error),
}
