//! Raw MIDI note message classification.
//!
//! Only note-on and note-off matter to the keyboard. Everything else is
//! reported as unsupported and dropped by the caller.

use serde::{Deserialize, Serialize};

use super::error::ProtocolError;

/// Status code for note-on (channel bits cleared).
pub const NOTE_ON_STATUS: u8 = 0x90;
/// Status code for note-off (channel bits cleared).
pub const NOTE_OFF_STATUS: u8 = 0x80;

/// Whether a note message starts or ends a note.
///
/// Serialized as the raw status code (144 / 128).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NoteStatus {
    On,
    Off,
}

impl NoteStatus {
    /// Classify a status byte, ignoring the channel nibble.
    pub fn classify(status: u8) -> Option<Self> {
        match status & 0xF0 {
            NOTE_ON_STATUS => Some(NoteStatus::On),
            NOTE_OFF_STATUS => Some(NoteStatus::Off),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            NoteStatus::On => NOTE_ON_STATUS,
            NoteStatus::Off => NOTE_OFF_STATUS,
        }
    }
}

impl TryFrom<u8> for NoteStatus {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            NOTE_ON_STATUS => Ok(NoteStatus::On),
            NOTE_OFF_STATUS => Ok(NoteStatus::Off),
            other => Err(ProtocolError::InvalidNoteStatus(other)),
        }
    }
}

impl From<NoteStatus> for u8 {
    fn from(status: NoteStatus) -> Self {
        status.code()
    }
}

/// A decoded note message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteMessage {
    /// On or off. A note-on with velocity 0 is reported as off.
    pub status: NoteStatus,
    /// MIDI channel (0-15).
    pub channel: u8,
    /// Note number (0-127), not yet range-checked against the keyboard.
    pub note: u8,
    /// Velocity (0-127).
    pub velocity: u8,
}

impl NoteMessage {
    /// Decode a three-byte note message.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.len() < 3 {
            return Err(ProtocolError::ShortMessage(data.len()));
        }

        let status_byte = data[0];
        let status = NoteStatus::classify(status_byte)
            .ok_or(ProtocolError::UnsupportedStatus(status_byte))?;
        let note = data[1] & 0x7F;
        let velocity = data[2] & 0x7F;

        // Running-status keyboards send note-on/velocity 0 instead of note-off
        let status = if status == NoteStatus::On && velocity == 0 {
            NoteStatus::Off
        } else {
            status
        };

        Ok(Self {
            status,
            channel: status_byte & 0x0F,
            note,
            velocity,
        })
    }

    #[inline]
    pub fn is_note_on(&self) -> bool {
        self.status == NoteStatus::On
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_on() {
        let msg = NoteMessage::from_bytes(&[0x90, 60, 100]).unwrap();
        assert_eq!(msg.status, NoteStatus::On);
        assert_eq!(msg.channel, 0);
        assert_eq!(msg.note, 60);
        assert_eq!(msg.velocity, 100);
    }

    #[test]
    fn test_note_off_with_channel() {
        let msg = NoteMessage::from_bytes(&[0x85, 61, 40]).unwrap();
        assert_eq!(msg.status, NoteStatus::Off);
        assert_eq!(msg.channel, 5);
    }

    #[test]
    fn test_note_on_zero_velocity_is_off() {
        let msg = NoteMessage::from_bytes(&[0x90, 60, 0]).unwrap();
        assert!(!msg.is_note_on());
    }

    #[test]
    fn test_rejects_other_messages() {
        assert!(matches!(
            NoteMessage::from_bytes(&[0xB0, 1, 64]),
            Err(ProtocolError::UnsupportedStatus(0xB0))
        ));
        assert!(matches!(
            NoteMessage::from_bytes(&[0x90, 60]),
            Err(ProtocolError::ShortMessage(2))
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(u8::from(NoteStatus::On), 144);
        assert_eq!(NoteStatus::try_from(128).unwrap(), NoteStatus::Off);
        assert!(NoteStatus::try_from(176).is_err());
    }
}
