//! Identity of the 88 keys of a standard piano (MIDI notes 21-108).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::ProtocolError;

/// Semitones within an octave that are black keys (C# D# F# G# A#).
const BLACK_KEY_NOTES: [u8; 5] = [1, 3, 6, 8, 10];

/// Note names by semitone, flats for the black keys.
const NOTE_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// One key of the 88-key keyboard.
///
/// Constructed only through [`PianoKey::new`] so an out-of-range note
/// number can never reach per-key state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PianoKey(u8);

impl PianoKey {
    /// Lowest key, A0.
    pub const LOWEST: PianoKey = PianoKey(21);
    /// Highest key, C8.
    pub const HIGHEST: PianoKey = PianoKey(108);
    /// Number of keys.
    pub const COUNT: usize = 88;
    /// Number of white keys.
    pub const WHITE_COUNT: usize = 52;
    /// Middle C.
    pub const MIDDLE_C: PianoKey = PianoKey(60);

    /// Key for a MIDI note number, or None when it is not on the keyboard.
    pub fn new(note: u8) -> Option<Self> {
        if (Self::LOWEST.0..=Self::HIGHEST.0).contains(&note) {
            Some(Self(note))
        } else {
            None
        }
    }

    /// Key for an arbitrary integer, as found in loosely typed payloads.
    pub fn from_i64(note: i64) -> Option<Self> {
        u8::try_from(note).ok().and_then(Self::new)
    }

    /// Key at a dense index (0 = A0, 87 = C8).
    pub fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(Self::LOWEST.0 + index as u8))
        } else {
            None
        }
    }

    /// MIDI note number.
    #[inline]
    pub fn note(self) -> u8 {
        self.0
    }

    /// Dense index in 0..88, for per-key tables.
    #[inline]
    pub fn index(self) -> usize {
        (self.0 - Self::LOWEST.0) as usize
    }

    /// Whether this is a black key.
    pub fn is_black(self) -> bool {
        BLACK_KEY_NOTES.contains(&(self.0 % 12))
    }

    /// Note name without octave ("C", "Db", ...).
    pub fn name(self) -> &'static str {
        NOTE_NAMES[(self.0 % 12) as usize]
    }

    /// Scientific pitch octave (middle C is octave 4).
    pub fn octave(self) -> i8 {
        (self.0 / 12) as i8 - 1
    }

    /// Number of white keys to the left of this key.
    ///
    /// For a black key this is the count up to and including the white key
    /// it sits on the right edge of.
    pub fn white_index(self) -> usize {
        (Self::LOWEST.0..self.0)
            .filter(|&n| !BLACK_KEY_NOTES.contains(&(n % 12)))
            .count()
    }

    /// Iterate all 88 keys from A0 to C8.
    pub fn all() -> impl Iterator<Item = PianoKey> {
        (Self::LOWEST.0..=Self::HIGHEST.0).map(PianoKey)
    }
}

impl fmt::Display for PianoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.octave())
    }
}

impl TryFrom<u8> for PianoKey {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ProtocolError::KeyOutOfRange(i64::from(value)))
    }
}

impl From<PianoKey> for u8 {
    fn from(key: PianoKey) -> Self {
        key.0
    }
}
