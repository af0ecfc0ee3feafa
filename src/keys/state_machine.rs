//! Per-key pressed/released tracking.
//!
//! Live note events and pointer interactions both land here. The machine
//! keeps only the current state of each key, so repeated note-ons for a key
//! that is already down are no-ops.

use log::trace;

use super::piano_key::PianoKey;

/// State of a single key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pressed: bool,
    /// Bumped on every transition. Beam tasks remember the value they were
    /// created under and treat any later change as their release signal.
    generation: u64,
}

impl KeyState {
    /// Whether the key is currently held.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Transition counter for this key.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once the press that started at `generation` has ended.
    #[inline]
    pub fn released_since(&self, generation: u64) -> bool {
        !self.pressed || self.generation != generation
    }
}

/// A state change produced by the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyTransition {
    /// Idle -> Pressed. Carries the generation of the new press.
    Pressed { key: PianoKey, generation: u64 },
    /// Pressed -> Idle.
    Released { key: PianoKey, generation: u64 },
}

impl KeyTransition {
    pub fn key(&self) -> PianoKey {
        match self {
            KeyTransition::Pressed { key, .. } => *key,
            KeyTransition::Released { key, .. } => *key,
        }
    }
}

/// Pointer interactions on a key element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Up,
    /// Pointer left the key; releases it only if it was held.
    Leave,
}

/// Tracks Idle/Pressed for all 88 keys.
#[derive(Clone, Debug)]
pub struct KeyStateMachine {
    states: [KeyState; PianoKey::COUNT],
}

impl KeyStateMachine {
    /// All keys idle.
    pub fn new() -> Self {
        Self {
            states: [KeyState::default(); PianoKey::COUNT],
        }
    }

    /// Current state of a key.
    #[inline]
    pub fn state(&self, key: PianoKey) -> &KeyState {
        &self.states[key.index()]
    }

    #[inline]
    pub fn is_pressed(&self, key: PianoKey) -> bool {
        self.state(key).pressed
    }

    /// Note-on or pointer-down. Returns None when already pressed.
    pub fn press(&mut self, key: PianoKey) -> Option<KeyTransition> {
        let state = &mut self.states[key.index()];
        if state.pressed {
            trace!("{} already pressed, ignoring note-on", key);
            return None;
        }
        state.pressed = true;
        state.generation += 1;
        Some(KeyTransition::Pressed {
            key,
            generation: state.generation,
        })
    }

    /// Note-off or pointer-up. Returns None when already idle.
    pub fn release(&mut self, key: PianoKey) -> Option<KeyTransition> {
        let state = &mut self.states[key.index()];
        if !state.pressed {
            return None;
        }
        state.pressed = false;
        state.generation += 1;
        Some(KeyTransition::Released {
            key,
            generation: state.generation,
        })
    }

    /// Apply a pointer interaction.
    pub fn pointer(&mut self, key: PianoKey, action: PointerAction) -> Option<KeyTransition> {
        match action {
            PointerAction::Down => self.press(key),
            PointerAction::Up | PointerAction::Leave => self.release(key),
        }
    }

    /// Keys currently held, lowest first.
    pub fn pressed_keys(&self) -> impl Iterator<Item = PianoKey> + '_ {
        PianoKey::all().filter(move |k| self.is_pressed(*k))
    }
}

impl Default for KeyStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
