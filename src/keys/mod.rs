//! Keys module
//!
//! Piano key identity and the per-key pressed/released state machine.

pub mod piano_key;
pub mod state_machine;

pub use piano_key::PianoKey;
pub use state_machine::{KeyState, KeyStateMachine, KeyTransition, PointerAction};
