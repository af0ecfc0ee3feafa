//! Declarative snapshot of everything one render pass draws.

use serde::{Deserialize, Serialize};

use super::layout::{KeyRect, KeyboardLayout};
use crate::beam::{Beam, BeamRegistry, Rgba};
use crate::keys::{KeyStateMachine, PianoKey};

/// Key and beam colors. A beam takes the active color of its key.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub white_active: Rgba,
    pub white_inactive: Rgba,
    pub black_active: Rgba,
    pub black_inactive: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            white_active: Rgba::rgb(255, 0, 0),
            white_inactive: Rgba::rgb(255, 255, 255),
            black_active: Rgba::rgb(139, 0, 0),
            black_inactive: Rgba::rgb(0, 0, 0),
        }
    }
}

impl Palette {
    pub fn active(&self, key: PianoKey) -> Rgba {
        if key.is_black() {
            self.black_active
        } else {
            self.white_active
        }
    }

    pub fn inactive(&self, key: PianoKey) -> Rgba {
        if key.is_black() {
            self.black_inactive
        } else {
            self.white_inactive
        }
    }

    pub fn key_color(&self, key: PianoKey, lit: bool) -> Rgba {
        if lit {
            self.active(key)
        } else {
            self.inactive(key)
        }
    }
}

/// One mounted key as it should appear this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyVisual {
    pub key: PianoKey,
    pub rect: KeyRect,
    pub color: Rgba,
    pub pressed: bool,
    /// A predictive beam reached this key and nothing has played it since.
    pub touched: bool,
}

/// Beams and keys ready to paint, in draw order.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub beams: Vec<Beam>,
    /// White keys first so black keys paint over them.
    pub keys: Vec<KeyVisual>,
}

impl Scene {
    /// Build the scene from current engine state. Unmounted keys are left out.
    pub fn compose(
        registry: &BeamRegistry,
        keys: &KeyStateMachine,
        layout: &KeyboardLayout,
        palette: &Palette,
        touched: &[bool; PianoKey::COUNT],
    ) -> Self {
        let beams = registry.beams().cloned().collect();

        let mut visuals: Vec<KeyVisual> = PianoKey::all()
            .filter_map(|key| {
                let rect = layout.key_rect(key)?;
                let pressed = keys.is_pressed(key);
                let touched = touched[key.index()];
                Some(KeyVisual {
                    key,
                    rect,
                    color: palette.key_color(key, pressed || touched),
                    pressed,
                    touched,
                })
            })
            .collect();
        visuals.sort_by_key(|v| v.key.is_black());

        Self {
            beams,
            keys: visuals,
        }
    }

    pub fn key(&self, key: PianoKey) -> Option<&KeyVisual> {
        self.keys.iter().find(|v| v.key == key)
    }
}
