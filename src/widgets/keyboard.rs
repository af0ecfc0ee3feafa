//! Piano keyboard widget for the full 88-key range.
//!
//! Paints the keys of a [`Scene`] and turns primary-button pointer input
//! into key presses. Key geometry comes from the engine's layout, so the
//! widget and the beams always agree on where a key is.

use egui::{Color32, Pos2, Rect, Response, Sense, Ui, Vec2};

use super::to_color32;
use crate::keys::{PianoKey, PointerAction};
use crate::surface::{KeyVisual, KeyboardLayout, Scene};

/// Configuration for the keyboard widget.
#[derive(Clone, Debug)]
pub struct KeyboardConfig {
    /// Border drawn around white keys.
    pub border_color: Color32,
    /// Glow drawn around keys a predictive beam just reached.
    pub touch_glow: Color32,
    /// Label every C key with its octave.
    pub show_octaves: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            border_color: Color32::from_gray(120),
            touch_glow: Color32::from_rgb(255, 120, 90),
            show_octaves: true,
        }
    }
}

/// Tracks which key the pointer is holding down.
///
/// A press starts only when the button goes down over a key. Dragging off
/// the key releases it with [`PointerAction::Leave`]; letting go releases
/// it with [`PointerAction::Up`].
#[derive(Clone, Debug, Default)]
pub struct KeyboardPointer {
    held: Option<PianoKey>,
}

impl KeyboardPointer {
    pub fn held(&self) -> Option<PianoKey> {
        self.held
    }

    /// Feed this frame's pointer state; returns the key actions to apply.
    pub fn update(
        &mut self,
        hovered: Option<PianoKey>,
        pressed_this_frame: bool,
        button_down: bool,
    ) -> Vec<(PianoKey, PointerAction)> {
        let mut actions = Vec::new();

        if let Some(key) = self.held {
            if !button_down {
                actions.push((key, PointerAction::Up));
                self.held = None;
            } else if hovered != Some(key) {
                actions.push((key, PointerAction::Leave));
                self.held = None;
            }
        }

        if self.held.is_none() && pressed_this_frame && button_down {
            if let Some(key) = hovered {
                actions.push((key, PointerAction::Down));
                self.held = Some(key);
            }
        }

        actions
    }
}

/// Output of [`keyboard_input`].
pub struct KeyboardOutput {
    pub response: Response,
    pub actions: Vec<(PianoKey, PointerAction)>,
}

/// Handle pointer input over the keyboard part of `rect`, the area the
/// layout was computed for.
pub fn keyboard_input(
    ui: &mut Ui,
    rect: Rect,
    layout: &KeyboardLayout,
    pointer: &mut KeyboardPointer,
) -> KeyboardOutput {
    let keyboard_rect = Rect::from_min_max(
        Pos2::new(rect.left(), rect.top() + layout.keyboard_top() as f32),
        rect.max,
    );
    let response = ui.interact(keyboard_rect, ui.id().with("keyboard"), Sense::click_and_drag());

    let (hover_pos, pressed, down) = ui.input(|i| {
        (
            i.pointer.interact_pos(),
            i.pointer.primary_pressed(),
            i.pointer.primary_down(),
        )
    });
    let hovered = hover_pos
        .filter(|p| keyboard_rect.contains(*p))
        .and_then(|p| layout.key_at((p.x - rect.left()) as f64, (p.y - rect.top()) as f64));
    let actions = pointer.update(hovered, pressed, down);

    KeyboardOutput { response, actions }
}

/// Paint the keys of `scene`, positioned relative to `origin`.
pub fn paint_keys(painter: &egui::Painter, origin: Pos2, scene: &Scene, config: &KeyboardConfig) {
    // Scene lists white keys first
    for visual in &scene.keys {
        paint_key(painter, origin, visual, config);
    }
}

fn key_screen_rect(origin: Pos2, visual: &KeyVisual) -> Rect {
    Rect::from_min_size(
        origin + Vec2::new(visual.rect.left as f32, visual.rect.top as f32),
        Vec2::new(visual.rect.width as f32, visual.rect.height as f32),
    )
}

fn paint_key(painter: &egui::Painter, origin: Pos2, visual: &KeyVisual, config: &KeyboardConfig) {
    let key_rect = key_screen_rect(origin, visual);
    let black = visual.key.is_black();
    let rounding = if black { 1.5 } else { 2.0 };

    if visual.touched {
        for layer in 0..3u8 {
            let expand = (3 - layer) as f32 * 1.5;
            let glow = Color32::from_rgba_unmultiplied(
                config.touch_glow.r(),
                config.touch_glow.g(),
                config.touch_glow.b(),
                45 - layer * 13,
            );
            painter.rect_filled(key_rect.expand(expand), rounding, glow);
        }
    }

    painter.rect_filled(key_rect, rounding, to_color32(visual.color));

    if black {
        if !visual.pressed && !visual.touched {
            let highlight = Rect::from_min_size(
                key_rect.min + Vec2::new(1.0, 1.0),
                Vec2::new((key_rect.width() - 2.0).max(0.0), 3.0),
            );
            painter.rect_filled(highlight, 1.0, Color32::from_rgba_unmultiplied(255, 255, 255, 20));
        }
        return;
    }

    painter.rect_stroke(key_rect, rounding, egui::Stroke::new(0.5, config.border_color));

    if config.show_octaves && visual.key.name() == "C" {
        painter.text(
            Pos2::new(key_rect.center().x, key_rect.bottom() - 8.0),
            egui::Align2::CENTER_CENTER,
            visual.key.to_string(),
            egui::FontId::proportional(9.0),
            Color32::from_gray(110),
        );
    }
}
