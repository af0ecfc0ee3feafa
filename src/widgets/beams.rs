//! Beam painter.
//!
//! Draws the beams of a [`Scene`](crate::surface::Scene) onto a painter.
//! Beams are positioned in surface coordinates relative to `origin`.

use egui::{Painter, Pos2, Rect, Rounding, Vec2};

use super::to_color32;
use crate::beam::{Beam, Corners};

/// Rounding for a beam with the given rounded ends.
pub fn beam_rounding(corners: Corners, radius: f32) -> Rounding {
    let top = if corners.top { radius } else { 0.0 };
    let bottom = if corners.bottom { radius } else { 0.0 };
    Rounding {
        nw: top,
        ne: top,
        sw: bottom,
        se: bottom,
    }
}

/// Screen rectangle of a beam, including its glide translation.
pub fn beam_rect(origin: Pos2, beam: &Beam) -> Rect {
    Rect::from_min_size(
        origin + Vec2::new(beam.left_px as f32, beam.visual_top() as f32),
        Vec2::new(beam.width_px as f32, beam.height_px.max(0.0) as f32),
    )
}

/// Paint every beam, clipped to `clip`.
pub fn paint_beams(painter: &Painter, origin: Pos2, clip: Rect, beams: &[Beam], radius: f32) {
    let painter = painter.with_clip_rect(clip);
    for beam in beams {
        let rect = beam_rect(origin, beam);
        if !rect.intersects(clip) {
            continue;
        }
        painter.rect_filled(
            rect,
            beam_rounding(beam.corners, radius),
            to_color32(beam.color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::{BeamId, BeamKind, Rgba};
    use crate::keys::PianoKey;

    fn beam() -> Beam {
        Beam {
            id: BeamId(1),
            key: PianoKey::MIDDLE_C,
            kind: BeamKind::PredictiveRelease,
            left_px: 10.0,
            width_px: 18.0,
            top_px: 64.0,
            height_px: 100.0,
            translate_y_px: 50.0,
            color: Rgba::rgb(255, 0, 0),
            corners: Corners {
                top: true,
                bottom: true,
            },
        }
    }

    #[test]
    fn test_rounding_follows_corners() {
        let r = beam_rounding(
            Corners {
                top: true,
                bottom: false,
            },
            5.0,
        );
        assert_eq!((r.nw, r.ne, r.sw, r.se), (5.0, 5.0, 0.0, 0.0));

        let r = beam_rounding(Corners::default(), 5.0);
        assert_eq!(r, Rounding::ZERO);
    }

    #[test]
    fn test_rect_includes_translation() {
        let rect = beam_rect(Pos2::new(100.0, 20.0), &beam());
        assert_eq!(rect.min, Pos2::new(110.0, 134.0));
        assert_eq!(rect.size(), Vec2::new(18.0, 100.0));
    }
}
