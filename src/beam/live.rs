//! Live beams: drawn while a key is held, then scrolled away.

use log::trace;

use super::beam::{Beam, BeamId, BeamKind, BeamStyle, Corners, Rgba};
use super::registry::{FrameContext, StepOutcome};
use crate::keys::PianoKey;
use crate::surface::KeyRect;
use crate::timing::pixels_for_elapsed;

/// Animation task for one live beam.
///
/// While the press that created it is held, each frame grows the beam and
/// moves its top up by the same amount, so the bottom edge stays just above
/// the key. Once the press ends the beam keeps moving up at the same rate
/// until its bottom edge clears the top of the surface.
#[derive(Clone, Debug)]
pub struct LiveBeamTask {
    beam: Beam,
    /// Generation of the press that owns this beam.
    generation: u64,
    last_frame_ms: f64,
}

impl LiveBeamTask {
    pub fn new(
        id: BeamId,
        key: PianoKey,
        rect: KeyRect,
        generation: u64,
        color: Rgba,
        style: &BeamStyle,
        now_ms: f64,
    ) -> Self {
        let beam = Beam {
            id,
            key,
            kind: BeamKind::LiveGrow,
            left_px: rect.left,
            width_px: rect.width,
            top_px: rect.top - style.live_gap_px,
            height_px: style.initial_height_px,
            translate_y_px: 0.0,
            color,
            corners: Corners {
                top: true,
                bottom: false,
            },
        };
        Self {
            beam,
            generation,
            last_frame_ms: now_ms,
        }
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    /// Advance one frame.
    pub fn step(&mut self, frame: &FrameContext<'_>) -> StepOutcome {
        let elapsed = frame.now_ms - self.last_frame_ms;
        self.last_frame_ms = self.last_frame_ms.max(frame.now_ms);
        let distance = pixels_for_elapsed(elapsed, frame.pixels_per_second);

        match self.beam.kind {
            BeamKind::LiveGrow => {
                self.beam.height_px += distance;
                self.beam.top_px -= distance;

                if frame
                    .keys
                    .state(self.beam.key)
                    .released_since(self.generation)
                {
                    trace!("{:?} on {} released", self.beam.id, self.beam.key);
                    self.beam.kind = BeamKind::LiveFallAway;
                    self.beam.corners.bottom = true;
                }
                StepOutcome::Continue
            }
            _ => {
                self.beam.top_px -= distance;
                if self.beam.visual_bottom() <= 0.0 {
                    StepOutcome::Finished
                } else {
                    StepOutcome::Continue
                }
            }
        }
    }
}
