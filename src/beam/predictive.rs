//! Predictive beams: fall from the start line toward the touch line ahead
//! of a note that has not sounded yet.

use log::trace;

use super::beam::{Beam, BeamId, BeamKind, BeamStyle, Corners, Rgba};
use super::registry::{FrameContext, StepOutcome};
use crate::keys::PianoKey;
use crate::surface::KeyRect;
use crate::timing::{pixels_for_elapsed, BeamTiming};

/// A committed time-based transition. Position is a function of elapsed
/// time, not of accumulated frame deltas.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Glide {
    start_ms: f64,
    distance_px: f64,
    duration_ms: f64,
}

impl Glide {
    fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Animation task for one predictive beam.
///
/// Grow phase: the leading (bottom) edge starts on the start line and the
/// beam grows downward each frame at the current speed, its top fixed.
/// Growth lasts until the beam has reached the height of the announced note
/// and the key is not being held.
///
/// Release phase: the beam glides the full touch distance over the touch
/// delay computed when it was scheduled. Speed changes during the glide do
/// not re-time it. With the leading edge moving at one rate from creation,
/// it crosses the touch line `touch_delay_ms` after the beam was spawned.
#[derive(Clone, Debug)]
pub struct PredictiveBeamTask {
    beam: Beam,
    timing: BeamTiming,
    last_frame_ms: f64,
    glide: Option<Glide>,
}

impl PredictiveBeamTask {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BeamId,
        key: PianoKey,
        rect: KeyRect,
        start_top_px: f64,
        timing: BeamTiming,
        color: Rgba,
        style: &BeamStyle,
        now_ms: f64,
    ) -> Self {
        let beam = Beam {
            id,
            key,
            kind: BeamKind::PredictiveGrow,
            left_px: rect.left,
            width_px: rect.width,
            top_px: start_top_px - style.initial_height_px,
            height_px: style.initial_height_px,
            translate_y_px: 0.0,
            color,
            corners: Corners {
                top: false,
                bottom: true,
            },
        };
        Self {
            beam,
            timing,
            last_frame_ms: now_ms,
            glide: None,
        }
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    /// Timing frozen at creation.
    pub fn timing(&self) -> &BeamTiming {
        &self.timing
    }

    /// Height the grow phase must reach before the beam can glide.
    pub fn growth_target_px(&self) -> f64 {
        self.timing.height_at_arrival_px
    }

    /// Advance one frame.
    pub fn step(&mut self, frame: &FrameContext<'_>) -> StepOutcome {
        let elapsed = frame.now_ms - self.last_frame_ms;
        self.last_frame_ms = self.last_frame_ms.max(frame.now_ms);

        match self.glide {
            None => {
                self.beam.height_px += pixels_for_elapsed(elapsed, frame.pixels_per_second);

                let grown = self.beam.height_px >= self.growth_target_px();
                if grown && !frame.keys.is_pressed(self.beam.key) {
                    trace!(
                        "{:?} on {} gliding {:.0}px over {:.0}ms",
                        self.beam.id,
                        self.beam.key,
                        self.timing.distance_px,
                        self.timing.glide_duration_ms()
                    );
                    self.beam.kind = BeamKind::PredictiveRelease;
                    self.beam.corners.top = true;
                    self.glide = Some(Glide {
                        start_ms: self.last_frame_ms,
                        distance_px: self.timing.distance_px,
                        duration_ms: self.timing.glide_duration_ms(),
                    });
                }
                StepOutcome::Continue
            }
            Some(glide) => {
                let progress = glide.progress(self.last_frame_ms);
                self.beam.translate_y_px = glide.distance_px * progress;
                if progress >= 1.0 {
                    StepOutcome::Finished
                } else {
                    StepOutcome::Continue
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyStateMachine;

    fn task(time_length_ms: f64, multiplier: f64) -> PredictiveBeamTask {
        let rect = KeyRect {
            left: 40.0,
            width: 18.0,
            top: 878.0,
            height: 122.0,
        };
        let timing = BeamTiming::compute(200.0, multiplier, 600.0, time_length_ms);
        PredictiveBeamTask::new(
            BeamId(9),
            PianoKey::MIDDLE_C,
            rect,
            64.0,
            timing,
            Rgba::rgb(0, 0, 255),
            &BeamStyle::default(),
            0.0,
        )
    }

    fn frame(now_ms: f64, pps: f64, keys: &KeyStateMachine) -> FrameContext<'_> {
        FrameContext {
            now_ms,
            pixels_per_second: pps,
            keys,
        }
    }

    #[test]
    fn test_starts_on_start_line() {
        let task = task(500.0, 1.0);
        assert_eq!(task.beam().kind, BeamKind::PredictiveGrow);
        assert_eq!(task.beam().visual_bottom(), 64.0);
        assert_eq!(task.beam().top_px, 64.0 - BeamStyle::default().initial_height_px);
        assert!(task.beam().corners.bottom);
        assert!((task.growth_target_px() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_grows_until_target_then_glides() {
        let keys = KeyStateMachine::new();
        let mut task = task(500.0, 1.0);

        let top = task.beam().top_px;
        let mut now = 0.0;
        let mut last_height = task.beam().height_px;
        while task.beam().kind == BeamKind::PredictiveGrow {
            now += 50.0;
            task.step(&frame(now, 200.0, &keys));
            assert!(task.beam().height_px >= last_height);
            assert_eq!(task.beam().top_px, top);
            last_height = task.beam().height_px;
            assert!(now <= 1000.0, "never reached growth target");
        }
        assert!(task.beam().height_px >= task.growth_target_px());
        assert!(task.beam().corners.top);

        // Glide: 600px at 200px/s takes 3s
        let glide_start = now;
        assert_eq!(task.step(&frame(glide_start + 1500.0, 200.0, &keys)), StepOutcome::Continue);
        assert!((task.beam().translate_y_px - 300.0).abs() < 1e-9);
        assert_eq!(task.step(&frame(glide_start + 3000.0, 200.0, &keys)), StepOutcome::Finished);
        assert!((task.beam().translate_y_px - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_held_key_extends_growth() {
        let mut keys = KeyStateMachine::new();
        keys.press(PianoKey::MIDDLE_C);
        let mut task = task(100.0, 1.0);

        task.step(&frame(500.0, 200.0, &keys));
        assert_eq!(task.beam().kind, BeamKind::PredictiveGrow);
        assert!(task.beam().height_px > task.growth_target_px());

        keys.release(PianoKey::MIDDLE_C);
        task.step(&frame(516.0, 200.0, &keys));
        assert_eq!(task.beam().kind, BeamKind::PredictiveRelease);
    }

    #[test]
    fn test_glide_ignores_speed_changes() {
        let keys = KeyStateMachine::new();
        let mut task = task(0.0, 1.0);
        task.step(&frame(16.0, 200.0, &keys));
        assert_eq!(task.beam().kind, BeamKind::PredictiveRelease);

        // The live rate triples mid-glide; arrival time stays at 3s
        task.step(&frame(16.0 + 1500.0, 600.0, &keys));
        assert!((task.beam().translate_y_px - 300.0).abs() < 1e-9);
        assert_eq!(task.step(&frame(16.0 + 3000.0, 600.0, &keys)), StepOutcome::Finished);
    }

    #[test]
    fn test_glide_translation_is_monotonic() {
        let keys = KeyStateMachine::new();
        let mut task = task(0.0, 1.0);
        task.step(&frame(0.0, 200.0, &keys));
        task.step(&frame(1000.0, 200.0, &keys));
        let reached = task.beam().translate_y_px;
        // Stale frame timestamp must not pull the beam back up
        task.step(&frame(500.0, 200.0, &keys));
        assert_eq!(task.beam().translate_y_px, reached);
    }

    #[test]
    fn test_leading_edge_reaches_touch_line_at_touch_delay() {
        let keys = KeyStateMachine::new();
        let mut task = task(500.0, 1.0);
        let touch_line = 64.0 + 600.0;

        // 600px at 200px/s: the edge arrives at 3000ms
        let mut now = 0.0;
        while now < 2990.0 {
            now += 10.0;
            task.step(&frame(now, 200.0, &keys));
        }
        assert!(task.beam().visual_bottom() < touch_line);
        task.step(&frame(3000.0, 200.0, &keys));
        assert!((task.beam().visual_bottom() - touch_line).abs() < 1e-6);
    }
}
