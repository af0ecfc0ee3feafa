//! Future-event synchronizer.
//!
//! Turns each predictive note into a falling beam plus a playback trigger,
//! both derived from one [`BeamTiming`] so the trigger fires as the beam
//! reaches the touch line.

use log::debug;

use super::trigger::{TriggerPolicy, TriggerScheduler};
use crate::beam::{BeamId, BeamRegistry};
use crate::keys::PianoKey;
use crate::protocol::{PlaybackSink, PredictiveNoteEvent, TriggerId};
use crate::surface::{KeyboardLayout, Palette};
use crate::timing::{BeamTiming, SpeedMultiplier, DEFAULT_PIXELS_PER_SECOND};

/// What scheduling a predictive note produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledNote {
    pub key: PianoKey,
    pub trigger: TriggerId,
    /// None when the key element is not mounted.
    pub beam: Option<BeamId>,
    pub timing: BeamTiming,
}

#[derive(Debug)]
pub struct FutureEventSynchronizer {
    nominal_pixels_per_second: f64,
    triggers: TriggerScheduler,
}

impl FutureEventSynchronizer {
    pub fn new(nominal_pixels_per_second: f64, policy: TriggerPolicy) -> Self {
        Self {
            nominal_pixels_per_second,
            triggers: TriggerScheduler::new(policy),
        }
    }

    /// Schedule one predictive note.
    ///
    /// Note-offs and events for keys outside the piano are ignored. The
    /// trigger is scheduled even when the key has no element to draw on.
    pub fn on_future_event(
        &mut self,
        event: PredictiveNoteEvent,
        now_ms: f64,
        multiplier: SpeedMultiplier,
        layout: &KeyboardLayout,
        registry: &mut BeamRegistry,
        palette: &Palette,
    ) -> Option<ScheduledNote> {
        if !event.is_note_on() {
            debug!("Ignoring predictive note-off {:?}", event.message);
            return None;
        }
        let key = match event.piano_key() {
            Ok(key) => key,
            Err(e) => {
                debug!("Ignoring predictive event: {}", e);
                return None;
            }
        };

        let timing = BeamTiming::compute(
            self.nominal_pixels_per_second,
            multiplier.value(),
            layout.distance_to_touch(),
            event.time_length_ms,
        );

        let beam = match layout.key_rect(key) {
            Some(rect) => Some(registry.spawn_predictive(
                key,
                rect,
                layout.predictive_start_px(),
                timing,
                palette.active(key),
                now_ms,
            )),
            None => {
                debug!("{} not mounted, scheduling trigger without a beam", key);
                None
            }
        };

        let trigger = self
            .triggers
            .schedule(key, event, now_ms, timing.touch_delay_ms);

        Some(ScheduledNote {
            key,
            trigger,
            beam,
            timing,
        })
    }

    /// Fire due triggers. Returns the keys that were triggered.
    pub fn poll<S: PlaybackSink + ?Sized>(&mut self, now_ms: f64, sink: &mut S) -> Vec<PianoKey> {
        self.triggers.poll(now_ms, sink)
    }

    /// Apply the unmount policy to pending triggers of `key`.
    pub fn on_unmount(&mut self, key: PianoKey) -> usize {
        self.triggers.on_unmount(key)
    }

    pub fn next_due_ms(&self) -> Option<f64> {
        self.triggers.next_due_ms()
    }

    pub fn pending(&self) -> usize {
        self.triggers.len()
    }

    pub fn triggers(&self) -> &TriggerScheduler {
        &self.triggers
    }
}

impl Default for FutureEventSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_PIXELS_PER_SECOND, TriggerPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::{BeamKind, BeamStyle};
    use crate::protocol::PlaybackRequest;
    use crate::surface::SurfaceInsets;
    use crate::timing::SpeedController;

    // Viewport 1000px high: D = 1000 - 122 - 92 = 786
    fn layout() -> KeyboardLayout {
        KeyboardLayout::new(1040.0, 1000.0, SurfaceInsets::default())
    }

    #[test]
    fn test_schedules_beam_and_trigger() {
        let mut sync = FutureEventSynchronizer::default();
        let mut registry = BeamRegistry::new(BeamStyle::default());
        let event = PredictiveNoteEvent::new([0x90, 60, 90], 500.0);

        let note = sync
            .on_future_event(
                event,
                1000.0,
                SpeedMultiplier::NOMINAL,
                &layout(),
                &mut registry,
                &Palette::default(),
            )
            .unwrap();

        assert_eq!(note.key, PianoKey::MIDDLE_C);
        assert!((note.timing.height_at_arrival_px - 100.0).abs() < 1e-9);
        assert!((note.timing.touch_delay_ms - 3930.0).abs() < 1e-9);
        assert_eq!(sync.next_due_ms(), Some(1000.0 + note.timing.touch_delay_ms));

        let beam = registry.get(note.beam.unwrap()).unwrap();
        assert_eq!(beam.kind, BeamKind::PredictiveGrow);
        assert_eq!(beam.visual_bottom(), 64.0);
    }

    #[test]
    fn test_multiplier_scales_delay() {
        let mut sync = FutureEventSynchronizer::default();
        let mut registry = BeamRegistry::default();
        let note = sync
            .on_future_event(
                PredictiveNoteEvent::new([0x90, 60, 90], 500.0),
                0.0,
                SpeedController::new(100.0).multiplier(),
                &layout(),
                &mut registry,
                &Palette::default(),
            )
            .unwrap();
        assert!((note.timing.touch_delay_ms - 1310.0).abs() < 1e-9);
        assert!((note.timing.height_at_arrival_px - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_ignores_note_off_and_bad_keys() {
        let mut sync = FutureEventSynchronizer::default();
        let mut registry = BeamRegistry::default();
        let palette = Palette::default();
        for message in [[0x80, 60, 0], [0x90, 60, 0], [0x90, 10, 90], [0xB0, 60, 90]] {
            let result = sync.on_future_event(
                PredictiveNoteEvent::new(message, 500.0),
                0.0,
                SpeedMultiplier::NOMINAL,
                &layout(),
                &mut registry,
                &palette,
            );
            assert!(result.is_none(), "{:?} should be ignored", message);
        }
        assert!(registry.is_empty());
        assert_eq!(sync.pending(), 0);
    }

    #[test]
    fn test_unmounted_key_still_triggers() {
        let mut sync = FutureEventSynchronizer::default();
        let mut registry = BeamRegistry::default();
        let mut layout = layout();
        layout.unmount(PianoKey::MIDDLE_C);

        let note = sync
            .on_future_event(
                PredictiveNoteEvent::new([0x90, 60, 90], 500.0),
                0.0,
                SpeedMultiplier::NOMINAL,
                &layout,
                &mut registry,
                &Palette::default(),
            )
            .unwrap();
        assert!(note.beam.is_none());
        assert!(registry.is_empty());

        let mut sink: Vec<PlaybackRequest> = Vec::new();
        assert_eq!(sync.poll(note.timing.touch_delay_ms, &mut sink), vec![PianoKey::MIDDLE_C]);
        assert_eq!(sink[0].payload.message, [0x90, 60, 90]);
    }
}
