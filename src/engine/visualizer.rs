//! Visualizer Engine
//!
//! Owns every piece of mutable state and applies inputs, frames, and
//! trigger polls one at a time. Foreign threads never touch it directly;
//! they go through [`EngineHandle`].

use log::{debug, info};

use crate::beam::{BeamRegistry, FrameContext, FrameStats};
use crate::config::Settings;
use crate::keys::{KeyStateMachine, KeyTransition, PianoKey, PointerAction};
use crate::protocol::{
    EngineHandle, EngineInput, LiveNoteEvent, NoteStatus, PlaybackSink, PredictiveNoteEvent,
};
use crate::surface::{KeyboardLayout, Scene};
use crate::sync::{FutureEventSynchronizer, ScheduledNote};
use crate::timing::{SpeedController, SpeedMultiplier};

/// What one [`VisualizerEngine::drain`] call consumed and fired.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub inputs: usize,
    pub fired: usize,
}

pub struct VisualizerEngine {
    settings: Settings,
    keys: KeyStateMachine,
    speed: SpeedController,
    layout: KeyboardLayout,
    registry: BeamRegistry,
    sync: FutureEventSynchronizer,
    /// Keys a predictive beam reached since their last live transition.
    touched: [bool; PianoKey::COUNT],
    /// Multiplier sampled by the most recent frame.
    frame_multiplier: SpeedMultiplier,
}

impl VisualizerEngine {
    /// Create an engine for a surface of `width` x `height` pixels.
    pub fn new(settings: Settings, width: f64, height: f64) -> Self {
        let speed = SpeedController::new(settings.default_speed_value);
        info!(
            "Engine ready: {:.0}px/s nominal, speed {}%, {:?}",
            settings.nominal_pixels_per_second,
            speed.percent(),
            settings.trigger_policy
        );
        Self {
            keys: KeyStateMachine::new(),
            layout: KeyboardLayout::new(width, height, settings.insets()),
            registry: BeamRegistry::new(settings.beam_style()),
            sync: FutureEventSynchronizer::new(
                settings.nominal_pixels_per_second,
                settings.trigger_policy,
            ),
            touched: [false; PianoKey::COUNT],
            frame_multiplier: speed.multiplier(),
            speed,
            settings,
        }
    }

    /// Apply one input at `now_ms`. Malformed inputs are logged and dropped.
    pub fn handle_input(&mut self, input: EngineInput, now_ms: f64) {
        match input {
            EngineInput::Live(event) => self.on_live_event(event, now_ms),
            EngineInput::Midi(bytes) => match LiveNoteEvent::from_midi(&bytes) {
                Ok(event) => self.on_live_event(event, now_ms),
                Err(e) => debug!("Ignoring MIDI message {:02X?}: {}", bytes, e),
            },
            EngineInput::Predictive(event) => {
                self.on_future_event(event, now_ms);
            }
            EngineInput::Pointer { key, action } => self.pointer(key, action, now_ms),
            EngineInput::SetSpeed(value) => {
                self.set_speed_value(value);
            }
            EngineInput::Unmount(key) => {
                self.unmount_key(key);
            }
            EngineInput::Mount(key) => {
                self.mount_key(key);
            }
            EngineInput::Resize { width, height } => self.resize(width, height),
        }
    }

    /// Apply a live note event.
    pub fn on_live_event(&mut self, event: LiveNoteEvent, now_ms: f64) {
        let key = match event.piano_key() {
            Ok(key) => key,
            Err(e) => {
                debug!("Ignoring live event: {}", e);
                return;
            }
        };
        let transition = match event.event_type {
            NoteStatus::On => self.keys.press(key),
            NoteStatus::Off => self.keys.release(key),
        };
        if let Some(transition) = transition {
            self.apply_transition(transition, now_ms);
        }
    }

    /// Apply a pointer interaction on a key element.
    pub fn pointer(&mut self, key: PianoKey, action: PointerAction, now_ms: f64) {
        if let Some(transition) = self.keys.pointer(key, action) {
            self.apply_transition(transition, now_ms);
        }
    }

    /// Schedule a predictive note at the current speed.
    pub fn on_future_event(
        &mut self,
        event: PredictiveNoteEvent,
        now_ms: f64,
    ) -> Option<ScheduledNote> {
        self.sync.on_future_event(
            event,
            now_ms,
            self.speed.multiplier(),
            &self.layout,
            &mut self.registry,
            &self.settings.colors,
        )
    }

    fn apply_transition(&mut self, transition: KeyTransition, now_ms: f64) {
        let key = transition.key();
        self.touched[key.index()] = false;

        if let KeyTransition::Pressed { generation, .. } = transition {
            match self.layout.key_rect(key) {
                Some(rect) => {
                    self.registry.spawn_live(
                        key,
                        rect,
                        generation,
                        self.settings.colors.active(key),
                        now_ms,
                    );
                }
                None => debug!("{} not mounted, no live beam", key),
            }
        }
    }

    /// Move the speed slider. Returns true when the multiplier changed.
    pub fn set_speed_value(&mut self, value: f64) -> bool {
        self.speed.set_value(value)
    }

    /// Step every beam once. The multiplier is sampled once for the whole frame.
    pub fn frame(&mut self, now_ms: f64) -> FrameStats {
        let multiplier = self.speed.multiplier();
        if multiplier.version() != self.frame_multiplier.version() {
            debug!(
                "Frame picked up speed x{:.2} (v{})",
                multiplier.value(),
                multiplier.version()
            );
        }
        self.frame_multiplier = multiplier;

        let frame = FrameContext {
            now_ms,
            pixels_per_second: self.settings.nominal_pixels_per_second * multiplier.value(),
            keys: &self.keys,
        };
        self.registry.step_all(&frame)
    }

    /// Fire due playback triggers into `sink`. Returns how many fired.
    pub fn poll_triggers<S: PlaybackSink + ?Sized>(&mut self, now_ms: f64, sink: &mut S) -> usize {
        let fired = self.sync.poll(now_ms, sink);
        for key in &fired {
            if self.layout.is_mounted(*key) {
                self.touched[key.index()] = true;
            }
        }
        fired.len()
    }

    /// Apply every queued input, then fire due triggers back through the handle.
    pub fn drain(&mut self, handle: &mut EngineHandle, now_ms: f64) -> DrainStats {
        let mut inputs = 0;
        handle.process_inputs(|input| {
            inputs += 1;
            self.handle_input(input, now_ms);
        });
        DrainStats {
            inputs,
            fired: self.poll_triggers(now_ms, handle),
        }
    }

    /// When the next pending trigger is due.
    pub fn next_trigger_due_ms(&self) -> Option<f64> {
        self.sync.next_due_ms()
    }

    /// Snapshot for the render pass.
    pub fn scene(&self) -> Scene {
        Scene::compose(
            &self.registry,
            &self.keys,
            &self.layout,
            &self.settings.colors,
            &self.touched,
        )
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.layout.resize(width, height);
    }

    /// Detach a key element. Its beams go with it; pending triggers follow
    /// the configured policy.
    pub fn unmount_key(&mut self, key: PianoKey) -> bool {
        if !self.layout.unmount(key) {
            return false;
        }
        self.registry.remove_key(key);
        self.sync.on_unmount(key);
        self.touched[key.index()] = false;
        true
    }

    pub fn mount_key(&mut self, key: PianoKey) -> bool {
        self.layout.mount(key)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn keys(&self) -> &KeyStateMachine {
        &self.keys
    }

    pub fn speed(&self) -> &SpeedController {
        &self.speed
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn registry(&self) -> &BeamRegistry {
        &self.registry
    }

    pub fn synchronizer(&self) -> &FutureEventSynchronizer {
        &self.sync
    }

    pub fn is_touched(&self, key: PianoKey) -> bool {
        self.touched[key.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::BeamKind;
    use crate::protocol::{EventChannels, PlaybackRequest};
    use crate::sync::TriggerPolicy;

    fn engine() -> VisualizerEngine {
        VisualizerEngine::new(Settings::default(), 1040.0, 1000.0)
    }

    fn d4() -> PianoKey {
        PianoKey::new(62).unwrap()
    }

    #[test]
    fn test_note_on_spawns_live_beam() {
        let mut engine = engine();
        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_on(60, 90)), 0.0);
        assert!(engine.keys().is_pressed(PianoKey::MIDDLE_C));
        assert_eq!(engine.registry().len(), 1);

        let beam = engine.registry().beams().next().unwrap();
        let rect = engine.layout().key_rect(PianoKey::MIDDLE_C).unwrap();
        assert_eq!(beam.kind, BeamKind::LiveGrow);
        assert_eq!(beam.top_px, rect.top - 7.0);
        assert_eq!(beam.color, engine.settings().colors.white_active);
    }

    #[test]
    fn test_out_of_range_key_is_ignored() {
        let mut engine = engine();
        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_on(12, 90)), 0.0);
        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_on(200, 90)), 0.0);
        engine.handle_input(EngineInput::Midi(vec![0x90]), 0.0);
        assert!(engine.registry().is_empty());
        assert_eq!(engine.keys().pressed_keys().count(), 0);
    }

    #[test]
    fn test_midi_bytes_drive_key_state() {
        let mut engine = engine();
        engine.handle_input(EngineInput::Midi(vec![0x91, 62, 100]), 0.0);
        assert!(engine.keys().is_pressed(d4()));
        // Note-on with zero velocity releases
        engine.handle_input(EngineInput::Midi(vec![0x91, 62, 0]), 10.0);
        assert!(!engine.keys().is_pressed(d4()));
    }

    #[test]
    fn test_pointer_leave_releases() {
        let mut engine = engine();
        engine.pointer(d4(), PointerAction::Down, 0.0);
        assert!(engine.keys().is_pressed(d4()));
        engine.pointer(d4(), PointerAction::Leave, 5.0);
        assert!(!engine.keys().is_pressed(d4()));
        assert_eq!(engine.registry().len(), 1);
    }

    #[test]
    fn test_frame_uses_current_speed() {
        let mut engine = engine();
        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_on(60, 90)), 0.0);
        engine.frame(100.0);
        let height = engine.registry().beams().next().unwrap().height_px;
        assert!((height - 25.0).abs() < 1e-9);

        // 300%: the next 100ms grows 60px
        assert!(engine.set_speed_value(100.0));
        engine.frame(200.0);
        let height = engine.registry().beams().next().unwrap().height_px;
        assert!((height - 85.0).abs() < 1e-9);
    }

    #[test]
    fn test_trigger_marks_key_touched_until_played() {
        let mut engine = engine();
        let note = engine
            .on_future_event(PredictiveNoteEvent::new([0x90, 62, 80], 250.0), 0.0)
            .unwrap();
        let mut sink: Vec<PlaybackRequest> = Vec::new();

        assert_eq!(engine.poll_triggers(note.timing.touch_delay_ms - 1.0, &mut sink), 0);
        assert_eq!(engine.poll_triggers(note.timing.touch_delay_ms, &mut sink), 1);
        assert!(engine.is_touched(d4()));
        assert!(engine.scene().key(d4()).unwrap().touched);

        engine.pointer(d4(), PointerAction::Down, 5000.0);
        assert!(!engine.is_touched(d4()));
    }

    #[test]
    fn test_unmount_drops_beams_and_applies_policy() {
        let mut settings = Settings::default();
        settings.trigger_policy = TriggerPolicy::CancelOnUnmount;
        let mut engine = VisualizerEngine::new(settings, 1040.0, 1000.0);

        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_on(62, 90)), 0.0);
        engine.on_future_event(PredictiveNoteEvent::new([0x90, 62, 80], 250.0), 0.0);
        assert_eq!(engine.registry().count_for(d4()), 2);

        engine.handle_input(EngineInput::Unmount(d4()), 10.0);
        assert_eq!(engine.registry().count_for(d4()), 0);
        assert_eq!(engine.synchronizer().pending(), 0);

        // Unmounted: state still tracks, no beam is drawn
        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_off(62)), 20.0);
        engine.handle_input(EngineInput::Live(LiveNoteEvent::note_on(62, 90)), 30.0);
        assert!(engine.keys().is_pressed(d4()));
        assert!(engine.registry().is_empty());

        engine.handle_input(EngineInput::Mount(d4()), 40.0);
        assert!(engine.layout().is_mounted(d4()));
    }

    #[test]
    fn test_resize_input_moves_touch_line() {
        let mut engine = engine();
        assert!((engine.layout().distance_to_touch() - 786.0).abs() < 1e-9);
        engine.handle_input(
            EngineInput::Resize {
                width: 520.0,
                height: 500.0,
            },
            0.0,
        );
        assert_eq!(engine.layout().width(), 520.0);
        assert!((engine.layout().distance_to_touch() - (500.0 - 61.0 - 92.0)).abs() < 1e-9);
    }

    #[test]
    fn test_drain_round_trips_through_channels() {
        let mut engine = engine();
        let (mut tx, mut playback, mut handle) = EventChannels::new(16, 16).split();

        tx.send(EngineInput::Predictive(PredictiveNoteEvent::new([0x90, 60, 80], 0.0)))
            .unwrap();
        tx.send(EngineInput::SetSpeed(100.0)).unwrap();
        assert_eq!(
            engine.drain(&mut handle, 0.0),
            DrainStats {
                inputs: 2,
                fired: 0
            }
        );
        assert_eq!(engine.speed().percent(), 300);

        // Scheduled at 100%: D = 786px at 200px/s
        let due = engine.next_trigger_due_ms().unwrap();
        assert!((due - 3930.0).abs() < 1e-9);
        assert_eq!(engine.drain(&mut handle, due).fired, 1);

        let request = playback.recv().unwrap();
        assert_eq!(request.payload.message, [0x90, 60, 80]);
        assert!(playback.recv().is_none());
    }
}
