//! Engine loop.
//!
//! Runs inputs, trigger polls and frames on whatever thread owns the engine,
//! paced by a clock rather than by a window. The headless mode and the
//! viewer's engine thread both use it, so playback triggers keep firing when
//! nothing is being drawn.

use log::info;

use super::visualizer::{DrainStats, VisualizerEngine};
use crate::beam::FrameStats;
use crate::protocol::EngineHandle;
use crate::timing::Clock;

/// Frame interval used when no trigger is due sooner.
pub const HEADLESS_FRAME_MS: f64 = 1000.0 / 60.0;

/// Summary of a headless run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub triggers_fired: usize,
}

/// What one loop iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub drained: DrainStats,
    pub beams: FrameStats,
}

impl FrameReport {
    /// Whether the iteration may have changed what is on screen.
    pub fn changed(&self) -> bool {
        self.drained.inputs > 0 || self.drained.fired > 0 || self.beams.stepped > 0
    }
}

/// Drive `engine` until every input source closes and every pending trigger
/// has fired. `sleep` is called with the number of milliseconds to wait;
/// `on_frame` sees the engine after each iteration.
pub fn run_loop<C, S, F>(
    engine: &mut VisualizerEngine,
    handle: &mut EngineHandle,
    clock: &C,
    mut sleep: S,
    mut on_frame: F,
) -> RunStats
where
    C: Clock + ?Sized,
    S: FnMut(f64),
    F: FnMut(&VisualizerEngine, FrameReport, f64),
{
    let mut stats = RunStats::default();
    loop {
        let now_ms = clock.now_ms();
        let drained = engine.drain(handle, now_ms);
        let beams = engine.frame(now_ms);
        stats.triggers_fired += drained.fired;
        stats.frames += 1;
        on_frame(engine, FrameReport { drained, beams }, now_ms);

        if handle.inputs_closed()
            && handle.inputs_pending() == 0
            && engine.synchronizer().pending() == 0
        {
            break;
        }

        let wait = engine
            .next_trigger_due_ms()
            .map_or(HEADLESS_FRAME_MS, |due| (due - now_ms).clamp(0.0, HEADLESS_FRAME_MS));
        sleep(wait);
    }
    info!(
        "Engine loop finished: {} frames, {} triggers",
        stats.frames, stats.triggers_fired
    );
    stats
}

/// [`run_loop`] with nobody watching the frames.
pub fn run_headless<C, F>(
    engine: &mut VisualizerEngine,
    handle: &mut EngineHandle,
    clock: &C,
    sleep: F,
) -> RunStats
where
    C: Clock + ?Sized,
    F: FnMut(f64),
{
    run_loop(engine, handle, clock, sleep, |_, _, _| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::protocol::{EngineInput, EventChannels, LiveNoteEvent, PredictiveNoteEvent};
    use crate::timing::ManualClock;

    #[test]
    fn test_runs_until_triggers_fire() {
        let mut engine = VisualizerEngine::new(Settings::default(), 1040.0, 1000.0);
        let (mut tx, mut playback, mut handle) = EventChannels::new(8, 8).split();
        tx.send(EngineInput::Predictive(PredictiveNoteEvent::new([0x90, 60, 80], 100.0)))
            .unwrap();
        tx.send(EngineInput::Predictive(PredictiveNoteEvent::new([0x90, 64, 80], 100.0)))
            .unwrap();
        drop(tx);

        let clock = ManualClock::new();
        let stats = run_headless(&mut engine, &mut handle, &clock, |ms| clock.advance(ms));

        assert_eq!(stats.triggers_fired, 2);
        assert_eq!(playback.drain().count(), 2);
        // D = 786px at 200px/s
        assert!(clock.now_ms() >= 3930.0);
        assert!(clock.now_ms() < 3930.0 + HEADLESS_FRAME_MS);
    }

    #[test]
    fn test_stops_immediately_without_work() {
        let mut engine = VisualizerEngine::new(Settings::default(), 1040.0, 1000.0);
        let (tx, _playback, mut handle) = EventChannels::new(8, 8).split();
        drop(tx);

        let clock = ManualClock::new();
        let stats = run_headless(&mut engine, &mut handle, &clock, |ms| clock.advance(ms));
        assert_eq!(stats, RunStats { frames: 1, triggers_fired: 0 });
    }

    #[test]
    fn test_reports_frames_that_change_the_scene() {
        let mut engine = VisualizerEngine::new(Settings::default(), 1040.0, 1000.0);
        let (mut tx, _playback, mut handle) = EventChannels::new(8, 8).split();
        tx.send(EngineInput::Live(LiveNoteEvent::note_on(60, 90))).unwrap();
        tx.send(EngineInput::Live(LiveNoteEvent::note_off(60))).unwrap();
        drop(tx);

        let clock = ManualClock::new();
        let mut reports = Vec::new();
        run_loop(
            &mut engine,
            &mut handle,
            &clock,
            |ms| clock.advance(ms),
            |engine, report, _| reports.push((report, engine.registry().len())),
        );

        // Sources closed and nothing scheduled: one frame, leftover beams
        // are not waited for
        assert_eq!(reports.len(), 1);
        let (report, beams) = reports[0];
        assert_eq!(report.drained.inputs, 2);
        assert_eq!(report.beams.stepped, 1);
        assert_eq!(beams, 1);
        assert!(report.changed());
        assert!(!FrameReport::default().changed());
    }
}
