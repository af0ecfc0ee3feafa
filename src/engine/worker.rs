//! Engine thread for the windowed viewer.
//!
//! The viewer never steps the engine from its paint callback. The engine
//! runs [`run_loop`] on its own thread, so triggers keep firing while the
//! window is minimized or covered, and hands finished frames to the UI as
//! [`FrameSnapshot`]s. Both directions are rtrb SPSC queues.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};
use rtrb::{Consumer, Producer, RingBuffer};

use super::runner::{run_loop, FrameReport, RunStats};
use super::visualizer::VisualizerEngine;
use crate::protocol::{EngineHandle, EngineInput, InputSender};
use crate::surface::{KeyboardLayout, Scene};
use crate::timing::SystemClock;

/// Buffer size for the viewer's input queue (UI -> engine).
pub const UI_INPUT_BUFFER_SIZE: usize = 256;

/// Buffer size for the snapshot queue (engine -> UI).
pub const SNAPSHOT_BUFFER_SIZE: usize = 4;

/// Everything the viewer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct FrameSnapshot {
    pub now_ms: f64,
    pub scene: Scene,
    /// Layout the scene was composed against; also used for hit testing.
    pub layout: KeyboardLayout,
    pub speed_value: f64,
    pub speed_percent: i64,
    pub beams: usize,
    pub pending_triggers: usize,
}

impl FrameSnapshot {
    pub fn capture(engine: &VisualizerEngine, now_ms: f64) -> Self {
        Self {
            now_ms,
            scene: engine.scene(),
            layout: engine.layout().clone(),
            speed_value: engine.speed().value(),
            speed_percent: engine.speed().percent(),
            beams: engine.registry().len(),
            pending_triggers: engine.synchronizer().pending(),
        }
    }
}

/// Create a snapshot queue holding at most `capacity` frames.
pub fn snapshot_channel(capacity: usize) -> (SnapshotPublisher, SnapshotReceiver) {
    let (tx, rx) = RingBuffer::new(capacity);
    (SnapshotPublisher { tx }, SnapshotReceiver { rx })
}

/// Engine-side end of the snapshot queue.
pub struct SnapshotPublisher {
    tx: Producer<FrameSnapshot>,
}

impl SnapshotPublisher {
    pub fn has_room(&self) -> bool {
        self.tx.slots() > 0
    }

    /// Queue a snapshot. Returns false if the viewer has fallen behind.
    pub fn publish(&mut self, snapshot: FrameSnapshot) -> bool {
        self.tx.push(snapshot).is_ok()
    }
}

/// UI-side end of the snapshot queue.
pub struct SnapshotReceiver {
    rx: Consumer<FrameSnapshot>,
}

impl SnapshotReceiver {
    /// Newest snapshot queued since the last call. Older ones are discarded.
    pub fn latest(&mut self) -> Option<FrameSnapshot> {
        std::iter::from_fn(|| self.rx.pop().ok()).last()
    }
}

/// Publishes a snapshot for every frame that changed something, then calls
/// `wake`. A frame that finds the queue full is remembered and published on
/// the next iteration with room, so the viewer always ends on a current
/// frame.
pub struct FramePublisher<W> {
    publisher: SnapshotPublisher,
    wake: W,
    stale: bool,
}

impl<W: FnMut()> FramePublisher<W> {
    pub fn new(publisher: SnapshotPublisher, wake: W) -> Self {
        Self {
            publisher,
            wake,
            stale: true,
        }
    }

    /// Returns true if a snapshot was queued.
    pub fn on_frame(&mut self, engine: &VisualizerEngine, report: FrameReport, now_ms: f64) -> bool {
        if !self.stale && !report.changed() {
            return false;
        }
        if !self.publisher.has_room()
            || !self.publisher.publish(FrameSnapshot::capture(engine, now_ms))
        {
            self.stale = true;
            return false;
        }
        self.stale = false;
        (self.wake)();
        true
    }
}

/// Handle to an engine running on its own thread.
pub struct EngineWorker {
    inputs: InputSender,
    snapshots: SnapshotReceiver,
    thread: JoinHandle<RunStats>,
}

impl EngineWorker {
    /// Move `engine` onto a new thread. `wake` runs on that thread after each
    /// published snapshot, typically to request a repaint.
    pub fn spawn<W>(
        mut engine: VisualizerEngine,
        mut handle: EngineHandle,
        wake: W,
    ) -> io::Result<Self>
    where
        W: FnMut() + Send + 'static,
    {
        let inputs = handle.attach_source(UI_INPUT_BUFFER_SIZE);
        let (publisher, snapshots) = snapshot_channel(SNAPSHOT_BUFFER_SIZE);

        let thread = thread::Builder::new()
            .name("key-beam-engine".into())
            .spawn(move || {
                info!("Engine thread started");
                let clock = SystemClock::new();
                let mut frames = FramePublisher::new(publisher, wake);
                run_loop(
                    &mut engine,
                    &mut handle,
                    &clock,
                    |ms| thread::sleep(Duration::from_secs_f64(ms / 1000.0)),
                    |engine, report, now_ms| {
                        frames.on_frame(engine, report, now_ms);
                    },
                )
            })?;

        Ok(Self {
            inputs,
            snapshots,
            thread,
        })
    }

    /// Queue an input from the viewer.
    pub fn send(&mut self, input: EngineInput) {
        self.inputs.send_lossy(input);
    }

    pub fn latest(&mut self) -> Option<FrameSnapshot> {
        self.snapshots.latest()
    }

    /// Close the viewer's queues and wait for the engine loop to end. The
    /// loop ends once every other input source has closed too and the last
    /// pending trigger has fired.
    pub fn join(self) -> Option<RunStats> {
        let Self {
            inputs,
            snapshots,
            thread,
        } = self;
        drop(inputs);
        drop(snapshots);
        match thread.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                debug!("Engine thread panicked");
                None
            }
        }
    }
}
