//! Beam task registry driven by a single frame clock.
//!
//! Each frame the registry steps every task exactly once, in creation order,
//! then drops the tasks that finished. A task never runs twice in one frame
//! and nothing else touches its beam.

use log::debug;

use super::beam::{Beam, BeamId, BeamStyle, Rgba};
use super::live::LiveBeamTask;
use super::predictive::PredictiveBeamTask;
use crate::keys::{KeyStateMachine, PianoKey};
use crate::surface::KeyRect;
use crate::timing::BeamTiming;

/// Per-frame inputs shared by every task.
pub struct FrameContext<'a> {
    /// Frame timestamp in milliseconds.
    pub now_ms: f64,
    /// Nominal rate times the multiplier sampled for this frame.
    pub pixels_per_second: f64,
    /// Key states, read-only during the frame.
    pub keys: &'a KeyStateMachine,
}

/// Result of stepping a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// The animation completed; the beam must be removed.
    Finished,
}

/// One running animation.
#[derive(Clone, Debug)]
pub enum BeamTask {
    Live(LiveBeamTask),
    Predictive(PredictiveBeamTask),
}

impl BeamTask {
    pub fn beam(&self) -> &Beam {
        match self {
            BeamTask::Live(t) => t.beam(),
            BeamTask::Predictive(t) => t.beam(),
        }
    }

    fn step(&mut self, frame: &FrameContext<'_>) -> StepOutcome {
        match self {
            BeamTask::Live(t) => t.step(frame),
            BeamTask::Predictive(t) => t.step(frame),
        }
    }
}

/// Frame summary returned by [`BeamRegistry::step_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub stepped: usize,
    pub finished: usize,
}

/// Owns every live and predictive beam task.
#[derive(Debug, Default)]
pub struct BeamRegistry {
    tasks: Vec<BeamTask>,
    next_id: u64,
    style: BeamStyle,
}

impl BeamRegistry {
    pub fn new(style: BeamStyle) -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 0,
            style,
        }
    }

    pub fn style(&self) -> &BeamStyle {
        &self.style
    }

    fn allocate_id(&mut self) -> BeamId {
        self.next_id += 1;
        BeamId(self.next_id)
    }

    /// Start a live beam for the press identified by `generation`.
    pub fn spawn_live(
        &mut self,
        key: PianoKey,
        rect: KeyRect,
        generation: u64,
        color: Rgba,
        now_ms: f64,
    ) -> BeamId {
        let id = self.allocate_id();
        let task = LiveBeamTask::new(id, key, rect, generation, color, &self.style, now_ms);
        self.tasks.push(BeamTask::Live(task));
        id
    }

    /// Start a predictive beam with timing frozen at `timing`.
    pub fn spawn_predictive(
        &mut self,
        key: PianoKey,
        rect: KeyRect,
        start_top_px: f64,
        timing: BeamTiming,
        color: Rgba,
        now_ms: f64,
    ) -> BeamId {
        let id = self.allocate_id();
        let task = PredictiveBeamTask::new(
            id,
            key,
            rect,
            start_top_px,
            timing,
            color,
            &self.style,
            now_ms,
        );
        self.tasks.push(BeamTask::Predictive(task));
        id
    }

    /// Step every task once and remove the finished ones.
    pub fn step_all(&mut self, frame: &FrameContext<'_>) -> FrameStats {
        let stepped = self.tasks.len();
        self.tasks
            .retain_mut(|task| task.step(frame) == StepOutcome::Continue);
        FrameStats {
            stepped,
            finished: stepped - self.tasks.len(),
        }
    }

    /// Drop every beam belonging to `key`. Used when its element unmounts.
    pub fn remove_key(&mut self, key: PianoKey) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.beam().key != key);
        let removed = before - self.tasks.len();
        if removed > 0 {
            debug!("Detached {} beam(s) from unmounted {}", removed, key);
        }
        removed
    }

    /// Current beams in creation order.
    pub fn beams(&self) -> impl Iterator<Item = &Beam> + '_ {
        self.tasks.iter().map(BeamTask::beam)
    }

    pub fn tasks(&self) -> &[BeamTask] {
        &self.tasks
    }

    pub fn get(&self, id: BeamId) -> Option<&Beam> {
        self.beams().find(|b| b.id == id)
    }

    pub fn count_for(&self, key: PianoKey) -> usize {
        self.beams().filter(|b| b.key == key).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
