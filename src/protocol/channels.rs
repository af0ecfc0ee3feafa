//! Engine Channels
//!
//! Lock-free queues that move events from foreign threads (device callbacks,
//! host readers) onto the engine's single execution context, and carry fired
//! playback requests back out. Uses rtrb SPSC ring buffers.

use log::warn;
use rtrb::{Consumer, Producer, RingBuffer};
use thiserror::Error;

use super::commands::{EngineInput, PlaybackRequest, PlaybackSink};

/// Default buffer size for the input queue (sources -> engine).
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 1024;

/// Default buffer size for the playback queue (engine -> playback).
pub const DEFAULT_PLAYBACK_BUFFER_SIZE: usize = 512;

/// Error returned when a queue has no free slot.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Engine input queue is full")]
    InputFull(EngineInput),
}

/// Both directions of communication, before being split between threads.
pub struct EventChannels {
    pub input_tx: Producer<EngineInput>,
    pub input_rx: Consumer<EngineInput>,
    pub playback_tx: Producer<PlaybackRequest>,
    pub playback_rx: Consumer<PlaybackRequest>,
}

impl EventChannels {
    /// Create channels with the given capacities.
    pub fn new(input_capacity: usize, playback_capacity: usize) -> Self {
        let (input_tx, input_rx) = RingBuffer::new(input_capacity);
        let (playback_tx, playback_rx) = RingBuffer::new(playback_capacity);

        Self {
            input_tx,
            input_rx,
            playback_tx,
            playback_rx,
        }
    }

    /// Create channels with default capacities.
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_INPUT_BUFFER_SIZE, DEFAULT_PLAYBACK_BUFFER_SIZE)
    }

    /// Split into the three handles that live on different threads.
    pub fn split(self) -> (InputSender, PlaybackReceiver, EngineHandle) {
        (
            InputSender { tx: self.input_tx },
            PlaybackReceiver {
                rx: self.playback_rx,
            },
            EngineHandle {
                sources: vec![self.input_rx],
                playback_tx: self.playback_tx,
            },
        )
    }
}

/// Source-side handle: pushes inputs toward the engine.
pub struct InputSender {
    tx: Producer<EngineInput>,
}

impl InputSender {
    /// Queue an input. Never blocks.
    pub fn send(&mut self, input: EngineInput) -> Result<(), ChannelError> {
        self.tx
            .push(input)
            .map_err(|rtrb::PushError::Full(input)| ChannelError::InputFull(input))
    }

    /// Queue an input, dropping it if the queue is full.
    pub fn send_lossy(&mut self, input: EngineInput) {
        if let Err(e) = self.send(input) {
            warn!("{}, dropping input", e);
        }
    }

    /// Whether the engine side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_abandoned()
    }
}

/// Playback-side handle: receives fired playback requests.
pub struct PlaybackReceiver {
    rx: Consumer<PlaybackRequest>,
}

impl PlaybackReceiver {
    pub fn recv(&mut self) -> Option<PlaybackRequest> {
        self.rx.pop().ok()
    }

    /// Drain all pending requests.
    pub fn drain(&mut self) -> impl Iterator<Item = PlaybackRequest> + '_ {
        std::iter::from_fn(|| self.recv())
    }

    pub fn is_abandoned(&self) -> bool {
        self.rx.is_abandoned()
    }
}

/// Engine-side handle: consumes inputs and publishes playback requests.
///
/// Each producer thread gets its own SPSC queue. Inputs from one source stay
/// in order; no order is kept across sources.
pub struct EngineHandle {
    sources: Vec<Consumer<EngineInput>>,
    playback_tx: Producer<PlaybackRequest>,
}

impl EngineHandle {
    /// Open another input queue for a second producer thread.
    pub fn attach_source(&mut self, capacity: usize) -> InputSender {
        let (tx, rx) = RingBuffer::new(capacity);
        self.sources.push(rx);
        InputSender { tx }
    }

    pub fn recv_input(&mut self) -> Option<EngineInput> {
        self.sources.iter_mut().find_map(|rx| rx.pop().ok())
    }

    /// Hand every pending input to `handler`, in arrival order.
    pub fn process_inputs<F>(&mut self, mut handler: F)
    where
        F: FnMut(EngineInput),
    {
        while let Some(input) = self.recv_input() {
            handler(input);
        }
    }

    pub fn inputs_pending(&self) -> usize {
        self.sources.iter().map(|rx| rx.slots()).sum()
    }

    /// Whether every source has been dropped.
    pub fn inputs_closed(&self) -> bool {
        self.sources.iter().all(|rx| rx.is_abandoned())
    }
}

impl PlaybackSink for EngineHandle {
    fn trigger_playback(&mut self, request: PlaybackRequest) {
        if self.playback_tx.push(request).is_err() {
            warn!("Playback queue full, dropping playback request");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::events::PredictiveNoteEvent;

    #[test]
    fn test_channel_creation() {
        let channels = EventChannels::new(64, 32);
        assert_eq!(channels.input_tx.slots(), 64);
        assert_eq!(channels.playback_tx.slots(), 32);
    }

    #[test]
    fn test_inputs_arrive_in_order() {
        let (mut sender, _playback, mut engine) = EventChannels::with_defaults().split();
        sender.send(EngineInput::SetSpeed(1.0)).unwrap();
        sender.send(EngineInput::SetSpeed(2.0)).unwrap();
        assert_eq!(engine.inputs_pending(), 2);

        let mut seen = Vec::new();
        engine.process_inputs(|input| {
            if let EngineInput::SetSpeed(v) = input {
                seen.push(v);
            }
        });
        assert_eq!(seen, vec![1.0, 2.0]);
        assert!(engine.recv_input().is_none());
    }

    #[test]
    fn test_full_input_queue() {
        let (mut sender, _playback, _engine) = EventChannels::new(1, 1).split();
        sender.send(EngineInput::SetSpeed(1.0)).unwrap();
        assert!(matches!(
            sender.send(EngineInput::SetSpeed(2.0)),
            Err(ChannelError::InputFull(EngineInput::SetSpeed(_)))
        ));
    }

    #[test]
    fn test_playback_round_trip() {
        let (_sender, mut playback, mut engine) = EventChannels::with_defaults().split();
        engine.trigger_playback(PlaybackRequest {
            id: 7,
            payload: PredictiveNoteEvent::new([0x90, 60, 100], 500.0),
            scheduled_at_ms: 0.0,
            due_ms: 100.0,
            fired_at_ms: 101.0,
        });
        let fired: Vec<_> = playback.drain().collect();
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, 7);
    }

    #[test]
    fn test_inputs_closed_when_sender_dropped() {
        let (sender, _playback, engine) = EventChannels::with_defaults().split();
        assert!(!engine.inputs_closed());
        drop(sender);
        assert!(engine.inputs_closed());
    }

    #[test]
    fn test_attached_source_feeds_engine() {
        let (mut sender, _playback, mut engine) = EventChannels::with_defaults().split();
        let mut ui = engine.attach_source(8);

        ui.send(EngineInput::SetSpeed(50.0)).unwrap();
        sender.send(EngineInput::SetSpeed(10.0)).unwrap();
        assert_eq!(engine.inputs_pending(), 2);

        let mut seen = Vec::new();
        engine.process_inputs(|input| {
            if let EngineInput::SetSpeed(v) = input {
                seen.push(v);
            }
        });
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, vec![10.0, 50.0]);

        // Closed only once every source is gone
        drop(sender);
        assert!(!engine.inputs_closed());
        drop(ui);
        assert!(engine.inputs_closed());
    }

    #[test]
    fn test_handles_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<InputSender>();
        assert_send::<PlaybackReceiver>();
        assert_send::<EngineHandle>();
    }
}
