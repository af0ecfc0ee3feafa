//! Timer queue for playback triggers.
//!
//! Triggers are independent of the frame loop: they fire from `poll`
//! whether or not any frame was rendered, so a hidden or paused surface
//! never delays playback.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::keys::PianoKey;
use crate::protocol::{PlaybackRequest, PlaybackSink, PredictiveNoteEvent, TriggerId};

/// What happens to pending triggers when their key element unmounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Pending triggers still fire; only the visuals are dropped.
    #[default]
    FireAndForget,
    /// Pending triggers for the key are retracted.
    CancelOnUnmount,
}

#[derive(Clone, Debug)]
struct PendingTrigger {
    id: TriggerId,
    key: PianoKey,
    due_ms: f64,
    scheduled_at_ms: f64,
    payload: PredictiveNoteEvent,
}

// Min-heap on (due_ms, id): earliest first, ties in scheduling order.
impl Ord for PendingTrigger {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due_ms
            .total_cmp(&self.due_ms)
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for PendingTrigger {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PendingTrigger {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PendingTrigger {}

/// Pending playback triggers ordered by due time.
#[derive(Debug, Default)]
pub struct TriggerScheduler {
    pending: BinaryHeap<PendingTrigger>,
    next_id: TriggerId,
    policy: TriggerPolicy,
}

impl TriggerScheduler {
    pub fn new(policy: TriggerPolicy) -> Self {
        Self {
            pending: BinaryHeap::new(),
            next_id: 0,
            policy,
        }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    /// Schedule `payload` to fire `delay_ms` after `now_ms`.
    pub fn schedule(
        &mut self,
        key: PianoKey,
        payload: PredictiveNoteEvent,
        now_ms: f64,
        delay_ms: f64,
    ) -> TriggerId {
        self.next_id += 1;
        let id = self.next_id;
        let due_ms = now_ms + delay_ms.max(0.0);
        trace!("Trigger {} for {} due at {:.1}ms", id, key, due_ms);
        self.pending.push(PendingTrigger {
            id,
            key,
            due_ms,
            scheduled_at_ms: now_ms,
            payload,
        });
        id
    }

    /// Fire every trigger due at or before `now_ms`, earliest first.
    pub fn poll<S: PlaybackSink + ?Sized>(&mut self, now_ms: f64, sink: &mut S) -> Vec<PianoKey> {
        let mut fired = Vec::new();
        while self.pending.peek().is_some_and(|t| t.due_ms <= now_ms) {
            let Some(trigger) = self.pending.pop() else {
                break;
            };
            fired.push(trigger.key);
            sink.trigger_playback(PlaybackRequest {
                id: trigger.id,
                payload: trigger.payload,
                scheduled_at_ms: trigger.scheduled_at_ms,
                due_ms: trigger.due_ms,
                fired_at_ms: now_ms,
            });
        }
        fired
    }

    /// Apply the unmount policy for `key`. Returns how many were retracted.
    pub fn on_unmount(&mut self, key: PianoKey) -> usize {
        match self.policy {
            TriggerPolicy::FireAndForget => 0,
            TriggerPolicy::CancelOnUnmount => {
                let before = self.pending.len();
                self.pending.retain(|t| t.key != key);
                let cancelled = before - self.pending.len();
                if cancelled > 0 {
                    debug!("Cancelled {} trigger(s) for unmounted {}", cancelled, key);
                }
                cancelled
            }
        }
    }

    /// Due time of the next trigger, if any.
    pub fn next_due_ms(&self) -> Option<f64> {
        self.pending.peek().map(|t| t.due_ms)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(note: u8) -> PredictiveNoteEvent {
        PredictiveNoteEvent::new([0x90, note, 100], 500.0)
    }

    fn key(note: u8) -> PianoKey {
        PianoKey::new(note).unwrap()
    }

    #[test]
    fn test_fires_once_when_due() {
        let mut scheduler = TriggerScheduler::default();
        scheduler.schedule(key(60), payload(60), 100.0, 250.0);
        let mut sink: Vec<PlaybackRequest> = Vec::new();

        assert!(scheduler.poll(349.0, &mut sink).is_empty());
        assert_eq!(scheduler.poll(350.0, &mut sink), vec![key(60)]);
        assert!(scheduler.poll(1000.0, &mut sink).is_empty());

        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].payload, payload(60));
        assert_eq!(sink[0].scheduled_at_ms, 100.0);
        assert_eq!(sink[0].due_ms, 350.0);
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut scheduler = TriggerScheduler::default();
        scheduler.schedule(key(64), payload(64), 0.0, 300.0);
        scheduler.schedule(key(60), payload(60), 0.0, 100.0);
        scheduler.schedule(key(62), payload(62), 0.0, 100.0);
        assert_eq!(scheduler.next_due_ms(), Some(100.0));

        let mut sink: Vec<PlaybackRequest> = Vec::new();
        let fired = scheduler.poll(500.0, &mut sink);
        assert_eq!(fired, vec![key(60), key(62), key(64)]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_fire_and_forget_survives_unmount() {
        let mut scheduler = TriggerScheduler::new(TriggerPolicy::FireAndForget);
        scheduler.schedule(key(60), payload(60), 0.0, 100.0);
        assert_eq!(scheduler.on_unmount(key(60)), 0);
        let mut sink: Vec<PlaybackRequest> = Vec::new();
        scheduler.poll(100.0, &mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_cancel_on_unmount() {
        let mut scheduler = TriggerScheduler::new(TriggerPolicy::CancelOnUnmount);
        scheduler.schedule(key(60), payload(60), 0.0, 100.0);
        scheduler.schedule(key(62), payload(62), 0.0, 100.0);
        assert_eq!(scheduler.on_unmount(key(60)), 1);

        let mut sink: Vec<PlaybackRequest> = Vec::new();
        assert_eq!(scheduler.poll(100.0, &mut sink), vec![key(62)]);
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: TriggerPolicy = serde_json::from_str("\"cancel_on_unmount\"").unwrap();
        assert_eq!(policy, TriggerPolicy::CancelOnUnmount);
    }
}
