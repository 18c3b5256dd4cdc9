//! Discrete-event clock: a min-heap of timestamped events in simulation nanoseconds.
//!
//! Events with equal timestamps pop in the order they were scheduled, so a
//! trial replays identically for identical inputs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

pub const ONE_US_NS: u64 = 1_000;
pub const ONE_SEC_NS: u64 = 1_000_000_000;

/// Convert seconds to simulation nanoseconds, rounding to the nearest tick.
/// Negative and non-finite inputs clamp to zero.
pub fn secs_to_ns(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    (secs * ONE_SEC_NS as f64).round() as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Traffic generator tick on an application socket.
    AppSend,
    /// A PPDU finished arriving at the receiving device.
    PhyRxEnd,
    /// The sender's medium access for a PPDU (including block ack) is over.
    TxComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    /// Entity the event targets (socket for `AppSend`, device node otherwise).
    pub subject: Option<Entity>,
    /// Node id the event executes in, for diagnostics.
    pub context: Option<u32>,
    seq: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event currently being dispatched by the runner.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Hard stop: the runner never processes an event at or after this timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct StopTime(pub u64);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<Entity>) {
        self.push(timestamp, kind, subject, None);
    }

    pub fn schedule_in(&mut self, delay_ns: u64, kind: EventKind, subject: Option<Entity>) {
        self.push(self.now.saturating_add(delay_ns), kind, subject, None);
    }

    /// Schedule an event that executes in the context of `node_id`.
    pub fn schedule_with_context(
        &mut self,
        node_id: u32,
        delay_ns: u64,
        kind: EventKind,
        subject: Option<Entity>,
    ) {
        self.push(self.now.saturating_add(delay_ns), kind, subject, Some(node_id));
    }

    fn push(
        &mut self,
        timestamp: u64,
        kind: EventKind,
        subject: Option<Entity>,
        context: Option<u32>,
    ) {
        debug_assert!(timestamp >= self.now, "event timestamp must be >= current time");
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp,
            kind,
            subject,
            context,
            seq,
        });
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_timestamps_pop_in_schedule_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::TxComplete, None);
        clock.schedule_at(10, EventKind::AppSend, None);
        clock.schedule_at(10, EventKind::PhyRxEnd, None);

        assert_eq!(clock.pop_next().expect("first").kind, EventKind::TxComplete);
        assert_eq!(clock.pop_next().expect("second").kind, EventKind::AppSend);
        assert_eq!(clock.pop_next().expect("third").kind, EventKind::PhyRxEnd);
        assert!(clock.is_empty());
    }

    #[test]
    fn schedule_in_is_relative_to_now() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(ONE_SEC_NS, EventKind::AppSend, None);
        clock.pop_next().expect("tick");
        clock.schedule_with_context(1, 5 * ONE_US_NS, EventKind::AppSend, None);

        let next = clock.pop_next().expect("rescheduled tick");
        assert_eq!(next.timestamp, ONE_SEC_NS + 5_000);
        assert_eq!(next.context, Some(1));
    }

    #[test]
    fn seconds_round_to_nanoseconds() {
        assert_eq!(secs_to_ns(1.0), ONE_SEC_NS);
        assert_eq!(secs_to_ns(0.000_157_653_333_3), 157_653);
        assert_eq!(secs_to_ns(-3.0), 0);
        assert_eq!(secs_to_ns(f64::NAN), 0);
    }
}
