//! Constant-bit-rate traffic generator.
//!
//! The generator is a finite iterator advanced once per scheduled tick: it
//! yields `Send` while packets remain, then a single `Close`, then nothing.
//! The engine reschedules the next tick after `interval_ns` for every `Send`.

use bevy_ecs::prelude::Component;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficAction {
    /// Send one payload of this many bytes and tick again after the interval.
    Send { payload_bytes: u32 },
    /// Close the sending socket; no further ticks.
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct TrafficGenerator {
    payload_bytes: u32,
    remaining: u32,
    interval_ns: u64,
    closed: bool,
}

impl TrafficGenerator {
    pub fn new(payload_bytes: u32, packet_count: u32, interval_ns: u64) -> Self {
        Self {
            payload_bytes,
            remaining: packet_count,
            interval_ns,
            closed: false,
        }
    }

    pub fn interval_ns(&self) -> u64 {
        self.interval_ns
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.closed
    }
}

impl Iterator for TrafficGenerator {
    type Item = TrafficAction;

    fn next(&mut self) -> Option<TrafficAction> {
        if self.closed {
            return None;
        }
        if self.remaining > 0 {
            self.remaining -= 1;
            return Some(TrafficAction::Send {
                payload_bytes: self.payload_bytes,
            });
        }
        self.closed = true;
        Some(TrafficAction::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_count_packets_then_closes_once() {
        let generator = TrafficGenerator::new(1450, 3, 1_000);
        let actions: Vec<_> = generator.collect();
        assert_eq!(
            actions,
            vec![
                TrafficAction::Send { payload_bytes: 1450 },
                TrafficAction::Send { payload_bytes: 1450 },
                TrafficAction::Send { payload_bytes: 1450 },
                TrafficAction::Close,
            ]
        );
    }

    #[test]
    fn zero_packets_closes_immediately() {
        let mut generator = TrafficGenerator::new(1450, 0, 1_000);
        assert_eq!(generator.next(), Some(TrafficAction::Close));
        assert!(generator.is_finished());
        assert_eq!(generator.next(), None);
    }

    #[test]
    fn fresh_generators_are_independent() {
        let mut first = TrafficGenerator::new(100, 2, 10);
        first.next();
        let second = TrafficGenerator::new(100, 2, 10);
        assert_eq!(first.remaining(), 1);
        assert_eq!(second.remaining(), 2);
        assert_eq!(second.interval_ns(), 10);
    }
}
