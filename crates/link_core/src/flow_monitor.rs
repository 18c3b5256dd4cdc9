//! Per-flow IP-layer counters, read once after a trial.

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddrV4;

use bevy_ecs::prelude::Resource;

pub const IPPROTO_UDP: u8 = 17;

/// Flow ids are assigned in order of first transmission, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiveTuple {
    pub src: SocketAddrV4,
    pub dst: SocketAddrV4,
    pub protocol: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub lost_packets: u64,
    pub first_tx_ns: Option<u64>,
    pub last_rx_ns: Option<u64>,
}

#[derive(Debug, Default, Resource)]
pub struct FlowMonitor {
    classifier: HashMap<FiveTuple, FlowId>,
    stats: BTreeMap<FlowId, FlowStats>,
}

impl FlowMonitor {
    /// Look up or create the flow for `tuple`.
    pub fn classify(&mut self, tuple: FiveTuple) -> FlowId {
        let next = FlowId(self.classifier.len() as u32 + 1);
        *self.classifier.entry(tuple).or_insert(next)
    }

    pub fn record_tx(&mut self, flow: FlowId, bytes: u32, now: u64) {
        let stats = self.stats.entry(flow).or_default();
        stats.tx_packets += 1;
        stats.tx_bytes += bytes as u64;
        stats.first_tx_ns.get_or_insert(now);
    }

    pub fn record_rx(&mut self, flow: FlowId, bytes: u32, now: u64) {
        let stats = self.stats.entry(flow).or_default();
        stats.rx_packets += 1;
        stats.rx_bytes += bytes as u64;
        stats.last_rx_ns = Some(now);
    }

    pub fn record_drop(&mut self, flow: FlowId) {
        self.stats.entry(flow).or_default().lost_packets += 1;
    }

    pub fn stats(&self) -> &BTreeMap<FlowId, FlowStats> {
        &self.stats
    }

    /// The most recently created flow, if any packet was ever sent.
    pub fn last_flow(&self) -> Option<(FlowId, &FlowStats)> {
        self.stats.iter().next_back().map(|(id, stats)| (*id, stats))
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
