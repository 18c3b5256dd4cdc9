//! Reduces a trial's engine notifications to the two logged scalars.

use bevy_ecs::prelude::{Entity, World};
use link_core::scenario::{enable_sniffer_trace, Teardown};

/// Trial-scoped observer of the receiving device.
///
/// Created per trial, so a trial that receives no frame reports no signal
/// instead of a value left over from an earlier trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryCollector {
    receiver: Entity,
}

/// What one trial measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialTelemetry {
    pub rx_bytes: u64,
    pub signal_dbm: Option<f64>,
    pub throughput_mbps: f64,
}

impl TelemetryCollector {
    /// Subscribe to physical-layer receive notifications of `receiver`.
    /// Must be called before the trial runs.
    pub fn attach(world: &mut World, receiver: Entity) -> Self {
        enable_sniffer_trace(world, receiver);
        Self { receiver }
    }

    /// Read the trial's measurements after teardown. Throughput comes from
    /// the last flow's received bytes; signal from the last received frame.
    pub fn collect(&self, teardown: &Teardown, duration_s: f64) -> TrialTelemetry {
        let rx_bytes = teardown
            .flows
            .last_flow()
            .map(|(_, stats)| stats.rx_bytes)
            .unwrap_or(0);
        let signal_dbm = teardown
            .sniffer_trace(self.receiver)
            .and_then(|trace| trace.last())
            .map(|sample| sample.signal_dbm);
        TrialTelemetry {
            rx_bytes,
            signal_dbm,
            throughput_mbps: throughput_mbps(rx_bytes, duration_s),
        }
    }
}

/// `rx_bytes * 8 / duration / 1e6`; zero for an empty or zero-length trial.
pub fn throughput_mbps(rx_bytes: u64, duration_s: f64) -> f64 {
    if rx_bytes == 0 || duration_s <= 0.0 {
        return 0.0;
    }
    rx_bytes as f64 * 8.0 / duration_s / 1e6
}
