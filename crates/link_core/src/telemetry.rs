//! Physical-layer receive notifications ("sniffer" trace).
//!
//! Attaching a [`SnifferRxTrace`] to a device entity subscribes it: every
//! MPDU that device decodes updates the trace. The trace lives in the trial
//! world, so it starts empty for every trial.

use bevy_ecs::prelude::Component;

/// Signal/noise sample of one received frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnifferRxSample {
    pub timestamp_ns: u64,
    pub signal_dbm: f64,
    pub noise_dbm: f64,
    pub mcs: u8,
    pub mpdu_bytes: u32,
}

impl SnifferRxSample {
    pub fn snr_db(&self) -> f64 {
        self.signal_dbm - self.noise_dbm
    }
}

#[derive(Debug, Clone, Default, PartialEq, Component)]
pub struct SnifferRxTrace {
    last: Option<SnifferRxSample>,
    frames: u64,
}

impl SnifferRxTrace {
    pub fn record(&mut self, sample: SnifferRxSample) {
        self.last = Some(sample);
        self.frames += 1;
    }

    /// Most recent sample; `None` if nothing was received.
    pub fn last(&self) -> Option<&SnifferRxSample> {
        self.last.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
