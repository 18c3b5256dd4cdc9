//! 802.11n device model: PHY reception thresholds, ideal rate control and a
//! single-queue MAC with A-MPDU aggregation and bounded retries.

use std::collections::VecDeque;
use std::net::SocketAddrV4;

use bevy_ecs::prelude::{Component, Entity, Resource};

use crate::clock::ONE_US_NS;
use crate::flow_monitor::FlowId;

/// Thermal noise density at room temperature.
const THERMAL_NOISE_DBM_PER_HZ: f64 = -174.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelWidth {
    Mhz20,
    Mhz40,
}

impl ChannelWidth {
    /// Channel bonding combines two adjacent 20 MHz channels.
    pub fn from_bonding(channel_bonding: bool) -> Self {
        if channel_bonding {
            Self::Mhz40
        } else {
            Self::Mhz20
        }
    }

    pub fn mhz(self) -> u32 {
        match self {
            Self::Mhz20 => 20,
            Self::Mhz40 => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct McsEntry {
    pub index: u8,
    pub min_snr_db: f64,
    pub rate_20mhz_mbps: f64,
}

impl McsEntry {
    pub fn rate_mbps(&self, width: ChannelWidth) -> f64 {
        match width {
            ChannelWidth::Mhz20 => self.rate_20mhz_mbps,
            // 108 data subcarriers at 40 MHz vs 52 at 20 MHz.
            ChannelWidth::Mhz40 => self.rate_20mhz_mbps * 108.0 / 52.0,
        }
    }
}

/// HT MCS 0-7, one spatial stream, long guard interval.
pub const HT_MCS_TABLE: [McsEntry; 8] = [
    McsEntry { index: 0, min_snr_db: 5.0, rate_20mhz_mbps: 6.5 },
    McsEntry { index: 1, min_snr_db: 8.0, rate_20mhz_mbps: 13.0 },
    McsEntry { index: 2, min_snr_db: 11.0, rate_20mhz_mbps: 19.5 },
    McsEntry { index: 3, min_snr_db: 14.0, rate_20mhz_mbps: 26.0 },
    McsEntry { index: 4, min_snr_db: 18.0, rate_20mhz_mbps: 39.0 },
    McsEntry { index: 5, min_snr_db: 22.0, rate_20mhz_mbps: 52.0 },
    McsEntry { index: 6, min_snr_db: 24.0, rate_20mhz_mbps: 58.5 },
    McsEntry { index: 7, min_snr_db: 26.0, rate_20mhz_mbps: 65.0 },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WifiPhyConfig {
    pub channel_width: ChannelWidth,
    pub tx_power_dbm: f64,
    pub tx_gain_db: f64,
    pub rx_gain_db: f64,
    pub noise_figure_db: f64,
    /// Frames below this power are never seen by the receiver.
    pub rx_sensitivity_dbm: f64,
    /// Minimum RSSI for preamble detection.
    pub preamble_min_rssi_dbm: f64,
    /// Minimum SNR for preamble detection.
    pub preamble_snr_threshold_db: f64,
}

impl Default for WifiPhyConfig {
    fn default() -> Self {
        Self {
            channel_width: ChannelWidth::Mhz20,
            tx_power_dbm: 10.0,
            tx_gain_db: 1.0,
            rx_gain_db: 1.0,
            noise_figure_db: 7.0,
            rx_sensitivity_dbm: -101.0,
            preamble_min_rssi_dbm: -82.0,
            preamble_snr_threshold_db: 4.0,
        }
    }
}

impl WifiPhyConfig {
    pub fn with_channel_bonding(mut self, channel_bonding: bool) -> Self {
        self.channel_width = ChannelWidth::from_bonding(channel_bonding);
        self
    }

    pub fn noise_floor_dbm(&self) -> f64 {
        let bandwidth_hz = self.channel_width.mhz() as f64 * 1e6;
        THERMAL_NOISE_DBM_PER_HZ + 10.0 * bandwidth_hz.log10() + self.noise_figure_db
    }

    /// Effective radiated power handed to the propagation model.
    pub fn radiated_power_dbm(&self) -> f64 {
        self.tx_power_dbm + self.tx_gain_db
    }

    /// Classify an arriving PPDU given its power at the antenna port
    /// (before rx gain) and the MCS it was sent with.
    pub fn classify(&self, antenna_power_dbm: f64, mcs: &McsEntry) -> RxOutcome {
        let rx_power_dbm = antenna_power_dbm + self.rx_gain_db;
        let snr_db = rx_power_dbm - self.noise_floor_dbm();
        if rx_power_dbm < self.rx_sensitivity_dbm {
            return RxOutcome::BelowSensitivity;
        }
        if rx_power_dbm < self.preamble_min_rssi_dbm || snr_db < self.preamble_snr_threshold_db {
            return RxOutcome::PreambleMissed { rx_power_dbm, snr_db };
        }
        if snr_db < mcs.min_snr_db {
            return RxOutcome::DecodeFailed { rx_power_dbm, snr_db };
        }
        RxOutcome::Decoded { rx_power_dbm, snr_db }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RxOutcome {
    BelowSensitivity,
    PreambleMissed { rx_power_dbm: f64, snr_db: f64 },
    DecodeFailed { rx_power_dbm: f64, snr_db: f64 },
    Decoded { rx_power_dbm: f64, snr_db: f64 },
}

impl RxOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded { .. })
    }

    /// SNR as fed back to the sender's rate control, when the receiver locked
    /// onto the preamble.
    pub fn feedback_snr_db(&self) -> Option<f64> {
        match self {
            Self::DecodeFailed { snr_db, .. } | Self::Decoded { snr_db, .. } => Some(*snr_db),
            Self::BelowSensitivity | Self::PreambleMissed { .. } => None,
        }
    }
}

/// Picks the fastest MCS the last observed SNR supports.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdealRateManager {
    last_snr_db: Option<f64>,
}

impl IdealRateManager {
    pub fn report_snr(&mut self, snr_db: f64) {
        self.last_snr_db = Some(snr_db);
    }

    pub fn last_snr_db(&self) -> Option<f64> {
        self.last_snr_db
    }

    pub fn select(&self) -> &'static McsEntry {
        let Some(snr) = self.last_snr_db else {
            return &HT_MCS_TABLE[0];
        };
        HT_MCS_TABLE
            .iter()
            .rev()
            .find(|mcs| mcs.min_snr_db <= snr)
            .unwrap_or(&HT_MCS_TABLE[0])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacConfig {
    pub queue_limit_packets: usize,
    pub max_ampdu_bytes: u32,
    /// MAC header, LLC/SNAP and FCS per MPDU.
    pub mpdu_overhead_bytes: u32,
    pub preamble_ns: u64,
    /// DIFS, mean backoff, SIFS and block ack per channel access.
    pub access_overhead_ns: u64,
    pub max_retries: u8,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            queue_limit_packets: 500,
            max_ampdu_bytes: 65_535,
            mpdu_overhead_bytes: 38,
            preamble_ns: 36 * ONE_US_NS,
            access_overhead_ns: 150 * ONE_US_NS,
            max_retries: 7,
        }
    }
}

impl MacConfig {
    /// On-air duration of a PPDU carrying `psdu_bytes` at `rate_mbps`.
    /// OFDM symbols are 4 us and carry service (16) and tail (6) bits.
    pub fn ppdu_duration_ns(&self, psdu_bytes: u32, rate_mbps: f64) -> u64 {
        let bits_per_symbol = rate_mbps * 4.0;
        let payload_bits = 16.0 + 8.0 * psdu_bytes as f64 + 6.0;
        let symbols = (payload_bits / bits_per_symbol).ceil() as u64;
        self.preamble_ns + symbols * 4 * ONE_US_NS
    }
}

/// An IP packet waiting in a device's transmit queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedPacket {
    pub flow: FlowId,
    pub src: SocketAddrV4,
    pub dst: SocketAddrV4,
    /// IP packet size, headers included.
    pub size_bytes: u32,
    pub retries: u8,
}

/// A PPDU occupying the sender until its `TxComplete` event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPpdu {
    pub mpdus: usize,
    pub decoded: bool,
}

#[derive(Debug, Clone, Component)]
pub struct WifiDevice {
    pub phy: WifiPhyConfig,
    pub mac: MacConfig,
    pub rate: IdealRateManager,
    pub queue: VecDeque<QueuedPacket>,
    pub pending: Option<PendingPpdu>,
}

impl WifiDevice {
    pub fn new(phy: WifiPhyConfig, mac: MacConfig) -> Self {
        Self {
            phy,
            mac,
            rate: IdealRateManager::default(),
            queue: VecDeque::new(),
            pending: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Tail-drop enqueue. Returns `false` when the queue is full.
    pub fn enqueue(&mut self, packet: QueuedPacket) -> bool {
        if self.queue.len() >= self.mac.queue_limit_packets {
            return false;
        }
        self.queue.push_back(packet);
        true
    }

    /// Number of head-of-queue packets that fit in one A-MPDU, and the PSDU size.
    pub fn next_aggregate(&self) -> (usize, u32) {
        let mut count = 0;
        let mut bytes: u32 = 0;
        for packet in &self.queue {
            let mpdu = packet.size_bytes + self.mac.mpdu_overhead_bytes;
            if count > 0 && bytes + mpdu > self.mac.max_ampdu_bytes {
                break;
            }
            bytes += mpdu;
            count += 1;
        }
        (count, bytes)
    }

    /// Settle the pending PPDU: acknowledged MPDUs leave the queue, the
    /// others are retried until `max_retries` and then dropped.
    /// Returns the dropped packets.
    pub fn complete_pending(&mut self) -> Vec<QueuedPacket> {
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        let mpdus = pending.mpdus.min(self.queue.len());
        if pending.decoded {
            self.queue.drain(..mpdus);
            return Vec::new();
        }

        let mut dropped = Vec::new();
        let mut kept = VecDeque::with_capacity(mpdus);
        for mut packet in self.queue.drain(..mpdus) {
            packet.retries += 1;
            if packet.retries > self.mac.max_retries {
                dropped.push(packet);
            } else {
                kept.push_back(packet);
            }
        }
        while let Some(packet) = kept.pop_back() {
            self.queue.push_front(packet);
        }
        dropped
    }
}

/// A decodable PPDU travelling to its receiver; consumed by its `PhyRxEnd` event.
#[derive(Debug, Clone, PartialEq)]
pub struct InFlightPpdu {
    pub sender: Entity,
    pub receiver: Entity,
    pub arrival_ns: u64,
    pub mcs: u8,
    pub rx_power_dbm: f64,
    pub noise_dbm: f64,
    pub packets: Vec<QueuedPacket>,
}

#[derive(Debug, Default, Resource)]
pub struct InFlightPpdus(pub VecDeque<InFlightPpdu>);

impl InFlightPpdus {
    pub fn push(&mut self, ppdu: InFlightPpdu) {
        self.0.push_back(ppdu);
    }

    /// Remove the PPDU that reaches `receiver` at `now`.
    pub fn take_arrival(&mut self, receiver: Entity, now: u64) -> Option<InFlightPpdu> {
        let index = self
            .0
            .iter()
            .position(|ppdu| ppdu.receiver == receiver && ppdu.arrival_ns == now)?;
        self.0.remove(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
