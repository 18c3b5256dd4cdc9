use crate::clock::ONE_SEC_NS;
use crate::propagation::{FriisConfig, PropagationLossModel};
use crate::wifi::{MacConfig, WifiPhyConfig};

/// Default start of the traffic generator: one second into simulated time.
pub const DEFAULT_TRAFFIC_START_NS: u64 = ONE_SEC_NS;

/// Port the receiving socket binds to.
pub const DEFAULT_SINK_PORT: u16 = 80;

/// Parameters for building one two-node link scenario.
#[derive(Debug, Clone)]
pub struct LinkScenarioParams {
    /// Separation along the x axis; the receiver sits at the origin.
    pub distance_m: f64,
    pub loss: PropagationLossModel,
    pub phy: WifiPhyConfig,
    pub mac: MacConfig,
    pub payload_bytes: u32,
    pub packet_count: u32,
    pub interval_ns: u64,
    pub traffic_start_ns: u64,
    /// Hard stop of the run.
    pub stop_ns: u64,
    pub sink_port: u16,
    pub seed: u64,
}

impl Default for LinkScenarioParams {
    fn default() -> Self {
        Self {
            distance_m: 1.0,
            loss: PropagationLossModel::Friis(FriisConfig::default()),
            phy: WifiPhyConfig::default(),
            mac: MacConfig::default(),
            payload_bytes: 1450,
            packet_count: 0,
            interval_ns: ONE_SEC_NS,
            traffic_start_ns: DEFAULT_TRAFFIC_START_NS,
            stop_ns: 10 * ONE_SEC_NS,
            sink_port: DEFAULT_SINK_PORT,
            seed: 1,
        }
    }
}

impl LinkScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_distance_m(mut self, distance_m: f64) -> Self {
        self.distance_m = distance_m;
        self
    }

    pub fn with_loss(mut self, loss: PropagationLossModel) -> Self {
        self.loss = loss;
        self
    }

    pub fn with_channel_bonding(mut self, channel_bonding: bool) -> Self {
        self.phy = self.phy.with_channel_bonding(channel_bonding);
        self
    }

    /// Send `packet_count` payloads of `payload_bytes`, one every `interval_ns`.
    pub fn with_traffic(mut self, payload_bytes: u32, packet_count: u32, interval_ns: u64) -> Self {
        self.payload_bytes = payload_bytes;
        self.packet_count = packet_count;
        self.interval_ns = interval_ns;
        self
    }

    pub fn with_stop_ns(mut self, stop_ns: u64) -> Self {
        self.stop_ns = stop_ns;
        self
    }
}
