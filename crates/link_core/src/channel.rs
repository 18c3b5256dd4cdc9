use bevy_ecs::prelude::Resource;
use rand::Rng;

use crate::clock::secs_to_ns;
use crate::ecs::Position;
use crate::propagation::{PropagationLossModel, SPEED_OF_LIGHT_M_PER_S};

/// The shared wireless medium of a trial: one propagation-loss model and a
/// constant-speed propagation delay.
#[derive(Debug, Clone, Resource)]
pub struct WifiChannel {
    pub loss: PropagationLossModel,
    pub propagation_speed_m_per_s: f64,
}

impl WifiChannel {
    pub fn new(loss: PropagationLossModel) -> Self {
        Self {
            loss,
            propagation_speed_m_per_s: SPEED_OF_LIGHT_M_PER_S,
        }
    }

    pub fn rx_power_dbm<R: Rng + ?Sized>(
        &self,
        tx_power_dbm: f64,
        from: &Position,
        to: &Position,
        rng: &mut R,
    ) -> f64 {
        self.loss.rx_power_dbm(tx_power_dbm, from, to, rng)
    }

    pub fn delay_ns(&self, from: &Position, to: &Position) -> u64 {
        secs_to_ns(from.distance_to(to) / self.propagation_speed_m_per_s)
    }
}
