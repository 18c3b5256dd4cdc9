//! Seeded randomness for one simulation world.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The only source of randomness inside a trial. One instance per world, so
/// two worlds built from the same seed draw the same sequence.
#[derive(Debug, Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::seeded(1)
    }
}
