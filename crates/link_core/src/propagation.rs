//! Propagation-loss models installed on the shared channel.
//!
//! Each model maps a transmit power and the two endpoint positions to a
//! received power in dBm. Defaults follow the conventional parameterization
//! of each model; callers override only what a campaign needs.

use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::ecs::Position;

pub const SPEED_OF_LIGHT_M_PER_S: f64 = 299_792_458.0;

fn wavelength_m(frequency_hz: f64) -> f64 {
    SPEED_OF_LIGHT_M_PER_S / frequency_hz
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FriisConfig {
    pub frequency_hz: f64,
    pub system_loss: f64,
    pub min_loss_db: f64,
}

impl Default for FriisConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 5.15e9,
            system_loss: 1.0,
            min_loss_db: 0.0,
        }
    }
}

impl FriisConfig {
    fn rx_power_dbm(&self, tx_power_dbm: f64, distance_m: f64) -> f64 {
        if distance_m <= 0.0 {
            return tx_power_dbm - self.min_loss_db;
        }
        let lambda = wavelength_m(self.frequency_hz);
        let numerator = lambda * lambda;
        let denominator = 16.0
            * std::f64::consts::PI
            * std::f64::consts::PI
            * distance_m
            * distance_m
            * self.system_loss;
        let loss_db = -10.0 * (numerator / denominator).log10();
        tx_power_dbm - loss_db.max(self.min_loss_db)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreeLogDistanceConfig {
    pub distance0_m: f64,
    pub distance1_m: f64,
    pub distance2_m: f64,
    pub exponent0: f64,
    pub exponent1: f64,
    pub exponent2: f64,
    pub reference_loss_db: f64,
}

impl Default for ThreeLogDistanceConfig {
    fn default() -> Self {
        Self {
            distance0_m: 1.0,
            distance1_m: 200.0,
            distance2_m: 500.0,
            exponent0: 1.9,
            exponent1: 3.8,
            exponent2: 3.8,
            reference_loss_db: 46.6777,
        }
    }
}

impl ThreeLogDistanceConfig {
    fn path_loss_db(&self, distance_m: f64) -> f64 {
        let c = self;
        if distance_m < c.distance0_m {
            return 0.0;
        }
        let seg0 = |d: f64| 10.0 * c.exponent0 * (d / c.distance0_m).log10();
        let seg1 = |d: f64| 10.0 * c.exponent1 * (d / c.distance1_m).log10();
        let seg2 = |d: f64| 10.0 * c.exponent2 * (d / c.distance2_m).log10();

        if distance_m < c.distance1_m {
            c.reference_loss_db + seg0(distance_m)
        } else if distance_m < c.distance2_m {
            c.reference_loss_db + seg0(c.distance1_m) + seg1(distance_m)
        } else {
            c.reference_loss_db + seg0(c.distance1_m) + seg1(c.distance2_m) + seg2(distance_m)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoRayGroundConfig {
    pub frequency_hz: f64,
    pub height_above_z_m: f64,
    pub system_loss: f64,
    pub min_distance_m: f64,
}

impl Default for TwoRayGroundConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 5.15e9,
            height_above_z_m: 0.0,
            system_loss: 1.0,
            min_distance_m: 0.5,
        }
    }
}

impl TwoRayGroundConfig {
    /// Distance beyond which the ground-reflection term dominates.
    pub fn crossover_distance_m(&self, tx_height_m: f64, rx_height_m: f64) -> f64 {
        4.0 * std::f64::consts::PI * tx_height_m * rx_height_m / wavelength_m(self.frequency_hz)
    }

    fn rx_power_dbm(&self, tx_power_dbm: f64, a: &Position, b: &Position) -> f64 {
        let distance_m = a.distance_to(b);
        if distance_m <= self.min_distance_m {
            return tx_power_dbm;
        }
        let tx_height = a.z + self.height_above_z_m;
        let rx_height = b.z + self.height_above_z_m;
        let lambda = wavelength_m(self.frequency_hz);

        let gain = if distance_m <= self.crossover_distance_m(tx_height, rx_height) {
            let four_pi_d = 4.0 * std::f64::consts::PI * distance_m;
            (lambda * lambda) / (four_pi_d * four_pi_d * self.system_loss)
        } else {
            (tx_height * tx_height * rx_height * rx_height)
                / (distance_m.powi(4) * self.system_loss)
        };
        tx_power_dbm + 10.0 * gain.log10()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NakagamiConfig {
    pub distance1_m: f64,
    pub distance2_m: f64,
    pub m0: f64,
    pub m1: f64,
    pub m2: f64,
}

impl Default for NakagamiConfig {
    fn default() -> Self {
        Self {
            distance1_m: 80.0,
            distance2_m: 200.0,
            m0: 1.5,
            m1: 0.75,
            m2: 0.75,
        }
    }
}

impl NakagamiConfig {
    pub fn shape_at(&self, distance_m: f64) -> f64 {
        if distance_m < self.distance1_m {
            self.m0
        } else if distance_m < self.distance2_m {
            self.m1
        } else {
            self.m2
        }
    }

    /// Fading only: the received power is a Gamma-distributed draw whose mean
    /// is the transmit power.
    fn rx_power_dbm<R: Rng + ?Sized>(
        &self,
        tx_power_dbm: f64,
        distance_m: f64,
        rng: &mut R,
    ) -> f64 {
        let m = self.shape_at(distance_m);
        let gain = match Gamma::new(m, 1.0 / m) {
            Ok(gamma) => gamma.sample(rng),
            Err(_) => 1.0,
        };
        tx_power_dbm + 10.0 * gain.log10()
    }
}

/// Propagation-loss behavior of a channel, one variant per supported model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropagationLossModel {
    Friis(FriisConfig),
    FixedRss { rss_dbm: f64 },
    ThreeLogDistance(ThreeLogDistanceConfig),
    TwoRayGround(TwoRayGroundConfig),
    Nakagami(NakagamiConfig),
}

impl PropagationLossModel {
    /// Engine type identifier, as used by the log of the original tooling.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Friis(_) => "FriisPropagationLossModel",
            Self::FixedRss { .. } => "FixedRssLossModel",
            Self::ThreeLogDistance(_) => "ThreeLogDistancePropagationLossModel",
            Self::TwoRayGround(_) => "TwoRayGroundPropagationLossModel",
            Self::Nakagami(_) => "NakagamiPropagationLossModel",
        }
    }

    /// Whether repeated calls with the same geometry can differ.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Self::Nakagami(_))
    }

    pub fn rx_power_dbm<R: Rng + ?Sized>(
        &self,
        tx_power_dbm: f64,
        a: &Position,
        b: &Position,
        rng: &mut R,
    ) -> f64 {
        let distance_m = a.distance_to(b);
        match self {
            Self::Friis(config) => config.rx_power_dbm(tx_power_dbm, distance_m),
            Self::FixedRss { rss_dbm } => *rss_dbm,
            Self::ThreeLogDistance(config) => tx_power_dbm - config.path_loss_db(distance_m),
            Self::TwoRayGround(config) => config.rx_power_dbm(tx_power_dbm, a, b),
            Self::Nakagami(config) => config.rx_power_dbm(tx_power_dbm, distance_m, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(x: f64) -> Position {
        Position::new(x, 0.0, 0.0)
    }

    fn rx(model: PropagationLossModel, distance_m: f64) -> f64 {
        let mut rng = StdRng::seed_from_u64(7);
        model.rx_power_dbm(12.0, &Position::ORIGIN, &at(distance_m), &mut rng)
    }

    #[test]
    fn friis_loses_six_db_per_distance_doubling() {
        let model = PropagationLossModel::Friis(FriisConfig::default());
        let near = rx(model, 10.0);
        let far = rx(model, 20.0);
        assert!((near - far - 6.0206).abs() < 1e-3);
        // 5.15 GHz at 1 m is roughly 46.7 dB of loss.
        assert!((rx(model, 1.0) - (12.0 - 46.68)).abs() < 0.05);
    }

    #[test]
    fn friis_clamps_to_min_loss() {
        let model = PropagationLossModel::Friis(FriisConfig {
            min_loss_db: 50.0,
            ..Default::default()
        });
        assert_eq!(rx(model, 1.0), 12.0 - 50.0);
        assert_eq!(rx(model, 0.0), 12.0 - 50.0);
    }

    #[test]
    fn fixed_rss_ignores_geometry_and_power() {
        let model = PropagationLossModel::FixedRss { rss_dbm: -80.0 };
        assert_eq!(rx(model, 1.0), -80.0);
        assert_eq!(rx(model, 250.0), -80.0);
    }

    #[test]
    fn three_log_distance_is_continuous_at_breakpoints() {
        let config = ThreeLogDistanceConfig::default();
        let below = config.path_loss_db(200.0 - 1e-9);
        let above = config.path_loss_db(200.0);
        assert!((below - above).abs() < 1e-6);
        assert_eq!(config.path_loss_db(0.5), 0.0);
        assert!((config.path_loss_db(1.0) - 46.6777).abs() < 1e-9);
    }

    #[test]
    fn two_ray_switches_to_fourth_power_beyond_crossover() {
        let config = TwoRayGroundConfig {
            frequency_hz: 5e9,
            height_above_z_m: 1.0,
            ..Default::default()
        };
        let crossover = config.crossover_distance_m(1.0, 1.0);
        assert!((crossover - 209.6).abs() < 0.5);

        let model = PropagationLossModel::TwoRayGround(config);
        let at_250 = rx(model, 250.0);
        let at_500 = rx(model, 500.0);
        assert!((at_250 - at_500 - 12.041).abs() < 1e-3);
        assert_eq!(rx(model, 0.4), 12.0);
    }

    #[test]
    fn nakagami_preserves_mean_power() {
        let model = PropagationLossModel::Nakagami(NakagamiConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let samples = 20_000;
        let mean_mw: f64 = (0..samples)
            .map(|_| {
                let dbm = model.rx_power_dbm(0.0, &Position::ORIGIN, &at(50.0), &mut rng);
                10f64.powf(dbm / 10.0)
            })
            .sum::<f64>()
            / samples as f64;
        assert!((mean_mw - 1.0).abs() < 0.05, "mean {mean_mw}");
        assert!(model.is_stochastic());
    }

    #[test]
    fn nakagami_shape_follows_distance_bands() {
        let config = NakagamiConfig::default();
        assert_eq!(config.shape_at(10.0), 1.5);
        assert_eq!(config.shape_at(80.0), 0.75);
        assert_eq!(config.shape_at(250.0), 0.75);
    }
}
