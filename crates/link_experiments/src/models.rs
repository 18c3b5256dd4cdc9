//! Propagation models swept by a campaign.
//!
//! Each variant carries only the parameters its model needs; everything else
//! takes the engine's defaults.

use std::fmt;
use std::str::FromStr;

use link_core::propagation::{
    FriisConfig, NakagamiConfig, PropagationLossModel, ThreeLogDistanceConfig, TwoRayGroundConfig,
};

use crate::error::ConfigError;

/// Received power used by the fixed-RSS model in the campaign.
pub const CAMPAIGN_FIXED_RSS_DBM: f64 = -80.0;
/// Two-ray ground carrier frequency used in the campaign.
pub const CAMPAIGN_TWO_RAY_FREQUENCY_HZ: f64 = 5e9;
/// Two-ray ground antenna height above the node position.
pub const CAMPAIGN_TWO_RAY_HEIGHT_M: f64 = 1.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PropagationModelSpec {
    #[default]
    Friis,
    FixedRss { rss_dbm: f64 },
    ThreeLogDistance,
    TwoRayGround { frequency_hz: f64, height_above_z_m: f64 },
    Nakagami,
}

impl PropagationModelSpec {
    /// Identifier written to the results log.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Friis => "Friis",
            Self::FixedRss { .. } => "FixedRss",
            Self::ThreeLogDistance => "ThreeLogDistance",
            Self::TwoRayGround { .. } => "TwoRayGround",
            Self::Nakagami => "Nakagami",
        }
    }

    /// Engine type identifier accepted on the command line.
    pub fn type_id(&self) -> &'static str {
        match self {
            Self::Friis => "ns3::FriisPropagationLossModel",
            Self::FixedRss { .. } => "ns3::FixedRssLossModel",
            Self::ThreeLogDistance => "ns3::ThreeLogDistancePropagationLossModel",
            Self::TwoRayGround { .. } => "ns3::TwoRayGroundPropagationLossModel",
            Self::Nakagami => "ns3::NakagamiPropagationLossModel",
        }
    }

    /// The fixed ordered model list of a distance campaign.
    pub fn campaign_models() -> [PropagationModelSpec; 5] {
        [
            Self::Friis,
            Self::FixedRss {
                rss_dbm: CAMPAIGN_FIXED_RSS_DBM,
            },
            Self::ThreeLogDistance,
            Self::TwoRayGround {
                frequency_hz: CAMPAIGN_TWO_RAY_FREQUENCY_HZ,
                height_above_z_m: CAMPAIGN_TWO_RAY_HEIGHT_M,
            },
            Self::Nakagami,
        ]
    }

    /// Engine-side loss model for one trial.
    pub fn to_loss_model(&self) -> PropagationLossModel {
        match *self {
            Self::Friis => PropagationLossModel::Friis(FriisConfig::default()),
            Self::FixedRss { rss_dbm } => PropagationLossModel::FixedRss { rss_dbm },
            Self::ThreeLogDistance => {
                PropagationLossModel::ThreeLogDistance(ThreeLogDistanceConfig::default())
            }
            Self::TwoRayGround {
                frequency_hz,
                height_above_z_m,
            } => PropagationLossModel::TwoRayGround(TwoRayGroundConfig {
                frequency_hz,
                height_above_z_m,
                ..TwoRayGroundConfig::default()
            }),
            Self::Nakagami => PropagationLossModel::Nakagami(NakagamiConfig::default()),
        }
    }
}

impl fmt::Display for PropagationModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PropagationModelSpec {
    type Err = ConfigError;

    /// Accepts the short identifier or the engine type identifier; model
    /// parameters are the campaign's.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::campaign_models()
            .into_iter()
            .find(|model| {
                name.eq_ignore_ascii_case(model.id()) || name.eq_ignore_ascii_case(model.type_id())
            })
            .ok_or_else(|| ConfigError::UnknownModel(name.to_string()))
    }
}
