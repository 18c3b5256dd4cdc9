//! Command-line configuration and the resolved experiment parameters.
//!
//! Option names follow the original campaign scripts (`--packetSize`,
//! `--dataRate`, ...) so existing invocations keep working.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use link_core::clock::secs_to_ns;

use crate::error::ConfigError;
use crate::models::PropagationModelSpec;

/// UDP (8) and IPv4 (20) header bytes added to every payload.
pub const HEADER_OVERHEAD_BYTES: u32 = 28;

pub const DEFAULT_PACKET_SIZE: u32 = 1450;
pub const DEFAULT_DATA_RATE_MBPS: f64 = 75.0;
pub const DEFAULT_DISTANCE_M: f64 = 1.0;
pub const DEFAULT_DURATION_S: f64 = 60.0;
pub const DEFAULT_SEED: u64 = 1;

/// Which parameter a campaign varies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SweepMode {
    /// Every campaign model at increasing distance.
    #[default]
    Distance,
    /// One model at increasing trial duration.
    Duration,
    /// One trial at the configured point.
    Single,
}

impl SweepMode {
    /// Results file used when `--output` is not given.
    pub fn default_output(self) -> &'static str {
        match self {
            Self::Distance => "results.csv",
            Self::Duration => "pre_results.csv",
            Self::Single => "trial_results.csv",
        }
    }

    fn default_duration_s(self) -> f64 {
        match self {
            Self::Duration => 0.0,
            Self::Distance | Self::Single => DEFAULT_DURATION_S,
        }
    }
}

/// Stepping and upper bounds of the sweeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepLimits {
    pub distance_step_m: f64,
    pub max_distance_m: f64,
    pub duration_step_s: f64,
    pub max_duration_s: f64,
}

impl Default for SweepLimits {
    fn default() -> Self {
        Self {
            distance_step_m: 5.0,
            max_distance_m: 251.0,
            duration_step_s: 1.0,
            max_duration_s: 120.0,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "link-sweep",
    version,
    about = "Sweep a simulated two-node Wi-Fi link over propagation models, distance or duration"
)]
pub struct ExperimentConfig {
    /// Payload bytes per sent packet
    #[arg(long = "packetSize", default_value_t = DEFAULT_PACKET_SIZE)]
    pub packet_size: u32,

    /// Offered load in Mbps, used to derive the send interval
    #[arg(long = "dataRate", default_value_t = DEFAULT_DATA_RATE_MBPS)]
    pub data_rate_mbps: f64,

    /// Use a 40 MHz channel instead of 20 MHz
    #[arg(
        long = "channelBonding",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true"
    )]
    pub channel_bonding: bool,

    /// Propagation model for duration and single-trial runs
    #[arg(long = "model", default_value = "Friis")]
    pub model: PropagationModelSpec,

    /// Initial (or fixed) separation between the nodes in meters
    #[arg(long = "distance", default_value_t = DEFAULT_DISTANCE_M)]
    pub distance_m: f64,

    /// Trial length in seconds [default: 60, or 0 in duration mode]
    #[arg(long = "duration")]
    pub duration_s: Option<f64>,

    /// Inter-packet interval in seconds, overriding the one derived from the data rate
    #[arg(long = "interval")]
    pub interval_s: Option<f64>,

    /// Packets to send per trial, overriding the one derived from the duration
    #[arg(long = "numPackets")]
    pub num_packets: Option<u32>,

    /// Trace every frame in the simulated link
    #[arg(
        long = "verbose",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub verbose: bool,

    /// Parameter varied by the campaign
    #[arg(long = "mode", value_enum, default_value_t = SweepMode::Distance)]
    pub mode: SweepMode,

    /// Results file [default: depends on --mode]
    #[arg(long = "output")]
    pub output: Option<PathBuf>,

    /// Seed of the simulation random source
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Disable the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            packet_size: DEFAULT_PACKET_SIZE,
            data_rate_mbps: DEFAULT_DATA_RATE_MBPS,
            channel_bonding: true,
            model: PropagationModelSpec::default(),
            distance_m: DEFAULT_DISTANCE_M,
            duration_s: None,
            interval_s: None,
            num_packets: None,
            verbose: false,
            mode: SweepMode::Distance,
            output: None,
            seed: DEFAULT_SEED,
            no_progress: false,
        }
    }
}

impl ExperimentConfig {
    /// Resolve defaults and overrides into one validated parameter set.
    pub fn resolve(&self) -> Result<ExperimentParameters, ConfigError> {
        if self.packet_size == 0 {
            return Err(ConfigError::ZeroPacketSize);
        }
        if !(self.data_rate_mbps.is_finite() && self.data_rate_mbps > 0.0) {
            return Err(ConfigError::InvalidDataRate(self.data_rate_mbps));
        }
        let duration_s = self.duration_s.unwrap_or(self.mode.default_duration_s());
        non_negative("distance", self.distance_m)?;
        non_negative("duration", duration_s)?;

        let interval_s = match self.interval_s {
            Some(interval) if interval.is_finite() && interval > 0.0 => interval,
            Some(interval) => return Err(ConfigError::InvalidInterval(interval)),
            None => derived_interval_s(self.packet_size, self.data_rate_mbps),
        };
        if secs_to_ns(interval_s) == 0 {
            return Err(ConfigError::IntervalBelowTick(interval_s));
        }
        if self.num_packets.is_none() {
            let longest_s = match self.mode {
                SweepMode::Duration => duration_s.max(SweepLimits::default().max_duration_s),
                SweepMode::Distance | SweepMode::Single => duration_s,
            };
            if (longest_s / interval_s).floor() > u32::MAX as f64 {
                return Err(ConfigError::TooManyPackets {
                    duration_s: longest_s,
                    interval_s,
                });
            }
        }

        let params = ExperimentParameters {
            mode: self.mode,
            packet_size: self.packet_size,
            data_rate_mbps: self.data_rate_mbps,
            channel_bonding: self.channel_bonding,
            model: self.model,
            distance_m: self.distance_m,
            duration_s,
            interval_s,
            packet_count_override: self.num_packets,
            verbose: self.verbose,
            seed: self.seed,
            output: self
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(self.mode.default_output())),
            show_progress: !self.no_progress && !self.verbose,
            limits: SweepLimits::default(),
        };
        Ok(params)
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

/// Seconds between packets for `packet_size` payload bytes at `data_rate_mbps`.
pub fn derived_interval_s(packet_size: u32, data_rate_mbps: f64) -> f64 {
    (packet_size + HEADER_OVERHEAD_BYTES) as f64 * 8.0 / (data_rate_mbps * 1e6)
}

/// Packets sent at one per `interval_s` over `duration_s`, rounded down.
/// Counts beyond `u32::MAX` saturate; `ExperimentConfig::resolve` rejects them.
pub fn packets_in(duration_s: f64, interval_s: f64) -> u32 {
    (duration_s / interval_s).floor() as u32
}

/// Immutable parameters of one campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentParameters {
    pub mode: SweepMode,
    pub packet_size: u32,
    pub data_rate_mbps: f64,
    pub channel_bonding: bool,
    pub model: PropagationModelSpec,
    pub distance_m: f64,
    pub duration_s: f64,
    pub interval_s: f64,
    pub packet_count_override: Option<u32>,
    pub verbose: bool,
    pub seed: u64,
    pub output: PathBuf,
    pub show_progress: bool,
    pub limits: SweepLimits,
}

impl ExperimentParameters {
    /// Packets sent in a trial of the configured duration.
    pub fn packet_count(&self) -> u32 {
        self.packet_count_for(self.duration_s)
    }

    /// `floor(duration / interval)` unless overridden.
    pub fn packet_count_for(&self, duration_s: f64) -> u32 {
        self.packet_count_override
            .unwrap_or_else(|| packets_in(duration_s, self.interval_s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ExperimentConfig {
        ExperimentConfig::parse_from(std::iter::once("link-sweep").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_campaign_setup() {
        let params = parse(&[]).resolve().unwrap();
        assert_eq!(params.packet_size, 1450);
        assert_eq!(params.data_rate_mbps, 75.0);
        assert!(params.channel_bonding);
        assert_eq!(params.model, PropagationModelSpec::Friis);
        assert_eq!(params.distance_m, 1.0);
        assert_eq!(params.duration_s, 60.0);
        assert_eq!(params.mode, SweepMode::Distance);
        assert_eq!(params.output, PathBuf::from("results.csv"));
        assert_eq!(params.seed, 1);
        assert!(!params.verbose);
        assert!(params.show_progress);
        assert_eq!(ExperimentConfig::default().resolve().unwrap(), params);
    }

    #[test]
    fn interval_and_packet_count_are_derived() {
        let params = parse(&[]).resolve().unwrap();
        let expected = 1478.0 * 8.0 / 75e6;
        assert!((params.interval_s - expected).abs() < 1e-15);
        assert_eq!(params.packet_count(), (60.0 / expected).floor() as u32);
        assert_eq!(params.packet_count(), 380_581);
    }

    #[test]
    fn overrides_take_precedence_over_derivation() {
        let params = parse(&["--interval=0.5", "--numPackets", "7", "--duration", "10"])
            .resolve()
            .unwrap();
        assert_eq!(params.interval_s, 0.5);
        assert_eq!(params.packet_count(), 7);
        assert_eq!(params.packet_count_for(100.0), 7);

        let params = parse(&["--interval=0.5", "--duration", "10"]).resolve().unwrap();
        assert_eq!(params.packet_count(), 20);
        assert_eq!(params.packet_count_for(3.2), 6);
    }

    #[test]
    fn original_option_syntax_is_accepted() {
        let config = parse(&[
            "--packetSize=1000",
            "--dataRate=10",
            "--channelBonding=false",
            "--model=ns3::TwoRayGroundPropagationLossModel",
            "--distance=55",
            "--verbose",
        ]);
        let params = config.resolve().unwrap();
        assert_eq!(params.packet_size, 1000);
        assert_eq!(params.data_rate_mbps, 10.0);
        assert!(!params.channel_bonding);
        assert_eq!(params.model.id(), "TwoRayGround");
        assert_eq!(params.distance_m, 55.0);
        assert!(params.verbose);
        assert!(!params.show_progress);
    }

    #[test]
    fn duration_mode_starts_at_zero_and_writes_pre_results() {
        let params = parse(&["--mode", "duration", "--model", "Nakagami"]).resolve().unwrap();
        assert_eq!(params.duration_s, 0.0);
        assert_eq!(params.packet_count(), 0);
        assert_eq!(params.output, PathBuf::from("pre_results.csv"));
        assert_eq!(params.model, PropagationModelSpec::Nakagami);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let config = ExperimentConfig {
            packet_size: 0,
            ..Default::default()
        };
        assert_eq!(config.resolve(), Err(ConfigError::ZeroPacketSize));

        let config = ExperimentConfig {
            data_rate_mbps: 0.0,
            ..Default::default()
        };
        assert_eq!(config.resolve(), Err(ConfigError::InvalidDataRate(0.0)));

        let config = ExperimentConfig {
            distance_m: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::Negative { name: "distance", .. })
        ));

        let config = ExperimentConfig {
            interval_s: Some(0.0),
            ..Default::default()
        };
        assert_eq!(config.resolve(), Err(ConfigError::InvalidInterval(0.0)));
    }

    #[test]
    fn interval_shorter_than_clock_tick_is_rejected() {
        let config = ExperimentConfig {
            mode: SweepMode::Single,
            interval_s: Some(1e-10),
            duration_s: Some(2.0),
            ..Default::default()
        };
        assert_eq!(config.resolve(), Err(ConfigError::IntervalBelowTick(1e-10)));

        let config = ExperimentConfig {
            data_rate_mbps: 1e9,
            ..Default::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::IntervalBelowTick(_))));
    }

    #[test]
    fn packet_count_beyond_u32_is_rejected() {
        let config = ExperimentConfig {
            interval_s: Some(1e-8),
            duration_s: Some(60.0),
            ..Default::default()
        };
        assert_eq!(
            config.resolve(),
            Err(ConfigError::TooManyPackets {
                duration_s: 60.0,
                interval_s: 1e-8,
            })
        );

        // Duration sweeps are checked against their longest trial.
        let config = ExperimentConfig {
            mode: SweepMode::Duration,
            interval_s: Some(2e-8),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::TooManyPackets { duration_s, .. }) if duration_s == 120.0
        ));

        // A fixed packet count makes the derived one irrelevant.
        let config = ExperimentConfig {
            interval_s: Some(1e-8),
            num_packets: Some(10),
            ..Default::default()
        };
        assert_eq!(config.resolve().unwrap().packet_count(), 10);
    }

    #[test]
    fn unknown_model_is_a_parse_error() {
        let err =
            ExperimentConfig::try_parse_from(["link-sweep", "--model", "Okumura"]).unwrap_err();
        assert!(err.to_string().contains("unknown propagation model"));
    }
}
