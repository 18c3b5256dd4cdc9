//! Link-characterization campaigns over the `link_core` simulation.
//!
//! For a set of propagation models, a campaign simulates a two-node Wi-Fi
//! link at increasing separation (or increasing trial length), measures the
//! received signal and throughput of every trial, and appends one row per
//! trial to a results log.
//!
//! # Quick Start
//!
//! ```no_run
//! use link_experiments::{run_campaign, ExperimentConfig, SweepMode};
//!
//! let config = ExperimentConfig {
//!     mode: SweepMode::Single,
//!     distance_m: 55.0,
//!     ..Default::default()
//! };
//! let params = config.resolve().unwrap();
//! let summary = run_campaign(&params).unwrap();
//! println!("{} trials", summary.total_trials());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: command-line options and resolved parameters
//! - [`models`]: the swept propagation models
//! - [`trial`]: one isolated simulation per parameter point
//! - [`telemetry`]: signal and throughput of a finished trial
//! - [`sweep`]: sweep strategies and the stopping policy
//! - [`export`]: the results log

pub mod campaign;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod sweep;
pub mod telemetry;
pub mod trial;

pub use campaign::run_campaign;
pub use config::{ExperimentConfig, ExperimentParameters, SweepLimits, SweepMode};
pub use error::{ConfigError, ExperimentError, SinkError};
pub use export::{CsvResultSink, ResultSink};
pub use metrics::{ModelSummary, SweepSummary, TrialResult};
pub use models::PropagationModelSpec;
pub use sweep::{
    DistanceSweep, DurationSweep, SingleTrial, SweepController, SweepState, SweepStrategy,
};
pub use trial::{LinkTrialRunner, TrialExecutor, TrialPoint};
