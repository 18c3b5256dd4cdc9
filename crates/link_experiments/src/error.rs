//! Error types for configuration and result export.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid experiment parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown propagation model: {0}")]
    UnknownModel(String),

    #[error("packet size must be positive")]
    ZeroPacketSize,

    #[error("data rate must be a positive number of Mbps, got {0}")]
    InvalidDataRate(f64),

    #[error("inter-packet interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("inter-packet interval of {0} s is shorter than the 1 ns clock tick")]
    IntervalBelowTick(f64),

    #[error("{duration_s} s at one packet per {interval_s} s exceeds u32::MAX packets")]
    TooManyPackets { duration_s: f64, interval_s: f64 },

    #[error("{name} must be a finite non-negative number, got {value}")]
    Negative { name: &'static str, value: f64 },
}

/// The results log could not be opened or written.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open results file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write result row: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush results: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that ends a campaign early.
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
