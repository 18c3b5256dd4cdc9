//! Result log destinations.
//!
//! A campaign writes to exactly one sink: opened before the first trial,
//! appended to once per trial in arrival order, finished after the last.

use crate::error::SinkError;
use crate::metrics::TrialResult;

#[path = "export/csv.rs"]
mod csv;

pub use self::csv::CsvResultSink;

/// Column names of the results log, in order.
pub const RESULT_COLUMNS: [&str; 5] = [
    "propagationModel",
    "distance",
    "duration",
    "signalStrength",
    "throughput",
];

pub trait ResultSink {
    /// Append one trial result.
    fn write(&mut self, result: &TrialResult) -> Result<(), SinkError>;

    /// Flush everything written so far. Called once after the last trial.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps results in memory, in arrival order.
impl ResultSink for Vec<TrialResult> {
    fn write(&mut self, result: &TrialResult) -> Result<(), SinkError> {
        self.push(*result);
        Ok(())
    }
}

/// One log row: numbers as Rust formats them, a missing signal as an empty field.
pub fn result_record(result: &TrialResult) -> [String; 5] {
    [
        result.model.to_string(),
        result.distance_m.to_string(),
        result.duration_s.to_string(),
        result
            .signal_dbm
            .map(|signal| signal.to_string())
            .unwrap_or_default(),
        result.throughput_mbps.to_string(),
    ]
}
