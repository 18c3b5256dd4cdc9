use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::{result_record, ResultSink, RESULT_COLUMNS};
use crate::error::SinkError;
use crate::metrics::TrialResult;

/// Comma-separated results log with one header row.
///
/// Every row is flushed as it is written so an interrupted campaign keeps
/// the trials it completed.
pub struct CsvResultSink<W: Write> {
    wtr: csv::Writer<W>,
    rows: usize,
}

impl CsvResultSink<File> {
    /// Create (or truncate) the log at `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| SinkError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "results log opened");
        Self::from_writer(file)
    }
}

impl<W: Write> CsvResultSink<W> {
    pub fn from_writer(writer: W) -> Result<Self, SinkError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(RESULT_COLUMNS)?;
        wtr.flush()?;
        Ok(Self { wtr, rows: 0 })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.wtr
            .into_inner()
            .map_err(|err| SinkError::Io(err.into_error()))
    }
}

impl<W: Write> ResultSink for CsvResultSink<W> {
    fn write(&mut self, result: &TrialResult) -> Result<(), SinkError> {
        self.wtr.write_record(result_record(result))?;
        self.wtr.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.wtr.flush()?;
        debug!(rows = self.rows, "results log finished");
        Ok(())
    }
}
