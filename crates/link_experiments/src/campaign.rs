//! A complete campaign: open the log, sweep, close the log.

use tracing::info;

use crate::config::ExperimentParameters;
use crate::error::ExperimentError;
use crate::export::CsvResultSink;
use crate::metrics::SweepSummary;
use crate::sweep::SweepController;
use crate::trial::LinkTrialRunner;

/// Run the campaign described by `params`, logging to `params.output`.
///
/// The log is opened before the first trial; failing to open it aborts the
/// campaign before any trial runs.
pub fn run_campaign(params: &ExperimentParameters) -> Result<SweepSummary, ExperimentError> {
    let mut sink = CsvResultSink::create(&params.output)?;
    let mut runner = LinkTrialRunner::from_parameters(params);
    let mut controller = SweepController::from_parameters(params);

    info!(
        mode = ?params.mode,
        output = %params.output.display(),
        packet_size = params.packet_size,
        data_rate_mbps = params.data_rate_mbps,
        channel_bonding = params.channel_bonding,
        interval_s = params.interval_s,
        seed = params.seed,
        "campaign started"
    );
    let summary = controller.run(&mut runner, &mut sink)?;
    info!(
        trials = summary.total_trials(),
        rows = sink.rows(),
        "campaign finished"
    );
    Ok(summary)
}
