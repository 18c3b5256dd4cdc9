use clap::Parser;
use link_experiments::logging::init_tracing;
use link_experiments::{run_campaign, ExperimentConfig, ExperimentError};

fn main() -> Result<(), ExperimentError> {
    let config = ExperimentConfig::parse();
    init_tracing(config.verbose);

    let params = config.resolve()?;
    run_campaign(&params)?;
    Ok(())
}
