use std::fs;

use link_experiments::{
    run_campaign, ExperimentConfig, ExperimentError, PropagationModelSpec, SinkError, SweepMode,
};
use tempfile::TempDir;

fn quick_config(dir: &TempDir, file: &str) -> ExperimentConfig {
    ExperimentConfig {
        data_rate_mbps: 0.5,
        output: Some(dir.path().join(file)),
        no_progress: true,
        ..Default::default()
    }
}

#[test]
fn single_trial_writes_header_and_one_row() {
    let dir = TempDir::new().unwrap();
    let config = ExperimentConfig {
        mode: SweepMode::Single,
        duration_s: Some(3.0),
        ..quick_config(&dir, "trial_results.csv")
    };
    let params = config.resolve().unwrap();
    let summary = run_campaign(&params).unwrap();
    assert_eq!(summary.total_trials(), 1);

    let text = fs::read_to_string(&params.output).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "propagationModel,distance,duration,signalStrength,throughput");

    let fields: Vec<_> = lines[1].split(',').collect();
    assert_eq!(&fields[..3], ["Friis", "1", "3"]);
    let signal: f64 = fields[3].parse().unwrap();
    assert!(signal < -30.0 && signal > -40.0, "{signal}");
    let throughput: f64 = fields[4].parse().unwrap();
    // Traffic runs for 2 of the 3 seconds.
    assert!(throughput > 0.3 && throughput <= 0.34, "{throughput}");
}

#[test]
fn duration_campaign_writes_one_row_per_step() {
    let dir = TempDir::new().unwrap();
    let config = ExperimentConfig {
        mode: SweepMode::Duration,
        model: PropagationModelSpec::Nakagami,
        distance_m: 55.0,
        data_rate_mbps: 0.05,
        ..quick_config(&dir, "pre_results.csv")
    };
    let params = config.resolve().unwrap();
    run_campaign(&params).unwrap();

    let mut reader = csv::Reader::from_path(&params.output).unwrap();
    let durations: Vec<f64> = reader
        .records()
        .map(|record| record.unwrap()[2].parse().unwrap())
        .collect();
    assert_eq!(durations.len(), (120.0_f64 / 1.0).floor() as usize + 1);
    assert_eq!(durations[0], 0.0);
    assert_eq!(durations[120], 120.0);
    assert!(durations.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn seeded_trials_are_reproducible() {
    let dir = TempDir::new().unwrap();
    let run = |file: &str| {
        let config = ExperimentConfig {
            mode: SweepMode::Single,
            model: PropagationModelSpec::Nakagami,
            distance_m: 150.0,
            duration_s: Some(4.0),
            seed: 11,
            ..quick_config(&dir, file)
        };
        let params = config.resolve().unwrap();
        run_campaign(&params).unwrap();
        fs::read(&params.output).unwrap()
    };
    assert_eq!(run("a.csv"), run("b.csv"));
}

#[test]
fn unopenable_results_file_fails_before_any_trial() {
    let dir = TempDir::new().unwrap();
    let config = ExperimentConfig {
        output: Some(dir.path().join("missing").join("results.csv")),
        no_progress: true,
        ..Default::default()
    };
    let params = config.resolve().unwrap();
    let err = run_campaign(&params).unwrap_err();
    assert!(matches!(err, ExperimentError::Sink(SinkError::Open { .. })));
}
