//! Parameter-space iteration and the stopping policy.
//!
//! A [`SweepStrategy`] hands out one [`TrialPoint`] at a time and is told the
//! result before it is asked for the next one, so stopping decisions always
//! follow a completed trial. [`SweepController`] drives any strategy against a
//! [`TrialExecutor`] and forwards every result to the sink as it arrives.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::{packets_in, ExperimentParameters, SweepLimits, SweepMode};
use crate::error::SinkError;
use crate::export::ResultSink;
use crate::metrics::{SweepSummary, TrialResult};
use crate::models::PropagationModelSpec;
use crate::trial::{TrialExecutor, TrialPoint};

/// Position of a sweep in its parameter space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepState {
    pub model_index: usize,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Throughput of the last completed trial of the current model.
    pub last_throughput_mbps: Option<f64>,
}

pub trait SweepStrategy {
    /// Next point to run, or `None` when the sweep is over.
    fn next_point(&mut self) -> Option<TrialPoint>;

    /// Report the result of the point last handed out.
    fn observe(&mut self, result: &TrialResult);

    /// Upper bound on the number of trials, for progress reporting.
    fn max_trials(&self) -> u64;

    fn state(&self) -> &SweepState;
}

/// Every model at increasing distance. Each model runs at least one trial;
/// its sweep ends after the first trial that delivers nothing, or once the
/// distance passes the bound.
#[derive(Debug, Clone)]
pub struct DistanceSweep {
    models: Vec<PropagationModelSpec>,
    initial_distance_m: f64,
    duration_s: f64,
    packet_count: u32,
    limits: SweepLimits,
    state: SweepState,
}

impl DistanceSweep {
    pub fn new(
        models: Vec<PropagationModelSpec>,
        initial_distance_m: f64,
        duration_s: f64,
        packet_count: u32,
        limits: SweepLimits,
    ) -> Self {
        Self {
            models,
            initial_distance_m,
            duration_s,
            packet_count,
            limits,
            state: SweepState {
                model_index: 0,
                distance_m: initial_distance_m,
                duration_s,
                last_throughput_mbps: None,
            },
        }
    }

    fn model_exhausted(&self) -> bool {
        self.state
            .last_throughput_mbps
            .is_some_and(|t| t <= 0.0 || self.state.distance_m > self.limits.max_distance_m)
    }

    fn advance_model(&mut self) {
        self.state.model_index += 1;
        self.state.distance_m = self.initial_distance_m;
        self.state.last_throughput_mbps = None;
    }
}

impl SweepStrategy for DistanceSweep {
    fn next_point(&mut self) -> Option<TrialPoint> {
        while let Some(&model) = self.models.get(self.state.model_index) {
            if !self.model_exhausted() {
                return Some(TrialPoint {
                    model,
                    distance_m: self.state.distance_m,
                    duration_s: self.duration_s,
                    packet_count: self.packet_count,
                });
            }
            self.advance_model();
        }
        None
    }

    fn observe(&mut self, result: &TrialResult) {
        self.state.last_throughput_mbps = Some(result.throughput_mbps);
        self.state.distance_m += self.limits.distance_step_m;
    }

    fn max_trials(&self) -> u64 {
        let span = (self.limits.max_distance_m - self.initial_distance_m).max(0.0);
        let per_model = (span / self.limits.distance_step_m).floor() as u64 + 1;
        per_model * self.models.len() as u64
    }

    fn state(&self) -> &SweepState {
        &self.state
    }
}

/// One model at fixed distance, increasing trial duration up to the bound.
/// The first trial always runs. The packet count follows each trial's
/// duration unless it was fixed.
#[derive(Debug, Clone)]
pub struct DurationSweep {
    model: PropagationModelSpec,
    distance_m: f64,
    initial_duration_s: f64,
    interval_s: f64,
    packet_count_override: Option<u32>,
    limits: SweepLimits,
    state: SweepState,
}

impl DurationSweep {
    pub fn new(
        model: PropagationModelSpec,
        distance_m: f64,
        initial_duration_s: f64,
        interval_s: f64,
        packet_count_override: Option<u32>,
        limits: SweepLimits,
    ) -> Self {
        Self {
            model,
            distance_m,
            initial_duration_s,
            interval_s,
            packet_count_override,
            limits,
            state: SweepState {
                model_index: 0,
                distance_m,
                duration_s: initial_duration_s,
                last_throughput_mbps: None,
            },
        }
    }

    fn packet_count(&self, duration_s: f64) -> u32 {
        self.packet_count_override
            .unwrap_or_else(|| packets_in(duration_s, self.interval_s))
    }
}

impl SweepStrategy for DurationSweep {
    fn next_point(&mut self) -> Option<TrialPoint> {
        let duration_s = self.state.duration_s;
        let started = self.state.last_throughput_mbps.is_some();
        (!started || duration_s <= self.limits.max_duration_s).then(|| TrialPoint {
            model: self.model,
            distance_m: self.distance_m,
            duration_s,
            packet_count: self.packet_count(duration_s),
        })
    }

    fn observe(&mut self, result: &TrialResult) {
        self.state.last_throughput_mbps = Some(result.throughput_mbps);
        self.state.duration_s += self.limits.duration_step_s;
    }

    fn max_trials(&self) -> u64 {
        let span = (self.limits.max_duration_s - self.initial_duration_s).max(0.0);
        (span / self.limits.duration_step_s).floor() as u64 + 1
    }

    fn state(&self) -> &SweepState {
        &self.state
    }
}

/// Exactly one trial.
#[derive(Debug, Clone)]
pub struct SingleTrial {
    point: TrialPoint,
    done: bool,
    state: SweepState,
}

impl SingleTrial {
    pub fn new(point: TrialPoint) -> Self {
        Self {
            point,
            done: false,
            state: SweepState {
                model_index: 0,
                distance_m: point.distance_m,
                duration_s: point.duration_s,
                last_throughput_mbps: None,
            },
        }
    }
}

impl SweepStrategy for SingleTrial {
    fn next_point(&mut self) -> Option<TrialPoint> {
        (!self.done).then_some(self.point)
    }

    fn observe(&mut self, result: &TrialResult) {
        self.state.last_throughput_mbps = Some(result.throughput_mbps);
        self.done = true;
    }

    fn max_trials(&self) -> u64 {
        1
    }

    fn state(&self) -> &SweepState {
        &self.state
    }
}

/// Strategy for the configured mode.
pub fn strategy_for(params: &ExperimentParameters) -> Box<dyn SweepStrategy> {
    match params.mode {
        SweepMode::Distance => Box::new(DistanceSweep::new(
            PropagationModelSpec::campaign_models().to_vec(),
            params.distance_m,
            params.duration_s,
            params.packet_count(),
            params.limits,
        )),
        SweepMode::Duration => Box::new(DurationSweep::new(
            params.model,
            params.distance_m,
            params.duration_s,
            params.interval_s,
            params.packet_count_override,
            params.limits,
        )),
        SweepMode::Single => Box::new(SingleTrial::new(TrialPoint {
            model: params.model,
            distance_m: params.distance_m,
            duration_s: params.duration_s,
            packet_count: params.packet_count(),
        })),
    }
}

/// Drives a sweep strategy to completion.
pub struct SweepController {
    strategy: Box<dyn SweepStrategy>,
    show_progress: bool,
}

impl SweepController {
    pub fn new(strategy: Box<dyn SweepStrategy>) -> Self {
        Self {
            strategy,
            show_progress: false,
        }
    }

    pub fn from_parameters(params: &ExperimentParameters) -> Self {
        Self::new(strategy_for(params)).with_progress(params.show_progress)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn state(&self) -> &SweepState {
        self.strategy.state()
    }

    /// Run every trial in order, writing each result before the next trial
    /// starts. Stops at the first sink error.
    pub fn run<E, S>(&mut self, executor: &mut E, sink: &mut S) -> Result<SweepSummary, SinkError>
    where
        E: TrialExecutor + ?Sized,
        S: ResultSink + ?Sized,
    {
        let progress = self.show_progress.then(|| progress_bar(self.strategy.max_trials()));
        let mut summary = SweepSummary::default();

        while let Some(point) = self.strategy.next_point() {
            let result = executor.execute(&point);
            sink.write(&result)?;
            summary.record(&result);
            self.strategy.observe(&result);
            if let Some(bar) = &progress {
                bar.inc(1);
            }
        }
        sink.finish()?;

        if let Some(bar) = &progress {
            bar.finish_with_message("Completed");
        }
        for model in &summary.models {
            info!(
                model = model.model,
                trials = model.trials,
                last_reachable_distance_m = ?model.last_reachable_distance_m,
                peak_throughput_mbps = model.peak_throughput_mbps,
                "model sweep finished"
            );
        }
        Ok(summary)
    }
}

fn progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
