//! One isolated simulation trial per parameter point.

use bevy_ecs::prelude::World;
use link_core::clock::secs_to_ns;
use link_core::runner::run;
use link_core::scenario::{build_link_scenario, destroy, LinkScenarioParams};
use tracing::{debug, info};

use crate::config::ExperimentParameters;
use crate::metrics::TrialResult;
use crate::models::PropagationModelSpec;
use crate::telemetry::TelemetryCollector;

/// A point of the parameter space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialPoint {
    pub model: PropagationModelSpec,
    pub distance_m: f64,
    pub duration_s: f64,
    pub packet_count: u32,
}

/// Runs one trial to completion and reports its result.
pub trait TrialExecutor {
    fn execute(&mut self, point: &TrialPoint) -> TrialResult;
}

/// Transport settings shared by every trial of a campaign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportParameters {
    pub packet_size: u32,
    pub interval_s: f64,
    pub channel_bonding: bool,
}

impl From<&ExperimentParameters> for TransportParameters {
    fn from(params: &ExperimentParameters) -> Self {
        Self {
            packet_size: params.packet_size,
            interval_s: params.interval_s,
            channel_bonding: params.channel_bonding,
        }
    }
}

/// Executes trials on the discrete-event link simulation, one fresh world each.
#[derive(Debug, Clone)]
pub struct LinkTrialRunner {
    transport: TransportParameters,
    seed: u64,
}

impl LinkTrialRunner {
    pub fn new(transport: TransportParameters, seed: u64) -> Self {
        Self { transport, seed }
    }

    pub fn from_parameters(params: &ExperimentParameters) -> Self {
        Self::new(TransportParameters::from(params), params.seed)
    }

    /// Scenario for `point`: receiver at the origin, sender at the point's
    /// distance, traffic from 1 s, hard stop at the trial duration.
    pub fn scenario_params(&self, point: &TrialPoint) -> LinkScenarioParams {
        LinkScenarioParams::default()
            .with_seed(self.seed)
            .with_loss(point.model.to_loss_model())
            .with_distance_m(point.distance_m)
            .with_channel_bonding(self.transport.channel_bonding)
            .with_traffic(
                self.transport.packet_size,
                point.packet_count,
                secs_to_ns(self.transport.interval_s),
            )
            .with_stop_ns(secs_to_ns(point.duration_s))
    }
}

impl TrialExecutor for LinkTrialRunner {
    fn execute(&mut self, point: &TrialPoint) -> TrialResult {
        info!(
            model = point.model.id(),
            distance_m = point.distance_m,
            duration_s = point.duration_s,
            "running trial"
        );

        let params = self.scenario_params(point);
        let mut world = World::new();
        let handles = build_link_scenario(&mut world, &params);
        let collector = TelemetryCollector::attach(&mut world, handles.receiver);

        let steps = run(&mut world);
        let teardown = destroy(world);
        let telemetry = collector.collect(&teardown, point.duration_s);

        debug!(
            steps,
            rx_bytes = telemetry.rx_bytes,
            signal_dbm = ?telemetry.signal_dbm,
            throughput_mbps = telemetry.throughput_mbps,
            "trial finished"
        );

        TrialResult {
            model: point.model.id(),
            distance_m: point.distance_m,
            duration_s: point.duration_s,
            signal_dbm: telemetry.signal_dbm,
            throughput_mbps: telemetry.throughput_mbps,
        }
    }
}
