#![allow(dead_code)]

use bevy_ecs::prelude::World;
use link_core::clock::{secs_to_ns, ONE_SEC_NS};
use link_core::propagation::PropagationLossModel;
use link_core::runner::run;
use link_core::scenario::{
    build_link_scenario, destroy, enable_sniffer_trace, LinkHandles, LinkScenarioParams, Teardown,
};

/// Inter-packet interval that offers `rate_mbps` including the 28 byte UDP/IP header.
pub fn interval_for_rate(payload_bytes: u32, rate_mbps: f64) -> u64 {
    secs_to_ns((payload_bytes as f64 + 28.0) * 8.0 / (rate_mbps * 1e6))
}

/// Parameters for a short bonded-channel trial: `traffic_secs` of traffic at
/// `rate_mbps`, starting at 1 s, with the run stopped at the end of traffic.
pub fn short_trial_params(
    loss: PropagationLossModel,
    distance_m: f64,
    rate_mbps: f64,
    traffic_secs: f64,
) -> LinkScenarioParams {
    let payload_bytes = 1450;
    let interval_ns = interval_for_rate(payload_bytes, rate_mbps);
    let packets = (traffic_secs * ONE_SEC_NS as f64 / interval_ns as f64).floor() as u32;
    LinkScenarioParams::default()
        .with_loss(loss)
        .with_distance_m(distance_m)
        .with_channel_bonding(true)
        .with_traffic(payload_bytes, packets, interval_ns)
        .with_stop_ns(ONE_SEC_NS + secs_to_ns(traffic_secs))
}

/// Build, run and tear down one trial, tracing frames at the receiver.
pub fn run_trial(params: &LinkScenarioParams) -> (LinkHandles, Teardown) {
    let mut world = World::new();
    let handles = build_link_scenario(&mut world, params);
    enable_sniffer_trace(&mut world, handles.receiver);
    run(&mut world);
    (handles, destroy(world))
}
