//! Scenario setup: two nodes, one channel, one UDP flow.
//!
//! The builder functions mirror the steps of assembling a link by hand
//! (nodes, devices, positions, addresses, sockets, traffic, monitors, stop
//! time) so callers can also compose scenarios of their own.

mod build;
mod params;

pub use build::{
    build_link_scenario, create_nodes, destroy, enable_sniffer_trace, init_world,
    install_flow_monitor, install_traffic, install_wifi, set_position, set_stop_time, LinkHandles,
    Teardown,
};
pub use params::{LinkScenarioParams, DEFAULT_SINK_PORT, DEFAULT_TRAFFIC_START_NS};
