//! Discrete-event simulation of a two-node 802.11n link.
//!
//! A trial is a fresh [`bevy_ecs::prelude::World`]: nodes and sockets are
//! entities, the channel, clock, flow monitor and random source are
//! resources, and the [`runner`] dispatches one event at a time to the
//! systems that react to it.

pub mod channel;
pub mod clock;
pub mod ecs;
pub mod flow_monitor;
pub mod internet;
pub mod propagation;
pub mod random;
pub mod runner;
pub mod scenario;
pub mod systems;
pub mod telemetry;
pub mod traffic;
pub mod wifi;
