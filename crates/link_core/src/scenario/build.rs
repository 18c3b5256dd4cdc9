use std::net::{Ipv4Addr, SocketAddrV4};

use bevy_ecs::prelude::{Entity, World};
use tracing::debug;

use crate::channel::WifiChannel;
use crate::clock::{EventKind, SimulationClock, StopTime};
use crate::ecs::{Node, Position, UdpSocket};
use crate::flow_monitor::FlowMonitor;
use crate::internet::{self, Ipv4AddressHelper};
use crate::propagation::PropagationLossModel;
use crate::random::SimRng;
use crate::telemetry::SnifferRxTrace;
use crate::traffic::TrafficGenerator;
use crate::wifi::{InFlightPpdus, MacConfig, WifiDevice, WifiPhyConfig};

use super::params::LinkScenarioParams;

const NETWORK_BASE: Ipv4Addr = Ipv4Addr::new(10, 1, 1, 0);
const NETWORK_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

/// Entities of a built link scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkHandles {
    pub receiver: Entity,
    pub sender: Entity,
    pub sink_socket: Entity,
    pub source_socket: Entity,
}

/// Insert the world-level resources every scenario needs.
pub fn init_world(world: &mut World, seed: u64) {
    world.insert_resource(SimulationClock::default());
    world.insert_resource(SimRng::seeded(seed));
    world.insert_resource(InFlightPpdus::default());
}

/// Spawn `count` nodes with sequential ids, at the origin until positioned.
pub fn create_nodes(world: &mut World, count: u32) -> Vec<Entity> {
    (0..count)
        .map(|id| world.spawn((Node { id }, Position::ORIGIN)).id())
        .collect()
}

pub fn set_position(world: &mut World, node: Entity, position: Position) {
    world.entity_mut(node).insert(position);
}

/// Install one Wi-Fi device per node on a channel using `loss`.
pub fn install_wifi(
    world: &mut World,
    nodes: &[Entity],
    phy: WifiPhyConfig,
    mac: MacConfig,
    loss: PropagationLossModel,
) {
    world.insert_resource(WifiChannel::new(loss));
    for &node in nodes {
        world.entity_mut(node).insert(WifiDevice::new(phy, mac));
    }
}

/// Start counting per-flow statistics for every node.
pub fn install_flow_monitor(world: &mut World) {
    world.insert_resource(FlowMonitor::default());
}

/// Subscribe to physical-layer receive notifications on `device`.
pub fn enable_sniffer_trace(world: &mut World, device: Entity) {
    world.entity_mut(device).insert(SnifferRxTrace::default());
}

/// Attach a traffic generator to `socket` and schedule its first tick at
/// `start_ns`, in the context of the socket's node.
pub fn install_traffic(
    world: &mut World,
    socket: Entity,
    generator: TrafficGenerator,
    start_ns: u64,
) {
    let node_id = world
        .get::<UdpSocket>(socket)
        .and_then(|udp| world.get::<Node>(udp.node))
        .map(|node| node.id)
        .unwrap_or_default();
    world.entity_mut(socket).insert(generator);
    world
        .resource_mut::<SimulationClock>()
        .schedule_with_context(node_id, start_ns, EventKind::AppSend, Some(socket));
}

pub fn set_stop_time(world: &mut World, stop_ns: u64) {
    world.insert_resource(StopTime(stop_ns));
}

/// Build the two-node link: receiver at the origin with a UDP sink, sender at
/// `distance_m` along x with a connected UDP source driven by a traffic
/// generator. Sniffer traces are left to the caller.
pub fn build_link_scenario(world: &mut World, params: &LinkScenarioParams) -> LinkHandles {
    init_world(world, params.seed);

    let nodes = create_nodes(world, 2);
    let (receiver, sender) = (nodes[0], nodes[1]);

    install_wifi(world, &nodes, params.phy, params.mac, params.loss);
    set_position(world, receiver, Position::ORIGIN);
    set_position(world, sender, Position::new(params.distance_m, 0.0, 0.0));

    let mut addresses = Ipv4AddressHelper::new(NETWORK_BASE, NETWORK_MASK);
    let assigned = internet::assign_ipv4(world, &nodes, &mut addresses);
    let sink_addr = SocketAddrV4::new(assigned[0], params.sink_port);

    let sink_socket = internet::create_udp_socket(world, receiver);
    internet::bind(world, sink_socket, sink_addr);

    let source_socket = internet::create_udp_socket(world, sender);
    internet::set_allow_broadcast(world, source_socket, true);
    internet::connect(world, source_socket, sink_addr);

    install_traffic(
        world,
        source_socket,
        TrafficGenerator::new(params.payload_bytes, params.packet_count, params.interval_ns),
        params.traffic_start_ns,
    );
    install_flow_monitor(world);
    set_stop_time(world, params.stop_ns);

    debug!(
        loss = params.loss.type_name(),
        stochastic = params.loss.is_stochastic(),
        distance_m = params.distance_m,
        packets = params.packet_count,
        interval_ns = params.interval_ns,
        stop_ns = params.stop_ns,
        "link scenario built"
    );

    LinkHandles {
        receiver,
        sender,
        sink_socket,
        source_socket,
    }
}

/// What survives a disposed world.
#[derive(Debug, Default)]
pub struct Teardown {
    pub flows: FlowMonitor,
    pub sniffer_traces: Vec<(Entity, SnifferRxTrace)>,
}

impl Teardown {
    pub fn sniffer_trace(&self, device: Entity) -> Option<&SnifferRxTrace> {
        self.sniffer_traces
            .iter()
            .find(|(entity, _)| *entity == device)
            .map(|(_, trace)| trace)
    }
}

/// Dispose of all scenario state, keeping only flow statistics and sniffer traces.
pub fn destroy(mut world: World) -> Teardown {
    let flows = world.remove_resource::<FlowMonitor>().unwrap_or_default();
    let mut traces = world.query::<(Entity, &SnifferRxTrace)>();
    let sniffer_traces = traces
        .iter(&world)
        .map(|(entity, trace)| (entity, trace.clone()))
        .collect();
    Teardown {
        flows,
        sniffer_traces,
    }
}
