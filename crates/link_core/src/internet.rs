//! IPv4 addressing and UDP sockets.

use std::net::{Ipv4Addr, SocketAddrV4};

use bevy_ecs::prelude::{Entity, Resource, World};
use tracing::debug;

use crate::ecs::{Ipv4Interface, SocketState, UdpSocket};

pub const IPV4_HEADER_BYTES: u32 = 20;
pub const UDP_HEADER_BYTES: u32 = 8;
pub const UDP_IP_HEADER_BYTES: u32 = IPV4_HEADER_BYTES + UDP_HEADER_BYTES;

pub const FIRST_EPHEMERAL_PORT: u16 = 49153;

/// Hands out sequential host addresses from a network base.
#[derive(Debug, Clone)]
pub struct Ipv4AddressHelper {
    network: u32,
    mask: Ipv4Addr,
    next_host: u32,
}

impl Ipv4AddressHelper {
    pub fn new(network: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self {
            network: u32::from(network) & u32::from(mask),
            mask,
            next_host: 1,
        }
    }

    pub fn next_address(&mut self) -> Ipv4Addr {
        let address = Ipv4Addr::from(self.network | self.next_host);
        self.next_host += 1;
        address
    }
}

#[derive(Debug, Clone, Copy, Resource)]
pub struct EphemeralPorts {
    next: u16,
}

impl Default for EphemeralPorts {
    fn default() -> Self {
        Self {
            next: FIRST_EPHEMERAL_PORT,
        }
    }
}

impl EphemeralPorts {
    pub fn allocate(&mut self) -> u16 {
        let port = self.next;
        self.next = self.next.checked_add(1).unwrap_or(FIRST_EPHEMERAL_PORT);
        port
    }
}

/// Assign one address per node, in order. Returns the assigned addresses.
pub fn assign_ipv4(
    world: &mut World,
    nodes: &[Entity],
    helper: &mut Ipv4AddressHelper,
) -> Vec<Ipv4Addr> {
    world.get_resource_or_insert_with(EphemeralPorts::default);
    nodes
        .iter()
        .map(|&node| {
            let address = helper.next_address();
            world.entity_mut(node).insert(Ipv4Interface {
                address,
                mask: helper.mask,
            });
            debug!(%address, "assigned ipv4 address");
            address
        })
        .collect()
}

pub fn create_udp_socket(world: &mut World, node: Entity) -> Entity {
    world.spawn(UdpSocket::new(node)).id()
}

pub fn bind(world: &mut World, socket: Entity, local: SocketAddrV4) {
    if let Some(mut udp) = world.get_mut::<UdpSocket>(socket) {
        udp.local = Some(local);
    }
}

/// Connect to `remote`, binding an ephemeral port on the node's address
/// first if the socket is unbound.
pub fn connect(world: &mut World, socket: Entity, remote: SocketAddrV4) {
    let Some(node) = world.get::<UdpSocket>(socket).map(|udp| udp.node) else {
        return;
    };
    let unbound = world
        .get::<UdpSocket>(socket)
        .map(|udp| udp.local.is_none())
        .unwrap_or(false);
    if unbound {
        let address = world
            .get::<Ipv4Interface>(node)
            .map(|iface| iface.address)
            .unwrap_or(Ipv4Addr::UNSPECIFIED);
        let port = world.resource_mut::<EphemeralPorts>().allocate();
        bind(world, socket, SocketAddrV4::new(address, port));
    }
    if let Some(mut udp) = world.get_mut::<UdpSocket>(socket) {
        udp.remote = Some(remote);
    }
}

pub fn set_allow_broadcast(world: &mut World, socket: Entity, allow: bool) {
    if let Some(mut udp) = world.get_mut::<UdpSocket>(socket) {
        udp.allow_broadcast = allow;
    }
}

pub fn close(world: &mut World, socket: Entity) {
    if let Some(mut udp) = world.get_mut::<UdpSocket>(socket) {
        udp.state = SocketState::Closed;
    }
}
