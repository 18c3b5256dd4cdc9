use std::net::{Ipv4Addr, SocketAddrV4};

use bevy_ecs::prelude::{Component, Entity};

/// A simulated host. `id` is the node index used as event context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Node {
    pub id: u32,
}

/// Constant position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// IPv4 address assigned to a node's single interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Ipv4Interface {
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Open,
    Closed,
}

/// A UDP socket living on `node`. Sockets are their own entities so a node
/// can carry several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct UdpSocket {
    pub node: Entity,
    pub local: Option<SocketAddrV4>,
    pub remote: Option<SocketAddrV4>,
    pub allow_broadcast: bool,
    pub state: SocketState,
    pub rx_packets: u64,
    pub rx_bytes: u64,
}

impl UdpSocket {
    pub fn new(node: Entity) -> Self {
        Self {
            node,
            local: None,
            remote: None,
            allow_broadcast: false,
            state: SocketState::Open,
            rx_packets: 0,
            rx_bytes: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == SocketState::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let far = Position::new(3.0, 4.0, 0.0);
        assert_eq!(Position::ORIGIN.distance_to(&far), 5.0);
        assert_eq!(far.distance_to(&far), 0.0);
    }
}
