use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::trace;

use crate::clock::{CurrentEvent, SimulationClock};
use crate::ecs::{Ipv4Interface, UdpSocket};
use crate::flow_monitor::FlowMonitor;
use crate::internet::UDP_IP_HEADER_BYTES;
use crate::telemetry::{SnifferRxSample, SnifferRxTrace};
use crate::wifi::{InFlightPpdus, WifiDevice};

/// A decodable PPDU reached its receiver: notify the sniffer trace once per
/// MPDU and deliver each packet addressed to this node.
pub fn phy_rx_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut in_flight: ResMut<InFlightPpdus>,
    mut traces: Query<&mut SnifferRxTrace>,
    devices: Query<(&Ipv4Interface, &WifiDevice)>,
    mut sockets: Query<&mut UdpSocket>,
    mut monitor: ResMut<FlowMonitor>,
) {
    let Some(receiver) = event.0.subject else {
        return;
    };
    let now = clock.now();
    let Some(ppdu) = in_flight.take_arrival(receiver, now) else {
        return;
    };
    let Ok((iface, device)) = devices.get(receiver) else {
        return;
    };

    for packet in &ppdu.packets {
        if let Ok(mut trace) = traces.get_mut(receiver) {
            trace.record(SnifferRxSample {
                timestamp_ns: now,
                signal_dbm: ppdu.rx_power_dbm,
                noise_dbm: ppdu.noise_dbm,
                mcs: ppdu.mcs,
                mpdu_bytes: packet.size_bytes + device.mac.mpdu_overhead_bytes,
            });
        }

        if iface.address != *packet.dst.ip() {
            continue;
        }
        monitor.record_rx(packet.flow, packet.size_bytes, now);

        let port = packet.dst.port();
        if let Some(mut socket) = sockets.iter_mut().find(|socket| {
            socket.node == receiver
                && socket.is_open()
                && socket.local.map(|local| local.port()) == Some(port)
        }) {
            socket.rx_packets += 1;
            socket.rx_bytes += (packet.size_bytes - UDP_IP_HEADER_BYTES) as u64;
        }
    }

    trace!(
        now,
        mpdus = ppdu.packets.len(),
        signal_dbm = ppdu.rx_power_dbm,
        mcs = ppdu.mcs,
        "ppdu received"
    );
}
