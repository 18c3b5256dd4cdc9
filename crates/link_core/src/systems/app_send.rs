use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{debug, trace, warn};

use crate::channel::WifiChannel;
use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{SocketState, UdpSocket};
use crate::flow_monitor::{FiveTuple, FlowMonitor, IPPROTO_UDP};
use crate::internet::UDP_IP_HEADER_BYTES;
use crate::random::SimRng;
use crate::systems::{start_transmission, DeviceQuery};
use crate::traffic::{TrafficAction, TrafficGenerator};
use crate::wifi::{InFlightPpdus, QueuedPacket};

/// One traffic generator tick: send a payload and reschedule, or close.
#[allow(clippy::too_many_arguments)]
pub fn app_send_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut apps: Query<(&mut TrafficGenerator, &mut UdpSocket)>,
    mut devices: DeviceQuery,
    mut monitor: ResMut<FlowMonitor>,
    channel: Res<WifiChannel>,
    mut rng: ResMut<SimRng>,
    mut in_flight: ResMut<InFlightPpdus>,
) {
    let event = event.0;
    let Some(app) = event.subject else {
        return;
    };
    let Ok((mut generator, mut socket)) = apps.get_mut(app) else {
        return;
    };

    let payload_bytes = match generator.next() {
        Some(TrafficAction::Send { payload_bytes }) => payload_bytes,
        Some(TrafficAction::Close) => {
            socket.state = SocketState::Closed;
            debug!(context = ?event.context, now = clock.now(), "traffic finished, socket closed");
            return;
        }
        None => return,
    };

    let interval_ns = generator.interval_ns();
    match event.context {
        Some(node_id) => {
            clock.schedule_with_context(node_id, interval_ns, EventKind::AppSend, Some(app))
        }
        None => clock.schedule_in(interval_ns, EventKind::AppSend, Some(app)),
    }

    if !socket.is_open() {
        warn!("send on closed socket ignored");
        return;
    }
    let (Some(local), Some(remote)) = (socket.local, socket.remote) else {
        warn!("send on unconnected socket ignored");
        return;
    };

    let now = clock.now();
    let size_bytes = payload_bytes + UDP_IP_HEADER_BYTES;
    let flow = monitor.classify(FiveTuple {
        src: local,
        dst: remote,
        protocol: IPPROTO_UDP,
    });
    monitor.record_tx(flow, size_bytes, now);

    let sender = socket.node;
    let Ok((_, _, _, _, mut device)) = devices.get_mut(sender) else {
        monitor.record_drop(flow);
        return;
    };
    let queued = device.enqueue(QueuedPacket {
        flow,
        src: local,
        dst: remote,
        size_bytes,
        retries: 0,
    });
    if !queued {
        trace!(now, queue = device.queue.len(), "mac queue full, packet dropped");
        monitor.record_drop(flow);
        return;
    }

    start_transmission(sender, &mut devices, &channel, &mut rng, &mut clock, &mut in_flight);
}
