use bevy_ecs::prelude::{Res, ResMut};
use tracing::trace;

use crate::channel::WifiChannel;
use crate::clock::{CurrentEvent, SimulationClock};
use crate::flow_monitor::FlowMonitor;
use crate::random::SimRng;
use crate::systems::{start_transmission, DeviceQuery};
use crate::wifi::InFlightPpdus;

/// Channel access finished: settle the block ack and start the next PPDU.
pub fn tx_complete_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut devices: DeviceQuery,
    mut monitor: ResMut<FlowMonitor>,
    channel: Res<WifiChannel>,
    mut rng: ResMut<SimRng>,
    mut in_flight: ResMut<InFlightPpdus>,
) {
    let Some(sender) = event.0.subject else {
        return;
    };
    let dropped = match devices.get_mut(sender) {
        Ok((_, _, _, _, mut device)) => device.complete_pending(),
        Err(_) => return,
    };
    if !dropped.is_empty() {
        trace!(now = clock.now(), dropped = dropped.len(), "retry limit reached");
    }
    for packet in &dropped {
        monitor.record_drop(packet.flow);
    }

    start_transmission(sender, &mut devices, &channel, &mut rng, &mut clock, &mut in_flight);
}
