pub mod app_send;
pub mod phy_rx;
pub mod tx_complete;

use bevy_ecs::prelude::{Entity, Query};
use tracing::trace;

use crate::channel::WifiChannel;
use crate::clock::{EventKind, SimulationClock};
use crate::ecs::{Ipv4Interface, Node, Position};
use crate::random::SimRng;
use crate::wifi::{InFlightPpdu, PendingPpdu, RxOutcome, WifiDevice};

pub(crate) type DeviceQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Node,
        &'static Position,
        &'static Ipv4Interface,
        &'static mut WifiDevice,
    ),
>;

/// Put the next A-MPDU of `sender` on the air if the device is idle and has
/// queued packets. Reception is decided at transmit time: geometry is static
/// for the whole PPDU.
pub(crate) fn start_transmission(
    sender: Entity,
    devices: &mut DeviceQuery,
    channel: &WifiChannel,
    rng: &mut SimRng,
    clock: &mut SimulationClock,
    in_flight: &mut crate::wifi::InFlightPpdus,
) {
    let Ok((_, node, sender_pos, _, device)) = devices.get(sender) else {
        return;
    };
    if device.is_busy() {
        return;
    }
    let Some(head) = device.queue.front() else {
        return;
    };
    let node_id = node.id;
    let sender_pos = *sender_pos;
    let dst_ip = *head.dst.ip();
    let radiated_power_dbm = device.phy.radiated_power_dbm();

    let receiver = devices
        .iter()
        .find(|(entity, _, _, iface, _)| *entity != sender && iface.address == dst_ip)
        .map(|(entity, node, pos, _, dev)| (entity, node.id, *pos, dev.phy));

    let Ok((_, _, _, _, mut device)) = devices.get_mut(sender) else {
        return;
    };
    let (mpdus, psdu_bytes) = device.next_aggregate();
    let mcs = device.rate.select();
    let rate_mbps = mcs.rate_mbps(device.phy.channel_width);
    let airtime_ns = device.mac.ppdu_duration_ns(psdu_bytes, rate_mbps);
    let now = clock.now();

    let outcome = match receiver {
        Some((rx_entity, rx_node_id, rx_pos, rx_phy)) => {
            let antenna_dbm =
                channel.rx_power_dbm(radiated_power_dbm, &sender_pos, &rx_pos, &mut rng.0);
            let outcome = rx_phy.classify(antenna_dbm, mcs);
            if let Some(snr_db) = outcome.feedback_snr_db() {
                device.rate.report_snr(snr_db);
            }
            if let RxOutcome::Decoded { rx_power_dbm, .. } = outcome {
                let arrival_delay = airtime_ns + channel.delay_ns(&sender_pos, &rx_pos);
                in_flight.push(InFlightPpdu {
                    sender,
                    receiver: rx_entity,
                    arrival_ns: now + arrival_delay,
                    mcs: mcs.index,
                    rx_power_dbm,
                    noise_dbm: rx_phy.noise_floor_dbm(),
                    packets: device.queue.iter().take(mpdus).copied().collect(),
                });
                clock.schedule_with_context(
                    rx_node_id,
                    arrival_delay,
                    EventKind::PhyRxEnd,
                    Some(rx_entity),
                );
            }
            outcome
        }
        None => RxOutcome::BelowSensitivity,
    };

    trace!(
        node = node_id,
        now,
        mpdus,
        psdu_bytes,
        mcs = mcs.index,
        airtime_ns,
        ?outcome,
        "ppdu on air"
    );

    device.pending = Some(PendingPpdu {
        mpdus,
        decoded: outcome.is_decoded(),
    });
    let busy_ns = airtime_ns + device.mac.access_overhead_ns;
    clock.schedule_with_context(node_id, busy_ns, EventKind::TxComplete, Some(sender));
}
