mod support;

use link_core::propagation::{FriisConfig, NakagamiConfig, PropagationLossModel};
use link_core::scenario::LinkScenarioParams;
use support::{run_trial, short_trial_params};

fn friis() -> PropagationLossModel {
    PropagationLossModel::Friis(FriisConfig::default())
}

#[test]
fn short_friis_link_delivers_nearly_all_offered_traffic() {
    let params = short_trial_params(friis(), 1.0, 20.0, 0.2);
    let (_, teardown) = run_trial(&params);

    let (_, stats) = teardown.flows.last_flow().expect("one flow");
    assert_eq!(stats.tx_packets, params.packet_count as u64);
    assert!(stats.rx_packets > 0);
    assert!(
        stats.rx_packets as f64 >= 0.95 * stats.tx_packets as f64,
        "rx {} of tx {}",
        stats.rx_packets,
        stats.tx_packets
    );
    assert_eq!(stats.rx_bytes, stats.rx_packets * (1450 + 28));
}

#[test]
fn receiver_sniffer_sees_strong_signal_at_one_metre() {
    let params = short_trial_params(friis(), 1.0, 10.0, 0.1);
    let (handles, teardown) = run_trial(&params);

    let trace = teardown
        .sniffer_trace(handles.receiver)
        .expect("receiver carries a sniffer trace");
    let last = trace.last().expect("frames were received");
    // 10 dBm + 2 dB of antenna gain minus ~46.7 dB of free-space loss.
    assert!((last.signal_dbm - (-34.68)).abs() < 0.1, "{}", last.signal_dbm);
    assert!(last.snr_db() > 50.0);
    assert_eq!(last.mcs, 7);
    assert!(teardown.sniffer_trace(handles.sender).is_none());
}

#[test]
fn out_of_range_friis_link_delivers_nothing() {
    let params = short_trial_params(friis(), 1000.0, 10.0, 0.1);
    let (handles, teardown) = run_trial(&params);

    let (_, stats) = teardown.flows.last_flow().expect("flow exists even without delivery");
    assert!(stats.tx_packets > 0);
    assert_eq!(stats.rx_packets, 0);
    assert_eq!(stats.rx_bytes, 0);
    let trace = teardown.sniffer_trace(handles.receiver).expect("trace installed");
    assert!(trace.last().is_none());
}

#[test]
fn fixed_rss_ignores_distance() {
    let loss = PropagationLossModel::FixedRss { rss_dbm: -80.0 };
    let (near_handles, near) = run_trial(&short_trial_params(loss, 1.0, 10.0, 0.1));
    let (far_handles, far) = run_trial(&short_trial_params(loss, 251.0, 10.0, 0.1));

    let near_rx = near.flows.last_flow().expect("flow").1.rx_bytes;
    let far_rx = far.flows.last_flow().expect("flow").1.rx_bytes;
    assert!(near_rx > 0);
    // Only the propagation delay differs between the two runs.
    assert!(far_rx as f64 >= 0.95 * near_rx as f64, "near {near_rx} far {far_rx}");

    let near_signal = near
        .sniffer_trace(near_handles.receiver)
        .and_then(|t| t.last())
        .map(|s| s.signal_dbm);
    let far_signal = far
        .sniffer_trace(far_handles.receiver)
        .and_then(|t| t.last())
        .map(|s| s.signal_dbm);
    assert_eq!(near_signal, Some(-79.0));
    assert_eq!(near_signal, far_signal);
}

#[test]
fn nakagami_trials_are_reproducible_for_a_seed() {
    let loss = PropagationLossModel::Nakagami(NakagamiConfig::default());
    let params = short_trial_params(loss, 50.0, 20.0, 0.1).with_seed(7);

    let (_, first) = run_trial(&params);
    let (_, second) = run_trial(&params);

    assert_eq!(
        first.flows.last_flow().map(|(_, s)| *s),
        second.flows.last_flow().map(|(_, s)| *s)
    );
}

#[test]
fn zero_packets_produce_no_flow() {
    let params = LinkScenarioParams::default().with_traffic(1450, 0, 1_000);
    let (_, teardown) = run_trial(&params);
    assert!(teardown.flows.is_empty());
}
