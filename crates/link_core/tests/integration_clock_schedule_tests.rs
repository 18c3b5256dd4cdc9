use bevy_ecs::prelude::{Schedule, World};
use link_core::clock::{CurrentEvent, EventKind, SimulationClock, StopTime};
use link_core::runner::{run_next_event, run_until_empty};

#[test]
fn events_dispatch_in_timestamp_order_with_insertion_tie_break() {
    let mut world = World::new();
    let mut clock = SimulationClock::default();
    clock.schedule_at(30, EventKind::TxComplete, None);
    clock.schedule_at(10, EventKind::PhyRxEnd, None);
    clock.schedule_at(10, EventKind::AppSend, None);
    world.insert_resource(clock);

    let mut schedule = Schedule::default();
    let mut seen = Vec::new();
    while run_next_event(&mut world, &mut schedule) {
        let event = world.resource::<CurrentEvent>().0;
        seen.push((event.timestamp, event.kind));
    }

    assert_eq!(
        seen,
        vec![
            (10, EventKind::PhyRxEnd),
            (10, EventKind::AppSend),
            (30, EventKind::TxComplete),
        ]
    );
}

#[test]
fn context_is_carried_on_the_event() {
    let mut world = World::new();
    let mut clock = SimulationClock::default();
    clock.schedule_with_context(1, 5, EventKind::AppSend, None);
    world.insert_resource(clock);

    let mut schedule = Schedule::default();
    assert!(run_next_event(&mut world, &mut schedule));
    let event = world.resource::<CurrentEvent>().0;
    assert_eq!(event.context, Some(1));
    assert_eq!(event.timestamp, 5);
}

#[test]
fn events_at_stop_time_are_left_pending() {
    let mut world = World::new();
    let mut clock = SimulationClock::default();
    for ts in [1, 2, 3, 4] {
        clock.schedule_at(ts, EventKind::AppSend, None);
    }
    world.insert_resource(clock);
    world.insert_resource(StopTime(3));

    let mut schedule = Schedule::default();
    assert_eq!(run_until_empty(&mut world, &mut schedule, 100), 2);
    let clock = world.resource::<SimulationClock>();
    assert_eq!(clock.now(), 2);
    assert_eq!(clock.next_event_time(), Some(3));
}
