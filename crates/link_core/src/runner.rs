//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. Exactly one system reacts to each
//! event kind, and the schedule is single-threaded, so callbacks execute
//! strictly in simulated-time order.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};

use crate::clock::{CurrentEvent, EventKind, SimulationClock, StopTime};
use crate::systems::{
    app_send::app_send_system, phy_rx::phy_rx_system, tx_complete::tx_complete_system,
};

fn is_app_send(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::AppSend).unwrap_or(false)
}

fn is_phy_rx_end(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::PhyRxEnd).unwrap_or(false)
}

fn is_tx_complete(event: Option<Res<CurrentEvent>>) -> bool {
    event.map(|e| e.0.kind == EventKind::TxComplete).unwrap_or(false)
}

/// Runs one simulation step: pops the next event, inserts it as [CurrentEvent],
/// then runs the schedule. Returns `false` if the clock is empty or the next
/// event is at or past [StopTime].
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let stop_at = world.get_resource::<StopTime>().map(|s| s.0);
    let next_ts = world
        .get_resource::<SimulationClock>()
        .and_then(|c| c.next_event_time());
    if let (Some(stop_ns), Some(ts)) = (stop_at, next_ts) {
        if ts >= stop_ns {
            return false;
        }
    }

    let event = match world.get_resource_mut::<SimulationClock>().and_then(|mut c| c.pop_next()) {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs simulation steps until the stop time, an empty queue, or `max_steps`.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Runs the trial to completion: until the stop time or until nothing is left to do.
pub fn run(world: &mut World) -> usize {
    let mut schedule = simulation_schedule();
    run_until_empty(world, &mut schedule, usize::MAX)
}

pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            app_send_system.run_if(is_app_send),
            phy_rx_system.run_if(is_phy_rx_end),
            tx_complete_system.run_if(is_tx_complete),
        )
            .chain(),
    );
    schedule
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_time_is_exclusive() {
        let mut world = World::new();
        let mut clock = SimulationClock::default();
        clock.schedule_at(5, EventKind::TxComplete, None);
        clock.schedule_at(10, EventKind::TxComplete, None);
        world.insert_resource(clock);
        world.insert_resource(StopTime(10));

        let mut schedule = Schedule::default();
        assert_eq!(run_until_empty(&mut world, &mut schedule, 100), 1);
        assert_eq!(world.resource::<SimulationClock>().now(), 5);
        assert_eq!(world.resource::<SimulationClock>().pending(), 1);
    }

    #[test]
    fn runs_until_queue_is_empty_without_stop_time() {
        let mut world = World::new();
        let mut clock = SimulationClock::default();
        clock.schedule_at(1, EventKind::PhyRxEnd, None);
        clock.schedule_at(2, EventKind::PhyRxEnd, None);
        world.insert_resource(clock);

        let mut schedule = Schedule::default();
        assert_eq!(run_until_empty(&mut world, &mut schedule, 100), 2);
        assert_eq!(world.resource::<CurrentEvent>().0.kind, EventKind::PhyRxEnd);
    }
}
