use std::time::Duration;

use squall::{SimulationConfig, SimWorld, TurbineId, TurbineState};

/// With more failed turbines than vessels, occupancy must stay within
/// capacity and every outstanding request is either active or queued.
#[test]
fn vessel_pool_occupancy_stays_within_capacity() {
    let config = SimulationConfig::reference_fleet(8, 2, 42);
    let mut world = SimWorld::new(config).unwrap();
    let horizon = Duration::from_secs(8760 * 3600);

    while world.now() < horizon {
        if !world.step().unwrap() {
            break;
        }
        assert!(world.vessels_in_use() <= 2);
        assert_eq!(
            world.vessels_in_use() + world.repair_queue_len(),
            world.outstanding_requests()
        );
        // The queue is non-empty only while the pool is saturated.
        if world.repair_queue_len() > 0 {
            assert_eq!(world.vessels_in_use(), 2);
        }
    }
}

/// Every turbine's uptime and downtime partition the horizon exactly.
#[test]
fn uptime_and_downtime_partition_the_horizon() {
    let horizon_hours = 8760.0;
    let config = SimulationConfig::reference_fleet(10, 1, 42);
    let report = squall::Simulation::new(config)
        .unwrap()
        .run_horizon_hours(horizon_hours)
        .unwrap();

    for turbine in &report.per_turbine {
        let uptime_hours = turbine.availability * horizon_hours;
        assert!(
            (uptime_hours + turbine.downtime_hours - horizon_hours).abs() < 1e-6,
            "turbine {:?}: uptime {uptime_hours} + downtime {} != horizon",
            turbine.id,
            turbine.downtime_hours
        );
    }
}

/// A turbine that never fails inside the horizon reports full availability.
#[test]
fn failure_free_turbine_is_fully_available() {
    // With an MTBF far beyond the horizon the first failure draw almost
    // surely lands outside it; seed 42 is known to.
    let config = SimulationConfig::new(
        1,
        1,
        vec![squall::FailureKind::new("Blade erosion", 1.0e9, 10.0)],
        42,
    );
    let report = squall::Simulation::new(config)
        .unwrap()
        .run_horizon_hours(100.0)
        .unwrap();

    assert_eq!(report.per_turbine[0].failure_count, 0);
    assert_eq!(report.per_turbine[0].availability, 1.0);
    assert_eq!(report.per_turbine[0].downtime_hours, 0.0);
    assert_eq!(report.fleet_utilization, 0.0);
}

/// State machine transitions only move along the failure-repair cycle.
#[test]
fn state_transitions_follow_the_cycle() {
    let config = SimulationConfig::reference_fleet(3, 1, 42);
    let mut world = SimWorld::new(config).unwrap();
    let horizon = Duration::from_secs(8760 * 3600);
    let ids: Vec<TurbineId> = (0..3).map(TurbineId).collect();
    let mut previous: Vec<TurbineState> = ids
        .iter()
        .map(|id| world.turbine_state(*id).unwrap())
        .collect();

    while world.now() < horizon {
        if !world.step().unwrap() {
            break;
        }
        for (i, id) in ids.iter().enumerate() {
            let state = world.turbine_state(*id).unwrap();
            let legal = match (previous[i], state) {
                (old, new) if old == new => true,
                (TurbineState::Operating, TurbineState::AwaitingRepair) => true,
                (TurbineState::AwaitingRepair, TurbineState::UnderRepair) => true,
                // Preemption suspends an in-progress repair.
                (TurbineState::UnderRepair, TurbineState::AwaitingRepair) => true,
                (TurbineState::UnderRepair, TurbineState::Operating) => true,
                _ => false,
            };
            assert!(legal, "illegal transition {:?} -> {state:?}", previous[i]);
            previous[i] = state;
        }
    }
}
