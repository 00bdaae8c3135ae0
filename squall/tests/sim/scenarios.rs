use std::time::Duration;

use squall::{
    FailureKind, ReplicationRunner, Simulation, SimulationConfig, SimWorld, TurbineState,
};
use tracing_test::traced_test;

/// Single turbine, MTBF 100 h, fixed 5 h repairs, dedicated vessel: every
/// failure costs exactly one repair, so availability follows directly from
/// the failure count.
#[test]
fn lone_turbine_availability_is_exactly_repair_time() {
    let config = SimulationConfig::new(
        1,
        1,
        vec![FailureKind::new("Generic fault", 100.0, 5.0)],
        42,
    );
    let report = Simulation::new(config)
        .unwrap()
        .run_horizon_hours(1000.0)
        .unwrap();

    let turbine = &report.per_turbine[0];
    assert!(turbine.failure_count > 0, "1000 h at MTBF 100 h should fail");
    assert!(
        (turbine.availability - (1000.0 - turbine.downtime_hours) / 1000.0).abs() < 1e-9
    );
    if turbine.final_state == TurbineState::Operating {
        assert_eq!(turbine.downtime_hours, 5.0 * turbine.failure_count as f64);
    }
    // Never waited: the vessel is always free.
    assert_eq!(report.queue_wait.mean_hours, 0.0);
    assert_eq!(report.queue_wait.p95_hours, 0.0);
}

/// Two turbines sharing one vessel: at most one repair request can ever be
/// waiting, and it waits only while the other repair runs.
#[test]
fn two_turbines_one_vessel_queue_stays_short() {
    let config = SimulationConfig::new(
        2,
        1,
        vec![FailureKind::new("Generic fault", 100.0, 5.0)],
        42,
    );
    let mut world = SimWorld::new(config).unwrap();
    let horizon = Duration::from_secs(5000 * 3600);

    // Step only through events inside the horizon the report covers.
    while world.next_event_time().is_some_and(|t| t <= horizon) {
        world.step().unwrap();
        assert!(world.repair_queue_len() <= 1);
        assert!(world.vessels_in_use() <= 1);
    }
    let report = world.run_until(horizon).unwrap();
    assert_eq!(report.horizon_hours, 5000.0);
    // Waits are bounded by the fixed repair length.
    assert!(report.queue_wait.p95_hours <= 5.0);
}

#[test]
fn configuration_round_trips_through_json() {
    let config = SimulationConfig::reference_fleet(10, 2, 42);
    let json = serde_json::to_string_pretty(&config).unwrap();
    let restored: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);

    // A config restored from JSON reproduces the original run.
    let a = Simulation::new(config).unwrap().run_horizon_hours(1000.0).unwrap();
    let b = Simulation::new(restored).unwrap().run_horizon_hours(1000.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn run_report_renders_a_summary() {
    let config = SimulationConfig::reference_fleet(4, 1, 42);
    let report = Simulation::new(config)
        .unwrap()
        .run_horizon_hours(8760.0)
        .unwrap();

    let rendered = report.to_string();
    assert!(rendered.contains("=== Run Report ==="));
    assert!(rendered.contains("Seed: 42"));
    assert!(rendered.contains("Total Failures:"));
}

#[traced_test]
#[test]
fn finished_runs_are_logged() {
    let config = SimulationConfig::reference_fleet(2, 1, 42);
    Simulation::new(config)
        .unwrap()
        .run_horizon_hours(1000.0)
        .unwrap();
    assert!(logs_contain("simulation finished"));
}

#[test]
fn replication_batches_are_reproducible() {
    let run = || {
        let config = SimulationConfig::reference_fleet(5, 2, 42);
        ReplicationRunner::new(config, 3)
            .unwrap()
            .run_horizon_hours(8760.0)
            .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_eq!(first.runs.len(), 3);
}
