use std::time::Duration;

use squall::{Simulation, SimulationConfig, SimWorld};

#[test]
fn identical_seeds_produce_bit_identical_reports() {
    let run = |seed: u64| {
        let config = SimulationConfig::reference_fleet(10, 2, seed);
        Simulation::new(config)
            .unwrap()
            .run_horizon_hours(8760.0)
            .unwrap()
    };

    let first = run(42);
    let second = run(42);
    assert_eq!(first, second, "same seed must reproduce the exact run");
}

#[test]
fn different_seeds_diverge() {
    let run = |seed: u64| {
        let config = SimulationConfig::reference_fleet(10, 2, seed);
        Simulation::new(config)
            .unwrap()
            .run_horizon_hours(8760.0)
            .unwrap()
    };

    let availabilities = |report: &squall::RunReport| -> Vec<f64> {
        report.per_turbine.iter().map(|t| t.availability).collect()
    };
    assert_ne!(availabilities(&run(42)), availabilities(&run(43)));
}

#[test]
fn clock_never_moves_backwards() {
    let config = SimulationConfig::reference_fleet(6, 1, 42);
    let mut world = SimWorld::new(config).unwrap();
    let horizon = Duration::from_secs(8760 * 3600);

    let mut last = Duration::ZERO;
    while world.now() < horizon {
        if !world.step().unwrap() {
            break;
        }
        assert!(world.now() >= last, "clock regressed");
        last = world.now();
    }
}

#[test]
fn event_count_is_reproducible() {
    let run = |_| {
        let config = SimulationConfig::reference_fleet(4, 1, 7);
        Simulation::new(config)
            .unwrap()
            .run_horizon_hours(20_000.0)
            .unwrap()
            .events_processed
    };
    assert_eq!(run(()), run(()));
}
