use std::time::Duration;

use squall::{
    FailureKind, FailureTimeline, PlannedFailure, PriorityScheme, SimulationConfig, SimWorld,
    TurbineState, TurbineId,
};

fn hours(h: f64) -> Duration {
    Duration::from_secs_f64(h * 3600.0)
}

fn scripted(instants: &[(f64, usize)]) -> FailureTimeline {
    FailureTimeline::scripted(
        instants
            .iter()
            .map(|&(h, kind)| PlannedFailure {
                at: hours(h),
                kind,
            })
            .collect(),
    )
}

/// Major replacement (priority 2) in progress when a manual reset
/// (priority 1) arrives: the reset takes the vessel, the replacement
/// resumes afterwards with its exact remainder, losing no progress.
#[test]
fn urgent_failure_preempts_and_victim_resumes_with_remainder() {
    let mut config = SimulationConfig::new(
        2,
        1,
        vec![
            FailureKind::new("Major replacement", 1000.0, 20.0).with_priority(2),
            FailureKind::new("Manual reset", 1000.0, 3.0).with_priority(1),
        ],
        42,
    );
    config.priority_scheme = PriorityScheme::BySeverity;

    let timelines = vec![scripted(&[(10.0, 0)]), scripted(&[(18.0, 1)])];
    let mut world = SimWorld::with_timelines(config, timelines).unwrap();
    let report = world.run_until(hours(100.0)).unwrap();

    assert_eq!(world.stats().preemptions(), 1);
    // Reset: failed 18h, repaired 18h..21h.
    assert_eq!(report.per_turbine[1].downtime_hours, 3.0);
    // Replacement: 10h..18h of work done, 12h remaining after the reset
    // releases at 21h, complete at 33h. Total downtime 23h.
    assert_eq!(report.per_turbine[0].downtime_hours, 23.0);
    assert_eq!(report.per_turbine[0].final_state, TurbineState::Operating);
}

/// Two preemptions at the same instant: the second victim has not even
/// started its repair when it loses the vessel, and its stale grant event
/// must be dropped rather than dispatched.
#[test]
fn same_instant_preemption_of_an_ungranted_request() {
    let mut config = SimulationConfig::new(
        3,
        1,
        vec![
            FailureKind::new("Major replacement", 1000.0, 50.0).with_priority(3),
            FailureKind::new("Minor repair", 1000.0, 4.0).with_priority(2),
            FailureKind::new("Manual reset", 1000.0, 2.0).with_priority(1),
        ],
        42,
    );
    config.priority_scheme = PriorityScheme::BySeverity;

    let timelines = vec![
        scripted(&[(5.0, 0)]),
        scripted(&[(10.0, 1)]),
        scripted(&[(10.0, 2)]),
    ];
    let mut world = SimWorld::with_timelines(config, timelines).unwrap();
    let report = world.run_until(hours(100.0)).unwrap();

    assert_eq!(world.stats().preemptions(), 2);
    // Reset runs 10h..12h, then the minor repair 12h..16h, then the
    // replacement resumes its remaining 45h, 16h..61h.
    assert_eq!(report.per_turbine[2].downtime_hours, 2.0);
    assert_eq!(report.per_turbine[1].downtime_hours, 6.0);
    assert_eq!(report.per_turbine[0].downtime_hours, 56.0);
    for turbine in &report.per_turbine {
        assert_eq!(turbine.final_state, TurbineState::Operating);
    }
}

/// Equal priority never preempts; the later failure waits its turn.
#[test]
fn equal_priority_waits_instead_of_preempting() {
    let config = SimulationConfig::new(
        2,
        1,
        vec![FailureKind::new("Minor repair", 1000.0, 8.0)],
        42,
    );
    let timelines = vec![scripted(&[(10.0, 0)]), scripted(&[(12.0, 0)])];
    let mut world = SimWorld::with_timelines(config, timelines).unwrap();

    // Run to just past the second failure.
    while world.now() < hours(13.0) {
        if !world.step().unwrap() {
            break;
        }
    }
    assert_eq!(world.stats().preemptions(), 0);
    assert_eq!(
        world.turbine_state(TurbineId(1)),
        Some(TurbineState::AwaitingRepair)
    );

    let report = world.run_until(hours(100.0)).unwrap();
    // First repair 10h..18h, second 18h..26h.
    assert_eq!(report.per_turbine[0].downtime_hours, 8.0);
    assert_eq!(report.per_turbine[1].downtime_hours, 14.0);
}
