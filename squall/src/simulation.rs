//! High-level entry point for running a configured simulation.

use std::time::Duration;

use tracing::info;

use crate::config::{duration_from_hours, SimulationConfig};
use crate::error::SimulationResult;
use crate::report::RunReport;
use crate::world::SimWorld;

/// A configured, ready-to-run simulation.
///
/// Thin wrapper over [`SimWorld`] that validates the configuration up
/// front and reduces a run to a single call:
///
/// ```
/// use squall::{Simulation, SimulationConfig};
///
/// let config = SimulationConfig::reference_fleet(10, 2, 42);
/// let report = Simulation::new(config)?.run_horizon_hours(8760.0)?;
/// assert!(report.mean_availability() > 0.0);
/// # Ok::<(), squall::SimulationError>(())
/// ```
#[derive(Debug)]
pub struct Simulation {
    world: SimWorld,
}

impl Simulation {
    /// Validates the configuration and builds the initial world.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        Ok(Self {
            world: SimWorld::new(config)?,
        })
    }

    /// Runs to the given horizon and reports.
    pub fn run(mut self, horizon: Duration) -> SimulationResult<RunReport> {
        let report = self.world.run_until(horizon)?;
        info!(
            horizon_hours = report.horizon_hours,
            events = report.events_processed,
            mean_availability = report.mean_availability(),
            "simulation finished"
        );
        Ok(report)
    }

    /// Runs to a horizon given in hours.
    pub fn run_horizon_hours(self, hours: f64) -> SimulationResult<RunReport> {
        let horizon = duration_from_hours(hours)?;
        self.run(horizon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;

    #[test]
    fn invalid_configuration_is_rejected_at_construction() {
        let config = SimulationConfig::reference_fleet(0, 1, 42);
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Configuration(_))
        ));
    }

    #[test]
    fn negative_horizon_is_rejected() {
        let config = SimulationConfig::reference_fleet(1, 1, 42);
        let sim = Simulation::new(config).unwrap();
        assert!(matches!(
            sim.run_horizon_hours(-1.0),
            Err(SimulationError::InvalidDelay { .. })
        ));
    }

    #[test]
    fn reference_fleet_produces_sensible_numbers() {
        let config = SimulationConfig::reference_fleet(10, 2, 42);
        let report = Simulation::new(config).unwrap().run_horizon_hours(8760.0).unwrap();
        assert_eq!(report.per_turbine.len(), 10);
        for turbine in &report.per_turbine {
            assert!(turbine.availability > 0.0 && turbine.availability <= 1.0);
        }
        assert!(report.fleet_utilization >= 0.0 && report.fleet_utilization <= 1.0);
    }
}
