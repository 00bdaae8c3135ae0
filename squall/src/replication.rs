//! Independent replications of one scenario under varying seeds.
//!
//! A single run is one sample of a stochastic process. Replications rerun
//! the same configuration under per-run seeds, giving a spread of outcomes
//! for the same scenario while every individual run stays reproducible.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::report::RunReport;
use crate::simulation::Simulation;

/// Seed for replication `index` of a run seeded with `base`.
///
/// SplitMix64 over `base + index`, so neighbouring replications get
/// unrelated streams.
pub fn replication_seed(base: u64, index: u32) -> u64 {
    let mut z = base.wrapping_add(u64::from(index).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Runs a scenario several times, once per seed.
#[derive(Debug, Clone)]
pub struct ReplicationRunner {
    config: SimulationConfig,
    seeds: Vec<u64>,
}

impl ReplicationRunner {
    /// A runner for `replications` runs under seeds derived from the
    /// configuration's base seed.
    pub fn new(config: SimulationConfig, replications: u32) -> SimulationResult<Self> {
        let seeds = (0..replications)
            .map(|index| replication_seed(config.seed, index))
            .collect();
        Self::with_seeds(config, seeds)
    }

    /// A runner over an explicit seed list, one replication per entry.
    pub fn with_seeds(config: SimulationConfig, seeds: Vec<u64>) -> SimulationResult<Self> {
        config.validate()?;
        if seeds.is_empty() {
            return Err(SimulationError::Configuration(
                "replication needs at least one seed".to_string(),
            ));
        }
        Ok(Self { config, seeds })
    }

    /// Runs every replication to the same horizon.
    pub fn run_horizon_hours(&self, hours: f64) -> SimulationResult<ReplicationReport> {
        let mut runs = Vec::with_capacity(self.seeds.len());
        for (index, &seed) in self.seeds.iter().enumerate() {
            let mut config = self.config.clone();
            config.seed = seed;
            info!(index, seed, "starting replication");
            runs.push(Simulation::new(config)?.run_horizon_hours(hours)?);
        }
        Ok(ReplicationReport::from_runs(self.config.seed, runs))
    }
}

/// Aggregate over a batch of replications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationReport {
    /// Base seed of the scenario the replications were derived from.
    pub base_seed: u64,
    /// The individual runs, in replication order.
    pub runs: Vec<RunReport>,
    /// Mean of the per-run mean availabilities.
    pub mean_availability: f64,
    /// Sample standard deviation of the per-run mean availabilities.
    pub availability_stddev: f64,
    /// Mean of the per-run fleet utilizations.
    pub mean_utilization: f64,
    /// Mean of the per-run total failure counts.
    pub mean_failures: f64,
}

impl ReplicationReport {
    fn from_runs(base_seed: u64, runs: Vec<RunReport>) -> Self {
        let n = runs.len() as f64;
        let samples: Vec<f64> = runs.iter().map(RunReport::mean_availability).collect();
        let mean = samples.iter().sum::<f64>() / n;
        let stddev = if samples.len() > 1 {
            let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt()
        } else {
            0.0
        };
        let mean_utilization = runs.iter().map(|r| r.fleet_utilization).sum::<f64>() / n;
        let mean_failures = runs.iter().map(|r| r.total_failures() as f64).sum::<f64>() / n;
        Self {
            base_seed,
            runs,
            mean_availability: mean,
            availability_stddev: stddev,
            mean_utilization,
            mean_failures,
        }
    }
}

impl fmt::Display for ReplicationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Replication Report ===")?;
        writeln!(f, "Base Seed: {}", self.base_seed)?;
        writeln!(f, "Replications: {}", self.runs.len())?;
        writeln!(
            f,
            "Mean Availability: {:.4} (stddev {:.4})",
            self.mean_availability, self.availability_stddev
        )?;
        writeln!(f, "Mean Fleet Utilization: {:.4}", self.mean_utilization)?;
        writeln!(f, "Mean Failures per Run: {:.1}", self.mean_failures)?;
        Ok(())
    }
}
