//! End-of-run reports.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::turbine::{TurbineId, TurbineState};

/// Per-turbine results of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbineReport {
    /// The turbine these numbers describe.
    pub id: TurbineId,
    /// Fraction of the horizon spent operating.
    pub availability: f64,
    /// Total time spent failed, in hours.
    pub downtime_hours: f64,
    /// Number of failures experienced.
    pub failure_count: u64,
    /// State the turbine ended the run in.
    pub final_state: TurbineState,
}

/// Queue-wait distribution over all granted requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueWaitStats {
    /// Number of grants the distribution is over.
    pub grants: u64,
    /// Mean wait, in hours.
    pub mean_hours: f64,
    /// Median wait, in hours.
    pub p50_hours: f64,
    /// 95th percentile wait, in hours.
    pub p95_hours: f64,
}

impl QueueWaitStats {
    /// Derives the distribution from raw wait samples (nearest-rank
    /// percentiles).
    pub(crate) fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self {
                grants: 0,
                mean_hours: 0.0,
                p50_hours: 0.0,
                p95_hours: 0.0,
            };
        }
        let mut sorted: Vec<Duration> = samples.to_vec();
        sorted.sort();
        let hours = |d: Duration| d.as_secs_f64() / 3600.0;
        let rank = |q: f64| {
            let idx = (q * sorted.len() as f64).ceil() as usize;
            sorted[idx.clamp(1, sorted.len()) - 1]
        };
        let total: Duration = sorted.iter().sum();
        Self {
            grants: sorted.len() as u64,
            mean_hours: hours(total) / sorted.len() as f64,
            p50_hours: hours(rank(0.50)),
            p95_hours: hours(rank(0.95)),
        }
    }
}

/// Results of a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Seed the run was executed with.
    pub seed: u64,
    /// Simulated horizon, in hours.
    pub horizon_hours: f64,
    /// Number of events dispatched.
    pub events_processed: u64,
    /// Per-turbine availability and failure counts.
    pub per_turbine: Vec<TurbineReport>,
    /// Fraction of horizon-capacity the vessel pool spent busy.
    pub fleet_utilization: f64,
    /// Queue-wait distribution over all granted requests.
    pub queue_wait: QueueWaitStats,
}

impl RunReport {
    /// Mean availability across the farm.
    pub fn mean_availability(&self) -> f64 {
        if self.per_turbine.is_empty() {
            return 0.0;
        }
        self.per_turbine.iter().map(|t| t.availability).sum::<f64>()
            / self.per_turbine.len() as f64
    }

    /// Total failures across the farm.
    pub fn total_failures(&self) -> u64 {
        self.per_turbine.iter().map(|t| t.failure_count).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Run Report ===")?;
        writeln!(f, "Seed: {}", self.seed)?;
        writeln!(f, "Horizon: {:.1} h", self.horizon_hours)?;
        writeln!(f, "Events Processed: {}", self.events_processed)?;
        writeln!(f, "Mean Availability: {:.4}", self.mean_availability())?;
        writeln!(f, "Total Failures: {}", self.total_failures())?;
        writeln!(f, "Fleet Utilization: {:.4}", self.fleet_utilization)?;
        writeln!(
            f,
            "Queue Wait: mean {:.2} h, p50 {:.2} h, p95 {:.2} h over {} grants",
            self.queue_wait.mean_hours,
            self.queue_wait.p50_hours,
            self.queue_wait.p95_hours,
            self.queue_wait.grants
        )?;
        Ok(())
    }
}
