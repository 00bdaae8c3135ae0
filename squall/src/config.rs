//! Configuration for a simulation run.
//!
//! Failure kinds are immutable reference data shared by every turbine;
//! per-run knobs (fleet size, priority scheme, repair sampling, seed) live
//! on [`SimulationConfig`]. All durations are expressed in hours, the unit
//! the underlying reliability data is published in.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};

/// Highest (least important) priority value a request may carry.
pub const MAX_PRIORITY: u8 = 9;

const SECS_PER_HOUR: f64 = 3600.0;

/// Converts a non-negative, finite hour count into simulation time.
///
/// Fails with [`SimulationError::InvalidDelay`] for negative or non-finite
/// values rather than clamping, so defects surface at the seam they were
/// introduced.
pub fn duration_from_hours(hours: f64) -> SimulationResult<Duration> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(SimulationError::InvalidDelay { delay_hours: hours });
    }
    Ok(Duration::from_secs_f64(hours * SECS_PER_HOUR))
}

/// A category of turbine failure.
///
/// Mean time between failures parameterizes the exponential inter-arrival
/// distribution; `repair_hours` is the mean length of the corresponding
/// repair. `priority` is only consulted under
/// [`PriorityScheme::BySeverity`], lower value meaning more important.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureKind {
    /// Human-readable name, used in reports.
    pub name: String,
    /// Mean time between failures, in hours.
    pub mtbf_hours: f64,
    /// Mean repair length, in hours.
    pub repair_hours: f64,
    /// Request priority under the severity-weighted scheme (1 = most urgent).
    pub priority: u8,
}

impl FailureKind {
    /// Creates a failure kind with the default (most urgent) priority.
    pub fn new(name: impl Into<String>, mtbf_hours: f64, repair_hours: f64) -> Self {
        Self {
            name: name.into(),
            mtbf_hours,
            repair_hours,
            priority: 1,
        }
    }

    /// Sets the severity priority for this kind.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// How repair durations are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepairSampling {
    /// Every repair takes exactly the kind's mean repair length.
    #[default]
    Fixed,
    /// Repair lengths are drawn from an exponential distribution with the
    /// kind's mean repair length.
    Exponential,
}

/// How request priorities are assigned to failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PriorityScheme {
    /// All corrective repairs compete at equal priority, first come first
    /// served.
    #[default]
    Flat,
    /// Each failure kind's configured priority is used, so severe failures
    /// can preempt minor ones.
    BySeverity,
}

/// Full configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of turbines in the farm.
    pub turbines: u32,
    /// Number of maintenance vessels in the shared pool.
    pub vessels: usize,
    /// Failure categories shared by all turbines.
    pub failure_kinds: Vec<FailureKind>,
    /// Priority assignment for repair requests.
    pub priority_scheme: PriorityScheme,
    /// Repair duration sampling.
    pub repair_sampling: RepairSampling,
    /// Seed for all random streams of the run.
    pub seed: u64,
}

impl SimulationConfig {
    /// Creates a configuration with the given fleet sizes and failure kinds,
    /// flat priorities, fixed repairs.
    pub fn new(turbines: u32, vessels: usize, failure_kinds: Vec<FailureKind>, seed: u64) -> Self {
        Self {
            turbines,
            vessels,
            failure_kinds,
            priority_scheme: PriorityScheme::default(),
            repair_sampling: RepairSampling::default(),
            seed,
        }
    }

    /// The reference failure table for an offshore wind farm.
    ///
    /// MTBF and repair lengths (hours) for the four corrective failure
    /// classes: manual reset, minor repair, major repair, major replacement.
    pub fn reference_fleet(turbines: u32, vessels: usize, seed: u64) -> Self {
        Self::new(
            turbines,
            vessels,
            vec![
                FailureKind::new("Manual reset", 1272.0, 3.0).with_priority(4),
                FailureKind::new("Minor repair", 2120.0, 7.5).with_priority(3),
                FailureKind::new("Major repair", 21_200.0, 22.0).with_priority(2),
                FailureKind::new("Major replacement", 57_818.2, 34.0).with_priority(1),
            ],
            seed,
        )
    }

    /// Validates the configuration.
    ///
    /// All violations are fatal at construction and never recovered.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.turbines == 0 {
            return Err(SimulationError::Configuration(
                "turbine count must be positive".to_string(),
            ));
        }
        if self.vessels == 0 {
            return Err(SimulationError::Configuration(
                "vessel capacity must be positive".to_string(),
            ));
        }
        if self.failure_kinds.is_empty() {
            return Err(SimulationError::Configuration(
                "at least one failure kind is required".to_string(),
            ));
        }
        for kind in &self.failure_kinds {
            if !kind.mtbf_hours.is_finite() || kind.mtbf_hours <= 0.0 {
                return Err(SimulationError::Configuration(format!(
                    "failure kind '{}' has non-positive mtbf {}",
                    kind.name, kind.mtbf_hours
                )));
            }
            if !kind.repair_hours.is_finite() || kind.repair_hours < 0.0 {
                return Err(SimulationError::Configuration(format!(
                    "failure kind '{}' has invalid repair length {}",
                    kind.name, kind.repair_hours
                )));
            }
            if kind.priority == 0 || kind.priority > MAX_PRIORITY {
                return Err(SimulationError::Configuration(format!(
                    "failure kind '{}' has priority {} outside 1..={}",
                    kind.name, kind.priority, MAX_PRIORITY
                )));
            }
        }
        Ok(())
    }

    /// The request priority for a failure of the given kind index.
    pub(crate) fn priority_of(&self, kind_index: usize) -> u8 {
        match self.priority_scheme {
            PriorityScheme::Flat => 1,
            PriorityScheme::BySeverity => self.failure_kinds[kind_index].priority,
        }
    }
}
