//! # Squall
//!
//! A deterministic discrete-event simulation of offshore wind farm
//! operations and maintenance.
//!
//! Turbines fail under seeded stochastic timelines, compete for a shared
//! pool of maintenance vessels with priority-preemptive arbitration, and
//! report availability, downtime, and queueing statistics at the end of
//! the run:
//! - Event queue with strict `(time, sequence)` ordering, so equal-time
//!   events dispatch in scheduling order and every run is reproducible
//! - Explicit per-turbine state machines driven entirely by events
//! - Per-`(turbine, kind)` random streams, so one turbine's failure
//!   instants never depend on vessel contention elsewhere in the farm
//! - Replication support for running the same scenario under derived seeds
//!
//! [`Simulation`] is the entry point for a single run and
//! [`ReplicationRunner`] for a batch.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

/// Scenario configuration: fleet shape, failure kinds, sampling policy.
pub mod config;
/// Error types for simulation operations.
pub mod error;
/// Event scheduling and ordering for the simulation engine.
pub mod events;
/// The shared vessel pool and its priority-preemptive arbitration.
pub mod fleet;
/// Seeded random streams for interarrival sampling.
pub mod random;
/// Batches of independent replications under derived seeds.
pub mod replication;
/// End-of-run reports and aggregates.
pub mod report;
/// High-level simulation entry point.
pub mod simulation;
/// Statistics collection at the state-machine and fleet boundaries.
pub mod stats;
/// Pre-planned per-turbine failure timelines.
pub mod timeline;
/// The turbine state machine and its time accounting.
pub mod turbine;
/// Core simulation world and event dispatch.
pub mod world;

pub use config::{
    duration_from_hours, FailureKind, PriorityScheme, RepairSampling, SimulationConfig,
    MAX_PRIORITY,
};
pub use error::{SimulationError, SimulationResult};
pub use events::{Event, EventQueue, ScheduledEvent};
pub use fleet::{Grant, GrantId, RequestOutcome, VesselFleet};
pub use random::ExponentialInterarrival;
pub use replication::{replication_seed, ReplicationReport, ReplicationRunner};
pub use report::{QueueWaitStats, RunReport, TurbineReport};
pub use simulation::Simulation;
pub use stats::{ResourceEvent, StatsCollector};
pub use timeline::{FailureTimeline, PlannedFailure};
pub use turbine::{Turbine, TurbineId, TurbineState};
pub use world::SimWorld;
