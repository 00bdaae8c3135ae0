//! Turbine entities and their repair lifecycle state machine.
//!
//! A turbine produces power while operating and stops when a planned failure
//! instant is reached. Suspension points of the original coroutine model are
//! expressed as explicit states: the scheduler dispatches `FailureDue`,
//! `RepairGranted` and `RepairComplete` events at the turbine, and each
//! dispatch performs exactly one transition of the cycle
//! `Operating -> AwaitingRepair -> UnderRepair -> Operating`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};
use crate::timeline::FailureTimeline;

/// Identifier of a turbine within the farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TurbineId(pub u32);

/// Lifecycle state of a turbine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurbineState {
    /// Producing power, waiting for its next planned failure.
    Operating,
    /// Failed, waiting for a vessel grant.
    AwaitingRepair,
    /// A vessel is on site, repair in progress.
    UnderRepair,
}

/// The failure a turbine is currently down with.
#[derive(Debug, Clone, Copy)]
pub struct ActiveFailure {
    /// Index into the configured failure kinds.
    pub kind: usize,
    /// When the failure occurred.
    pub failed_at: Duration,
}

/// A simulated repairable turbine.
#[derive(Debug)]
pub struct Turbine {
    id: TurbineId,
    state: TurbineState,
    timeline: FailureTimeline,
    operating_since: Option<Duration>,
    cumulative_uptime: Duration,
    cumulative_downtime: Duration,
    failure_count: u64,
    active_failure: Option<ActiveFailure>,
}

impl Turbine {
    /// Creates a turbine in the `Operating` state at time zero.
    pub fn new(id: TurbineId, timeline: FailureTimeline) -> Self {
        Self {
            id,
            state: TurbineState::Operating,
            timeline,
            operating_since: Some(Duration::ZERO),
            cumulative_uptime: Duration::ZERO,
            cumulative_downtime: Duration::ZERO,
            failure_count: 0,
            active_failure: None,
        }
    }

    /// This turbine's identifier.
    pub fn id(&self) -> TurbineId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TurbineState {
        self.state
    }

    /// Total time spent operating so far.
    pub fn cumulative_uptime(&self) -> Duration {
        self.cumulative_uptime
    }

    /// Total time spent failed (waiting or under repair) so far.
    pub fn cumulative_downtime(&self) -> Duration {
        self.cumulative_downtime
    }

    /// Number of failures experienced so far.
    pub fn failure_count(&self) -> u64 {
        self.failure_count
    }

    /// The failure currently keeping this turbine down, if any.
    pub fn active_failure(&self) -> Option<ActiveFailure> {
        self.active_failure
    }

    /// Pops the next planned failure strictly after `now`.
    pub fn plan_next_failure(&mut self, now: Duration) -> Option<crate::timeline::PlannedFailure> {
        self.timeline.next_after(now)
    }

    /// `Operating -> AwaitingRepair`: a planned failure instant was reached.
    ///
    /// Credits the elapsed operating interval and tallies the failure.
    pub fn fail(&mut self, kind: usize, now: Duration) -> SimulationResult<()> {
        let since = match (self.state, self.operating_since) {
            (TurbineState::Operating, Some(since)) => since,
            _ => {
                return Err(SimulationError::InvalidState(format!(
                    "turbine {:?} failed while {:?}",
                    self.id, self.state
                )))
            }
        };
        self.cumulative_uptime += now - since;
        self.operating_since = None;
        self.failure_count += 1;
        self.state = TurbineState::AwaitingRepair;
        self.active_failure = Some(ActiveFailure {
            kind,
            failed_at: now,
        });
        Ok(())
    }

    /// `AwaitingRepair -> UnderRepair`: a vessel grant arrived.
    pub fn begin_repair(&mut self) -> SimulationResult<()> {
        if self.state != TurbineState::AwaitingRepair {
            return Err(SimulationError::InvalidState(format!(
                "turbine {:?} granted a vessel while {:?}",
                self.id, self.state
            )));
        }
        self.state = TurbineState::UnderRepair;
        Ok(())
    }

    /// `UnderRepair -> AwaitingRepair`: the vessel was preempted away.
    pub fn suspend_repair(&mut self) -> SimulationResult<()> {
        if self.state != TurbineState::UnderRepair {
            return Err(SimulationError::InvalidState(format!(
                "turbine {:?} preempted while {:?}",
                self.id, self.state
            )));
        }
        self.state = TurbineState::AwaitingRepair;
        Ok(())
    }

    /// `UnderRepair -> Operating`: repair ran to completion.
    ///
    /// Credits the whole failed interval as downtime and restarts the
    /// operating clock.
    pub fn complete_repair(&mut self, now: Duration) -> SimulationResult<()> {
        let failure = match (self.state, self.active_failure) {
            (TurbineState::UnderRepair, Some(failure)) => failure,
            _ => {
                return Err(SimulationError::InvalidState(format!(
                    "turbine {:?} completed a repair while {:?}",
                    self.id, self.state
                )))
            }
        };
        self.cumulative_downtime += now - failure.failed_at;
        self.active_failure = None;
        self.state = TurbineState::Operating;
        self.operating_since = Some(now);
        Ok(())
    }

    /// Accounts for the partial final interval when the run ends at `horizon`.
    pub fn finalize(&mut self, horizon: Duration) {
        match (self.state, self.operating_since, self.active_failure) {
            (TurbineState::Operating, Some(since), _) => {
                self.cumulative_uptime += horizon - since;
                self.operating_since = Some(horizon);
            }
            (_, _, Some(failure)) => {
                self.cumulative_downtime += horizon - failure.failed_at;
                self.active_failure = Some(ActiveFailure {
                    failed_at: horizon,
                    ..failure
                });
            }
            _ => {}
        }
    }
}
