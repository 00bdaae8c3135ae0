//! Passive observation of simulation state transitions and resource events.
//!
//! The collector never mutates simulation state; it keeps independent
//! running totals (notably its own per-turbine failure tally, separate from
//! the entities' bookkeeping) and is read once when the run ends.

use std::time::Duration;

use tracing::trace;

use crate::turbine::{TurbineId, TurbineState};

/// Resource-side events observed at the fleet boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    /// A repair request entered the fleet.
    Requested,
    /// A vessel was allocated; `waited` is the request's time in the queue.
    Granted {
        /// Queue wait of the granted request.
        waited: Duration,
    },
    /// An active repair was suspended by a more important request.
    Preempted,
    /// A vessel returned to the pool.
    Released,
}

/// Append-only accumulator of per-turbine and fleet-wide totals.
#[derive(Debug)]
pub struct StatsCollector {
    failures: Vec<u64>,
    queue_waits: Vec<Duration>,
    requests: u64,
    grants: u64,
    preemptions: u64,
    releases: u64,
}

impl StatsCollector {
    /// Creates a collector for the given number of turbines.
    pub fn new(turbines: usize) -> Self {
        Self {
            failures: vec![0; turbines],
            queue_waits: Vec::new(),
            requests: 0,
            grants: 0,
            preemptions: 0,
            releases: 0,
        }
    }

    /// Observes a turbine state transition.
    pub fn on_state_change(
        &mut self,
        turbine: TurbineId,
        old_state: TurbineState,
        new_state: TurbineState,
        time: Duration,
    ) {
        trace!(?turbine, ?old_state, ?new_state, at_secs = time.as_secs_f64(), "state change");
        if new_state == TurbineState::AwaitingRepair && old_state == TurbineState::Operating {
            if let Some(count) = self.failures.get_mut(turbine.0 as usize) {
                *count += 1;
            }
        }
    }

    /// Observes a resource event at the fleet boundary.
    pub fn on_resource_event(&mut self, event: ResourceEvent, time: Duration) {
        trace!(?event, at_secs = time.as_secs_f64(), "resource event");
        match event {
            ResourceEvent::Requested => self.requests += 1,
            ResourceEvent::Granted { waited } => {
                self.grants += 1;
                self.queue_waits.push(waited);
            }
            ResourceEvent::Preempted => self.preemptions += 1,
            ResourceEvent::Released => self.releases += 1,
        }
    }

    /// Failures observed for one turbine.
    pub fn failures_of(&self, turbine: TurbineId) -> u64 {
        self.failures.get(turbine.0 as usize).copied().unwrap_or(0)
    }

    /// Number of repair requests observed.
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Number of vessel allocations observed.
    pub fn grants(&self) -> u64 {
        self.grants
    }

    /// Number of preemptions observed.
    pub fn preemptions(&self) -> u64 {
        self.preemptions
    }

    /// Number of releases observed.
    pub fn releases(&self) -> u64 {
        self.releases
    }

    /// Queue-wait samples, one per granted request.
    pub fn queue_waits(&self) -> &[Duration] {
        &self.queue_waits
    }
}
