//! The shared pool of maintenance vessels and its arbitration protocol.
//!
//! The fleet is a fixed-capacity pool with priority-preemptive semantics,
//! lower priority value meaning more important. Decisions are returned as
//! [`RequestOutcome`] values; the caller translates them into scheduled
//! events, so arbitration itself stays synchronous and side-effect free with
//! respect to the event queue.
//!
//! Invariants maintained at every instant:
//! - `0 <= in_use <= capacity`;
//! - the waiting queue is non-empty only while the pool is saturated;
//! - a preempted repair resumes with exactly its unfinished remainder, so
//!   no repair progress is ever lost.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MAX_PRIORITY;
use crate::error::{SimulationError, SimulationResult};
use crate::turbine::TurbineId;

/// Handle to an active vessel allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantId(pub(crate) u64);

/// An allocation handed to a turbine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    /// Handle for later release.
    pub id: GrantId,
    /// The turbine the vessel was allocated to.
    pub turbine: TurbineId,
    /// Unfinished repair work at the moment of allocation.
    pub remaining: Duration,
    /// Time spent waiting in the queue, `None` when this grant resumes a
    /// previously preempted repair (its wait was already observed).
    pub waited: Option<Duration>,
}

/// Outcome of a repair request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A vessel was free; the request holds it now.
    Granted(Grant),
    /// The pool is saturated and nothing could be preempted; the request
    /// waits in priority order.
    Queued,
    /// A less important active repair was suspended and its vessel handed
    /// to this request.
    Preempted {
        /// The turbine whose repair was suspended.
        preempted: TurbineId,
        /// The allocation for the new request.
        granted: Grant,
    },
}

#[derive(Debug)]
struct ActiveGrant {
    id: GrantId,
    turbine: TurbineId,
    priority: u8,
    remaining: Duration,
    started_at: Duration,
    enqueue_time: Duration,
    request_seq: u64,
}

#[derive(Debug)]
struct PendingRequest {
    turbine: TurbineId,
    priority: u8,
    enqueue_time: Duration,
    sequence: u64,
    remaining: Duration,
    resumed: bool,
}

impl PendingRequest {
    fn order_key(&self) -> (u8, Duration, u64) {
        (self.priority, self.enqueue_time, self.sequence)
    }
}

/// The capacity-bounded, priority-preemptive vessel pool.
#[derive(Debug)]
pub struct VesselFleet {
    capacity: usize,
    active: Vec<ActiveGrant>,
    waiting: Vec<PendingRequest>,
    next_grant_id: u64,
    next_sequence: u64,
    busy: Duration,
    last_update: Duration,
}

impl VesselFleet {
    /// Creates an idle fleet of the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            active: Vec::with_capacity(capacity),
            waiting: Vec::new(),
            next_grant_id: 0,
            next_sequence: 0,
            busy: Duration::ZERO,
            last_update: Duration::ZERO,
        }
    }

    /// Pool capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of vessels currently allocated.
    pub fn in_use(&self) -> usize {
        self.active.len()
    }

    /// Number of requests waiting for a vessel.
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    /// Requests granted or waiting right now.
    pub fn outstanding(&self) -> usize {
        self.active.len() + self.waiting.len()
    }

    /// Whether the grant is currently held.
    pub fn is_active(&self, grant: GrantId) -> bool {
        self.active.iter().any(|g| g.id == grant)
    }

    /// Unfinished work under an active grant.
    pub fn remaining(&self, grant: GrantId) -> Option<Duration> {
        self.active.iter().find(|g| g.id == grant).map(|g| g.remaining)
    }

    /// Vessel-busy time integrated up to the last bookkeeping instant.
    pub fn busy_time(&self) -> Duration {
        self.busy
    }

    /// Integrates occupancy up to `now`. Called before every mutation and
    /// once more when the run ends.
    pub fn settle(&mut self, now: Duration) {
        if now > self.last_update {
            self.busy += (now - self.last_update) * self.active.len() as u32;
            self.last_update = now;
        }
    }

    /// A failed turbine asks for a vessel.
    ///
    /// Grants immediately when a vessel is free; otherwise preempts the
    /// least important active repair if it is strictly less important than
    /// this request; otherwise queues in `(priority, enqueue time)` order.
    pub fn request(
        &mut self,
        turbine: TurbineId,
        priority: u8,
        work: Duration,
        now: Duration,
    ) -> SimulationResult<RequestOutcome> {
        if priority == 0 || priority > MAX_PRIORITY {
            return Err(SimulationError::InvalidPriority {
                priority,
                max: MAX_PRIORITY,
            });
        }
        self.settle(now);

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        if self.active.len() < self.capacity {
            let grant = self.activate(turbine, priority, work, now, now, sequence, Some(Duration::ZERO));
            debug!(?turbine, priority, "vessel granted immediately");
            return Ok(RequestOutcome::Granted(grant));
        }

        // Saturated. The preemption victim is the least important active
        // repair, most recently started among equals; equal priority never
        // preempts.
        let victim_idx = self
            .active
            .iter()
            .enumerate()
            .max_by_key(|(_, g)| (g.priority, g.started_at, g.id.0))
            .map(|(idx, _)| idx);

        if let Some(idx) = victim_idx {
            if self.active[idx].priority > priority {
                let victim = self.active.swap_remove(idx);
                let elapsed = now - victim.started_at;
                let unfinished = victim.remaining.saturating_sub(elapsed);
                debug!(
                    preempted = ?victim.turbine,
                    by = ?turbine,
                    remaining_secs = unfinished.as_secs_f64(),
                    "active repair preempted"
                );
                self.insert_waiting(PendingRequest {
                    turbine: victim.turbine,
                    priority: victim.priority,
                    enqueue_time: victim.enqueue_time,
                    sequence: victim.request_seq,
                    remaining: unfinished,
                    resumed: true,
                });
                let granted =
                    self.activate(turbine, priority, work, now, now, sequence, Some(Duration::ZERO));
                return Ok(RequestOutcome::Preempted {
                    preempted: victim.turbine,
                    granted,
                });
            }
        }

        debug!(?turbine, priority, queued = self.waiting.len() + 1, "request queued");
        self.insert_waiting(PendingRequest {
            turbine,
            priority,
            enqueue_time: now,
            sequence,
            remaining: work,
            resumed: false,
        });
        Ok(RequestOutcome::Queued)
    }

    /// Releases a held grant, handing the vessel to the head of the queue.
    ///
    /// Returns the follow-up allocation, if any, for the caller to schedule
    /// as a grant event at the current instant.
    pub fn release(&mut self, grant: GrantId, now: Duration) -> SimulationResult<Option<Grant>> {
        self.settle(now);
        let idx = self
            .active
            .iter()
            .position(|g| g.id == grant)
            .ok_or(SimulationError::DoubleRelease { grant })?;
        self.active.swap_remove(idx);

        if self.waiting.is_empty() {
            return Ok(None);
        }
        let head = self.waiting.remove(0);
        let waited = if head.resumed {
            None
        } else {
            Some(now - head.enqueue_time)
        };
        let next = self.activate(
            head.turbine,
            head.priority,
            head.remaining,
            now,
            head.enqueue_time,
            head.sequence,
            waited,
        );
        debug!(?next.turbine, "queued request granted on release");
        Ok(Some(next))
    }

    #[allow(clippy::too_many_arguments)]
    fn activate(
        &mut self,
        turbine: TurbineId,
        priority: u8,
        remaining: Duration,
        now: Duration,
        enqueue_time: Duration,
        request_seq: u64,
        waited: Option<Duration>,
    ) -> Grant {
        let id = GrantId(self.next_grant_id);
        self.next_grant_id += 1;
        self.active.push(ActiveGrant {
            id,
            turbine,
            priority,
            remaining,
            started_at: now,
            enqueue_time,
            request_seq,
        });
        Grant {
            id,
            turbine,
            remaining,
            waited,
        }
    }

    fn insert_waiting(&mut self, request: PendingRequest) {
        let key = request.order_key();
        let pos = self.waiting.partition_point(|r| r.order_key() <= key);
        self.waiting.insert(pos, request);
    }
}
