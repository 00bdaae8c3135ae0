//! The simulation world: clock, event queue, and dispatch loop.
//!
//! `SimWorld` owns every piece of mutable simulation state. Time only moves
//! inside [`SimWorld::step`], which pops the earliest scheduled event,
//! advances the clock to its timestamp, and dispatches it against the
//! turbine state machines and the vessel fleet. Handlers never mutate state
//! directly across entities; they schedule follow-up events instead, so the
//! `(time, sequence)` order of the queue is the single source of causality.

use std::time::Duration;

use tracing::{debug, trace};

use crate::config::{duration_from_hours, RepairSampling, SimulationConfig};
use crate::error::{SimulationError, SimulationResult};
use crate::events::{Event, EventQueue, ScheduledEvent};
use crate::fleet::{Grant, GrantId, RequestOutcome, VesselFleet};
use crate::random::ExponentialInterarrival;
use crate::report::{QueueWaitStats, RunReport, TurbineReport};
use crate::stats::{ResourceEvent, StatsCollector};
use crate::timeline::{FailureTimeline, PlannedFailure};
use crate::turbine::{Turbine, TurbineId, TurbineState};

/// Per-`(turbine, kind)` source of repair durations.
#[derive(Debug)]
enum RepairDraw {
    Fixed(Duration),
    Sampled(ExponentialInterarrival),
}

impl RepairDraw {
    fn draw(&mut self) -> SimulationResult<Duration> {
        match self {
            RepairDraw::Fixed(duration) => Ok(*duration),
            RepairDraw::Sampled(sampler) => duration_from_hours(sampler.next_interval()),
        }
    }
}

/// Central simulation state and dispatch loop.
#[derive(Debug)]
pub struct SimWorld {
    config: SimulationConfig,
    current_time: Duration,
    queue: EventQueue,
    next_sequence: u64,
    turbines: Vec<Turbine>,
    fleet: VesselFleet,
    stats: StatsCollector,
    /// Failure instant each turbine is currently scheduled for, consumed
    /// when the corresponding `FailureDue` dispatches.
    planned: Vec<Option<PlannedFailure>>,
    repair_draws: Vec<Vec<RepairDraw>>,
    events_processed: u64,
}

impl SimWorld {
    /// Builds a world from the configuration, with every turbine operating
    /// and its first failure already on the queue.
    ///
    /// Each `(turbine, kind)` pair draws from its own random stream, so the
    /// planned failure instants and repair lengths of one turbine are
    /// unaffected by how contended the vessel pool turns out to be.
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        let kinds = config.failure_kinds.len() as u64;
        let mut timelines = Vec::with_capacity(config.turbines as usize);
        for t in 0..config.turbines {
            let base_stream = t as u64 * 2 * kinds;
            timelines.push(FailureTimeline::sampled(
                &config.failure_kinds,
                config.seed,
                base_stream,
            )?);
        }
        Self::with_timelines(config, timelines)
    }

    /// Builds a world driven by caller-provided timelines, one per turbine.
    ///
    /// Scripted timelines make scenario tests deterministic down to the
    /// exact failure instant.
    pub fn with_timelines(
        config: SimulationConfig,
        timelines: Vec<FailureTimeline>,
    ) -> SimulationResult<Self> {
        config.validate()?;
        if timelines.len() != config.turbines as usize {
            return Err(SimulationError::Configuration(format!(
                "{} timelines provided for {} turbines",
                timelines.len(),
                config.turbines
            )));
        }

        let kinds = config.failure_kinds.len() as u64;
        let mut repair_draws = Vec::with_capacity(config.turbines as usize);
        for t in 0..config.turbines {
            let base_stream = t as u64 * 2 * kinds;
            let mut per_kind = Vec::with_capacity(config.failure_kinds.len());
            for (k, kind) in config.failure_kinds.iter().enumerate() {
                let draw = match config.repair_sampling {
                    RepairSampling::Fixed => {
                        RepairDraw::Fixed(duration_from_hours(kind.repair_hours)?)
                    }
                    RepairSampling::Exponential if kind.repair_hours == 0.0 => {
                        RepairDraw::Fixed(Duration::ZERO)
                    }
                    RepairSampling::Exponential => RepairDraw::Sampled(
                        ExponentialInterarrival::new(
                            config.seed,
                            base_stream + kinds + k as u64,
                            kind.repair_hours,
                        )?,
                    ),
                };
                per_kind.push(draw);
            }
            repair_draws.push(per_kind);
        }

        let turbine_count = config.turbines as usize;
        let mut world = Self {
            fleet: VesselFleet::new(config.vessels),
            stats: StatsCollector::new(turbine_count),
            config,
            current_time: Duration::ZERO,
            queue: EventQueue::new(),
            next_sequence: 0,
            turbines: timelines
                .into_iter()
                .enumerate()
                .map(|(t, timeline)| Turbine::new(TurbineId(t as u32), timeline))
                .collect(),
            planned: (0..turbine_count).map(|_| None).collect(),
            repair_draws,
            events_processed: 0,
        };

        for t in 0..turbine_count {
            world.plan_failure(t, Duration::ZERO);
        }
        Ok(world)
    }

    /// Current simulation time.
    pub fn now(&self) -> Duration {
        self.current_time
    }

    /// Number of events dispatched so far.
    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    /// Events still waiting on the queue.
    pub fn pending_event_count(&self) -> usize {
        self.queue.len()
    }

    /// Time of the earliest scheduled event, if any.
    pub fn next_event_time(&self) -> Option<Duration> {
        self.queue.peek_earliest().map(ScheduledEvent::time)
    }

    /// Current state of a turbine.
    pub fn turbine_state(&self, turbine: TurbineId) -> Option<TurbineState> {
        self.turbines.get(turbine.0 as usize).map(|t| t.state())
    }

    /// Vessels allocated right now.
    pub fn vessels_in_use(&self) -> usize {
        self.fleet.in_use()
    }

    /// Repair requests waiting for a vessel.
    pub fn repair_queue_len(&self) -> usize {
        self.fleet.queue_len()
    }

    /// Repair requests granted or waiting.
    pub fn outstanding_requests(&self) -> usize {
        self.fleet.outstanding()
    }

    /// Statistics collected so far.
    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    fn schedule_at(&mut self, time: Duration, event: Event) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        trace!(at_secs = time.as_secs_f64(), ?event, sequence, "scheduling event");
        self.queue.schedule(ScheduledEvent::new(time, event, sequence));
    }

    fn schedule_now(&mut self, event: Event) {
        self.schedule_at(self.current_time, event);
    }

    /// Draws the next failure for turbine `t` and puts it on the queue.
    fn plan_failure(&mut self, t: usize, now: Duration) {
        if let Some(planned) = self.turbines[t].plan_next_failure(now) {
            let turbine = self.turbines[t].id();
            self.schedule_at(planned.at, Event::FailureDue { turbine });
            self.planned[t] = Some(planned);
        }
    }

    /// Pops and dispatches the earliest event. Returns `false` once the
    /// queue is empty.
    pub fn step(&mut self) -> SimulationResult<bool> {
        let Some(scheduled) = self.queue.pop_earliest() else {
            return Ok(false);
        };
        debug_assert!(scheduled.time() >= self.current_time);
        self.current_time = scheduled.time();
        let event = scheduled.into_event();
        self.dispatch(event)?;
        self.events_processed += 1;
        Ok(true)
    }

    fn dispatch(&mut self, event: Event) -> SimulationResult<()> {
        match event {
            Event::FailureDue { turbine } => self.on_failure_due(turbine),
            Event::RepairGranted { turbine, grant } => self.on_repair_granted(turbine, grant),
            Event::RepairComplete { turbine, grant } => self.on_repair_complete(turbine, grant),
        }
    }

    fn turbine_mut(&mut self, turbine: TurbineId) -> SimulationResult<&mut Turbine> {
        self.turbines
            .get_mut(turbine.0 as usize)
            .ok_or_else(|| SimulationError::InvalidState(format!("unknown turbine {turbine:?}")))
    }

    fn on_failure_due(&mut self, turbine: TurbineId) -> SimulationResult<()> {
        let now = self.current_time;
        let t = turbine.0 as usize;
        let planned = self.planned.get_mut(t).and_then(Option::take).ok_or_else(|| {
            SimulationError::InvalidState(format!("failure due with nothing planned for {turbine:?}"))
        })?;

        self.turbine_mut(turbine)?.fail(planned.kind, now)?;
        self.stats.on_state_change(
            turbine,
            TurbineState::Operating,
            TurbineState::AwaitingRepair,
            now,
        );
        debug!(?turbine, kind = planned.kind, at_secs = now.as_secs_f64(), "turbine failed");

        let priority = self.config.priority_of(planned.kind);
        let work = self.repair_draws[t][planned.kind].draw()?;
        self.stats.on_resource_event(ResourceEvent::Requested, now);
        match self.fleet.request(turbine, priority, work, now)? {
            RequestOutcome::Granted(grant) => self.accept_grant(grant),
            RequestOutcome::Queued => Ok(()),
            RequestOutcome::Preempted { preempted, granted } => {
                self.stats.on_resource_event(ResourceEvent::Preempted, now);
                // The victim may still be awaiting its grant event at this
                // same instant; only an in-progress repair gets suspended.
                let victim = self.turbine_mut(preempted)?;
                if victim.state() == TurbineState::UnderRepair {
                    victim.suspend_repair()?;
                    self.stats.on_state_change(
                        preempted,
                        TurbineState::UnderRepair,
                        TurbineState::AwaitingRepair,
                        now,
                    );
                }
                self.accept_grant(granted)
            }
        }
    }

    /// Records a fresh allocation and schedules its grant event at the
    /// current instant.
    fn accept_grant(&mut self, grant: Grant) -> SimulationResult<()> {
        if let Some(waited) = grant.waited {
            self.stats
                .on_resource_event(ResourceEvent::Granted { waited }, self.current_time);
        }
        self.schedule_now(Event::RepairGranted {
            turbine: grant.turbine,
            grant: grant.id,
        });
        Ok(())
    }

    fn on_repair_granted(&mut self, turbine: TurbineId, grant: GrantId) -> SimulationResult<()> {
        // The grant may have been revoked by a preemption scheduled at the
        // same instant; a stale grant event is simply dropped.
        if !self.fleet.is_active(grant) {
            trace!(?turbine, ?grant, "dropping stale grant event");
            return Ok(());
        }
        let now = self.current_time;
        self.turbine_mut(turbine)?.begin_repair()?;
        self.stats.on_state_change(
            turbine,
            TurbineState::AwaitingRepair,
            TurbineState::UnderRepair,
            now,
        );
        let remaining = self.fleet.remaining(grant).ok_or_else(|| {
            SimulationError::InvalidState(format!("active grant {grant:?} without remaining work"))
        })?;
        debug!(?turbine, remaining_secs = remaining.as_secs_f64(), "repair started");
        self.schedule_at(now + remaining, Event::RepairComplete { turbine, grant });
        Ok(())
    }

    fn on_repair_complete(&mut self, turbine: TurbineId, grant: GrantId) -> SimulationResult<()> {
        // Completions for preempted grants are stale; the repair resumes
        // later under a new grant with the unfinished remainder.
        if !self.fleet.is_active(grant) {
            trace!(?turbine, ?grant, "dropping stale completion event");
            return Ok(());
        }
        let now = self.current_time;
        self.turbine_mut(turbine)?.complete_repair(now)?;
        self.stats.on_state_change(
            turbine,
            TurbineState::UnderRepair,
            TurbineState::Operating,
            now,
        );
        debug!(?turbine, at_secs = now.as_secs_f64(), "repair complete");

        self.stats.on_resource_event(ResourceEvent::Released, now);
        if let Some(next) = self.fleet.release(grant, now)? {
            self.accept_grant(next)?;
        }
        self.plan_failure(turbine.0 as usize, now);
        Ok(())
    }

    /// Runs every event up to and including `horizon`, then closes the
    /// books and produces the run report.
    ///
    /// The clock never moves backwards: if earlier [`SimWorld::step`] calls
    /// already advanced past `horizon`, accounting closes at the current
    /// time instead and the report covers that longer span.
    pub fn run_until(&mut self, horizon: Duration) -> SimulationResult<RunReport> {
        while let Some(next) = self.queue.peek_earliest() {
            if next.time() > horizon {
                break;
            }
            self.step()?;
        }
        let end = self.current_time.max(horizon);
        self.current_time = end;
        self.fleet.settle(end);

        let horizon_secs = end.as_secs_f64();
        let per_turbine = self
            .turbines
            .iter_mut()
            .map(|t| {
                t.finalize(end);
                TurbineReport {
                    id: t.id(),
                    availability: if horizon_secs > 0.0 {
                        t.cumulative_uptime().as_secs_f64() / horizon_secs
                    } else {
                        0.0
                    },
                    downtime_hours: t.cumulative_downtime().as_secs_f64() / 3600.0,
                    failure_count: t.failure_count(),
                    final_state: t.state(),
                }
            })
            .collect();

        let capacity_secs = horizon_secs * self.fleet.capacity() as f64;
        Ok(RunReport {
            seed: self.config.seed,
            horizon_hours: horizon_secs / 3600.0,
            events_processed: self.events_processed,
            per_turbine,
            fleet_utilization: if capacity_secs > 0.0 {
                self.fleet.busy_time().as_secs_f64() / capacity_secs
            } else {
                0.0
            },
            queue_wait: QueueWaitStats::from_samples(self.stats.queue_waits()),
        })
    }
}
