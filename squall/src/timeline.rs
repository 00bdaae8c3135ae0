//! Planned failure timelines.
//!
//! Failures are pre-planned per turbine rather than re-derived at occurrence
//! time: each failure kind contributes a lazily extended stream of absolute
//! arrival instants (cumulative exponential inter-arrivals), and the timeline
//! merges the streams in ascending order. Repair delays shift what the
//! turbine experiences, but never the planned instants themselves, so runs
//! with the same seed are reproducible regardless of resource contention.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::FailureKind;
use crate::error::{SimulationError, SimulationResult};
use crate::random::ExponentialInterarrival;

const SECS_PER_HOUR: f64 = 3600.0;

/// A planned failure instant for one turbine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedFailure {
    /// Absolute simulation time of the failure.
    pub at: Duration,
    /// Index into the configured failure kinds.
    pub kind: usize,
}

#[derive(Debug)]
struct KindStream {
    kind: usize,
    sampler: ExponentialInterarrival,
    elapsed_hours: f64,
    next_at: Duration,
}

impl KindStream {
    fn advance(&mut self) {
        self.elapsed_hours += self.sampler.next_interval();
        self.next_at = Duration::from_secs_f64(self.elapsed_hours * SECS_PER_HOUR);
    }
}

#[derive(Debug)]
enum Source {
    Sampled { streams: Vec<KindStream> },
    Scripted { planned: VecDeque<PlannedFailure> },
}

/// The merged, lazily extendable failure schedule of a single turbine.
///
/// Planned instants that fall while the turbine is already down are skipped:
/// a stopped machine cannot fail. [`FailureTimeline::next_after`] therefore
/// always returns an instant strictly in the future of the query time.
#[derive(Debug)]
pub struct FailureTimeline {
    source: Source,
}

impl FailureTimeline {
    /// Builds a sampled timeline for the given failure kinds.
    ///
    /// Stream `base_stream + k` of the run seed is dedicated to kind `k`,
    /// keeping every `(turbine, kind)` pair on an independent random stream.
    pub fn sampled(kinds: &[FailureKind], seed: u64, base_stream: u64) -> SimulationResult<Self> {
        if kinds.is_empty() {
            return Err(SimulationError::Configuration(
                "a sampled timeline needs at least one failure kind".to_string(),
            ));
        }
        let mut streams = Vec::with_capacity(kinds.len());
        for (kind, failure_kind) in kinds.iter().enumerate() {
            let sampler = ExponentialInterarrival::new(
                seed,
                base_stream + kind as u64,
                failure_kind.mtbf_hours,
            )?;
            let mut stream = KindStream {
                kind,
                sampler,
                elapsed_hours: 0.0,
                next_at: Duration::ZERO,
            };
            stream.advance();
            streams.push(stream);
        }
        Ok(Self {
            source: Source::Sampled { streams },
        })
    }

    /// Builds a fixed, pre-planned schedule, mainly for scripted scenarios.
    ///
    /// Entries are sorted by time; order of entry breaks ties.
    pub fn scripted(mut planned: Vec<PlannedFailure>) -> Self {
        planned.sort_by_key(|p| p.at);
        Self {
            source: Source::Scripted {
                planned: planned.into(),
            },
        }
    }

    /// Pops the earliest planned failure strictly after `now`.
    ///
    /// Planned instants at or before `now` are consumed and discarded.
    /// Sampled timelines extend themselves on demand and never run out;
    /// scripted ones return `None` once exhausted.
    pub fn next_after(&mut self, now: Duration) -> Option<PlannedFailure> {
        match &mut self.source {
            Source::Scripted { planned } => {
                while let Some(front) = planned.front() {
                    if front.at > now {
                        break;
                    }
                    planned.pop_front();
                }
                planned.pop_front()
            }
            Source::Sampled { streams } => loop {
                let earliest = streams.iter_mut().min_by_key(|s| (s.next_at, s.kind))?;
                let planned = PlannedFailure {
                    at: earliest.next_at,
                    kind: earliest.kind,
                };
                earliest.advance();
                if planned.at > now {
                    return Some(planned);
                }
            },
        }
    }
}
