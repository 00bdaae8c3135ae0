//! Error types and utilities for simulation operations.

use thiserror::Error;

use crate::fleet::GrantId;

/// Errors surfaced by the simulation engine.
///
/// Construction-time problems are `Configuration`; everything else indicates
/// a protocol defect and aborts the run. Steady-state execution with valid
/// inputs never produces an error after construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Invalid configuration rejected at construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A delay requested at the scheduling seam was negative or not finite.
    #[error("invalid delay: {delay_hours} hours")]
    InvalidDelay {
        /// The offending delay, in hours.
        delay_hours: f64,
    },

    /// A resource request carried a priority outside the configured range.
    #[error("invalid priority {priority} (allowed 1..={max})")]
    InvalidPriority {
        /// The priority supplied with the request.
        priority: u8,
        /// Highest (least important) allowed priority value.
        max: u8,
    },

    /// A grant was released that is not currently held.
    #[error("double release of grant {grant:?}")]
    DoubleRelease {
        /// The grant handle that was released twice.
        grant: GrantId,
    },

    /// Internal bookkeeping reached a state that should be unreachable.
    #[error("invalid simulation state: {0}")]
    InvalidState(String),
}

/// Result type for simulation operations.
pub type SimulationResult<T> = Result<T, SimulationError>;
