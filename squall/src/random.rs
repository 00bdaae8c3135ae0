//! Random process generation for failure inter-arrival and repair times.
//!
//! Each sampler owns its own ChaCha stream derived from the run seed, so
//! sample sequences are a pure function of `(seed, stream)` and never depend
//! on what the rest of the simulation did in between draws. The exponential
//! transform is the standard inverse CDF, `-ln(U) * mean`, which models the
//! constant-failure-rate section of the bath-tub curve.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{SimulationError, SimulationResult};

/// Exponentially distributed inter-arrival sampler with an injected seed.
#[derive(Debug, Clone)]
pub struct ExponentialInterarrival {
    rng: ChaCha8Rng,
    mean_hours: f64,
}

impl ExponentialInterarrival {
    /// Creates a sampler for the given mean, on its own ChaCha stream.
    ///
    /// Fails with a configuration error for a non-positive or non-finite
    /// mean; the distribution is undefined there.
    pub fn new(seed: u64, stream: u64, mean_hours: f64) -> SimulationResult<Self> {
        if !mean_hours.is_finite() || mean_hours <= 0.0 {
            return Err(SimulationError::Configuration(format!(
                "exponential mean must be positive, got {mean_hours}"
            )));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Ok(Self { rng, mean_hours })
    }

    /// Draws the next inter-arrival interval, in hours.
    ///
    /// Always finite and non-negative: a uniform draw of exactly zero
    /// (which would map to infinity) is rejected and resampled.
    pub fn next_interval(&mut self) -> f64 {
        loop {
            let u: f64 = self.rng.gen();
            if u > 0.0 {
                return -u.ln() * self.mean_hours;
            }
        }
    }
}
