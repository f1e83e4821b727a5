use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::foundation::error::{AugsweepError, AugsweepResult};

/// Shared, monotonically increasing output number.
///
/// Cloning yields another handle to the same counter. Numbers start at 1 after a reset and are
/// never reused within a job.
#[derive(Clone, Debug, Default)]
pub struct SequenceCounter(Arc<AtomicU64>);

impl SequenceCounter {
    /// Create a counter positioned before 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the counter; the next number handed out is 1.
    pub fn reset(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    /// Increment and return the new value.
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Last number handed out (0 if none since the last reset).
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Owner of the per-job random generator and the output numbering counter.
///
/// A job calls [`Reproducibility::begin_job`] exactly once before any sampling; that zeroes the
/// counter and seeds the generator. Given the same seed and the same call sequence the
/// generator yields the same values on every platform (ChaCha8).
#[derive(Debug)]
pub struct Reproducibility {
    seed: Option<u64>,
    rng: ChaCha8Rng,
    counter: SequenceCounter,
}

impl Default for Reproducibility {
    fn default() -> Self {
        Self::new()
    }
}

impl Reproducibility {
    /// Create an unseeded manager with a fresh counter.
    pub fn new() -> Self {
        Self {
            seed: None,
            rng: ChaCha8Rng::seed_from_u64(0),
            counter: SequenceCounter::new(),
        }
    }

    /// Reset the counter and seed the generator for a new job.
    pub fn begin_job(&mut self, seed: u64) {
        self.seed = None;
        self.reset_counter();
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = Some(seed);
    }

    /// Seed the generator. Fails if it was already seeded for the current job.
    pub fn seed(&mut self, value: u64) -> AugsweepResult<()> {
        if let Some(existing) = self.seed {
            return Err(AugsweepError::validation(format!(
                "generator already seeded with {existing} for this job"
            )));
        }
        self.rng = ChaCha8Rng::seed_from_u64(value);
        self.seed = Some(value);
        Ok(())
    }

    /// Seed in effect for the current job, if any.
    pub fn current_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Zero the numbering counter.
    pub fn reset_counter(&self) {
        self.counter.reset();
    }

    /// Next output number (1-based, strictly increasing within a job).
    pub fn next_number(&self) -> u64 {
        self.counter.next()
    }

    /// Handle to the numbering counter for the layout manager.
    pub fn counter(&self) -> SequenceCounter {
        self.counter.clone()
    }

    /// Mutable access to the seeded generator.
    pub fn rng(&mut self) -> AugsweepResult<&mut ChaCha8Rng> {
        if self.seed.is_none() {
            return Err(AugsweepError::validation(
                "random generator used before it was seeded",
            ));
        }
        Ok(&mut self.rng)
    }

    /// Uniform draw from the inclusive range `[min, max]`.
    pub fn uniform(&mut self, min: f64, max: f64) -> AugsweepResult<f64> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(AugsweepError::invalid_param(format!(
                "uniform range [{min}, {max}] is malformed"
            )));
        }
        Ok(self.rng()?.gen_range(min..=max))
    }

    /// Raw 64-bit draw, used to derive per-application operator seeds.
    pub fn next_u64(&mut self) -> AugsweepResult<u64> {
        Ok(self.rng()?.next_u64())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/repro.rs"]
mod tests;
