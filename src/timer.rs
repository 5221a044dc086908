//! Wall-clock phase timing (spec.md §4.8): each measured phase of the step
//! driver (neighbor search, kernel evaluation, the four stencils,
//! integration, halo exchange, migration, checkpointing) accumulates time
//! across the run, gathered to rank 0 for the closing report.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Default, Debug, Clone)]
pub struct PhaseTimers {
    totals: BTreeMap<&'static str, Duration>,
}

impl PhaseTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time `f` and add its duration to `phase`'s running total.
    pub fn time<R>(&mut self, phase: &'static str, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        *self.totals.entry(phase).or_insert(Duration::ZERO) += start.elapsed();
        result
    }

    pub fn total(&self, phase: &str) -> Duration {
        self.totals.get(phase).copied().unwrap_or(Duration::ZERO)
    }

    pub fn phases(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.totals.iter().map(|(k, v)| (*k, *v))
    }
}
