use crate::engine::SimTime;
use hdrhistogram::{CreationError, Histogram};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of [`PropagationStats`], in ticks.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PropagationSummary {
    pub adoptions: u64,
    pub min: SimTime,
    pub p50: SimTime,
    pub p99: SimTime,
    pub max: SimTime,
    pub mean: f64,
}

impl fmt::Display for PropagationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "adoptions: {} delay min: {} p50: {} p99: {} max: {} mean: {:.2}",
            self.adoptions, self.min, self.p50, self.p99, self.max, self.mean
        )
    }
}

/// Delay between a block being found and a miner adopting a chain ending in it.
pub struct PropagationStats {
    delays: Histogram<u64>,
}

impl PropagationStats {
    pub fn new() -> Result<Self, CreationError> {
        Ok(Self {
            delays: Histogram::new(3)?,
        })
    }

    pub fn record(&mut self, delay: SimTime) {
        self.delays.saturating_record(delay);
    }

    pub fn adoptions(&self) -> u64 {
        self.delays.len()
    }

    pub fn reset(&mut self) {
        self.delays.reset();
    }

    pub fn summary(&self) -> PropagationSummary {
        if self.delays.is_empty() {
            return PropagationSummary::default();
        }
        PropagationSummary {
            adoptions: self.delays.len(),
            min: self.delays.min(),
            p50: self.delays.value_at_quantile(0.5),
            p99: self.delays.value_at_quantile(0.99),
            max: self.delays.max(),
            mean: self.delays.mean(),
        }
    }
}
