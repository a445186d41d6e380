//! Root events for a simulation run: which miner finds the next block, and when.

use crate::config::SimulationConfig;
use crate::engine::SimTime;
use crate::error::ConfigError;
use crate::traits::{BlockId, NodeId};
use rand::distributions::{Distribution, Open01, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Exponential distribution with the given mean, sampled by inverting the CDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    mean: f64,
}

impl Exponential {
    pub fn new(mean: f64) -> Result<Self, ConfigError> {
        if !mean.is_finite() || mean <= 0.0 {
            return Err(ConfigError::InvalidInterval(mean));
        }
        Ok(Self { mean })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl Distribution<f64> for Exponential {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.sample(Open01);
        -u.ln() * self.mean
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    pub miner: NodeId,
    pub time: SimTime,
    pub block_id: BlockId,
}

/// Seeded stream of `block_count` discoveries at strictly increasing times.
///
/// Each gap is floored to whole ticks and is at least one tick long.
pub struct DiscoveryProcess {
    rng: ChaCha8Rng,
    selector: WeightedIndex<f64>,
    interval: Exponential,
    time: SimTime,
    next_block: BlockId,
    block_count: BlockId,
}

impl DiscoveryProcess {
    pub fn new(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let selector = WeightedIndex::new(config.weights()).map_err(|_| ConfigError::ZeroWeights)?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            selector,
            interval: Exponential::new(config.mean_block_interval)?,
            time: 0,
            next_block: 0,
            block_count: config.block_count,
        })
    }
}

impl Iterator for DiscoveryProcess {
    type Item = Discovery;

    fn next(&mut self) -> Option<Discovery> {
        if self.next_block >= self.block_count {
            return None;
        }
        let miner = self.selector.sample(&mut self.rng);
        let gap = self.interval.sample(&mut self.rng) as SimTime;
        self.time = self.time.saturating_add(gap.max(1));
        let block_id = self.next_block;
        self.next_block += 1;
        Some(Discovery {
            miner,
            time: self.time,
            block_id,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.block_count - self.next_block).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}
