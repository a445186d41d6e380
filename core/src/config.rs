use crate::engine::FailurePolicy;
use crate::error::ConfigError;
use crate::network::{reference_links, LinkConfig, Topology};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BLOCK_COUNT: u64 = 2016;
/// Mean ticks between blocks found anywhere in the network.
pub const DEFAULT_MEAN_BLOCK_INTERVAL: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinerConfig {
    /// Relative share of blocks this miner finds.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub block_count: u64,
    pub seed: u64,
    pub mean_block_interval: f64,
    pub miners: Vec<MinerConfig>,
    pub links: Vec<LinkConfig>,
    pub failure_policy: FailurePolicy,
}

impl Default for SimulationConfig {
    /// Seven miners: one of weight 0.3 linked to three of six fully meshed
    /// miners of weight 0.1. Weights are relative, so the first miner finds
    /// a third of the blocks and each of the others a ninth.
    fn default() -> Self {
        let mut miners = vec![MinerConfig { weight: 0.3 }];
        miners.extend((1..7).map(|_| MinerConfig { weight: 0.1 }));
        Self {
            block_count: DEFAULT_BLOCK_COUNT,
            seed: 0,
            mean_block_interval: DEFAULT_MEAN_BLOCK_INTERVAL,
            miners,
            links: reference_links(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_block_count(mut self, block_count: u64) -> Self {
        self.block_count = block_count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn weights(&self) -> Vec<f64> {
        self.miners.iter().map(|m| m.weight).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.miners.is_empty() {
            return Err(ConfigError::NoMiners);
        }
        for (id, miner) in self.miners.iter().enumerate() {
            if !miner.weight.is_finite() || miner.weight < 0.0 {
                return Err(ConfigError::InvalidWeight(id, miner.weight));
            }
        }
        if self.weights().iter().sum::<f64>() <= 0.0 {
            return Err(ConfigError::ZeroWeights);
        }
        if !self.mean_block_interval.is_finite() || self.mean_block_interval <= 0.0 {
            return Err(ConfigError::InvalidInterval(self.mean_block_interval));
        }
        self.topology()?;
        Ok(())
    }

    pub fn topology(&self) -> Result<Topology, ConfigError> {
        Ok(Topology::from_links(self.miners.len(), &self.links)?)
    }
}
