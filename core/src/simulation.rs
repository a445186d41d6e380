use crate::analytics::{PropagationStats, PropagationSummary};
use crate::components::miner::Miner;
use crate::components::{Event, EventType};
use crate::config::SimulationConfig;
use crate::engine::{DrainSummary, Executor, Scheduler, SimTime, TaskKey};
use crate::error::{ConfigError, DrainError, TaskError};
use crate::network::Topology;
use crate::traits::{BlockId, NodeId};
use crate::workload::{Discovery, DiscoveryProcess};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Drain(#[from] DrainError),
}

/// Miners plus propagation bookkeeping, executing each event against the miner it addresses.
pub struct Network {
    miners: Vec<Miner>,
    discovered_at: HashMap<BlockId, SimTime>,
    stats: PropagationStats,
}

impl Network {
    pub fn new(miners: Vec<Miner>) -> Result<Self, ConfigError> {
        Ok(Self {
            miners,
            discovered_at: HashMap::new(),
            stats: PropagationStats::new()?,
        })
    }

    pub fn miners(&self) -> &[Miner] {
        &self.miners
    }

    pub fn miner(&self, id: NodeId) -> Option<&Miner> {
        self.miners.get(id)
    }

    pub fn stats(&self) -> &PropagationStats {
        &self.stats
    }
}

impl Executor<Event> for Network {
    fn execute(
        &mut self,
        sched: &mut Scheduler<Event>,
        key: TaskKey,
        event: Event,
    ) -> Result<(), TaskError> {
        let miner = self
            .miners
            .get_mut(event.node_id)
            .ok_or(TaskError::UnknownNode(event.node_id))?;
        match event.event_type {
            EventType::Discover { block_id } => {
                self.discovered_at.insert(block_id, key.time);
                miner.discover(sched, key.time, block_id);
            }
            EventType::Consider { chain } => {
                let tip = chain.tip();
                if miner.consider(sched, key.time, chain) {
                    if let Some(found) = tip.and_then(|t| self.discovered_at.get(&t)) {
                        self.stats.record(key.time.saturating_sub(*found));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerSummary {
    pub id: NodeId,
    pub tip: Option<BlockId>,
    pub len: usize,
    pub blocks_found: u64,
    pub reorgs: u64,
}

impl From<&Miner> for MinerSummary {
    fn from(m: &Miner) -> Self {
        Self {
            id: m.id,
            tip: m.tip(),
            len: m.chain_len(),
            blocks_found: m.blocks_found(),
            reorgs: m.reorgs(),
        }
    }
}

impl fmt::Display for MinerSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tip {
            Some(tip) => write!(f, "Miner {} tip: {} len: {}", self.id, tip, self.len),
            None => write!(f, "Miner {} tip: -1 len: {}", self.id, self.len),
        }
    }
}

/// Final state of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub block_count: u64,
    pub miners: Vec<MinerSummary>,
    pub tasks_executed: u64,
    pub tasks_failed: u64,
    pub finished_at: SimTime,
    pub propagation: PropagationSummary,
}

impl Report {
    /// Every miner ends on the same tip with the same length.
    pub fn converged(&self) -> bool {
        self.miners
            .windows(2)
            .all(|w| w[0].tip == w[1].tip && w[0].len == w[1].len)
    }

    pub fn best_len(&self) -> usize {
        self.miners.iter().map(|m| m.len).max().unwrap_or(0)
    }

    /// Blocks found that did not make it into the longest chain.
    pub fn stale_blocks(&self) -> u64 {
        self.block_count.saturating_sub(self.best_len() as u64)
    }

    pub fn total_reorgs(&self) -> u64 {
        self.miners.iter().map(|m| m.reorgs).sum()
    }
}

impl fmt::Display for Report {
    /// One `Miner <i> tip: <T> len: <L>` line per miner.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for miner in &self.miners {
            writeln!(f, "{miner}")?;
        }
        Ok(())
    }
}

/// Drives one run: root discoveries in, one drain, a [`Report`] out.
pub struct Simulation {
    config: SimulationConfig,
    scheduler: Scheduler<Event>,
    network: Network,
    summary: DrainSummary,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let topology = config.topology()?;
        Self::with_topology(config, topology)
    }

    /// Uses `topology` in place of the configured links.
    pub fn with_topology(
        config: SimulationConfig,
        topology: Topology,
    ) -> Result<Self, ConfigError> {
        let network = Network::new(topology.build())?;
        Ok(Self {
            scheduler: Scheduler::with_policy(config.failure_policy),
            config,
            network,
            summary: DrainSummary::default(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler<Event> {
        &self.scheduler
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    pub fn schedule_discovery(&mut self, discovery: Discovery) -> TaskKey {
        self.scheduler.schedule(
            discovery.time,
            Event {
                node_id: discovery.miner,
                event_type: EventType::Discover {
                    block_id: discovery.block_id,
                },
            },
        )
    }

    /// Schedules the configured discovery process as root tasks.
    pub fn seed_discoveries(&mut self) -> Result<usize, ConfigError> {
        let process = DiscoveryProcess::new(&self.config)?;
        let mut count = 0;
        for discovery in process {
            self.schedule_discovery(discovery);
            count += 1;
        }
        Ok(count)
    }

    pub fn drain(&mut self) -> Result<DrainSummary, DrainError> {
        let summary = self.scheduler.drain(&mut self.network)?;
        self.summary.executed += summary.executed;
        self.summary.failed += summary.failed;
        Ok(summary)
    }

    pub fn report(&self) -> Report {
        Report {
            block_count: self.config.block_count,
            miners: self.network.miners().iter().map(MinerSummary::from).collect(),
            tasks_executed: self.summary.executed,
            tasks_failed: self.summary.failed,
            finished_at: self.scheduler.now(),
            propagation: self.network.stats().summary(),
        }
    }

    pub fn run(&mut self) -> Result<Report, SimulationError> {
        let roots = self.seed_discoveries()?;
        info!(
            blocks = roots,
            seed = self.config.seed,
            miners = self.network.miners().len(),
            "starting simulation"
        );
        self.drain()?;
        let report = self.report();
        info!(
            tasks = report.tasks_executed,
            finished_at = report.finished_at,
            converged = report.converged(),
            "simulation finished"
        );
        Ok(report)
    }
}
