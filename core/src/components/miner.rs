use crate::chain::Chain;
use crate::components::{Event, EventType};
use crate::engine::{Scheduler, SimTime};
use crate::traits::{BlockId, NodeId};
use std::sync::Arc;
use tracing::debug;

/// A miner assuming constant difficulty: it extends its own best chain when it
/// finds a block and otherwise follows the longest chain it has heard of.
#[derive(Debug, Clone)]
pub struct Miner {
    pub id: NodeId,
    peers: Vec<(NodeId, SimTime)>,
    best: Arc<Chain>,
    blocks_found: u64,
    reorgs: u64,
}

impl Miner {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            peers: Vec::new(),
            best: Arc::new(Chain::new()),
            blocks_found: 0,
            reorgs: 0,
        }
    }

    /// Adds a one-way edge. Symmetry is the topology builder's job, and
    /// repeated edges are kept: each one relays independently.
    pub fn add_peer(&mut self, peer: NodeId, latency: SimTime) {
        if self.peers.iter().any(|&(p, _)| p == peer) {
            debug!(miner = self.id, peer, latency, "duplicate peer edge");
        }
        self.peers.push((peer, latency));
    }

    pub fn peers(&self) -> &[(NodeId, SimTime)] {
        &self.peers
    }

    pub fn degree(&self) -> usize {
        self.peers.len()
    }

    /// Appends `block_id` to the best chain and relays the result.
    pub fn discover(
        &mut self,
        sched: &mut Scheduler<Event>,
        now: SimTime,
        block_id: BlockId,
    ) -> Arc<Chain> {
        let chain = Arc::new(self.best.extended(block_id));
        self.best = Arc::clone(&chain);
        self.blocks_found += 1;
        debug!(miner = self.id, block_id, len = chain.len(), now, "found block");
        self.relay(sched, now, &chain);
        chain
    }

    /// Longest chain wins; on a tie the chain adopted first is kept.
    /// Returns whether `candidate` was adopted.
    pub fn consider(
        &mut self,
        sched: &mut Scheduler<Event>,
        now: SimTime,
        candidate: Arc<Chain>,
    ) -> bool {
        if candidate.len() <= self.best.len() {
            return false;
        }
        if !candidate.extends(&self.best) {
            self.reorgs += 1;
            debug!(miner = self.id, from = self.best.len(), to = candidate.len(), now, "reorg");
        }
        self.best = candidate;
        let chain = Arc::clone(&self.best);
        self.relay(sched, now, &chain);
        true
    }

    /// Schedules a `Consider` on every peer at `now` plus the edge latency.
    /// Returns the number of tasks scheduled.
    pub fn relay(&self, sched: &mut Scheduler<Event>, now: SimTime, chain: &Arc<Chain>) -> usize {
        for &(peer, latency) in &self.peers {
            sched.schedule(
                now.saturating_add(latency),
                Event {
                    node_id: peer,
                    event_type: EventType::Consider {
                        chain: Arc::clone(chain),
                    },
                },
            );
        }
        self.peers.len()
    }

    pub fn tip(&self) -> Option<BlockId> {
        self.best.tip()
    }

    pub fn chain_len(&self) -> usize {
        self.best.len()
    }

    pub fn chain(&self) -> &Arc<Chain> {
        &self.best
    }

    pub fn blocks_found(&self) -> u64 {
        self.blocks_found
    }

    pub fn reorgs(&self) -> u64 {
        self.reorgs
    }
}
