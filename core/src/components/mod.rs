use crate::chain::Chain;
use crate::traits::{BlockId, NodeId};
use std::sync::Arc;

pub mod miner;

#[derive(Debug, Clone)]
pub enum EventType {
    /// Root event: the miner finds `block_id` on top of its best chain.
    Discover { block_id: BlockId },
    /// A peer relayed `chain`.
    Consider { chain: Arc<Chain> },
}

/// Task payload for the simulation scheduler.
#[derive(Debug, Clone)]
pub struct Event {
    pub node_id: NodeId,
    pub event_type: EventType,
}
