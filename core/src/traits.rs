use crate::engine::SimTime;

/// Index of a miner in the network's node array.
pub type NodeId = usize;

/// Opaque block identifier. Blocks carry no content.
pub type BlockId = u64;

/// Source of "current time" for the real-time scheduler, in microsecond ticks.
pub trait Clock: Send + Sync {
    fn now(&self) -> SimTime;
}
