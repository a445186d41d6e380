use crate::traits::BlockId;
use serde::{Deserialize, Serialize};

/// A node's view of history: block ids in append order.
///
/// Once handed to the scheduler a chain is shared behind an `Arc` and never
/// mutated; extending produces a new chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<BlockId>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tip(&self) -> Option<BlockId> {
        self.blocks.last().copied()
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Copy of this chain with `block` appended.
    pub fn extended(&self, block: BlockId) -> Self {
        let mut blocks = Vec::with_capacity(self.blocks.len() + 1);
        blocks.extend_from_slice(&self.blocks);
        blocks.push(block);
        Self { blocks }
    }

    /// True when `self` starts with every block of `prefix`.
    pub fn extends(&self, prefix: &Chain) -> bool {
        self.blocks.starts_with(&prefix.blocks)
    }
}

impl From<Vec<BlockId>> for Chain {
    fn from(blocks: Vec<BlockId>) -> Self {
        Self { blocks }
    }
}
