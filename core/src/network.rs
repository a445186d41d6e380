use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::components::miner::Miner;
use crate::engine::SimTime;
use crate::error::TopologyError;
use crate::NodeId;

/// Latency of every link in the reference topology.
pub const REFERENCE_LATENCY: SimTime = 1;
pub const REFERENCE_NODES: usize = 7;

/// A bidirectional link with the same one-way latency in both directions.
#[derive(Serialize, Deserialize, Clone, Debug, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    pub a: NodeId,
    pub b: NodeId,
    pub latency: SimTime,
}

pub fn canonical_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Builds the fixed miner array and its symmetric peer edges.
#[derive(Debug, Clone)]
pub struct Topology {
    miners: Vec<Miner>,
    links: Vec<LinkConfig>,
}

impl Topology {
    pub fn new(nodes: usize) -> Self {
        Self {
            miners: (0..nodes).map(Miner::new).collect(),
            links: Vec::new(),
        }
    }

    /// Miner 0 linked to 1, 2 and 3; miners 1 to 6 fully meshed.
    pub fn reference() -> Self {
        let mut t = Self::new(REFERENCE_NODES);
        for link in reference_links() {
            t.add_link(link);
        }
        t
    }

    pub fn full_mesh(nodes: usize, latency: SimTime) -> Self {
        let mut t = Self::new(nodes);
        for a in 0..nodes {
            for b in a + 1..nodes {
                t.add_link(LinkConfig { a, b, latency });
            }
        }
        t
    }

    pub fn from_links(nodes: usize, links: &[LinkConfig]) -> Result<Self, TopologyError> {
        let mut t = Self::new(nodes);
        for link in links {
            t.connect(link.a, link.b, link.latency)?;
        }
        Ok(t)
    }

    pub fn len(&self) -> usize {
        self.miners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.miners.is_empty()
    }

    /// Adds the edge in both directions. Repeating a link adds parallel edges.
    pub fn connect(
        &mut self,
        a: NodeId,
        b: NodeId,
        latency: SimTime,
    ) -> Result<&mut Self, TopologyError> {
        let nodes = self.miners.len();
        if a >= nodes || b >= nodes {
            return Err(TopologyError::UnknownNode { a, b, nodes });
        }
        self.add_link(LinkConfig { a, b, latency });
        Ok(self)
    }

    fn add_link(&mut self, link: LinkConfig) {
        self.miners[link.a].add_peer(link.b, link.latency);
        self.miners[link.b].add_peer(link.a, link.latency);
        self.links.push(link);
    }

    pub fn links(&self) -> &[LinkConfig] {
        &self.links
    }

    pub fn has_link(&self, a: NodeId, b: NodeId) -> bool {
        let key = canonical_key(a, b);
        self.links.iter().any(|l| canonical_key(l.a, l.b) == key)
    }

    /// Whether every miner can reach every other one.
    pub fn is_connected(&self) -> bool {
        if self.miners.is_empty() {
            return true;
        }
        let mut seen = vec![false; self.miners.len()];
        let mut queue = VecDeque::from([0]);
        seen[0] = true;
        while let Some(id) = queue.pop_front() {
            for &(peer, _) in self.miners[id].peers() {
                if !seen[peer] {
                    seen[peer] = true;
                    queue.push_back(peer);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    pub fn build(self) -> Vec<Miner> {
        self.miners
    }
}

pub fn reference_links() -> Vec<LinkConfig> {
    let mut links: Vec<LinkConfig> = (1..=3)
        .map(|b| LinkConfig {
            a: 0,
            b,
            latency: REFERENCE_LATENCY,
        })
        .collect();
    for a in 1..REFERENCE_NODES {
        for b in a + 1..REFERENCE_NODES {
            links.push(LinkConfig {
                a,
                b,
                latency: REFERENCE_LATENCY,
            });
        }
    }
    links
}
