use thiserror::Error;

use crate::engine::{SimTime, TaskKey};
use crate::traits::NodeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("cannot schedule {delay} ticks after {now}: time overflows")]
    TimeOverflow { now: SimTime, delay: SimTime },
    #[error("scheduler has been shut down")]
    ShutDown,
}

/// Failure raised by a task while it executes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task addressed unknown node {0}")]
    UnknownNode(NodeId),
    #[error("scheduling from task failed: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("{0}")]
    Failed(String),
}

/// Returned by a drain running under [`FailurePolicy::Propagate`](crate::engine::FailurePolicy)
/// when a task fails. Tasks still pending stay in the scheduler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("task {key} failed: {source}")]
pub struct DrainError {
    pub key: TaskKey,
    #[source]
    pub source: TaskError,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("link {a} <-> {b} references a node outside 0..{nodes}")]
    UnknownNode { a: NodeId, b: NodeId, nodes: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no miners configured")]
    NoMiners,
    #[error("miner {0} has an invalid weight {1}")]
    InvalidWeight(NodeId, f64),
    #[error("miner weights must have a positive sum")]
    ZeroWeights,
    #[error("mean block interval must be positive and finite, got {0}")]
    InvalidInterval(f64),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("cannot allocate propagation histogram: {0}")]
    Stats(#[from] hdrhistogram::CreationError),
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}
