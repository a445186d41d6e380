pub mod analytics;
pub mod chain;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod realtime;
pub mod simulation;
pub mod traits;
pub mod workload;

pub use analytics::{PropagationStats, PropagationSummary};
pub use chain::Chain;
pub use components::miner::Miner;
pub use components::{Event, EventType};
pub use config::{MinerConfig, SimulationConfig, DEFAULT_BLOCK_COUNT, DEFAULT_MEAN_BLOCK_INTERVAL};
pub use engine::{DrainSummary, Executor, FailurePolicy, Scheduler, SimTime, TaskKey};
pub use error::{ConfigError, DrainError, ScheduleError, TaskError, TopologyError};
pub use network::{canonical_key, LinkConfig, Topology};
pub use realtime::{RealTimeScheduler, ShutdownMode, WallClock};
pub use simulation::{MinerSummary, Network, Report, Simulation, SimulationError};
pub use traits::{BlockId, Clock, NodeId};
pub use workload::{Discovery, DiscoveryProcess, Exponential};
