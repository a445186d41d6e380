use forksim_core::*;
use std::sync::Arc;

/// One executed task as seen from outside the miner.
#[derive(Debug, Clone)]
pub struct Step {
    pub key: TaskKey,
    pub node_id: NodeId,
    pub discover: bool,
    pub len_before: usize,
    pub len_after: usize,
    pub scheduled: usize,
}

struct Recorder<'a> {
    network: &'a mut Network,
    log: &'a mut Vec<Step>,
}

impl Executor<Event> for Recorder<'_> {
    fn execute(
        &mut self,
        sched: &mut Scheduler<Event>,
        key: TaskKey,
        event: Event,
    ) -> Result<(), TaskError> {
        let node_id = event.node_id;
        let discover = matches!(event.event_type, EventType::Discover { .. });
        let len_before = self.network.miner(node_id).map_or(0, |m| m.chain_len());
        let pending_before = sched.len();
        self.network.execute(sched, key, event)?;
        self.log.push(Step {
            key,
            node_id,
            discover,
            len_before,
            len_after: self.network.miner(node_id).map_or(0, |m| m.chain_len()),
            scheduled: sched.len() - pending_before,
        });
        Ok(())
    }
}

pub struct TestHarness {
    pub sched: Scheduler<Event>,
    pub net: Network,
    pub log: Vec<Step>,
}

impl TestHarness {
    pub fn new(topology: Topology) -> Self {
        Self {
            sched: Scheduler::new(),
            net: Network::new(topology.build()).unwrap(),
            log: Vec::new(),
        }
    }

    pub fn reference() -> Self {
        Self::new(Topology::reference())
    }

    /// Schedules the seeded discovery process of `config`.
    pub fn seed(&mut self, config: &SimulationConfig) {
        for d in DiscoveryProcess::new(config).unwrap() {
            self.discover(d.miner, d.time, d.block_id);
        }
    }

    pub fn discover(&mut self, miner: NodeId, time: SimTime, block_id: BlockId) {
        self.sched.schedule(
            time,
            Event {
                node_id: miner,
                event_type: EventType::Discover { block_id },
            },
        );
    }

    pub fn deliver(&mut self, miner: NodeId, time: SimTime, chain: Arc<Chain>) {
        self.sched.schedule(
            time,
            Event {
                node_id: miner,
                event_type: EventType::Consider { chain },
            },
        );
    }

    pub fn run(&mut self) -> DrainSummary {
        let mut recorder = Recorder {
            network: &mut self.net,
            log: &mut self.log,
        };
        self.sched.drain(&mut recorder).unwrap()
    }

    pub fn miner(&self, id: NodeId) -> &Miner {
        self.net.miner(id).unwrap()
    }

    pub fn tips(&self) -> Vec<(Option<BlockId>, usize)> {
        self.net
            .miners()
            .iter()
            .map(|m| (m.tip(), m.chain_len()))
            .collect()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.miner(id).degree()
    }
}
