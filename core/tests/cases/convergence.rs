use crate::common::TestHarness;
use forksim_core::{Simulation, SimulationConfig, Topology};
use std::sync::Arc;

#[test]
fn test_reference_scenario_converges() {
    let report = Simulation::new(SimulationConfig::default()).unwrap().run().unwrap();

    assert_eq!(report.miners.len(), 7);
    assert!(report.converged(), "miners disagree:\n{report}");
    let best = report.best_len();
    assert!(best > 0 && best <= 2016);
    assert_eq!(report.stale_blocks(), 2016 - best as u64);
    assert_eq!(
        report.miners.iter().map(|m| m.blocks_found).sum::<u64>(),
        2016
    );
}

#[test]
fn test_lengths_always_agree_after_drain() {
    // Ties at the very end may leave different tips, never different lengths.
    for seed in 0..5 {
        let config = SimulationConfig::default().with_seed(seed).with_block_count(400);
        let report = Simulation::new(config).unwrap().run().unwrap();
        let best = report.best_len();
        assert!(report.miners.iter().all(|m| m.len == best), "seed {seed}");
    }
}

#[test]
fn test_redelivering_adopted_chain_is_a_no_op() {
    let mut h = TestHarness::reference();
    h.seed(&SimulationConfig::default().with_block_count(200));
    h.run();

    let before = h.tips();
    let chain = Arc::clone(h.miner(0).chain());
    let now = h.sched.now();
    for id in 0..7 {
        h.deliver(id, now + 1, Arc::clone(&chain));
    }
    h.log.clear();
    h.run();

    assert_eq!(h.log.len(), 7);
    assert!(h.log.iter().all(|s| s.scheduled == 0));
    assert_eq!(h.tips(), before);
}

#[test]
fn test_isolated_miner_keeps_own_chain() {
    let mut topology = Topology::new(3);
    topology.connect(0, 1, 1).unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(0, 10, 0);
    h.discover(2, 20, 1);
    h.discover(2, 30, 2);
    h.run();

    assert_eq!(h.tips(), vec![(Some(0), 1), (Some(0), 1), (Some(2), 2)]);
}
