use crate::common::TestHarness;
use forksim_core::{NodeId, SimulationConfig};
use std::collections::HashMap;

fn reference_run(blocks: u64, seed: u64) -> TestHarness {
    let mut h = TestHarness::reference();
    h.seed(&SimulationConfig::default().with_block_count(blocks).with_seed(seed));
    h.run();
    h
}

#[test]
fn test_executed_times_never_go_backwards() {
    let h = reference_run(300, 1);
    assert!(!h.log.is_empty());
    for pair in h.log.windows(2) {
        assert!(pair[0].key < pair[1].key);
        assert!(pair[0].key.time <= pair[1].key.time);
    }
}

#[test]
fn test_chain_length_never_decreases() {
    let h = reference_run(300, 2);
    let mut last: HashMap<NodeId, usize> = HashMap::new();
    for step in &h.log {
        assert!(step.len_after >= step.len_before);
        let prev = last.insert(step.node_id, step.len_after).unwrap_or(0);
        assert!(step.len_after >= prev, "miner {} shrank", step.node_id);
    }
}

#[test]
fn test_adoption_fans_out_to_every_peer() {
    let h = reference_run(300, 3);
    for step in &h.log {
        let degree = h.degree(step.node_id);
        if step.discover {
            assert_eq!(step.len_after, step.len_before + 1);
            assert_eq!(step.scheduled, degree);
        } else if step.len_after > step.len_before {
            assert_eq!(step.scheduled, degree);
        } else {
            assert_eq!(step.len_after, step.len_before);
            assert_eq!(step.scheduled, 0, "rejected chain must not relay");
        }
    }
}

#[test]
fn test_first_seen_wins_on_equal_length() {
    // 1 and 2 find competing blocks at once; 0 hears 1 first.
    let mut topology = forksim_core::Topology::new(3);
    topology.connect(0, 1, 2).unwrap().connect(0, 2, 5).unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(1, 100, 10);
    h.discover(2, 100, 20);
    h.run();

    assert_eq!(h.miner(0).tip(), Some(10));
    assert_eq!(h.miner(1).tip(), Some(10));
    assert_eq!(h.miner(2).tip(), Some(20));
}

#[test]
fn test_longer_fork_overrides_first_seen() {
    let mut topology = forksim_core::Topology::new(3);
    topology.connect(0, 1, 1).unwrap().connect(0, 2, 1).unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(1, 100, 10);
    h.discover(2, 100, 20);
    h.discover(2, 200, 21);
    h.run();

    assert_eq!(h.tips(), vec![(Some(21), 2); 3]);
    assert_eq!(h.miner(1).reorgs(), 1);
    assert_eq!(h.miner(0).reorgs(), 1);
}
