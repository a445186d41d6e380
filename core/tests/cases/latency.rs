use crate::common::TestHarness;
use forksim_core::Topology;

#[test]
fn test_relay_arrives_after_link_latency() {
    let mut topology = Topology::new(2);
    topology.connect(0, 1, 250).unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(0, 1_000, 0);
    h.run();

    let arrival = h
        .log
        .iter()
        .find(|s| s.node_id == 1)
        .map(|s| s.key.time);
    assert_eq!(arrival, Some(1_250));
}

#[test]
fn test_multi_hop_latency_accumulates() {
    let mut topology = Topology::new(4);
    topology
        .connect(0, 1, 10)
        .unwrap()
        .connect(1, 2, 20)
        .unwrap()
        .connect(2, 3, 30)
        .unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(0, 0, 0);
    h.run();

    let adopted_at: Vec<u64> = (1..4)
        .map(|id| {
            h.log
                .iter()
                .find(|s| s.node_id == id && s.len_after > s.len_before)
                .map_or(u64::MAX, |s| s.key.time)
        })
        .collect();
    assert_eq!(adopted_at, vec![10, 30, 60]);
}

#[test]
fn test_faster_path_wins_race() {
    // 0 -> 3 directly is slow, 0 -> 1 -> 3 is fast; 3 adopts via the fast path
    // and the slow delivery becomes a no-op.
    let mut topology = Topology::new(4);
    topology
        .connect(0, 3, 100)
        .unwrap()
        .connect(0, 1, 5)
        .unwrap()
        .connect(1, 3, 5)
        .unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(0, 0, 7);
    h.run();

    let at_three: Vec<(u64, bool)> = h
        .log
        .iter()
        .filter(|s| s.node_id == 3)
        .map(|s| (s.key.time, s.len_after > s.len_before))
        .collect();
    assert_eq!(at_three, vec![(10, true), (100, false)]);
}

#[test]
fn test_zero_latency_relays_at_same_time() {
    let mut h = TestHarness::new(Topology::full_mesh(3, 0));
    h.discover(0, 42, 1);
    h.run();

    assert!(h.log.iter().all(|s| s.key.time == 42));
    assert_eq!(h.tips(), vec![(Some(1), 1); 3]);
}

#[test]
fn test_parallel_links_deliver_twice() {
    let mut topology = Topology::new(2);
    topology.connect(0, 1, 3).unwrap().connect(0, 1, 3).unwrap();
    let mut h = TestHarness::new(topology);
    h.discover(0, 0, 0);
    h.run();

    let deliveries: Vec<bool> = h
        .log
        .iter()
        .filter(|s| s.node_id == 1)
        .map(|s| s.len_after > s.len_before)
        .collect();
    assert_eq!(deliveries, vec![true, false]);
}
