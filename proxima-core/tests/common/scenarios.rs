//! Pre-built simulation scenarios
//!
//! - Close pair: two nodes well inside the RSSI threshold
//! - Crowd: more neighbours than the contact table holds

use proxima_core::{config::NodeConfig, schedule::StrategyConfig, threshold::Dbm};

use super::harness::Simulation;

/// RSSI of a peer within close-contact range
pub const CLOSE_DBM: Dbm = -50;

/// RSSI of a peer audible but beyond the indoor threshold
pub const FAR_DBM: Dbm = -80;

/// Indoor threshold used throughout the scenarios
pub const THRESHOLD_DBM: Dbm = -63;

/// Two nodes, ids 1 and 2, booting `offset` slots apart at close range
pub fn close_pair(strategy: StrategyConfig, offset: u64) -> Simulation {
    let mut sim = Simulation::new();
    let a = sim.add_node(NodeConfig::new(1).with_strategy(strategy), THRESHOLD_DBM, 0);
    let b = sim.add_node(NodeConfig::new(2).with_strategy(strategy), THRESHOLD_DBM, offset);
    sim.set_link(a, b, CLOSE_DBM);
    sim
}

/// Node 0 surrounded by `peers` close neighbours with ids 1..=peers
pub fn crowd(strategy: StrategyConfig, peers: usize) -> Simulation {
    let mut sim = Simulation::new();
    let center = sim.add_node(NodeConfig::new(100).with_strategy(strategy), THRESHOLD_DBM, 0);
    for id in 1..=peers {
        let boot = (id as u64 * 7) % 25;
        let peer = sim.add_node(
            NodeConfig::new(id as u32).with_strategy(strategy),
            THRESHOLD_DBM,
            boot,
        );
        sim.set_link(center, peer, CLOSE_DBM);
    }
    sim
}
