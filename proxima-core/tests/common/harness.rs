//! Slot-stepped simulation of several nodes on one channel
//!
//! Global time advances one slot per [`Simulation::step`]. Each node owns a
//! `ManualClock` that starts at its boot slot, so node clocks are offset
//! from each other just like unsynchronized hardware. A frame broadcast in
//! a slot reaches every other node at the link RSSI set for the pair; nodes
//! with their radio off drop it themselves.

use proxima_core::{
    config::NodeConfig,
    errors::ProximityResult,
    tracker::TrackOutcome,
    events::ProximityEvent,
    node::Node,
    threshold::Dbm,
    time::ManualClock,
};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use super::{SimRadio, SimTransport};

/// Node type used by the simulation
pub type SimNode = Node<SimRadio, SimTransport, ManualClock>;

/// RSSI of a pair that cannot hear each other
pub const OUT_OF_RANGE_DBM: Dbm = -100;

/// Slots per second of the default `ManualClock`
pub const SLOTS_PER_SECOND: u64 = 64;

struct SimEntry {
    node: SimNode,
    boot_slot: u64,
    next_wake: u64,
    events: Vec<ProximityEvent>,
}

/// Multi-node simulation
pub struct Simulation {
    entries: Vec<SimEntry>,
    links: Vec<Vec<Dbm>>,
    now: u64,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            links: Vec::new(),
            now: 0,
        }
    }

    /// Add a node booting at global slot `boot_slot`; returns its index
    pub fn add_node(&mut self, config: NodeConfig, threshold_dbm: Dbm, boot_slot: u64) -> usize {
        let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed());
        let node = Node::new(
            config,
            threshold_dbm,
            SimRadio::default(),
            SimTransport::default(),
            ManualClock::new(0),
            &mut rng,
        )
        .expect("valid node config");

        for row in &mut self.links {
            row.push(OUT_OF_RANGE_DBM);
        }
        self.links.push(vec![OUT_OF_RANGE_DBM; self.entries.len() + 1]);

        self.entries.push(SimEntry {
            node,
            boot_slot,
            next_wake: boot_slot,
            events: Vec::new(),
        });
        self.entries.len() - 1
    }

    /// Set the RSSI both ways between `a` and `b`
    pub fn set_link(&mut self, a: usize, b: usize, rssi: Dbm) {
        self.links[a][b] = rssi;
        self.links[b][a] = rssi;
    }

    /// Advance one slot
    pub fn step(&mut self) {
        let now = self.now;

        for entry in &mut self.entries {
            if now < entry.boot_slot || entry.next_wake != now {
                continue;
            }
            entry
                .node
                .clock_mut()
                .fire()
                .expect("node always keeps a wake armed");
            entry.node.on_timer_fired(&mut entry.events);
            let armed = entry.node.clock().armed().expect("wake re-armed");
            entry.next_wake = now + armed as u64;
        }

        let mut airborne = Vec::new();
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            for frame in entry.node.transport_mut().drain() {
                airborne.push((idx, frame));
            }
        }

        for (sender, frame) in airborne {
            for rx in 0..self.entries.len() {
                if rx == sender || now < self.entries[rx].boot_slot {
                    continue;
                }
                let rssi = self.links[rx][sender];
                let entry = &mut self.entries[rx];
                let _ = entry.node.on_receive(&frame, rssi, &mut entry.events);
            }
        }

        self.now += 1;
    }

    /// Hand `frame` straight to node `rx`, as if received now
    pub fn inject(&mut self, rx: usize, frame: &[u8], rssi: Dbm) -> ProximityResult<TrackOutcome> {
        let entry = &mut self.entries[rx];
        entry.node.on_receive(frame, rssi, &mut entry.events)
    }

    /// Advance `slots` slots
    pub fn run_slots(&mut self, slots: u64) {
        for _ in 0..slots {
            self.step();
        }
    }

    /// Advance whole seconds
    pub fn run_seconds(&mut self, seconds: u64) {
        self.run_slots(seconds * SLOTS_PER_SECOND);
    }

    /// Step until `done` holds or `max_slots` pass; true if `done` held
    pub fn run_until<F>(&mut self, max_slots: u64, mut done: F) -> bool
    where
        F: FnMut(&Simulation) -> bool,
    {
        for _ in 0..max_slots {
            if done(self) {
                return true;
            }
            self.step();
        }
        done(self)
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn node(&self, idx: usize) -> &SimNode {
        &self.entries[idx].node
    }

    pub fn events(&self, idx: usize) -> &[ProximityEvent] {
        &self.entries[idx].events
    }

    /// True if `rx` has logged a detection of `peer`
    pub fn has_detected(&self, rx: usize, peer: u32) -> bool {
        self.events(rx)
            .iter()
            .any(|event| matches!(event, ProximityEvent::Detected { peer: p, .. } if *p == peer))
    }

    /// Events of `rx` about `peer`
    pub fn events_about(&self, rx: usize, peer: u32) -> Vec<ProximityEvent> {
        self.events(rx)
            .iter()
            .filter(|event| event.peer() == Some(peer))
            .copied()
            .collect()
    }
}
