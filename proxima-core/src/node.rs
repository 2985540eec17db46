//! Duty-Cycled Node
//!
//! Ties the schedule, the beacon sender and the tracker to the hardware
//! collaborators. A platform needs exactly two entry points:
//!
//! - [`Node::on_timer_fired`] from its slot timer callback
//! - [`Node::on_receive`] from its radio receive callback
//!
//! ## State Machine
//!
//! ```text
//!                    send (NUM_SEND times, one slot apart)
//!                  ┌───────┐
//!                  ↓       │
//!   ──start──→ ActiveBurst(remaining_sends) ──burst done, sleep > 0──→ CountingSleep(armed_slots)
//!                  ↑   │                                                      │
//!                  │   └──burst done, sleep == 0 (next slot is active)──┐     │
//!                  └────────────────────────────────────────────────────┴─────┘
//!                                        timer fires
//! ```
//!
//! The radio is on for the whole burst and off while counting sleep slots.
//! When a burst ends the schedule names the next active slot; the node arms
//! the clock for the slots in between, or starts the next burst right away
//! if there are none. A burst of `num_send` beacons occupies `num_send`
//! slots; the slots beyond the first are taken out of the following sleep so
//! the period keeps its length. Every `maintenance_freq` anchor visits the
//! tracker sweeps out departed peers.
//!
//! ## Usage
//!
//! ```rust
//! use proxima_core::config::NodeConfig;
//! use proxima_core::events::ProximityEvent;
//! use proxima_core::node::Node;
//! use proxima_core::time::ManualClock;
//! use proxima_core::traits::{Radio, Transport};
//! use rand_chacha::ChaCha8Rng;
//! use rand_core::SeedableRng;
//!
//! struct Led;
//! impl Radio for Led {
//!     fn on(&mut self) {}
//!     fn off(&mut self) {}
//! }
//!
//! struct Air;
//! impl Transport for Air {
//!     fn broadcast(&mut self, _frame: &[u8]) {}
//! }
//!
//! let config = NodeConfig::new(1);
//! let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed());
//! let mut node: Node<_, _, _> =
//!     Node::new(config, -63, Led, Air, ManualClock::new(0), &mut rng).unwrap();
//!
//! let mut events: Vec<ProximityEvent> = Vec::new();
//! while node.clock_mut().fire().is_some() && node.stats().beacons_sent < 10 {
//!     node.on_timer_fired(&mut events);
//! }
//! assert_eq!(node.stats().beacons_sent, 10);
//! ```

use crate::beacon::{Beacon, BeaconSender, PeerId, BEACON_LEN};
use crate::config::NodeConfig;
use crate::constants::protocol::DEFAULT_TABLE_CAPACITY;
use crate::errors::ProximityResult;
use crate::events::{EventSink, ProximityEvent};
use crate::schedule::{SlotSchedule, SlotStrategy, Strategy};
use crate::threshold::{Dbm, ThresholdSelection};
use crate::time::{ticks_subsec_millis, ticks_to_seconds, Seconds, Ticks};
use crate::tracker::{ProximityTracker, TrackOutcome};
use crate::traits::{Radio, SlotClock, TemperatureSensor, Transport, UniformSource};

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Radio on, `remaining_sends` beacons still to go in this active slot
    ActiveBurst {
        /// Beacons left in the burst
        remaining_sends: u8,
    },
    /// Radio off until the armed wake
    CountingSleep {
        /// Slots armed when the sleep began
        armed_slots: u16,
    },
}

/// Duty-cycle counters
///
/// Slot counts are in clock slots: a burst of `num_send` beacons holds the
/// radio for `num_send` slots. `radio_on_ticks` is measured on the slot
/// clock from every power-up to the matching power-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeStats {
    /// Slots spent bursting
    pub active_slots: u32,
    /// Slots slept
    pub sleep_slots: u32,
    /// Beacons broadcast
    pub beacons_sent: u32,
    /// Well-formed beacons received while listening
    pub beacons_received: u32,
    /// Frames discarded as malformed
    pub malformed_beacons: u32,
    /// Qualifying detections lost to a full table
    pub table_full_drops: u32,
    /// Maintenance sweeps run
    pub maintenance_sweeps: u32,
    /// Ticks spent with the radio powered
    pub radio_on_ticks: u64,
}

impl NodeStats {
    /// Fraction of slots spent active, 0.0 before the first slot completes
    pub fn duty_cycle(&self) -> f32 {
        let total = self.active_slots as u64 + self.sleep_slots as u64;
        if total == 0 {
            return 0.0;
        }
        self.active_slots as f32 / total as f32
    }
}

/// One proximity-detecting node
///
/// `N` is the contact table capacity.
pub struct Node<R, T, C, const N: usize = DEFAULT_TABLE_CAPACITY>
where
    R: Radio,
    T: Transport,
    C: SlotClock,
{
    config: NodeConfig,
    radio: R,
    transport: T,
    clock: C,
    schedule: SlotSchedule<Strategy>,
    tracker: ProximityTracker<N>,
    sender: BeaconSender,
    state: NodeState,
    stats: NodeStats,
    radio_on_since: Option<Ticks>,
    /// Burst slots beyond the first not yet taken out of a sleep
    overrun: u16,
}

impl<R, T, C, const N: usize> Node<R, T, C, N>
where
    R: Radio,
    T: Transport,
    C: SlotClock,
{
    /// Build a node with an already chosen RSSI threshold
    ///
    /// The schedule's random layout is drawn from `rng` here and never
    /// again. The radio is switched off and the clock armed for an
    /// immediate wake, which starts the first anchor burst.
    pub fn new<G: UniformSource + ?Sized>(
        config: NodeConfig,
        threshold_dbm: Dbm,
        mut radio: R,
        transport: T,
        mut clock: C,
        rng: &mut G,
    ) -> ProximityResult<Self> {
        config.validate()?;

        let strategy = Strategy::from_config(&config.strategy, rng)?;
        let schedule = SlotSchedule::new(strategy, config.maintenance_freq);

        log_info!(
            "Node {} starting: {} strategy, {} slots, beacon size {} bytes, RSSI threshold {}",
            config.node_id,
            schedule.strategy().name(),
            schedule.total_slots(),
            BEACON_LEN,
            threshold_dbm
        );

        radio.off();
        clock.arm_wake(0);

        Ok(Self {
            config,
            radio,
            transport,
            clock,
            schedule,
            tracker: ProximityTracker::new(threshold_dbm),
            sender: BeaconSender::new(config.node_id),
            state: NodeState::ActiveBurst { remaining_sends: config.num_send },
            stats: NodeStats::default(),
            radio_on_since: None,
            overrun: 0,
        })
    }

    /// Run the threshold policy against `sensor`, then build the node
    ///
    /// Blocks until the policy resolves: a reading arrives or the retry
    /// budget in `config` runs out.
    pub fn boot<S: TemperatureSensor, G: UniformSource + ?Sized>(
        config: NodeConfig,
        sensor: &mut S,
        radio: R,
        transport: T,
        clock: C,
        rng: &mut G,
    ) -> ProximityResult<(Self, ThresholdSelection)> {
        let selection = config.threshold.select(sensor, config.sensor_retry_limit);
        let node = Self::new(config, selection.threshold_dbm, radio, transport, clock, rng)?;
        Ok((node, selection))
    }

    /// Timer callback
    ///
    /// Sends the next beacon of the burst, or ends the burst and arms the
    /// clock for the next active slot. Always leaves exactly one wake armed.
    pub fn on_timer_fired<E: EventSink>(&mut self, sink: &mut E) {
        loop {
            match self.state {
                NodeState::ActiveBurst { remaining_sends } if remaining_sends > 0 => {
                    self.radio_on();
                    self.send_beacon();
                    self.state = NodeState::ActiveBurst { remaining_sends: remaining_sends - 1 };
                    self.clock.arm_wake(1);
                    return;
                }
                NodeState::ActiveBurst { .. } => {
                    let burst = u16::from(self.config.num_send);
                    self.stats.active_slots = self.stats.active_slots.wrapping_add(u32::from(burst));

                    let plan = self.schedule.advance();
                    if plan.run_maintenance {
                        self.run_maintenance(sink);
                    }

                    // A burst spans `num_send` slots but the schedule counts one;
                    // the rest comes out of this sleep or, if it is too short,
                    // the following ones
                    self.overrun = self.overrun.saturating_add(burst.saturating_sub(1));
                    let repaid = plan.sleep_slots.min(self.overrun);
                    self.overrun -= repaid;
                    let sleep = plan.sleep_slots - repaid;

                    if sleep == 0 {
                        // Next slot is active too; the radio stays on
                        self.state = NodeState::ActiveBurst { remaining_sends: self.config.num_send };
                        continue;
                    }

                    log_debug!("Sleeping {} slots until slot {}", sleep, plan.next_slot);
                    self.radio_off();
                    self.stats.sleep_slots = self.stats.sleep_slots.wrapping_add(u32::from(sleep));
                    self.state = NodeState::CountingSleep { armed_slots: sleep };
                    self.clock.arm_wake(sleep);
                    return;
                }
                NodeState::CountingSleep { .. } => {
                    self.state = NodeState::ActiveBurst { remaining_sends: self.config.num_send };
                }
            }
        }
    }

    /// Radio receive callback
    ///
    /// Frames that arrive while the radio is off, and the node's own
    /// beacons, are ignored. Malformed frames are counted, reported to
    /// `sink` and returned as errors.
    pub fn on_receive<E: EventSink>(
        &mut self,
        frame: &[u8],
        rssi: Dbm,
        sink: &mut E,
    ) -> ProximityResult<TrackOutcome> {
        if self.radio_on_since.is_none() {
            return Ok(TrackOutcome::Ignored);
        }

        let ticks = self.clock.now();
        let now = self.now_seconds();

        let beacon = match Beacon::decode(frame) {
            Ok(beacon) => beacon,
            Err(err) => {
                log_warn!("{} discarded malformed beacon of {} bytes", now, frame.len());
                self.stats.malformed_beacons = self.stats.malformed_beacons.wrapping_add(1);
                sink.record(ProximityEvent::Malformed {
                    len: frame.len().min(u16::MAX as usize) as u16,
                    at: now,
                });
                return Err(err);
            }
        };

        if beacon.src_id == self.config.node_id {
            return Ok(TrackOutcome::Ignored);
        }
        self.stats.beacons_received = self.stats.beacons_received.wrapping_add(1);

        let peer = beacon.src_id;
        let outcome = self.tracker.on_beacon_received(peer, rssi, now);
        match outcome {
            TrackOutcome::Ignored => {}
            TrackOutcome::Detected | TrackOutcome::Updated | TrackOutcome::Exposed => {
                log_info!(
                    "{} s {} ms DETECT {} with RSSI: {}",
                    now,
                    ticks_subsec_millis(ticks, self.clock.ticks_per_second()),
                    peer,
                    rssi
                );
                sink.record(ProximityEvent::Detected {
                    peer,
                    rssi,
                    at: now,
                    new_contact: outcome == TrackOutcome::Detected,
                });
                if outcome == TrackOutcome::Exposed {
                    sink.record(ProximityEvent::Exposed { peer, at: now });
                }
            }
            TrackOutcome::Dropped => {
                self.stats.table_full_drops = self.stats.table_full_drops.wrapping_add(1);
                sink.record(ProximityEvent::Dropped { peer, at: now });
            }
        }
        Ok(outcome)
    }

    fn send_beacon(&mut self) {
        let beacon = self.sender.next(self.clock.now());
        self.transport.broadcast(&beacon.encode());
        self.stats.beacons_sent = self.stats.beacons_sent.wrapping_add(1);
    }

    fn run_maintenance<E: EventSink>(&mut self, sink: &mut E) {
        let now = self.now_seconds();
        for departure in self.tracker.run_maintenance(now) {
            sink.record(ProximityEvent::Departed {
                peer: departure.peer_id,
                duration: departure.duration,
                at: now,
            });
        }
        self.stats.maintenance_sweeps = self.stats.maintenance_sweeps.wrapping_add(1);
        self.tracker.dump();
    }

    fn radio_on(&mut self) {
        if self.radio_on_since.is_none() {
            self.radio.on();
            self.radio_on_since = Some(self.clock.now());
        }
    }

    fn radio_off(&mut self) {
        if let Some(since) = self.radio_on_since.take() {
            self.radio.off();
            let on_for = self.clock.now().wrapping_sub(since);
            self.stats.radio_on_ticks = self.stats.radio_on_ticks.saturating_add(on_for as u64);
        }
    }

    /// Current time in whole seconds
    pub fn now_seconds(&self) -> Seconds {
        ticks_to_seconds(self.clock.now(), self.clock.ticks_per_second())
    }

    /// Identity carried in beacons
    pub fn node_id(&self) -> PeerId {
        self.config.node_id
    }

    /// Configuration the node was built with
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Current scheduler state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// True while the radio is powered
    pub fn radio_is_on(&self) -> bool {
        self.radio_on_since.is_some()
    }

    /// Duty-cycle counters
    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Contact tracker
    pub fn tracker(&self) -> &ProximityTracker<N> {
        &self.tracker
    }

    /// Slot schedule
    pub fn schedule(&self) -> &SlotSchedule<Strategy> {
        &self.schedule
    }

    /// Total slots per period
    pub fn total_slots(&self) -> u16 {
        self.schedule.strategy().total_slots()
    }

    /// Radio driver
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable transport, e.g. to drain a simulated outbox
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Slot clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable slot clock, for drivers that advance time themselves
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}
