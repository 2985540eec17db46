//! Proximity Events
//!
//! ## Overview
//!
//! Everything a node learns about its neighbours surfaces as a
//! [`ProximityEvent`]. Events are operational output, not protocol: nothing a
//! node does depends on whether anyone consumes them.
//!
//! ```text
//! beacon ─→ Detected ─→ (30 s of contact) ─→ Exposed
//!                 │
//!                 └──→ (30 s of silence) ─→ Departed { duration }
//! ```
//!
//! Degraded operation is reported the same way (`Dropped` when the contact
//! table is full, `Malformed` for frames that are not beacons) because the
//! scheduler loop is the top of the call stack and has nobody to return an
//! error to.
//!
//! ## Memory Model
//!
//! Events are `Copy` and at most 16 bytes, so they can be pushed into a
//! fixed `heapless::Vec` from the receive path without allocation.
//!
//! ## Sinks
//!
//! A node hands each event to an [`EventSink`]:
//!
//! | Sink | Behaviour |
//! |------|-----------|
//! | `()` | discard |
//! | `heapless::Vec<ProximityEvent, N>` | collect, drop when full |
//! | `Vec<ProximityEvent>` (std) | collect |
//! | [`LogSink`] | write one log line per event |

use crate::beacon::PeerId;
use crate::time::Seconds;

/// Kind of event, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    /// Beacon above the RSSI threshold
    Detected = 0,
    /// Contact reached the exposure window
    Exposed = 1,
    /// Peer evicted after the contact window of silence
    Departed = 2,
    /// Detection lost because the table was full
    Dropped = 3,
    /// Frame discarded as not a beacon
    Malformed = 4,
}

impl EventKind {
    /// Short name for log lines
    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::Detected => "DETECT",
            EventKind::Exposed => "EXPOSED",
            EventKind::Departed => "LEAVE",
            EventKind::Dropped => "DROPPED",
            EventKind::Malformed => "MALFORMED",
        }
    }
}

/// Observable outcome of tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProximityEvent {
    /// A beacon from `peer` crossed the RSSI threshold
    Detected {
        /// Sender of the beacon
        peer: PeerId,
        /// Received signal strength (dBm)
        rssi: i16,
        /// Receiver time of detection
        at: Seconds,
        /// True when this detection opened a new encounter
        new_contact: bool,
    },
    /// `peer` has been in range for the exposure window
    Exposed {
        /// Exposed peer
        peer: PeerId,
        /// Time the window was crossed
        at: Seconds,
    },
    /// `peer` left range; emitted by the maintenance sweep
    Departed {
        /// Departed peer
        peer: PeerId,
        /// `last_seen - first_seen` of the encounter
        duration: Seconds,
        /// Time of the sweep that evicted the record
        at: Seconds,
    },
    /// A qualifying detection of `peer` could not be tracked
    Dropped {
        /// Untracked peer
        peer: PeerId,
        /// Time of the lost detection
        at: Seconds,
    },
    /// A received frame of `len` bytes was not a beacon
    Malformed {
        /// Frame length
        len: u16,
        /// Time of reception
        at: Seconds,
    },
}

impl ProximityEvent {
    /// Payload-free kind
    pub fn kind(&self) -> EventKind {
        match self {
            ProximityEvent::Detected { .. } => EventKind::Detected,
            ProximityEvent::Exposed { .. } => EventKind::Exposed,
            ProximityEvent::Departed { .. } => EventKind::Departed,
            ProximityEvent::Dropped { .. } => EventKind::Dropped,
            ProximityEvent::Malformed { .. } => EventKind::Malformed,
        }
    }

    /// Event time in receiver seconds
    pub fn at(&self) -> Seconds {
        match self {
            ProximityEvent::Detected { at, .. }
            | ProximityEvent::Exposed { at, .. }
            | ProximityEvent::Departed { at, .. }
            | ProximityEvent::Dropped { at, .. }
            | ProximityEvent::Malformed { at, .. } => *at,
        }
    }

    /// Peer the event is about, if any
    pub fn peer(&self) -> Option<PeerId> {
        match self {
            ProximityEvent::Detected { peer, .. }
            | ProximityEvent::Exposed { peer, .. }
            | ProximityEvent::Departed { peer, .. }
            | ProximityEvent::Dropped { peer, .. } => Some(*peer),
            ProximityEvent::Malformed { .. } => None,
        }
    }

    /// Priority for consumers that must shed load
    ///
    /// Lower numbers = higher priority
    pub fn priority(&self) -> u8 {
        match self {
            ProximityEvent::Exposed { .. } => 0,
            ProximityEvent::Departed { .. } => 1,
            ProximityEvent::Dropped { .. } => 2,
            ProximityEvent::Detected { .. } => 3,
            ProximityEvent::Malformed { .. } => 4,
        }
    }
}

/// Consumer of proximity events
pub trait EventSink {
    /// Take one event. Must not block.
    fn record(&mut self, event: ProximityEvent);
}

impl EventSink for () {
    fn record(&mut self, _event: ProximityEvent) {}
}

impl<const N: usize> EventSink for heapless::Vec<ProximityEvent, N> {
    fn record(&mut self, event: ProximityEvent) {
        // Full buffers drop the newest event
        let _ = self.push(event);
    }
}

#[cfg(feature = "std")]
impl EventSink for std::vec::Vec<ProximityEvent> {
    fn record(&mut self, event: ProximityEvent) {
        self.push(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn record(&mut self, event: ProximityEvent) {
        (**self).record(event);
    }
}

/// Sink that turns every event into a log line
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, event: ProximityEvent) {
        match event {
            ProximityEvent::Detected { peer, rssi, at, new_contact } => {
                log_info!("{} DETECT {} with RSSI: {} (new: {})", at, peer, rssi, new_contact);
            }
            ProximityEvent::Exposed { peer, at } => {
                log_warn!("{} !! CLOSE PROXIMITY FOR 30S !! NODE: {}", at, peer);
            }
            ProximityEvent::Departed { peer, duration, at } => {
                log_info!("{} LEAVE {}", at, peer);
                log_info!("{} CONTACT TIME: {} s", peer, duration);
            }
            ProximityEvent::Dropped { peer, at } => {
                log_warn!("{} contact table full, dropped detection of {}", at, peer);
            }
            ProximityEvent::Malformed { len, at } => {
                log_warn!("{} discarded malformed beacon of {} bytes", at, len);
            }
        }
    }
}
