//! Proximity Tracker
//!
//! Turns a stream of received beacons into contact records.
//!
//! ## Contact Lifecycle
//!
//! ```text
//!            qualifying beacon              beacons keep arriving
//!  (absent) ─────────────────→ tracked ───────────────────────────┐
//!      ↑                          │  now - first_seen ≥ 30 s      │
//!      │                          ↓                               │
//!      │                       exposed ←──────────────────────────┘
//!      │  sweep: now - last_seen ≥ 30 s
//!      └──────────────────────── (either state) → Departed { duration }
//! ```
//!
//! A beacon qualifies when its RSSI is at or above the active threshold.
//! Exposure is reported once per encounter; after a departure the next
//! beacon from the same peer starts a new encounter.
//!
//! ## Capacity
//!
//! The table holds `N` peers. A new peer arriving while all slots are live
//! is not tracked: the detection is logged and reported as dropped, and the
//! peers already tracked are unaffected.

use heapless::Vec;

use crate::beacon::PeerId;
use crate::constants::protocol::DEFAULT_TABLE_CAPACITY;
use crate::constants::proximity::{CONTACT_WINDOW_S, EXPOSURE_WINDOW_S};
use crate::errors::ProximityError;
use crate::table::{ContactRecord, ContactTable, Slot};
use crate::threshold::Dbm;
use crate::time::Seconds;

/// A peer evicted by a maintenance sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// Peer that left
    pub peer_id: PeerId,
    /// `last_seen - first_seen` of the encounter
    pub duration: Seconds,
    /// Time of the last detection
    pub last_seen: Seconds,
}

/// What a received beacon did to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// Below the RSSI threshold
    Ignored,
    /// First detection of a new encounter
    Detected,
    /// Known peer, `last_seen` refreshed
    Updated,
    /// Known peer crossed the exposure window with this beacon
    Exposed,
    /// New peer, but the table was full
    Dropped,
}

impl TrackOutcome {
    /// True if the beacon qualified, whether or not it could be tracked
    pub fn qualified(&self) -> bool {
        !matches!(self, TrackOutcome::Ignored)
    }
}

/// Bounded contact tracker
#[derive(Debug, Clone)]
pub struct ProximityTracker<const N: usize = DEFAULT_TABLE_CAPACITY> {
    table: ContactTable<N>,
    threshold_dbm: Dbm,
    contact_window_s: Seconds,
    exposure_window_s: Seconds,
}

impl<const N: usize> ProximityTracker<N> {
    /// Tracker using `threshold_dbm` and the standard 30 s windows
    pub fn new(threshold_dbm: Dbm) -> Self {
        Self {
            table: ContactTable::new(),
            threshold_dbm,
            contact_window_s: CONTACT_WINDOW_S,
            exposure_window_s: EXPOSURE_WINDOW_S,
        }
    }

    /// Override the departure and exposure windows
    pub fn with_windows(mut self, contact_window_s: Seconds, exposure_window_s: Seconds) -> Self {
        self.contact_window_s = contact_window_s;
        self.exposure_window_s = exposure_window_s;
        self
    }

    /// Active RSSI threshold
    pub fn threshold_dbm(&self) -> Dbm {
        self.threshold_dbm
    }

    /// Process one received beacon
    ///
    /// `now` is the receiver's time in seconds.
    pub fn on_beacon_received(&mut self, peer_id: PeerId, rssi: Dbm, now: Seconds) -> TrackOutcome {
        if rssi < self.threshold_dbm {
            return TrackOutcome::Ignored;
        }

        if let Some(record) = self.table.get_mut(peer_id) {
            record.last_seen = record.last_seen.max(now);
            let in_contact = record.last_seen.saturating_sub(record.first_seen);
            if !record.exposed && in_contact >= self.exposure_window_s {
                record.exposed = true;
                log_warn!("{} !! CLOSE PROXIMITY FOR 30S !! NODE: {}", now, peer_id);
                return TrackOutcome::Exposed;
            }
            return TrackOutcome::Updated;
        }

        match self.table.insert(peer_id, now) {
            Ok(_) => {
                log_debug!("{} new contact {}", now, peer_id);
                TrackOutcome::Detected
            }
            Err(ProximityError::TableFull { capacity }) => {
                log_warn!("Contact table full ({}), not tracking {}", capacity, peer_id);
                TrackOutcome::Dropped
            }
            Err(_) => TrackOutcome::Dropped,
        }
    }

    /// Evict every peer silent for the contact window
    ///
    /// Returns the departures in table order. Evicted slots become
    /// tombstones and are reused by later inserts.
    pub fn run_maintenance(&mut self, now: Seconds) -> Vec<Departure, N> {
        let window = self.contact_window_s;
        let mut departures = Vec::new();

        self.table.evict_where(
            |record| record.idle_for(now) >= window,
            |record| {
                log_info!("{} LEAVE {}", now.saturating_sub(window), record.peer_id);
                log_info!("{} CONTACT TIME: {} s", record.peer_id, record.contact_duration());
                // At most N records can be evicted from an N-slot table
                let _ = departures.push(Departure {
                    peer_id: record.peer_id,
                    duration: record.contact_duration(),
                    last_seen: record.last_seen,
                });
            },
        );

        departures
    }

    /// Record for `peer_id`, if tracked
    pub fn get(&self, peer_id: PeerId) -> Option<&ContactRecord> {
        self.table.get(peer_id)
    }

    /// True if `peer_id` is tracked and exposed
    pub fn is_exposed(&self, peer_id: PeerId) -> bool {
        self.get(peer_id).map_or(false, |record| record.exposed)
    }

    /// Stop tracking `peer_id` without reporting a departure
    pub fn forget(&mut self, peer_id: PeerId) -> Option<ContactRecord> {
        self.table.remove(peer_id)
    }

    /// Tracked peers
    pub fn contacts(&self) -> impl Iterator<Item = &ContactRecord> {
        self.table.iter()
    }

    /// Number of tracked peers
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True when nobody is tracked
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Underlying table, for diagnostics
    pub fn table(&self) -> &ContactTable<N> {
        &self.table
    }

    /// Log every table slot at debug level
    pub fn dump(&self) {
        for (idx, slot) in self.table.slots().iter().enumerate() {
            match slot {
                Slot::Occupied(record) => log_debug!(
                    "[{}] ({},{},{})",
                    idx,
                    record.peer_id,
                    record.first_seen,
                    record.last_seen
                ),
                Slot::Tombstone => log_debug!("[{}] deleted", idx),
                Slot::Empty => log_debug!("[{}] ~~", idx),
            }
        }
    }
}

impl<const N: usize> Default for ProximityTracker<N> {
    fn default() -> Self {
        Self::new(crate::constants::proximity::INDOOR_RSSI_THRESHOLD_DBM)
    }
}
