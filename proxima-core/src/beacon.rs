//! Beacon wire format
//!
//! Every active slot a node broadcasts its identity in a fixed 12-byte
//! record. The layout is byte exact and little-endian so boards of different
//! families decode each other:
//!
//! ```text
//! ┌────────────┬────────────┬────────────┐
//! │   src_id   │    seq     │ timestamp  │
//! │  u32 (LE)  │  u32 (LE)  │  u32 (LE)  │
//! └────────────┴────────────┴────────────┘
//!   0..4         4..8         8..12
//! ```
//!
//! `seq` counts every copy a sender transmits and wraps on overflow.
//! `timestamp` is the sender's slot clock at send time; receivers never
//! compare it with their own clock.

use crate::errors::{ProximityError, ProximityResult};
use crate::time::Ticks;

/// Stable node identifier
pub type PeerId = u32;

/// Encoded beacon size in bytes
pub const BEACON_LEN: usize = 12;

/// One identity beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Beacon {
    /// Sender identity
    pub src_id: PeerId,
    /// Per-sender send counter
    pub seq: u32,
    /// Sender's clock reading at send time
    pub timestamp: Ticks,
}

impl Beacon {
    /// Build a beacon
    pub const fn new(src_id: PeerId, seq: u32, timestamp: Ticks) -> Self {
        Self { src_id, seq, timestamp }
    }

    /// Serialize into the wire layout
    pub fn encode(&self) -> [u8; BEACON_LEN] {
        let mut frame = [0u8; BEACON_LEN];
        frame[0..4].copy_from_slice(&self.src_id.to_le_bytes());
        frame[4..8].copy_from_slice(&self.seq.to_le_bytes());
        frame[8..12].copy_from_slice(&self.timestamp.to_le_bytes());
        frame
    }

    /// Parse a received frame
    ///
    /// Anything but exactly [`BEACON_LEN`] bytes is rejected; there is no
    /// version field to negotiate with.
    pub fn decode(frame: &[u8]) -> ProximityResult<Self> {
        let bytes: &[u8; BEACON_LEN] = frame.try_into().map_err(|_| {
            ProximityError::MalformedBeacon {
                len: frame.len(),
                expected: BEACON_LEN,
            }
        })?;

        Ok(Self {
            src_id: read_u32(bytes, 0),
            seq: read_u32(bytes, 4),
            timestamp: read_u32(bytes, 8),
        })
    }
}

fn read_u32(bytes: &[u8; BEACON_LEN], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Outgoing beacon state for one node
///
/// Owns the sequence counter. Each call to [`BeaconSender::next`] produces
/// the next copy with `seq` incremented before use, so the first beacon a
/// node sends carries `seq == 1`.
#[derive(Debug, Clone)]
pub struct BeaconSender {
    src_id: PeerId,
    seq: u32,
}

impl BeaconSender {
    /// Sender for `src_id` with the counter at zero
    pub const fn new(src_id: PeerId) -> Self {
        Self { src_id, seq: 0 }
    }

    /// Sender resuming from an arbitrary counter value
    pub const fn with_seq(src_id: PeerId, seq: u32) -> Self {
        Self { src_id, seq }
    }

    /// Next beacon stamped with `now`
    pub fn next(&mut self, now: Ticks) -> Beacon {
        self.seq = self.seq.wrapping_add(1);
        Beacon::new(self.src_id, self.seq, now)
    }

    /// Sequence number of the last beacon produced
    pub fn seq(&self) -> u32 {
        self.seq
    }

    /// Identity stamped on every beacon
    pub fn src_id(&self) -> PeerId {
        self.src_id
    }
}
