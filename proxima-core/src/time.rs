//! Time management for duty-cycled nodes
//!
//! Two units flow through the core:
//! - [`Ticks`]: raw readings of the free-running slot clock, carried in beacons
//! - [`Seconds`]: whole seconds since boot, used for contact windows
//!
//! Neither is wall-clock time. Each node's clock starts at boot and drifts
//! freely; nothing here tries to agree with a peer.

use crate::constants::time::{MS_PER_SECOND, SLOTS_PER_SECOND, TICKS_PER_SECOND};
use crate::traits::SlotClock;

/// Slot clock reading in ticks since boot
pub type Ticks = u32;

/// Whole seconds since boot
pub type Seconds = u32;

/// Convert a tick reading into whole seconds
pub fn ticks_to_seconds(ticks: Ticks, ticks_per_second: u32) -> Seconds {
    if ticks_per_second == 0 {
        return 0;
    }
    ticks / ticks_per_second
}

/// Millisecond part of a tick reading, for `seconds.millis` log lines
pub fn ticks_subsec_millis(ticks: Ticks, ticks_per_second: u32) -> u32 {
    if ticks_per_second == 0 {
        return 0;
    }
    ((ticks % ticks_per_second) as u64 * MS_PER_SECOND as u64 / ticks_per_second as u64) as u32
}

/// Manually driven slot clock for simulation and testing
///
/// Time only moves when [`ManualClock::advance_slots`] or
/// [`ManualClock::fire`] is called. The last armed wake is kept so a driver
/// can jump straight to the next timer event.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Ticks,
    ticks_per_second: u32,
    ticks_per_slot: u32,
    armed: Option<u16>,
}

impl ManualClock {
    /// Clock starting at `start` ticks with the default resolution
    pub fn new(start: Ticks) -> Self {
        Self {
            ticks: start,
            ticks_per_second: TICKS_PER_SECOND,
            ticks_per_slot: (TICKS_PER_SECOND / SLOTS_PER_SECOND).max(1),
            armed: None,
        }
    }

    /// Override the resolution. `ticks_per_slot` is clamped to at least 1.
    pub fn with_resolution(mut self, ticks_per_second: u32, ticks_per_slot: u32) -> Self {
        self.ticks_per_second = ticks_per_second.max(1);
        self.ticks_per_slot = ticks_per_slot.max(1);
        self
    }

    /// Jump to an absolute tick reading
    pub fn set(&mut self, ticks: Ticks) {
        self.ticks = ticks;
    }

    /// Advance by whole slots
    pub fn advance_slots(&mut self, slots: u32) {
        self.ticks = self
            .ticks
            .wrapping_add(slots.wrapping_mul(self.ticks_per_slot));
    }

    /// Pending wake in slots, if one is armed
    pub fn armed(&self) -> Option<u16> {
        self.armed
    }

    /// Advance to the armed wake and disarm it
    ///
    /// Returns the number of slots that elapsed, or `None` when nothing was
    /// armed.
    pub fn fire(&mut self) -> Option<u16> {
        let slots = self.armed.take()?;
        self.advance_slots(slots as u32);
        Some(slots)
    }

    /// Ticks in one slot
    pub fn ticks_per_slot(&self) -> u32 {
        self.ticks_per_slot
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SlotClock for ManualClock {
    fn now(&self) -> Ticks {
        self.ticks
    }

    fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    fn arm_wake(&mut self, slots_ahead: u16) {
        self.armed = Some(slots_ahead);
    }
}
