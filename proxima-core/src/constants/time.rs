//! Time-Related Constants
//!
//! Clock resolution and slot timing.

/// Milliseconds per second.
pub const MS_PER_SECOND: u32 = 1000;

/// Default slot clock resolution (ticks per second).
///
/// Matches a 128 Hz system clock.
pub const TICKS_PER_SECOND: u32 = 128;

/// Slots per second.
///
/// A slot is 1/64 s (15.6 ms), long enough for one beacon exchange.
pub const SLOTS_PER_SECOND: u32 = 64;
