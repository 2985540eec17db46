//! Slot Clock Abstraction
//!
//! The slot clock converts a periodic hardware timer into slot boundaries.
//! The core never sleeps on its own: after each timer event it tells the
//! clock how many slots to wait, and the platform calls back into
//! [`Node::on_timer_fired`](crate::node::Node::on_timer_fired) when they
//! have elapsed.

use crate::time::Ticks;

/// Free-running slot clock
///
/// ## Implementation Requirements
///
/// - `now()` is monotonic apart from counter wraparound
/// - `arm_wake()` replaces any previously armed wake
/// - Exactly one timer event is delivered per armed wake
///
/// ## Example Implementation
///
/// ```rust
/// use proxima_core::traits::SlotClock;
/// use proxima_core::time::Ticks;
///
/// struct RtcSlotTimer {
///     compare: u32,
/// }
///
/// impl SlotClock for RtcSlotTimer {
///     fn now(&self) -> Ticks {
///         0 // read the RTC counter
///     }
///
///     fn ticks_per_second(&self) -> u32 {
///         128
///     }
///
///     fn arm_wake(&mut self, slots_ahead: u16) {
///         // 1/64 s slots on a 128 Hz clock
///         self.compare = self.now() + slots_ahead as u32 * 2;
///     }
/// }
/// ```
pub trait SlotClock {
    /// Current clock reading in ticks since boot
    fn now(&self) -> Ticks;

    /// Clock resolution
    fn ticks_per_second(&self) -> u32;

    /// Schedule the next timer event `slots_ahead` slot boundaries from now
    fn arm_wake(&mut self, slots_ahead: u16);
}
