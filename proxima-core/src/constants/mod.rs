//! Constants for Proxima Core
//!
//! Centralised protocol parameters. Every default that ends up in
//! [`NodeConfig`](crate::config::NodeConfig) comes from here, so a firmware
//! build and a host simulation agree on the same numbers.
//!
//! ## Organization
//!
//! - **Protocol**: slot counts, burst length, maintenance cadence
//! - **Proximity**: RSSI thresholds and the contact window
//! - **Sensors**: temperature sensor limits used by the threshold policy
//! - **Time**: clock and slot timing
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Include units in the name (`_S`, `_DBM`, `_C`)
//! 3. Values that must agree between peers (slot layout, beacon format)
//!    change only together with a protocol revision

/// Slot layout, burst and maintenance parameters.
pub mod protocol;

/// RSSI thresholds and contact/exposure windows.
pub mod proximity;

/// Temperature sensor operating limits.
pub mod sensors;

/// Clock and slot timing.
pub mod time;

pub use protocol::{
    TOTAL_SLOTS, PROBE_SLOTS, NUM_SEND, MAINTENANCE_FREQ,
    BLIND_DATE_BLOCKS, BLIND_DATE_BLOCK_LEN, BLIND_DATE_STEP,
    MAX_TOTAL_SLOTS, MAX_PROBE_SLOTS, DEFAULT_TABLE_CAPACITY, RNG_SEED_BASE,
};

pub use proximity::{
    INDOOR_RSSI_THRESHOLD_DBM, OUTDOOR_RSSI_THRESHOLD_DBM, TEMP_THRESHOLD_C,
    CONTACT_WINDOW_S, EXPOSURE_WINDOW_S,
};

pub use time::{TICKS_PER_SECOND, SLOTS_PER_SECOND, MS_PER_SECOND};
