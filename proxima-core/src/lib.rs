//! Core of the proxima contact detector
//!
//! Duty-cycled neighbour discovery and close-contact tracking for
//! battery-powered radio nodes. Nodes share no clock and no coordinator:
//! each sleeps through most slots of its period, wakes in a few chosen
//! ones to beacon and listen, and tracks how long each neighbour stays
//! within RSSI range.
//!
//! Key constraints:
//! - Runs on a few KB of RAM (CC2650 class)
//! - No heap allocation: fixed tables and `heapless` buffers
//! - One timer callback and one receive callback drive everything
//!
//! ```no_run
//! use proxima_core::{NodeConfig, ProximityTracker, TrackOutcome};
//!
//! let config = NodeConfig::new(7);
//! assert!(config.validate().is_ok());
//!
//! let mut tracker: ProximityTracker = ProximityTracker::new(-63);
//! assert_eq!(tracker.on_beacon_received(3, -50, 0), TrackOutcome::Detected);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod beacon;
pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod node;
pub mod schedule;
pub mod table;
pub mod threshold;
pub mod time;
pub mod tracker;
pub mod traits;

// Public API
pub use beacon::{Beacon, BeaconSender, PeerId, BEACON_LEN};
pub use config::NodeConfig;
pub use errors::{ProximityError, ProximityResult};
pub use events::{EventSink, LogSink, ProximityEvent};
pub use node::{Node, NodeState, NodeStats};
pub use schedule::{SlotSchedule, SlotStrategy, Strategy, StrategyConfig};
pub use table::{ContactRecord, ContactTable};
pub use threshold::{ThresholdPolicy, ThresholdSelection};
pub use tracker::{Departure, ProximityTracker, TrackOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
