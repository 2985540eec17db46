//! Error Types for Contact Tracking and Scheduling
//!
//! ## Design Philosophy
//!
//! Nothing in the core is fatal. A battery-powered node that stops running
//! detects nobody, so every failure degrades detection instead of halting:
//!
//! 1. **Small Size**: errors are `Copy` and carry only inline data, since
//!    they are produced inside the timer and receive paths.
//!
//! 2. **No Heap Allocation**: reasons are `&'static str`.
//!
//! 3. **Absence Is Not an Error**: looking up or removing a peer that is not
//!    tracked returns `None`. Only conditions that lose information get a
//!    variant here.
//!
//! ## Error Categories
//!
//! - `TableFull`: the contact table has no free slot; the detection is
//!   dropped and logged
//! - `MalformedBeacon`: a received frame has the wrong length; discarded
//! - `SensorWarmingUp`: the temperature sensor has no reading yet; retried,
//!   then the indoor threshold is used
//! - `InvalidConfig`: a configuration that cannot produce a schedule
//!
//! ```rust
//! use proxima_core::{ContactTable, ProximityError};
//!
//! let mut table: ContactTable<1> = ContactTable::new();
//! table.insert(7, 0).unwrap();
//!
//! match table.insert(8, 0) {
//!     Err(ProximityError::TableFull { capacity }) => assert_eq!(capacity, 1),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for proximity operations
pub type ProximityResult<T> = Result<T, ProximityError>;

/// Proximity errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityError {
    /// No free or tombstoned slot left in the contact table
    #[error("Contact table full ({capacity} entries)")]
    TableFull {
        /// Table capacity at the time of the insert
        capacity: usize,
    },

    /// Received frame does not match the beacon size
    #[error("Malformed beacon: {len} bytes, expected {expected}")]
    MalformedBeacon {
        /// Length of the received frame
        len: usize,
        /// Length of a well-formed beacon
        expected: usize,
    },

    /// Temperature sensor has not produced a valid reading yet
    #[error("Temperature sensor warming up")]
    SensorWarmingUp,

    /// Configuration cannot be used to build a node
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong with it
        reason: &'static str,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ProximityError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::TableFull { capacity } =>
                defmt::write!(fmt, "Table full ({} entries)", capacity),
            Self::MalformedBeacon { len, expected } =>
                defmt::write!(fmt, "Malformed beacon: {} bytes, expected {}", len, expected),
            Self::SensorWarmingUp =>
                defmt::write!(fmt, "Sensor warming up"),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid config: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_small() {
        assert!(core::mem::size_of::<ProximityError>() <= 24);
    }

    #[cfg(feature = "std")]
    #[test]
    fn display_messages() {
        let err = ProximityError::MalformedBeacon { len: 3, expected: 12 };
        assert_eq!(err.to_string(), "Malformed beacon: 3 bytes, expected 12");

        let err = ProximityError::TableFull { capacity: 20 };
        assert_eq!(err.to_string(), "Contact table full (20 entries)");
    }
}
