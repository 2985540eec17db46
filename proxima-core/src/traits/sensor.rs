//! Ambient temperature sensor
//!
//! Consumed exactly once per run by the
//! [`ThresholdPolicy`](crate::threshold::ThresholdPolicy). The read is
//! non-blocking in the `nb` style: a sensor that is still warming up returns
//! `WouldBlock` and is asked again on the next periodic check.
//!
//! ```rust
//! use proxima_core::traits::{TemperatureSensor, SensorFault};
//!
//! struct Hdc1000 {
//!     ready: bool,
//!     centi_celsius: i32,
//! }
//!
//! impl TemperatureSensor for Hdc1000 {
//!     fn read(&mut self) -> nb::Result<f32, SensorFault> {
//!         if !self.ready {
//!             return Err(nb::Error::WouldBlock);
//!         }
//!         Ok(self.centi_celsius as f32 / 100.0)
//!     }
//! }
//! ```

/// Hard sensor failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Bus transaction failed
    Bus,
    /// Sensor returned its error marker
    ReadingError,
}

/// Temperature sensor reporting degrees Celsius
pub trait TemperatureSensor {
    /// Take one reading
    ///
    /// - `Ok(celsius)` - valid reading
    /// - `Err(nb::Error::WouldBlock)` - warming up, try again later
    /// - `Err(nb::Error::Other(fault))` - failed read, also retried
    fn read(&mut self) -> nb::Result<f32, SensorFault>;
}
