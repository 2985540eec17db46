//! Temperature Sensor Limits
//!
//! The threshold policy only needs to tell "indoors" from "outdoors", but a
//! reading outside the sensor's operating range is a fault, not weather.

/// Minimum operating temperature of the on-board sensor (°C).
///
/// Source: HDC1000 datasheet
pub const TEMP_SENSOR_MIN_C: f32 = -40.0;

/// Maximum operating temperature of the on-board sensor (°C).
///
/// Source: HDC1000 datasheet
pub const TEMP_SENSOR_MAX_C: f32 = 125.0;

/// Periodic checks spent waiting for a valid temperature reading before the
/// threshold policy falls back to the indoor threshold.
///
/// At one check per second this covers the sensor's warm-up time.
pub const SENSOR_RETRY_LIMIT: u8 = 10;
