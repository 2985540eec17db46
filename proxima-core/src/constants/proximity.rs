//! Proximity Thresholds
//!
//! RSSI cut-offs approximating a 3 m radius on 2.4 GHz radios, and the
//! windows that turn raw detections into contacts.

// ===== RSSI THRESHOLDS =====

/// RSSI threshold for indoor deployments (dBm).
///
/// Walls and furniture reflect energy back, so the same distance reads
/// stronger indoors.
///
/// Source: field calibration at 3 m on CC2650 boards
pub const INDOOR_RSSI_THRESHOLD_DBM: i16 = -63;

/// RSSI threshold for outdoor deployments (dBm).
///
/// Source: field calibration at 3 m on CC2650 boards
pub const OUTDOOR_RSSI_THRESHOLD_DBM: i16 = -70;

/// Ambient temperature above which the node assumes it is outdoors (°C).
///
/// Compared against whole degrees.
pub const TEMP_THRESHOLD_C: i16 = 27;

// ===== CONTACT WINDOWS =====

/// Seconds without a detection before a peer counts as departed.
pub const CONTACT_WINDOW_S: u32 = 30;

/// Seconds of continuous contact that count as an exposure.
pub const EXPOSURE_WINDOW_S: u32 = 30;
