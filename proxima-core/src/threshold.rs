//! RSSI threshold policy
//!
//! Chooses the signal strength a beacon must reach to count as close
//! contact. The same 3 m reads stronger indoors than in the open, so a node
//! can pick its threshold from the ambient temperature once at startup:
//! warm readings suggest sun and open air, cooler ones a building.
//!
//! The choice is made once, before the scheduler starts, and never revisited.

use core::convert::Infallible;

use crate::constants::proximity::{
    INDOOR_RSSI_THRESHOLD_DBM, OUTDOOR_RSSI_THRESHOLD_DBM, TEMP_THRESHOLD_C,
};
use crate::constants::sensors::{SENSOR_RETRY_LIMIT, TEMP_SENSOR_MAX_C, TEMP_SENSOR_MIN_C};
use crate::traits::TemperatureSensor;

/// Signal strength in dBm
pub type Dbm = i16;

/// How the RSSI threshold is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "mode", rename_all = "snake_case"))]
pub enum ThresholdPolicy {
    /// Always use `threshold_dbm`
    Fixed {
        /// Threshold in dBm
        threshold_dbm: Dbm,
    },
    /// Sample temperature once and pick indoor or outdoor
    AdaptiveOnce {
        /// Threshold used at or below `temp_threshold_c`
        indoor_dbm: Dbm,
        /// Threshold used above `temp_threshold_c`
        outdoor_dbm: Dbm,
        /// Switch-over temperature in whole degrees Celsius
        temp_threshold_c: i16,
    },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::AdaptiveOnce {
            indoor_dbm: INDOOR_RSSI_THRESHOLD_DBM,
            outdoor_dbm: OUTDOOR_RSSI_THRESHOLD_DBM,
            temp_threshold_c: TEMP_THRESHOLD_C,
        }
    }
}

/// Where a chosen threshold came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdSource {
    /// Fixed policy
    Fixed,
    /// Picked from a temperature reading
    Measured {
        /// The reading that decided it (°C)
        celsius: f32,
    },
    /// No valid reading arrived; indoor threshold used
    Fallback,
}

/// Result of running a policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSelection {
    /// Active threshold for the rest of the run
    pub threshold_dbm: Dbm,
    /// How it was chosen
    pub source: ThresholdSource,
}

impl ThresholdPolicy {
    /// Fixed threshold
    pub const fn fixed(threshold_dbm: Dbm) -> Self {
        Self::Fixed { threshold_dbm }
    }

    /// Temperature-selected threshold
    pub const fn adaptive(indoor_dbm: Dbm, outdoor_dbm: Dbm, temp_threshold_c: i16) -> Self {
        Self::AdaptiveOnce {
            indoor_dbm,
            outdoor_dbm,
            temp_threshold_c,
        }
    }

    /// Threshold for a given ambient temperature
    ///
    /// The reading is truncated to whole degrees before comparing, so 27.9 °C
    /// against a 27 °C switch-over still selects indoor.
    pub fn for_temperature(&self, celsius: f32) -> Dbm {
        match *self {
            Self::Fixed { threshold_dbm } => threshold_dbm,
            Self::AdaptiveOnce { indoor_dbm, outdoor_dbm, temp_threshold_c } => {
                if (celsius as i32) > temp_threshold_c as i32 {
                    outdoor_dbm
                } else {
                    indoor_dbm
                }
            }
        }
    }

    /// Threshold used when no reading can be obtained
    pub fn fallback(&self) -> Dbm {
        match *self {
            Self::Fixed { threshold_dbm } => threshold_dbm,
            Self::AdaptiveOnce { indoor_dbm, .. } => indoor_dbm,
        }
    }

    /// True if the policy needs a temperature reading
    pub fn needs_sensor(&self) -> bool {
        matches!(self, Self::AdaptiveOnce { .. })
    }

    /// Run the policy to completion against `sensor`
    ///
    /// Each failed read consumes one of `max_checks` periodic checks; the
    /// platform is expected to pace `sensor.read()` itself.
    pub fn select<S: TemperatureSensor>(&self, sensor: &mut S, max_checks: u8) -> ThresholdSelection {
        let mut selector = ThresholdSelector::new(*self, max_checks);
        loop {
            match selector.poll(sensor) {
                Ok(selection) => return selection,
                Err(nb::Error::WouldBlock) => continue,
                Err(nb::Error::Other(never)) => match never {},
            }
        }
    }
}

fn plausible(celsius: f32) -> bool {
    celsius.is_finite() && (TEMP_SENSOR_MIN_C..=TEMP_SENSOR_MAX_C).contains(&celsius)
}

/// Incremental threshold selection, one sensor check per `poll`
///
/// For platforms that check the sensor from a periodic timer:
///
/// ```rust
/// use proxima_core::threshold::{ThresholdPolicy, ThresholdSelector, ThresholdSource};
/// use proxima_core::traits::{TemperatureSensor, SensorFault};
///
/// struct WarmingUp(u8);
///
/// impl TemperatureSensor for WarmingUp {
///     fn read(&mut self) -> nb::Result<f32, SensorFault> {
///         if self.0 > 0 {
///             self.0 -= 1;
///             return Err(nb::Error::WouldBlock);
///         }
///         Ok(28.5)
///     }
/// }
///
/// let mut sensor = WarmingUp(2);
/// let mut selector = ThresholdSelector::new(ThresholdPolicy::adaptive(-63, -70, 27), 5);
///
/// assert!(selector.poll(&mut sensor).is_err());
/// assert!(selector.poll(&mut sensor).is_err());
/// let chosen = selector.poll(&mut sensor).unwrap();
/// assert_eq!(chosen.threshold_dbm, -70);
/// assert_eq!(chosen.source, ThresholdSource::Measured { celsius: 28.5 });
/// ```
#[derive(Debug, Clone)]
pub struct ThresholdSelector {
    policy: ThresholdPolicy,
    checks_left: u8,
    resolved: Option<ThresholdSelection>,
}

impl ThresholdSelector {
    /// Selector allowing `max_checks` sensor reads
    pub fn new(policy: ThresholdPolicy, max_checks: u8) -> Self {
        let resolved = match policy {
            ThresholdPolicy::Fixed { threshold_dbm } => Some(ThresholdSelection {
                threshold_dbm,
                source: ThresholdSource::Fixed,
            }),
            ThresholdPolicy::AdaptiveOnce { .. } => None,
        };
        Self {
            policy,
            checks_left: max_checks,
            resolved,
        }
    }

    /// Selector with the default retry budget
    pub fn with_default_budget(policy: ThresholdPolicy) -> Self {
        Self::new(policy, SENSOR_RETRY_LIMIT)
    }

    /// Perform one periodic check
    ///
    /// `WouldBlock` means the sensor is still warming up and checks remain.
    /// Once resolved, later polls return the same selection without touching
    /// the sensor.
    pub fn poll<S: TemperatureSensor>(&mut self, sensor: &mut S) -> nb::Result<ThresholdSelection, Infallible> {
        if let Some(selection) = self.resolved {
            return Ok(selection);
        }

        if self.checks_left == 0 {
            return Ok(self.finish());
        }
        self.checks_left -= 1;

        match sensor.read() {
            Ok(celsius) if plausible(celsius) => {
                let selection = ThresholdSelection {
                    threshold_dbm: self.policy.for_temperature(celsius),
                    source: ThresholdSource::Measured { celsius },
                };
                log_info!(
                    "Temp: {} C, RSSI threshold of {} will be used",
                    celsius as i32,
                    selection.threshold_dbm
                );
                self.resolved = Some(selection);
                Ok(selection)
            }
            Ok(celsius) => {
                log_warn!("Discarding implausible temperature reading {} C", celsius as i32);
                self.retry_or_finish()
            }
            Err(nb::Error::WouldBlock) => {
                log_debug!("Temperature sensor warming up, {} checks left", self.checks_left);
                self.retry_or_finish()
            }
            Err(nb::Error::Other(_fault)) => {
                log_warn!("Temperature read failed, {} checks left", self.checks_left);
                self.retry_or_finish()
            }
        }
    }

    fn retry_or_finish(&mut self) -> nb::Result<ThresholdSelection, Infallible> {
        if self.checks_left == 0 {
            Ok(self.finish())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    /// Stop waiting and settle on the result so far (fallback if unresolved)
    pub fn finish(&mut self) -> ThresholdSelection {
        if let Some(selection) = self.resolved {
            return selection;
        }
        let selection = ThresholdSelection {
            threshold_dbm: self.policy.fallback(),
            source: ThresholdSource::Fallback,
        };
        log_warn!(
            "No valid temperature reading, falling back to indoor RSSI threshold of {}",
            selection.threshold_dbm
        );
        self.resolved = Some(selection);
        selection
    }

    /// The selection, once resolved
    pub fn selection(&self) -> Option<ThresholdSelection> {
        self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SensorFault;

    /// Sensor replaying a scripted sequence of reads
    struct Scripted<'a> {
        reads: &'a [nb::Result<f32, SensorFault>],
        calls: usize,
    }

    impl<'a> Scripted<'a> {
        fn new(reads: &'a [nb::Result<f32, SensorFault>]) -> Self {
            Self { reads, calls: 0 }
        }
    }

    impl TemperatureSensor for Scripted<'_> {
        fn read(&mut self) -> nb::Result<f32, SensorFault> {
            let read = self
                .reads
                .get(self.calls)
                .cloned()
                .unwrap_or(Err(nb::Error::WouldBlock));
            self.calls += 1;
            read
        }
    }

    const POLICY: ThresholdPolicy = ThresholdPolicy::adaptive(-63, -70, 27);

    #[test]
    fn warm_reading_selects_outdoor() {
        let mut sensor = Scripted::new(&[Ok(28.0)]);
        assert_eq!(POLICY.select(&mut sensor, 3).threshold_dbm, -70);
    }

    #[test]
    fn cool_reading_selects_indoor() {
        let mut sensor = Scripted::new(&[Ok(26.0)]);
        assert_eq!(POLICY.select(&mut sensor, 3).threshold_dbm, -63);
    }

    #[test]
    fn switch_over_uses_whole_degrees() {
        assert_eq!(POLICY.for_temperature(27.0), -63);
        assert_eq!(POLICY.for_temperature(27.9), -63);
        assert_eq!(POLICY.for_temperature(28.0), -70);
    }

    #[test]
    fn warming_up_is_retried() {
        let reads = [
            Err(nb::Error::WouldBlock),
            Err(nb::Error::Other(SensorFault::ReadingError)),
            Ok(30.0),
        ];
        let mut sensor = Scripted::new(&reads);

        let selection = POLICY.select(&mut sensor, 5);
        assert_eq!(selection.threshold_dbm, -70);
        assert_eq!(selection.source, ThresholdSource::Measured { celsius: 30.0 });
        assert_eq!(sensor.calls, 3);
    }

    #[test]
    fn never_ready_falls_back_to_indoor() {
        let mut sensor = Scripted::new(&[]);

        let selection = POLICY.select(&mut sensor, 4);
        assert_eq!(selection.threshold_dbm, -63);
        assert_eq!(selection.source, ThresholdSource::Fallback);
        assert_eq!(sensor.calls, 4);
    }

    #[test]
    fn implausible_reading_is_retried() {
        let reads = [Ok(f32::NAN), Ok(400.0), Ok(20.0)];
        let mut sensor = Scripted::new(&reads);

        let selection = POLICY.select(&mut sensor, 5);
        assert_eq!(selection.source, ThresholdSource::Measured { celsius: 20.0 });
    }

    #[test]
    fn fixed_policy_never_reads() {
        let mut sensor = Scripted::new(&[Ok(40.0)]);
        let selection = ThresholdPolicy::fixed(-60).select(&mut sensor, 3);

        assert_eq!(selection.threshold_dbm, -60);
        assert_eq!(selection.source, ThresholdSource::Fixed);
        assert_eq!(sensor.calls, 0);
    }

    #[test]
    fn selection_is_immutable_once_resolved() {
        let reads = [Ok(26.0), Ok(35.0)];
        let mut sensor = Scripted::new(&reads);
        let mut selector = ThresholdSelector::new(POLICY, 5);

        let first = selector.poll(&mut sensor).unwrap();
        let second = selector.poll(&mut sensor).unwrap();
        assert_eq!(first, second);
        assert_eq!(sensor.calls, 1);
    }

    #[test]
    fn zero_budget_falls_back_immediately() {
        let mut sensor = Scripted::new(&[Ok(30.0)]);
        let selection = POLICY.select(&mut sensor, 0);
        assert_eq!(selection.source, ThresholdSource::Fallback);
        assert_eq!(sensor.calls, 0);
    }
}
