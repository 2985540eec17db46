//! Node configuration
//!
//! Everything that differs between two nodes running the same firmware
//! image. Defaults come from [`crate::constants`]; a host simulation usually
//! only overrides `node_id`, while a field trial may load a whole
//! configuration from JSON:
//!
//! ```json
//! {
//!   "node_id": 7,
//!   "strategy": { "kind": "blind_date", "blocks": 5, "block_len": 5, "step": 1 },
//!   "threshold": { "mode": "fixed", "threshold_dbm": -65 }
//! }
//! ```
//!
//! Missing fields keep their defaults.

use crate::beacon::PeerId;
use crate::constants::protocol::{MAINTENANCE_FREQ, NUM_SEND, RNG_SEED_BASE};
use crate::constants::sensors::SENSOR_RETRY_LIMIT;
use crate::errors::{ProximityError, ProximityResult};
use crate::schedule::StrategyConfig;
use crate::threshold::ThresholdPolicy;

/// Per-node configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeConfig {
    /// Identity carried in every beacon
    pub node_id: PeerId,
    /// Slot selection strategy and period layout
    pub strategy: StrategyConfig,
    /// Beacon copies per active slot
    pub num_send: u8,
    /// Anchor visits between maintenance sweeps
    pub maintenance_freq: u16,
    /// RSSI threshold policy
    pub threshold: ThresholdPolicy,
    /// Temperature checks before falling back to the indoor threshold
    pub sensor_retry_limit: u8,
    /// Added to `node_id` to seed the schedule's random source
    pub rng_seed_base: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: 0,
            strategy: StrategyConfig::default(),
            num_send: NUM_SEND,
            maintenance_freq: MAINTENANCE_FREQ,
            threshold: ThresholdPolicy::default(),
            sensor_retry_limit: SENSOR_RETRY_LIMIT,
            rng_seed_base: RNG_SEED_BASE,
        }
    }
}

impl NodeConfig {
    /// Default configuration for `node_id`
    pub fn new(node_id: PeerId) -> Self {
        Self { node_id, ..Self::default() }
    }

    /// Set the slot strategy
    pub fn with_strategy(mut self, strategy: StrategyConfig) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the burst length
    pub fn with_num_send(mut self, num_send: u8) -> Self {
        self.num_send = num_send;
        self
    }

    /// Set the maintenance cadence
    pub fn with_maintenance_freq(mut self, maintenance_freq: u16) -> Self {
        self.maintenance_freq = maintenance_freq;
        self
    }

    /// Set the threshold policy
    pub fn with_threshold(mut self, threshold: ThresholdPolicy) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the sensor check budget
    pub fn with_sensor_retry_limit(mut self, limit: u8) -> Self {
        self.sensor_retry_limit = limit;
        self
    }

    /// Set the RNG seed base
    pub fn with_rng_seed_base(mut self, base: u64) -> Self {
        self.rng_seed_base = base;
        self
    }

    /// Seed for this node's schedule
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed_base.wrapping_add(self.node_id as u64)
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> ProximityResult<()> {
        self.strategy.validate()?;

        if self.num_send == 0 {
            return Err(ProximityError::InvalidConfig {
                reason: "num_send must be at least 1",
            });
        }
        if u32::from(self.num_send) * self.strategy.wakes_per_period() > self.strategy.total_slots() {
            return Err(ProximityError::InvalidConfig {
                reason: "bursts do not fit in one period",
            });
        }
        if self.maintenance_freq == 0 {
            return Err(ProximityError::InvalidConfig {
                reason: "maintenance_freq must be at least 1",
            });
        }
        if let ThresholdPolicy::AdaptiveOnce { indoor_dbm, outdoor_dbm, .. } = self.threshold {
            // Open air attenuates less, so outdoors needs the weaker threshold
            if outdoor_dbm > indoor_dbm {
                return Err(ProximityError::InvalidConfig {
                    reason: "outdoor threshold must not exceed indoor threshold",
                });
            }
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
pub use loader::{ConfigError, from_json, from_json_file};

#[cfg(feature = "std")]
mod loader {
    use std::path::Path;

    use thiserror_no_std::Error;

    use super::NodeConfig;
    use crate::errors::ProximityError;

    /// Failure to load a configuration
    #[derive(Error, Debug)]
    pub enum ConfigError {
        /// File could not be read
        #[error("Failed to read config file: {0}")]
        Io(#[from] std::io::Error),

        /// Not valid JSON, or wrong field types
        #[error("Failed to parse config: {0}")]
        Parse(#[from] serde_json::Error),

        /// Parsed but rejected by [`NodeConfig::validate`]
        #[error(transparent)]
        Invalid(#[from] ProximityError),
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<NodeConfig, ConfigError> {
        let config: NodeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<NodeConfig, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        from_json(&json)
    }
}
