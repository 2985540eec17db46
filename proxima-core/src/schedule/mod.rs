//! Rendezvous Slot Scheduling
//!
//! Nodes share no clock. Each divides time into slots of equal length,
//! grouped into periods, and keeps its radio off except in a few active
//! slots per period. Two neighbours discover each other when one of their
//! active slots overlaps.
//!
//! ## Strategies
//!
//! | Strategy | Slots | Active per period | Module |
//! |----------|-------|-------------------|--------|
//! | Permutation probing | 1-indexed, anchor 1 | anchor + 1 probe | [`permutation`] |
//! | Blind Date | 0-indexed, anchor last | anchor + up to 2 probes | [`blind_date`] |
//!
//! Both implement [`SlotStrategy`]: given the active slot just finished,
//! they name the next one. [`SlotSchedule`] adds what they share, sleep
//! length and the maintenance cadence, and [`Strategy`] picks one at
//! runtime from a [`StrategyConfig`].
//!
//! ## Example
//!
//! ```rust
//! use proxima_core::schedule::{SlotSchedule, Strategy, StrategyConfig};
//! use rand_chacha::ChaCha8Rng;
//! use rand_core::SeedableRng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(54222);
//! let strategy = Strategy::from_config(&StrategyConfig::default(), &mut rng).unwrap();
//! let mut schedule = SlotSchedule::new(strategy, 3);
//!
//! let plan = schedule.advance();
//! assert!(plan.sleep_slots < 25);
//! ```

pub mod blind_date;
pub mod permutation;
pub mod slot;

pub use blind_date::BlindDate;
pub use permutation::PermutationProbing;
pub use slot::sleep_slots;

use crate::constants::protocol::{
    BLIND_DATE_BLOCKS, BLIND_DATE_BLOCK_LEN, BLIND_DATE_STEP, MAX_TOTAL_SLOTS, TOTAL_SLOTS,
};
use crate::errors::{ProximityError, ProximityResult};
use crate::traits::UniformSource;

/// Slot selection policy
///
/// Implementations own whatever per-period state they need (cursors,
/// flags) and are only ever asked about the slot the node just finished.
pub trait SlotStrategy {
    /// Slots per period
    fn total_slots(&self) -> u16;

    /// Slot that is active every period
    fn anchor_slot(&self) -> u16;

    /// Next active slot after `current`
    ///
    /// Called exactly once per active slot, in order. The result may lie in
    /// the following period.
    fn next_active(&mut self, current: u16) -> u16;
}

/// Which strategy a node runs, with its layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StrategyConfig {
    /// Anchor plus shuffled probe
    Permutation {
        /// Slots per period
        total_slots: u16,
    },
    /// Anchor plus forward and backward probes
    BlindDate {
        /// Number of blocks
        blocks: u16,
        /// Slots per block
        block_len: u16,
        /// Cursor movement per period
        step: u16,
    },
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::Permutation { total_slots: TOTAL_SLOTS }
    }
}

impl StrategyConfig {
    /// Default Blind Date layout
    pub const fn blind_date() -> Self {
        Self::BlindDate {
            blocks: BLIND_DATE_BLOCKS,
            block_len: BLIND_DATE_BLOCK_LEN,
            step: BLIND_DATE_STEP,
        }
    }

    /// Slots per period
    pub fn total_slots(&self) -> u32 {
        match *self {
            Self::Permutation { total_slots } => total_slots as u32,
            Self::BlindDate { blocks, block_len, .. } => blocks as u32 * block_len as u32,
        }
    }

    /// Most active slots in one period
    pub fn wakes_per_period(&self) -> u32 {
        match self {
            Self::Permutation { .. } => 2,
            Self::BlindDate { .. } => 3,
        }
    }

    /// Check the layout without building a schedule
    pub fn validate(&self) -> ProximityResult<()> {
        let total = self.total_slots();
        if total > MAX_TOTAL_SLOTS as u32 {
            return Err(ProximityError::InvalidConfig { reason: "period too long" });
        }
        match *self {
            Self::Permutation { total_slots } if total_slots < 4 => Err(ProximityError::InvalidConfig {
                reason: "permutation probing needs at least 4 slots",
            }),
            Self::BlindDate { blocks, .. } if blocks < 2 => Err(ProximityError::InvalidConfig {
                reason: "blind date needs at least 2 blocks",
            }),
            Self::BlindDate { block_len: 0, .. } => Err(ProximityError::InvalidConfig {
                reason: "block length must be non-zero",
            }),
            Self::BlindDate { block_len, step, .. } if step == 0 || step >= block_len => {
                Err(ProximityError::InvalidConfig {
                    reason: "probe step must be between 1 and the block length",
                })
            }
            _ => Ok(()),
        }
    }
}

/// Runtime-selected strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Permutation probing
    Permutation(PermutationProbing),
    /// Blind Date
    BlindDate(BlindDate),
}

impl Strategy {
    /// Build the configured strategy, drawing its random layout from `rng`
    pub fn from_config<R: UniformSource + ?Sized>(
        config: &StrategyConfig,
        rng: &mut R,
    ) -> ProximityResult<Self> {
        match *config {
            StrategyConfig::Permutation { total_slots } => {
                PermutationProbing::new(total_slots, rng).map(Self::Permutation)
            }
            StrategyConfig::BlindDate { blocks, block_len, step } => {
                BlindDate::new(blocks, block_len, step, rng).map(Self::BlindDate)
            }
        }
    }

    /// Short name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::Permutation(_) => "permutation",
            Self::BlindDate(_) => "blind-date",
        }
    }
}

impl SlotStrategy for Strategy {
    fn total_slots(&self) -> u16 {
        match self {
            Self::Permutation(s) => s.total_slots(),
            Self::BlindDate(s) => s.total_slots(),
        }
    }

    fn anchor_slot(&self) -> u16 {
        match self {
            Self::Permutation(s) => s.anchor_slot(),
            Self::BlindDate(s) => s.anchor_slot(),
        }
    }

    fn next_active(&mut self, current: u16) -> u16 {
        match self {
            Self::Permutation(s) => s.next_active(current),
            Self::BlindDate(s) => s.next_active(current),
        }
    }
}

/// What to do after an active slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPlan {
    /// Active slot that just ended
    pub completed_slot: u16,
    /// Next active slot
    pub next_slot: u16,
    /// Slots to sleep before `next_slot`, in `[0, total_slots - 1]`
    pub sleep_slots: u16,
    /// True if `completed_slot` was the anchor
    pub anchor: bool,
    /// True if the contact table is due for a sweep
    pub run_maintenance: bool,
}

/// Strategy plus the state shared by every strategy
#[derive(Debug, Clone)]
pub struct SlotSchedule<S: SlotStrategy = Strategy> {
    strategy: S,
    current_slot: u16,
    anchor_visits: u32,
    maintenance_freq: u16,
}

impl<S: SlotStrategy> SlotSchedule<S> {
    /// Schedule positioned on the anchor slot
    ///
    /// A sweep is requested every `maintenance_freq` anchor visits; zero
    /// disables sweeps.
    pub fn new(strategy: S, maintenance_freq: u16) -> Self {
        let current_slot = strategy.anchor_slot();
        Self {
            strategy,
            current_slot,
            anchor_visits: 0,
            maintenance_freq,
        }
    }

    /// Active slot the node is in, or will wake in next
    pub fn current_slot(&self) -> u16 {
        self.current_slot
    }

    /// Slots per period
    pub fn total_slots(&self) -> u16 {
        self.strategy.total_slots()
    }

    /// Anchor slots completed so far
    pub fn anchor_visits(&self) -> u32 {
        self.anchor_visits
    }

    /// Underlying strategy
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Finish the current active slot and move to the next one
    pub fn advance(&mut self) -> SlotPlan {
        let completed = self.current_slot;
        let anchor = completed == self.strategy.anchor_slot();

        let mut run_maintenance = false;
        if anchor {
            self.anchor_visits = self.anchor_visits.wrapping_add(1);
            run_maintenance = self.maintenance_freq > 0
                && self.anchor_visits % self.maintenance_freq as u32 == 0;
        }

        let next = self.strategy.next_active(completed);
        let sleep = sleep_slots(completed, next, self.strategy.total_slots());
        self.current_slot = next;

        SlotPlan {
            completed_slot: completed,
            next_slot: next,
            sleep_slots: sleep,
            anchor,
            run_maintenance,
        }
    }
}
