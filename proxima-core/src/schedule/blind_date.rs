//! Blind Date: forward and backward probing
//!
//! The period of `blocks × block_len` slots, numbered from 0, ends with the
//! anchor slot. Two probe cursors start in distinct random blocks:
//!
//! ```text
//! blocks:   [ 0  1  2  3  4 ][ 5  6  7  8  9 ][10 11 12 13 14 ] ... [20 .. 24]
//!             F→                                          ←B                A
//! ```
//!
//! - the forward cursor `F` starts on the first slot of its block and moves
//!   `step` slots later every period, wrapping to the block start
//! - the backward cursor `B` starts on the last slot of its block and moves
//!   `step` slots earlier every period, wrapping to the block end
//!
//! A cursor never leaves its block. With `step` coprime to the block length
//! it visits every slot of the block once per `block_len` periods, so a
//! neighbour whose anchor falls inside one of our cursor blocks is heard
//! within that many periods. The two cursors sweep in opposite directions,
//! so their phase against a neighbour's cursors keeps changing.
//!
//! Each cursor fires at most once per period: its flag is cleared when it
//! fires and set again at the anchor, where the cursors also move.

use super::slot::{advance_in_block, block_end, block_start, retreat_in_block};
use super::SlotStrategy;
use crate::constants::protocol::MAX_TOTAL_SLOTS;
use crate::errors::{ProximityError, ProximityResult};
use crate::traits::UniformSource;

/// Anchor, forward probe and backward probe per period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlindDate {
    blocks: u16,
    block_len: u16,
    step: u16,
    forward: u16,
    backward: u16,
    forward_armed: bool,
    backward_armed: bool,
    periods: u32,
}

impl BlindDate {
    /// Place both cursors in distinct random blocks
    pub fn new<R: UniformSource + ?Sized>(
        blocks: u16,
        block_len: u16,
        step: u16,
        rng: &mut R,
    ) -> ProximityResult<Self> {
        Self::check_layout(blocks, block_len, step)?;

        let forward_block = rng.uniform(blocks as u32) as u16;
        let backward_block = loop {
            let block = rng.uniform(blocks as u32) as u16;
            if block != forward_block {
                break block;
            }
        };

        Self::with_blocks(blocks, block_len, step, forward_block, backward_block)
    }

    /// Place the cursors in the given blocks
    pub fn with_blocks(
        blocks: u16,
        block_len: u16,
        step: u16,
        forward_block: u16,
        backward_block: u16,
    ) -> ProximityResult<Self> {
        Self::check_layout(blocks, block_len, step)?;
        if forward_block >= blocks || backward_block >= blocks || forward_block == backward_block {
            return Err(ProximityError::InvalidConfig {
                reason: "probe cursors need two distinct blocks",
            });
        }

        let forward = block_start(forward_block, block_len);
        let backward = block_end(backward_block, block_len);
        log_debug!("Blind Date probes start at {} and {}", forward, backward);

        Ok(Self {
            blocks,
            block_len,
            step,
            forward,
            backward,
            forward_armed: true,
            backward_armed: true,
            periods: 0,
        })
    }

    fn check_layout(blocks: u16, block_len: u16, step: u16) -> ProximityResult<()> {
        if blocks < 2 {
            return Err(ProximityError::InvalidConfig {
                reason: "blind date needs at least 2 blocks",
            });
        }
        if block_len == 0 {
            return Err(ProximityError::InvalidConfig { reason: "block length must be non-zero" });
        }
        let total = blocks as u32 * block_len as u32;
        if total > MAX_TOTAL_SLOTS as u32 {
            return Err(ProximityError::InvalidConfig { reason: "period too long" });
        }
        if step == 0 || step >= block_len {
            return Err(ProximityError::InvalidConfig {
                reason: "probe step must be between 1 and the block length",
            });
        }
        Ok(())
    }

    /// Number of blocks
    pub fn blocks(&self) -> u16 {
        self.blocks
    }

    /// Slots per block
    pub fn block_len(&self) -> u16 {
        self.block_len
    }

    /// Forward cursor position
    pub fn forward_probe(&self) -> u16 {
        self.forward
    }

    /// Backward cursor position
    pub fn backward_probe(&self) -> u16 {
        self.backward
    }

    /// Completed periods
    pub fn periods(&self) -> u32 {
        self.periods
    }

    /// True if the node wakes in `slot` during the current period
    pub fn is_active(&self, slot: u16) -> bool {
        slot == self.anchor_slot()
            || (self.forward_armed && slot == self.forward)
            || (self.backward_armed && slot == self.backward)
    }

    fn total(&self) -> u16 {
        self.blocks * self.block_len
    }

    fn on_anchor(&mut self) {
        // The first anchor opens the first period at the initial positions
        if self.periods > 0 {
            self.forward = advance_in_block(self.forward, self.step, self.block_len);
            self.backward = retreat_in_block(self.backward, self.step, self.block_len);
        }
        self.periods = self.periods.wrapping_add(1);
        self.forward_armed = true;
        self.backward_armed = true;
    }
}

impl SlotStrategy for BlindDate {
    fn total_slots(&self) -> u16 {
        self.total()
    }

    fn anchor_slot(&self) -> u16 {
        self.total() - 1
    }

    fn next_active(&mut self, current: u16) -> u16 {
        if current == self.anchor_slot() {
            self.on_anchor();
        } else {
            if current == self.forward {
                self.forward_armed = false;
            }
            if current == self.backward {
                self.backward_armed = false;
            }
        }

        let total = self.total();
        (1..=total)
            .map(|distance| ((current as u32 + distance as u32) % total as u32) as u16)
            .find(|&slot| self.is_active(slot))
            .unwrap_or_else(|| self.anchor_slot())
    }
}
