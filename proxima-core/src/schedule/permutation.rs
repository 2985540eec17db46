//! Permutation probing
//!
//! The period has `total_slots` slots numbered from 1. Slot 1 is the anchor
//! and is active every period. Half of the period, identities
//! `2..=probe_slots + 1`, is shuffled once at startup; each period the node
//! also wakes in the next slot of that permutation.
//!
//! ```text
//! period:      1  2  3  4  5  6  7 ... 13 14 ... 25
//! period n:    A        P                           (P = permutation[n % 12])
//! period n+1:  A                 P
//! ```
//!
//! Two nodes whose periods are offset by `d` slots meet because one node's
//! anchor falls in the other's probe half, and its probe visits every slot
//! of that half once every `probe_slots` periods.

use heapless::Vec;

use super::SlotStrategy;
use crate::constants::protocol::{MAX_PROBE_SLOTS, MAX_TOTAL_SLOTS};
use crate::errors::{ProximityError, ProximityResult};
use crate::traits::UniformSource;

/// Anchor slot; slots are numbered from 1
pub const ANCHOR_SLOT: u16 = 1;

/// Anchor plus a shuffled probe slot per period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationProbing {
    total_slots: u16,
    permutation: Vec<u16, MAX_PROBE_SLOTS>,
    cursor: usize,
}

impl PermutationProbing {
    /// Shuffle a fresh permutation for a `total_slots` period
    pub fn new<R: UniformSource + ?Sized>(total_slots: u16, rng: &mut R) -> ProximityResult<Self> {
        let probe_slots = Self::check_period(total_slots)?;

        // Pick a random free position for each identity, retrying on
        // occupied ones
        let mut permutation: Vec<u16, MAX_PROBE_SLOTS> = Vec::new();
        permutation
            .resize(probe_slots as usize, 0)
            .map_err(|_| ProximityError::InvalidConfig { reason: "period too long" })?;
        for identity in 2..=probe_slots + 1 {
            loop {
                let idx = rng.uniform(probe_slots as u32) as usize;
                if permutation[idx] == 0 {
                    permutation[idx] = identity;
                    break;
                }
            }
        }

        log_debug!("Permutation is {:?}", permutation.as_slice());

        Ok(Self {
            total_slots,
            permutation,
            cursor: 0,
        })
    }

    /// Use a given permutation of `2..=total_slots / 2 + 1`
    pub fn with_permutation(total_slots: u16, permutation: &[u16]) -> ProximityResult<Self> {
        let probe_slots = Self::check_period(total_slots)?;
        if permutation.len() != probe_slots as usize {
            return Err(ProximityError::InvalidConfig {
                reason: "permutation length must be total_slots / 2",
            });
        }

        let mut seen = [false; MAX_PROBE_SLOTS];
        for &identity in permutation {
            if identity < 2 || identity > probe_slots + 1 || seen[(identity - 2) as usize] {
                return Err(ProximityError::InvalidConfig {
                    reason: "permutation must hold each probe slot once",
                });
            }
            seen[(identity - 2) as usize] = true;
        }

        Ok(Self {
            total_slots,
            permutation: Vec::from_slice(permutation)
                .map_err(|_| ProximityError::InvalidConfig { reason: "period too long" })?,
            cursor: 0,
        })
    }

    fn check_period(total_slots: u16) -> ProximityResult<u16> {
        if total_slots < 4 {
            return Err(ProximityError::InvalidConfig {
                reason: "permutation probing needs at least 4 slots",
            });
        }
        if total_slots > MAX_TOTAL_SLOTS {
            return Err(ProximityError::InvalidConfig { reason: "period too long" });
        }
        Ok(total_slots / 2)
    }

    /// Shuffled probe slots
    pub fn permutation(&self) -> &[u16] {
        &self.permutation
    }

    /// Number of probe slot identities
    pub fn probe_slots(&self) -> u16 {
        self.permutation.len() as u16
    }

    /// Probe slot used in the coming period
    pub fn upcoming_probe(&self) -> u16 {
        self.permutation[self.cursor]
    }
}

impl SlotStrategy for PermutationProbing {
    fn total_slots(&self) -> u16 {
        self.total_slots
    }

    fn anchor_slot(&self) -> u16 {
        ANCHOR_SLOT
    }

    fn next_active(&mut self, current: u16) -> u16 {
        if current != ANCHOR_SLOT {
            return ANCHOR_SLOT;
        }
        let next = self.permutation[self.cursor];
        self.cursor = (self.cursor + 1) % self.permutation.len();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::slot::sleep_slots;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn permutation_holds_each_identity_once() {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(54222 + seed);
            let probing = PermutationProbing::new(25, &mut rng).unwrap();

            let mut identities: std::vec::Vec<u16> = probing.permutation().to_vec();
            identities.sort_unstable();
            assert_eq!(identities, (2..=13).collect::<std::vec::Vec<u16>>());
        }
    }

    #[test]
    fn alternates_anchor_and_probe() {
        let mut probing = PermutationProbing::with_permutation(10, &[4, 2, 6, 3, 5]).unwrap();

        assert_eq!(probing.next_active(ANCHOR_SLOT), 4);
        assert_eq!(probing.next_active(4), ANCHOR_SLOT);
        assert_eq!(probing.next_active(ANCHOR_SLOT), 2);
        assert_eq!(probing.next_active(2), ANCHOR_SLOT);

        // Cursor wraps after the last entry
        for _ in 0..3 {
            probing.next_active(ANCHOR_SLOT);
        }
        assert_eq!(probing.upcoming_probe(), 4);
    }

    #[test]
    fn period_is_total_slots() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut probing = PermutationProbing::new(25, &mut rng).unwrap();

        for _ in 0..24 {
            let probe = probing.next_active(ANCHOR_SLOT);
            let back = probing.next_active(probe);
            // anchor, sleep, probe, sleep, back at anchor
            let slots = 1 + sleep_slots(ANCHOR_SLOT, probe, 25) + 1 + sleep_slots(probe, back, 25);
            assert_eq!(slots, 25);
        }
    }

    #[test]
    fn rejects_bad_permutations() {
        assert!(PermutationProbing::with_permutation(10, &[2, 3, 4, 5]).is_err());
        assert!(PermutationProbing::with_permutation(10, &[2, 3, 4, 5, 5]).is_err());
        assert!(PermutationProbing::with_permutation(10, &[1, 3, 4, 5, 6]).is_err());
        assert!(PermutationProbing::with_permutation(10, &[2, 3, 4, 5, 7]).is_err());
    }

    #[test]
    fn rejects_bad_periods() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(PermutationProbing::new(3, &mut rng).is_err());
        assert!(PermutationProbing::new(MAX_TOTAL_SLOTS + 1, &mut rng).is_err());
        assert!(PermutationProbing::new(MAX_TOTAL_SLOTS, &mut rng).is_ok());
    }
}
