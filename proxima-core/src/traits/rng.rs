//! Uniform random source
//!
//! Schedule generation only needs integers in `[0, bound)`. Any
//! `rand_core::RngCore` provides them, which covers hardware TRNG drivers
//! and seeded software generators alike.

use rand_core::RngCore;

/// Source of uniformly distributed integers
pub trait UniformSource {
    /// Integer in `[0, bound)`. `bound` must be non-zero.
    fn uniform(&mut self, bound: u32) -> u32;
}

impl<R: RngCore> UniformSource for R {
    fn uniform(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        if bound == 0 {
            return 0;
        }
        // Rejection zone keeps the result unbiased for bounds that do not
        // divide 2^32.
        let zone = u32::MAX - (u32::MAX - bound + 1) % bound;
        loop {
            let value = self.next_u32();
            if value <= zone {
                return value % bound;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn uniform_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(54222);
        for bound in [1u32, 2, 12, 25, 1000] {
            for _ in 0..200 {
                assert!(rng.uniform(bound) < bound);
            }
        }
    }

    #[test]
    fn uniform_covers_small_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = [false; 12];
        for _ in 0..1000 {
            seen[rng.uniform(12) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
