//! Deterministic PRNG for simulation use (maintenance problem injection).
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable. Each controller owns
//! its own generator so a fixed seed replays the exact degradation sequence.

use crate::fixed::Fixed64;

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform draw in `[0, bound)`. `bound` of 0 or 1 always yields 0.
    ///
    /// Maps the upper 32 PRNG bits through a widening multiply, the same
    /// scheme [`SimRng::chance`] uses, so no modulo is involved.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        let upper = self.next_u64() >> 32;
        ((upper * bound as u64) >> 32) as u32
    }

    /// Returns `true` with the given probability (Fixed64 in [0, 1]).
    ///
    /// - probability <= 0 always returns false
    /// - probability >= 1 always returns true
    pub fn chance(&mut self, probability: Fixed64) -> bool {
        if probability <= Fixed64::ZERO {
            return false;
        }
        if probability >= Fixed64::from_num(1) {
            return true;
        }
        // Fixed64 is Q32.32 (I32F32). For p in (0,1), the raw bits hold
        // the fractional part in the lower 32 bits (integer part = 0), so
        // they equal p scaled to [0, 2^32). Compare a uniform u32 from the
        // upper PRNG bits against that.
        let upper = (self.next_u64() >> 32) as u32;
        (upper as u64) < probability.to_bits() as u64
    }

    /// Get the internal state (for inspection in tests).
    pub fn state(&self) -> u64 {
        self.state
    }
}
