// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled with no RNG crate so that a seed always replays the same
// verse on every platform.
//
// This crate is the only randomness source in rhymewalk: anchor phrase
// choice, content-word shuffling, frequency-weighted chain sampling, and the
// per-seed child streams handed to parallel reverse walks all draw from a
// `WalkRng`. Tests pin a seed; the CLI seeds from the clock and logs the
// seed so a production request can be replayed.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state. No floating point in the core
// generator, no stdlib or OS randomness in this module.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG.
///
/// Each generation request owns one `WalkRng`. Work that may run on another
/// thread gets its own generator via [`WalkRng::fork`], drawn in a fixed
/// order, so results do not depend on scheduling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalkRng {
    s: [u64; 4],
}

impl WalkRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        // = (2^64 - range) % range
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick one element uniformly, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        Some(&items[self.range_usize(0, items.len())])
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_usize(0, i + 1);
            items.swap(i, j);
        }
    }

    /// Derive an independent child generator and advance this one.
    ///
    /// The child is seeded from the next output of `self`, so a sequence of
    /// forks taken in the same order always yields the same children.
    pub fn fork(&mut self) -> WalkRng {
        WalkRng::new(self.next_u64())
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
