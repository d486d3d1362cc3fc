//! Injectable random sources
//!
//! Games own a seeded PCG generator so a session replays identically from its
//! seed. Helpers that need randomness take `&mut R where R: Rng + ?Sized`, so
//! tests can hand them a [`SequenceRng`] with an exact script of draws.

use rand::RngCore;
use rand::SeedableRng;
use rand::rand_core::impls;
use rand_pcg::Pcg32;

/// Generator every game session owns
pub type GameRng = Pcg32;

/// Seeded game generator
pub fn seeded(seed: u64) -> GameRng {
    Pcg32::seed_from_u64(seed)
}

/// Replays a fixed, cycling list of 32-bit words
///
/// A word of `0` makes float draws return the bottom of their range, which is
/// handy for forcing worst-case placement in tests.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    words: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    pub fn new(words: Vec<u32>) -> Self {
        Self { words, index: 0 }
    }

    /// A source that always yields the same word
    pub fn constant(word: u32) -> Self {
        Self::new(vec![word])
    }

    /// Number of words drawn so far
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl RngCore for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        if self.words.is_empty() {
            return 0;
        }
        let word = self.words[self.index % self.words.len()];
        self.index += 1;
        word
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}
