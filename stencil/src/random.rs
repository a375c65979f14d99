//! Injectable randomness for generation rules.
//!
//! Generation takes a `&mut dyn RandomSource` instead of reaching for a
//! global RNG, so tests can pin every random span.

#[cfg(test)]
#[path = "random_test.rs"]
mod tests;

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

use crate::pattern::Charset;

const DIGITS: &[u8] = b"0123456789";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Source of uniformly distributed indices.
pub trait RandomSource {
    /// A uniformly sampled index in `0..bound`. `bound` is never zero.
    fn pick(&mut self, bound: usize) -> usize;

    /// One character from `charset`.
    fn char_from(&mut self, charset: Charset) -> char {
        let pool = match charset {
            Charset::Digits => DIGITS,
            Charset::Letters => LETTERS,
            Charset::Upper => UPPER,
            Charset::Lower => LOWER,
        };
        char::from(pool[self.pick(pool.len())])
    }
}

/// Adapter from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<ThreadRng> {
    /// Thread-local entropy; the default outside tests.
    #[must_use]
    pub fn thread() -> Self {
        Self(rand::rng())
    }
}

impl RngSource<StdRng> {
    /// Reproducible stream for a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn pick(&mut self, bound: usize) -> usize {
        self.0.random_range(0..bound)
    }
}

/// Replays a fixed sequence of indices, wrapping around. Each value is
/// reduced modulo the requested bound.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<usize>,
    cursor: usize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(script: Vec<usize>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn pick(&mut self, bound: usize) -> usize {
        if self.script.is_empty() {
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value % bound
    }
}
