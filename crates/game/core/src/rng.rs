//! Random number sources for battle rolls.
//!
//! Every random decision the rules make (hit rolls, damage variance, random
//! targets, steal attempts) draws from a [`BattleRng`] passed in by the
//! caller. Nothing in game-core touches ambient randomness, so a seeded
//! [`PcgRng`] replays a battle exactly and tests can pin rolls with
//! [`SequenceRng`].

/// Source of uniform randomness for battle and story rules.
pub trait BattleRng {
    /// Next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform float in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform float in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Uniform integer in `[low, high]` inclusive.
    fn range_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if low >= high {
            return low;
        }
        let span = (high - low + 1) as f64;
        let offset = (self.next_f64() * span) as i64;
        low + offset.min(high - low)
    }

    /// Uniform index into a collection of `len` elements.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.range_inclusive(0, len as i64 - 1) as usize)
    }

    /// Returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

impl<R: BattleRng + ?Sized> BattleRng for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

impl<R: BattleRng + ?Sized> BattleRng for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR variant: 64 bits of state, 32-bit output.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// XSH-RR output permutation.
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl BattleRng for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }
}

/// Replays a fixed list of unit-interval values, cycling when exhausted.
///
/// Scripted battles and tests use this to pin hit rolls and variance.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceRng {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRng {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        let mut values: Vec<f64> = values.into();
        if values.is_empty() {
            values.push(0.5);
        }
        for value in &mut values {
            *value = value.clamp(0.0, 0.999_999_999);
        }
        Self { values, cursor: 0 }
    }

    /// Always yields the same value.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl BattleRng for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_f64() * u32::MAX as f64) as u32
    }

    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}
