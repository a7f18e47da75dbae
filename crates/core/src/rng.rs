//! RNG module - deterministic uniform randomness
//!
//! A small LCG is enough for piece selection and the LED sparkle effect, and
//! keeps games reproducible from a seed.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Uniform value in `[0, max)`; returns 0 when `max` is 0.
    ///
    /// Takes the high bits (multiply-shift) since the low bits of an LCG
    /// cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// `true` with probability `1 / n`
    pub fn one_in(&mut self, n: u32) -> bool {
        n > 0 && self.next_range(n) == 0
    }

    /// Uniform choice among the seven shapes (no bag)
    pub fn next_piece(&mut self) -> PieceKind {
        let idx = self.next_range(PieceKind::ALL.len() as u32) as usize;
        PieceKind::ALL[idx]
    }
}
