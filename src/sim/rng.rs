//! Linear congruential generator shared by every simulation component
//!
//! Same constants as Numerical Recipes (`a = 1664525`, `c = 1013904223`,
//! `m = 2^32`). Exposed both through its own float/int helpers and through
//! `rand::RngCore`, so `rand`'s adapters (shuffle, etc.) run on it.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const LCG_A: u64 = 1_664_525;
const LCG_C: u64 = 1_013_904_223;
const LCG_M: u64 = 1 << 32;

/// Deterministic LCG
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg {
    seed: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { seed: seed % LCG_M }
    }

    /// Seed from the platform wall clock
    pub fn from_clock() -> Self {
        Self::new(crate::platform::now_millis())
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed % LCG_M;
    }

    /// Advance and return the raw 32-bit state
    fn step(&mut self) -> u32 {
        self.seed = (LCG_A * self.seed + LCG_C) % LCG_M;
        self.seed as u32
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / LCG_M as f64
    }

    /// Uniform integer in [min, max)
    ///
    /// Returns `min` when the range is empty.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        (self.next_f64() * (max - min) as f64).floor() as i32 + min
    }

    /// Uniform index in [0, len)
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Random opaque RGB color
    pub fn color(&mut self) -> [u8; 3] {
        [
            self.range_i32(0, 256) as u8,
            self.range_i32(0, 256) as u8,
            self.range_i32(0, 256) as u8,
        ]
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.step()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.step() as u64;
        let lo = self.step() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state)
    }
}
