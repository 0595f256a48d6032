//! Explicit random source threaded through every pipeline stage.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::config::IntRange;

/// Independent random streams, one per stage that draws randomness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Sampling,
    Selection,
    BackEdges,
    Corridors,
    Placement,
}

impl Stage {
    fn stream(self) -> u64 {
        match self {
            Stage::Sampling => 1,
            Stage::Selection => 2,
            Stage::BackEdges => 3,
            Stage::Corridors => 4,
            Stage::Placement => 5,
        }
    }
}

pub struct DungeonRng {
    inner: ChaCha8Rng,
}

impl DungeonRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn for_stage(run_seed: u64, attempt: u32, stage: Stage) -> Self {
        let attempt_seed = mix_seed_stream(run_seed, u64::from(attempt));
        Self::seed_from_u64(mix_seed_stream(attempt_seed, stage.stream()))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform integer in `[range.min, range.max]`.
    pub fn range_inclusive(&mut self, range: IntRange) -> i32 {
        let span = (i64::from(range.max) - i64::from(range.min) + 1) as u64;
        range.min + (self.next_u64() % span) as i32
    }

    /// Uniform draw nudged to the nearest odd value that stays inside the range.
    pub fn odd_in(&mut self, range: IntRange) -> i32 {
        let value = self.range_inclusive(range);
        if value % 2 != 0 {
            value
        } else if value < range.max {
            value + 1
        } else {
            value - 1
        }
    }

    pub fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        (self.next_u64() % len as u64) as usize
    }

    /// Uniform float in `[0, 1)`.
    pub fn unit_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1_u64 << 24) as f32
    }

    /// One of `-1`, `0`, `1`.
    pub fn jitter(&mut self) -> i32 {
        self.range_inclusive(IntRange::new(-1, 1))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

pub(crate) fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}
