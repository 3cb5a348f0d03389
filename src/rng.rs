//! Deterministic entropy source for the secure engine.
//!
//! An xorshift32 generator seeded once, lazily, from a cycle counter sample.
//! Given the same sample and the same sequence of draws it produces the same
//! bytes, which is what makes simulated runs reproducible.
//!
//! This is NOT a cryptographically secure generator. Targets that need real
//! entropy hand the engine another [`RngCore`] instead.

use std::time::Instant;

use once_cell::sync::Lazy;
use rand::{RngCore, SeedableRng};

const INITIAL_STATE: u32 = 0xA5A5_A5A5;
const SEED_MIX: u32 = 0x3C6E_F35F;

// Anchor for the host stand-in of a free-running cycle counter.
static CYCLE_ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);

/// Sample the free-running cycle counter.
///
/// On a host this is nanoseconds since the first sample was taken in this
/// process, so the very first call returns a value close to zero.
pub fn cycle_sample() -> Option<u64> {
    let nanos = CYCLE_ANCHOR.elapsed().as_nanos();
    Some(nanos as u64)
}

/// Xorshift32 byte generator.
pub struct Entropy {
    state: u32,
    sample: Option<u64>,
    seeded: bool,
}

impl Entropy {
    /// Create a generator that seeds itself from `sample` on first use.
    ///
    /// `None` means no cycle counter is available, in which case only the
    /// fixed constants go into the seed.
    pub fn new(sample: Option<u64>) -> Self {
        Entropy {
            state: INITIAL_STATE,
            sample,
            seeded: false,
        }
    }

    /// Create a generator seeded from [`cycle_sample`].
    pub fn from_cycle_counter() -> Self {
        Self::new(cycle_sample())
    }

    /// Fill `out` with generator bytes. Never fails.
    pub fn generate(&mut self, out: &mut [u8]) {
        if !self.seeded {
            self.seed();
        }

        for b in out.iter_mut() {
            *b = (self.step() >> 24) as u8;
        }
    }

    /// Restart from the initial state with a new cycle sample.
    ///
    /// Seeding happens again on the next draw.
    pub fn reseed(&mut self, sample: Option<u64>) {
        *self = Self::new(sample);
    }

    fn seed(&mut self) {
        if let Some(cycles) = self.sample {
            self.state ^= (cycles as u32) ^ ((cycles >> 32) as u32);
        }
        self.state ^= SEED_MIX;

        // Zero is a fixed point of xorshift.
        if self.state == 0 {
            self.state = 1;
        }

        self.seeded = true;
        trace!("Entropy seeded (cycle sample: {})", self.sample.is_some());
    }

    fn step(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

impl RngCore for Entropy {
    fn next_u32(&mut self) -> u32 {
        let mut b = [0; 4];
        self.generate(&mut b);
        u32::from_be_bytes(b)
    }

    fn next_u64(&mut self) -> u64 {
        let mut b = [0; 8];
        self.generate(&mut b);
        u64::from_be_bytes(b)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.generate(dst);
    }
}

impl SeedableRng for Entropy {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(Some(u64::from_le_bytes(seed)))
    }
}

impl std::fmt::Debug for Entropy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the state.
        f.debug_struct("Entropy")
            .field("seeded", &self.seeded)
            .finish()
    }
}
