use std::fmt::Debug;

use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Uniform};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded generator used to initialize and mutate networks.
///
/// The same seed always yields the same sequence. Every call takes `&mut self`,
/// so a source shared across threads needs external synchronization; the
/// population driver instead hands each worker its own [`fork`](Self::fork).
pub struct RandomSource {
    rng: ChaCha8Rng,
    unit: Uniform<f32>,
}

impl RandomSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            unit: Uniform::new_inclusive(-1.0, 1.0),
        }
    }

    /// Nondeterministic source for runs that don't pin a seed.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().next_u64())
    }

    /// Uniform value in `[-1.0, 1.0]`, both bounds inclusive.
    #[inline]
    pub fn value(&mut self) -> f32 {
        self.unit.sample(&mut self.rng)
    }

    /// Uniform integer in `[min, max]`, both bounds inclusive.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    pub fn range<T>(&mut self, min: T, max: T) -> T
    where
        T: SampleUniform + PartialOrd + Copy + Debug,
    {
        assert!(min <= max, "invalid random range: min {min:?} > max {max:?}");
        self.rng.gen_range(min..=max)
    }

    /// Child source seeded from this one's next draw.
    pub fn fork(&mut self) -> Self {
        Self::new(self.rng.next_u64())
    }
}
