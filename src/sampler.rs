//! Seedable source of standard normal variates.
//!
//! Uniforms come from ChaCha8 (`rand_chacha::ChaCha8Rng`) seeded through
//! `SeedableRng::seed_from_u64`; they are turned into normals with the
//! Ziggurat method (`rand_distr::StandardNormal`). Both algorithms are fixed,
//! so a `(seed, stream)` pair always yields the same sequence.
//!
//! ChaCha's 64-bit stream id selects a separate keystream for the same key.
//! Parallel workers each take their own stream of one seed, which keeps
//! their draws disjoint without sharing a generator.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use rand_distr::StandardNormal;

#[derive(Debug, Clone)]
pub struct NormalSampler {
    rng: ChaCha8Rng,
    seed: u64,
    stream: u64,
}

impl NormalSampler {
    /// Sampler on stream 0 of `seed`.
    pub fn new(seed: u64) -> Self {
        Self::substream(seed, 0)
    }

    /// Sampler on an independent sub-stream of `seed`.
    pub fn substream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        NormalSampler { rng, seed, stream }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&self) -> u64 {
        self.stream
    }

    #[inline]
    pub fn sample(&mut self) -> f64 {
        self.rng.sample::<f64, _>(StandardNormal)
    }

    pub fn fill(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.sample();
        }
    }

    /// Rewinds to the first variate of this seed and stream.
    pub fn restart(&mut self) {
        *self = Self::substream(self.seed, self.stream);
    }
}

impl Iterator for NormalSampler {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        Some(self.sample())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
