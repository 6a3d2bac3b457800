//! Deterministic per-shape random streams for hand-drawn jitter.

use crate::shapes::ShapeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A random stream seeded from a shape identifier.
///
/// Every call to [`SeededRandom::from_id`] starts the same sequence for the
/// same id, so a shape renders identically on every frame and in every
/// process.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Start a fresh stream for a shape.
    pub fn from_id(id: &ShapeId) -> Self {
        Self::from_bytes(id.as_bytes())
    }

    /// Start a fresh stream from seed bytes. Bytes past the 32-byte seed
    /// are ignored; shorter input is zero-padded.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut seed = [0u8; 32];
        let n = bytes.len().min(seed.len());
        seed[..n].copy_from_slice(&bytes[..n]);
        Self {
            rng: StdRng::from_seed(seed),
        }
    }

    /// Next value in `[-0.5, 0.5)`.
    pub fn next(&mut self) -> f64 {
        self.rng.random::<f64>() - 0.5
    }
}
