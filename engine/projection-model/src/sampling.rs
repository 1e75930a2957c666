//! Seeded random draws

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Seeded generator producing uniform and Gaussian draws.
///
/// Gaussian draws use the Box-Muller transform, caching the second value of
/// each pair, so a given seed always yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededSampler {
    rng: StdRng,
    spare: Option<f64>,
}

impl SeededSampler {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), spare: None }
    }

    /// Uniform draw in [0, 1)
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // 1 - U keeps the log argument in (0, 1]
        let u1 = 1.0 - self.uniform();
        let u2 = self.uniform();
        let radius = (-2.0 * u1.ln()).sqrt();
        self.spare = Some(radius * (TAU * u2).sin());
        radius * (TAU * u2).cos()
    }

    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }

    /// Index in [0, n)
    pub fn index(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}
