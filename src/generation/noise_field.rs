//! # Noise Field
//!
//! Seeded coherent noise that shapes continents and oceans.

use crate::GenerationConfig;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use std::fmt;

/// Deterministic, spatially smooth 2D field in `[-1, 1]`.
///
/// Fractal Brownian motion over Perlin noise. The same seed and parameters
/// always give the same value at the same coordinate.
pub struct NoiseField {
    seed: u32,
    scale: f64,
    fbm: Fbm<Perlin>,
}

impl NoiseField {
    /// Builds the field described by `config`.
    pub fn new(config: &GenerationConfig) -> Self {
        let fbm = Fbm::<Perlin>::new(config.seed)
            .set_octaves(config.octaves)
            .set_frequency(1.0)
            .set_persistence(config.persistence)
            .set_lacunarity(config.lacunarity);
        Self {
            seed: config.seed,
            scale: config.noise_scale,
            fbm,
        }
    }

    /// Seed this field was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Samples the field at a world coordinate.
    pub fn sample(&self, x: i32, y: i32) -> f64 {
        let point = [f64::from(x) / self.scale, f64::from(y) / self.scale];
        self.fbm.get(point).clamp(-1.0, 1.0)
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("scale", &self.scale)
            .finish()
    }
}
