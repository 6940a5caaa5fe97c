//! # Generation Module
//!
//! Procedural content generation for the world map and everything found on it.
//!
//! This module provides the coherent noise field that shapes land and water,
//! the terrain classifier that decides what stands on each tile, town interior
//! layouts, names, fort stock and stronghold encounters.

pub mod classifier;
pub mod encounters;
pub mod items;
pub mod names;
pub mod noise_field;
pub mod town;

pub use classifier::*;
pub use encounters::*;
pub use items::*;
pub use noise_field::*;
pub use town::*;

use crate::{Position, WayfarerError, WayfarerResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for world generation.
///
/// Controls the shape of the noise field, the land threshold and the
/// probability bands used when classifying land tiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// World seed; the only generation input stored in save files
    pub seed: u32,
    /// World units per noise unit
    pub noise_scale: f64,
    /// Number of noise octaves
    pub octaves: usize,
    /// Amplitude falloff per octave
    pub persistence: f64,
    /// Frequency growth per octave
    pub lacunarity: f64,
    /// Noise values at or above this are land
    pub land_threshold: f64,
    /// Chance of a land tile being a town
    pub town_chance: f64,
    /// Chance of a land tile being a temple
    pub temple_chance: f64,
    /// Chance of a land tile being a mineshaft
    pub mineshaft_chance: f64,
    /// Chance of a land tile being a stronghold
    pub stronghold_chance: f64,
    /// Chance of a land tile being a forest
    pub forest_chance: f64,
    /// Chance of a land tile being a fort
    pub fort_chance: f64,
    /// Chance that a new forest spreads onto each unclassified neighbor
    pub forest_spread_chance: f64,
    /// Wood units in a fresh forest tile
    pub forest_wood: u32,
    /// Radius of the square classified around the origin of a new world
    pub initial_radius: i32,
    /// Radius of the square kept classified around the player after each move
    pub viewport_radius: i32,
}

impl GenerationConfig {
    /// Creates the standard world configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.seed, 42);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            noise_scale: 15.0,
            octaves: 1,
            persistence: 0.5,
            lacunarity: 2.0,
            land_threshold: -0.1,
            town_chance: 0.10,
            temple_chance: 0.05,
            mineshaft_chance: 0.02,
            stronghold_chance: 0.03,
            forest_chance: 0.10,
            fort_chance: 0.02,
            forest_spread_chance: 0.7,
            forest_wood: 20,
            initial_radius: 2,
            viewport_radius: 2,
        }
    }

    /// Creates a configuration for tests: all land, all plains, no spread.
    ///
    /// Individual tests switch on the features they exercise.
    pub fn for_testing(seed: u32) -> Self {
        Self {
            land_threshold: -2.0,
            town_chance: 0.0,
            temple_chance: 0.0,
            mineshaft_chance: 0.0,
            stronghold_chance: 0.0,
            forest_chance: 0.0,
            fort_chance: 0.0,
            forest_spread_chance: 0.0,
            ..Self::new(seed)
        }
    }

    /// Sum of every special land band; the rest of land is plains.
    pub fn special_land_total(&self) -> f64 {
        self.town_chance
            + self.temple_chance
            + self.mineshaft_chance
            + self.stronghold_chance
            + self.forest_chance
            + self.fort_chance
    }

    /// Checks that the probability bands and noise parameters make sense.
    pub fn validate(&self) -> WayfarerResult<()> {
        let bands = [
            self.town_chance,
            self.temple_chance,
            self.mineshaft_chance,
            self.stronghold_chance,
            self.forest_chance,
            self.fort_chance,
            self.forest_spread_chance,
        ];
        if bands.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(WayfarerError::InvalidState(
                "generation chances must lie in [0, 1]".to_string(),
            ));
        }
        if self.special_land_total() > 1.0 {
            return Err(WayfarerError::InvalidState(
                "land bands add up to more than 1".to_string(),
            ));
        }
        if self.noise_scale <= 0.0 || self.octaves == 0 {
            return Err(WayfarerError::InvalidState(
                "noise scale and octaves must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Generators that produce stored world content (town interiors, fort stock)
/// implement this trait so they share configuration and RNG handling.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WayfarerResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> WayfarerResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Creates the world's general-purpose random number generator.
pub fn create_rng(config: &GenerationConfig) -> StdRng {
    StdRng::seed_from_u64(u64::from(config.seed))
}

/// Creates the random stream used for rolls that belong to a single tile.
///
/// The stream depends only on the seed and the coordinate, so a tile rolls the
/// same way no matter when it is first visited.
pub fn tile_rng(seed: u32, pos: Position) -> StdRng {
    let packed = (u64::from(pos.x as u32) << 32) | u64::from(pos.y as u32);
    StdRng::seed_from_u64(splitmix64(packed ^ splitmix64(u64::from(seed))))
}

/// SplitMix64 finalizer, used to spread nearby coordinates across seed space.
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
