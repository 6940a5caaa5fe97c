//! # Terrain Classification
//!
//! Decides what terrain a coordinate gets the first time it is visited.
//!
//! Water tiles are shaped by the noise field alone: water touching land is a
//! beach, water touching a beach is coast, everything else is deep ocean. Land
//! tiles take one roll from the tile's own random stream and fall into one of the
//! probability bands of [`GenerationConfig`]. A new forest may spread onto
//! neighbors nobody has visited yet, which is the one way the order of visits
//! shapes the map.

use crate::{tile_rng, GenerationConfig, NoiseField, Position, TerrainCode, TownSize};
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Result of classifying one tile.
///
/// The world store applies every part of it to its caches.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Terrain of the classified tile
    pub terrain: TerrainCode,
    /// Size class when the tile is a town
    pub town_size: Option<TownSize>,
    /// Unvisited neighbors found to be beaches while resolving coast
    pub discovered_beaches: Vec<Position>,
    /// Unvisited neighbors that become forest through spreading
    pub spread_forest: Vec<Position>,
}

impl Classification {
    fn simple(terrain: TerrainCode) -> Self {
        Self {
            terrain,
            town_size: None,
            discovered_beaches: Vec::new(),
            spread_forest: Vec::new(),
        }
    }
}

/// Maps coordinates to terrain using the noise field and per-tile rolls.
#[derive(Debug)]
pub struct TerrainClassifier {
    config: GenerationConfig,
    noise: NoiseField,
}

impl TerrainClassifier {
    /// Creates a classifier for the given configuration.
    pub fn new(config: GenerationConfig) -> Self {
        let noise = NoiseField::new(&config);
        Self { config, noise }
    }

    /// Configuration this classifier was built with.
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Underlying noise field.
    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Whether the noise field puts land at `pos`.
    pub fn is_land(&self, pos: Position) -> bool {
        self.noise.sample(pos.x, pos.y) >= self.config.land_threshold
    }

    /// Whether `pos` is water with land on one of its four sides.
    fn borders_land(&self, pos: Position) -> bool {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .any(|neighbor| self.is_land(neighbor))
    }

    /// Classifies `pos`, consulting `known` for tiles already in the world.
    pub fn classify(&self, pos: Position, known: &HashMap<Position, TerrainCode>) -> Classification {
        if self.is_land(pos) {
            self.classify_land(pos, known)
        } else {
            self.classify_water(pos, known)
        }
    }

    fn classify_water(&self, pos: Position, known: &HashMap<Position, TerrainCode>) -> Classification {
        if self.borders_land(pos) {
            return Classification::simple(TerrainCode::Beach);
        }

        // Every neighbor is water here; a neighbor is a beach when it borders land.
        let mut discovered_beaches = Vec::new();
        let mut near_beach = false;
        for neighbor in pos.cardinal_adjacent_positions() {
            match known.get(&neighbor) {
                Some(terrain) => near_beach |= *terrain == TerrainCode::Beach,
                None => {
                    if self.borders_land(neighbor) {
                        discovered_beaches.push(neighbor);
                        near_beach = true;
                    }
                }
            }
        }

        let terrain = if near_beach {
            TerrainCode::Coast
        } else {
            TerrainCode::DeepOcean
        };
        Classification {
            terrain,
            town_size: None,
            discovered_beaches,
            spread_forest: Vec::new(),
        }
    }

    fn classify_land(&self, pos: Position, known: &HashMap<Position, TerrainCode>) -> Classification {
        let config = &self.config;
        let mut rng = tile_rng(config.seed, pos);
        let roll: f64 = rng.gen();

        let mut threshold = config.town_chance;
        if roll < threshold {
            let size = TownSize::ALL
                .choose(&mut rng)
                .copied()
                .unwrap_or(TownSize::Small);
            return Classification {
                town_size: Some(size),
                ..Classification::simple(TerrainCode::Town)
            };
        }

        threshold += config.temple_chance;
        if roll < threshold {
            return Classification::simple(TerrainCode::Temple);
        }

        threshold += config.mineshaft_chance;
        if roll < threshold {
            return Classification::simple(TerrainCode::Mineshaft);
        }

        threshold += config.stronghold_chance;
        if roll < threshold {
            let tier = rng.gen_range(1..=3);
            return Classification::simple(TerrainCode::Stronghold(tier));
        }

        threshold += config.forest_chance;
        if roll < threshold {
            let mut spread_forest = Vec::new();
            for neighbor in [
                Position::new(pos.x, pos.y + 1),
                Position::new(pos.x + 1, pos.y),
                Position::new(pos.x, pos.y - 1),
                Position::new(pos.x - 1, pos.y),
            ] {
                // Roll for every side so the stream does not depend on the cache.
                let spreads = rng.gen_bool(config.forest_spread_chance);
                if spreads && !known.contains_key(&neighbor) {
                    spread_forest.push(neighbor);
                }
            }
            if !spread_forest.is_empty() {
                trace!("forest at {pos} spreads to {spread_forest:?}");
            }
            return Classification {
                spread_forest,
                ..Classification::simple(TerrainCode::Forest)
            };
        }

        threshold += config.fort_chance;
        if roll < threshold {
            return Classification::simple(TerrainCode::Fort);
        }

        Classification::simple(TerrainCode::Plains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_land(classifier: &TerrainClassifier, want_land: bool) -> Option<Position> {
        (-200..200)
            .flat_map(|x| (-200..200).map(move |y| Position::new(x, y)))
            .find(|pos| classifier.is_land(*pos) == want_land)
    }

    #[test]
    fn test_plains_only_config() {
        let classifier = TerrainClassifier::new(GenerationConfig::for_testing(42));
        let known = HashMap::new();
        for x in -5..5 {
            for y in -5..5 {
                let result = classifier.classify(Position::new(x, y), &known);
                assert_eq!(result.terrain, TerrainCode::Plains);
            }
        }
    }

    #[test]
    fn test_classification_repeats_for_same_coordinate() {
        let classifier = TerrainClassifier::new(GenerationConfig::new(42));
        let known = HashMap::new();
        for x in -10..10 {
            let pos = Position::new(x, x * 2 - 3);
            assert_eq!(classifier.classify(pos, &known), classifier.classify(pos, &known));
        }
    }

    #[test]
    fn test_forest_spreads_only_to_unknown_tiles() {
        let mut config = GenerationConfig::for_testing(5);
        config.forest_chance = 1.0;
        config.forest_spread_chance = 1.0;
        let classifier = TerrainClassifier::new(config);

        let origin = Position::new(0, 0);
        let mut known = HashMap::new();
        known.insert(Position::new(1, 0), TerrainCode::Town);

        let result = classifier.classify(origin, &known);
        assert_eq!(result.terrain, TerrainCode::Forest);
        assert_eq!(result.spread_forest.len(), 3);
        assert!(!result.spread_forest.contains(&Position::new(1, 0)));
    }

    #[test]
    fn test_every_land_band_reachable() {
        let classifier = TerrainClassifier::new(GenerationConfig {
            land_threshold: -2.0,
            ..GenerationConfig::new(3)
        });
        let known = HashMap::new();
        let mut seen = std::collections::HashSet::new();
        for x in -60..60 {
            for y in -60..60 {
                let result = classifier.classify(Position::new(x, y), &known);
                assert_eq!(result.town_size.is_some(), result.terrain == TerrainCode::Town);
                seen.insert(result.terrain);
            }
        }
        for terrain in [
            TerrainCode::Plains,
            TerrainCode::Town,
            TerrainCode::Temple,
            TerrainCode::Mineshaft,
            TerrainCode::Forest,
            TerrainCode::Fort,
        ] {
            assert!(seen.contains(&terrain), "{terrain:?} never rolled");
        }
        assert!(seen.iter().any(|t| t.stronghold_tier().is_some()));
    }

    #[test]
    fn test_water_next_to_land_is_beach() {
        let classifier = TerrainClassifier::new(GenerationConfig::new(42));
        let known = HashMap::new();
        let Some(water) = find_land(&classifier, false) else {
            return;
        };
        let result = classifier.classify(water, &known);
        assert!(result.terrain.is_water());
        let borders_land = water
            .cardinal_adjacent_positions()
            .into_iter()
            .any(|n| classifier.is_land(n));
        assert_eq!(result.terrain == TerrainCode::Beach, borders_land);
        for beach in &result.discovered_beaches {
            assert!(!classifier.is_land(*beach));
        }
    }
}
