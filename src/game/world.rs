//! # World State
//!
//! The authoritative map store. Tiles are classified the first time anything
//! looks at them and cached forever after, together with the per-tile state
//! that grows around them: town records, forest wood, looted houses and fort
//! stock.

use crate::generation::names;
use crate::{
    create_rng, FortStockGenerator, GenerationConfig, Generator, Position, Profession,
    TerrainClassifier, TerrainCode, TownLayout, TownLayoutGenerator, TownSize, WayfarerError,
    WayfarerResult, Weapon, WeaponId,
};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

/// Fallback name for coordinates that hold no town.
pub const UNKNOWN_TOWN: &str = "Unknown Town";

/// Sparse, lazily populated world map.
#[derive(Debug)]
pub struct WorldState {
    pub(crate) classifier: TerrainClassifier,
    pub(crate) tiles: HashMap<Position, TerrainCode>,
    pub(crate) town_sizes: HashMap<Position, TownSize>,
    pub(crate) town_names: HashMap<Position, String>,
    pub(crate) mineshafts: HashSet<Position>,
    pub(crate) town_layouts: HashMap<Position, TownLayout>,
    pub(crate) looted_houses: HashSet<(Position, Position)>,
    pub(crate) forest_wood: HashMap<Position, u32>,
    pub(crate) npc_names: HashMap<(Position, Profession), String>,
    pub(crate) fort_inventories: HashMap<Position, Vec<Weapon>>,
    pub(crate) rng: StdRng,
}

impl WorldState {
    /// Creates a world with the standard configuration and classifies the
    /// area around the origin.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::{Position, WorldState};
    ///
    /// let mut world = WorldState::new(42);
    /// assert!(world.visited_count() >= 25);
    /// let here = world.terrain_at(Position::origin());
    /// assert_eq!(world.terrain_at(Position::origin()), here);
    /// ```
    pub fn new(seed: u32) -> Self {
        let mut world = Self::unpopulated(GenerationConfig::new(seed));
        world.populate_initial_area();
        world
    }

    /// Creates a world from a custom configuration.
    pub fn with_config(config: GenerationConfig) -> WayfarerResult<Self> {
        config.validate()?;
        let mut world = Self::unpopulated(config);
        world.populate_initial_area();
        Ok(world)
    }

    /// Creates a world with empty caches; nothing is classified yet.
    pub(crate) fn unpopulated(config: GenerationConfig) -> Self {
        let rng = create_rng(&config);
        Self {
            classifier: TerrainClassifier::new(config),
            tiles: HashMap::new(),
            town_sizes: HashMap::new(),
            town_names: HashMap::new(),
            mineshafts: HashSet::new(),
            town_layouts: HashMap::new(),
            looted_houses: HashSet::new(),
            forest_wood: HashMap::new(),
            npc_names: HashMap::new(),
            fort_inventories: HashMap::new(),
            rng,
        }
    }

    fn populate_initial_area(&mut self) {
        let radius = self.config().initial_radius;
        self.ensure_area(Position::origin(), radius);
    }

    pub fn config(&self) -> &GenerationConfig {
        self.classifier.config()
    }

    pub fn seed(&self) -> u32 {
        self.config().seed
    }

    /// Terrain at `pos`, classifying the tile on first access.
    ///
    /// Classifying a forest may also turn unvisited neighbors into forest.
    pub fn terrain_at(&mut self, pos: Position) -> TerrainCode {
        if let Some(terrain) = self.tiles.get(&pos) {
            return *terrain;
        }

        let classification = self.classifier.classify(pos, &self.tiles);
        let terrain = classification.terrain;
        trace!("classified {pos} as {terrain}");

        self.tiles.insert(pos, terrain);
        match terrain {
            TerrainCode::Town => {
                let size = classification.town_size.unwrap_or(TownSize::Small);
                debug!("new {size} town at {pos}");
                self.town_sizes.insert(pos, size);
            }
            TerrainCode::Mineshaft => {
                self.mineshafts.insert(pos);
            }
            TerrainCode::Forest => {
                let wood = self.config().forest_wood;
                self.forest_wood.insert(pos, wood);
            }
            _ => {}
        }

        for beach in classification.discovered_beaches {
            self.tiles.entry(beach).or_insert(TerrainCode::Beach);
        }
        for neighbor in classification.spread_forest {
            if !self.tiles.contains_key(&neighbor) {
                let wood = self.config().forest_wood;
                self.tiles.insert(neighbor, TerrainCode::Forest);
                self.forest_wood.insert(neighbor, wood);
            }
        }

        terrain
    }

    /// Terrain at `pos` if the tile has been visited; never classifies.
    pub fn known_terrain(&self, pos: Position) -> Option<TerrainCode> {
        self.tiles.get(&pos).copied()
    }

    /// Classifies every tile of the square of `radius` around `center`.
    pub fn ensure_area(&mut self, center: Position, radius: i32) {
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                self.terrain_at(Position::new(x, y));
            }
        }
    }

    /// Wood left in the forest at `pos`; 0 for anything that is not forest.
    pub fn wood_remaining(&mut self, pos: Position) -> u32 {
        if self.terrain_at(pos) != TerrainCode::Forest {
            return 0;
        }
        let fresh = self.config().forest_wood;
        self.forest_wood.get(&pos).copied().unwrap_or(fresh)
    }

    /// Takes `amount` wood from the forest at `pos`.
    ///
    /// Returns true when the forest runs out; the tile then becomes plains for
    /// good. Calls on tiles that are not forest do nothing.
    pub fn deplete_forest(&mut self, pos: Position, amount: u32) -> bool {
        if self.terrain_at(pos) != TerrainCode::Forest {
            return false;
        }

        let remaining = self.wood_remaining(pos).saturating_sub(amount);
        self.forest_wood.insert(pos, remaining);
        if remaining == 0 {
            debug!("forest at {pos} depleted");
            self.tiles.insert(pos, TerrainCode::Plains);
            return true;
        }
        false
    }

    pub fn town_size(&self, pos: Position) -> Option<TownSize> {
        self.town_sizes.get(&pos).copied()
    }

    pub fn town_layout(&self, pos: Position) -> Option<&TownLayout> {
        self.town_layouts.get(&pos)
    }

    /// Stores the layout of the town at `pos` unless one is already stored.
    ///
    /// Returns false, keeping the existing layout, when the town already has one.
    pub fn store_town_layout(&mut self, pos: Position, layout: TownLayout) -> bool {
        if self.town_layouts.contains_key(&pos) {
            return false;
        }
        self.town_layouts.insert(pos, layout);
        true
    }

    /// Layout of the town at `pos`, generating and storing it on first entry.
    pub fn enter_town(&mut self, pos: Position) -> WayfarerResult<&TownLayout> {
        if self.terrain_at(pos) != TerrainCode::Town {
            return Err(WayfarerError::InvalidTerrainAction(
                "There is no town here.".to_string(),
            ));
        }

        if !self.town_layouts.contains_key(&pos) {
            let size = self.town_size(pos).unwrap_or_else(|| {
                warn!("town at {pos} has no size record, treating it as small");
                TownSize::Small
            });
            let layout = TownLayoutGenerator::new(size).generate(self.classifier.config(), &mut self.rng)?;
            self.town_layouts.insert(pos, layout);
        }

        self.town_layouts
            .get(&pos)
            .ok_or_else(|| WayfarerError::InvalidState(format!("no layout for town at {pos}")))
    }

    pub fn house_looted(&self, town: Position, house: Position) -> bool {
        self.looted_houses.contains(&(town, house))
    }

    /// Flags a house as looted; flags are never cleared.
    pub fn mark_house_looted(&mut self, town: Position, house: Position) {
        self.looted_houses.insert((town, house));
    }

    /// Name of the town at `pos`, generated on first request.
    pub fn town_name(&mut self, pos: Position) -> String {
        if let Some(name) = self.town_names.get(&pos) {
            return name.clone();
        }
        let Some(size) = self.town_size(pos) else {
            return UNKNOWN_TOWN.to_string();
        };
        let name = names::town_name(size, &mut self.rng);
        self.town_names.insert(pos, name.clone());
        name
    }

    /// Name of the `profession` vendor of the town at `pos`, generated on
    /// first request.
    pub fn npc_name(&mut self, pos: Position, profession: Profession) -> String {
        let rng = &mut self.rng;
        self.npc_names
            .entry((pos, profession))
            .or_insert_with(|| names::npc_name(profession, rng))
            .clone()
    }

    /// Weapons on sale at the fort at `pos`, stocked on first request.
    pub fn fort_inventory(&mut self, pos: Position) -> WayfarerResult<&[Weapon]> {
        if !self.fort_inventories.contains_key(&pos) {
            let stock = FortStockGenerator::new().generate(self.classifier.config(), &mut self.rng)?;
            debug!("stocked fort at {pos}");
            self.fort_inventories.insert(pos, stock);
        }
        Ok(self
            .fort_inventories
            .get(&pos)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// The fort weapon with `id`, without buying it.
    pub fn fort_weapon(&mut self, pos: Position, id: WeaponId) -> WayfarerResult<&Weapon> {
        self.fort_inventory(pos)?
            .iter()
            .find(|weapon| weapon.id == id)
            .ok_or_else(|| WayfarerError::WeaponNotFound(id.to_string()))
    }

    /// Takes the weapon with `id` out of the fort's stock and forges a
    /// replacement of the same tier.
    pub fn purchase_from_fort(&mut self, pos: Position, id: WeaponId) -> WayfarerResult<Weapon> {
        self.fort_inventory(pos)?;
        let stock = self
            .fort_inventories
            .get_mut(&pos)
            .ok_or_else(|| WayfarerError::InvalidState(format!("fort at {pos} has no stock")))?;
        let index = stock
            .iter()
            .position(|weapon| weapon.id == id)
            .ok_or_else(|| WayfarerError::WeaponNotFound(id.to_string()))?;

        let sold = stock.remove(index);
        let replacement = FortStockGenerator::new().restock(sold.tier, &mut self.rng);
        stock.push(replacement);
        stock.sort_by_key(|weapon| weapon.tier);
        Ok(sold)
    }

    /// Whether the player may step onto `pos`; deep ocean needs a boat.
    pub fn can_enter(&mut self, pos: Position, has_boat: bool) -> bool {
        self.terrain_at(pos) != TerrainCode::DeepOcean || has_boat
    }

    pub fn stronghold_tier(&mut self, pos: Position) -> Option<u8> {
        self.terrain_at(pos).stronghold_tier()
    }

    /// Terrain of the eight tiles around `pos`, classifying as needed.
    pub fn surrounding_terrains(&mut self, pos: Position) -> Vec<TerrainCode> {
        pos.adjacent_positions()
            .into_iter()
            .map(|neighbor| self.terrain_at(neighbor))
            .collect()
    }

    pub fn is_mineshaft(&self, pos: Position) -> bool {
        self.mineshafts.contains(&pos)
    }

    /// Every classified tile.
    pub fn visited_tiles(&self) -> impl Iterator<Item = (Position, TerrainCode)> + '_ {
        self.tiles.iter().map(|(pos, terrain)| (*pos, *terrain))
    }

    pub fn visited_count(&self) -> usize {
        self.tiles.len()
    }
}
