//! # Save Documents
//!
//! The JSON document a game is saved as. The document types mirror the file
//! layout field for field and are converted to and from the live world and
//! player, so the in-memory types are free to change shape.

use crate::{
    GenerationConfig, Ledger, PlayerState, Position, Profession, TerrainClassifier, TerrainCode,
    TownLayout, TownSize, WayfarerError, WayfarerResult, Weapon, WeaponCategory, WeaponId,
    WeaponTier, WeaponType, WorldState,
};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

/// A whole saved game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub inventory: BTreeMap<String, u32>,
    pub coins: u64,
    pub player_x: i32,
    pub player_y: i32,
    pub world: WorldDocument,
    pub weapons: BTreeMap<WeaponId, Weapon>,
    #[serde(default)]
    pub current_hunting_weapon_id: Option<WeaponId>,
    #[serde(default)]
    pub current_combat_weapon_id: Option<WeaponId>,
    pub health: u32,
    pub energy: u32,
}

/// The saved world: every visited tile and all per-tile side state.
///
/// Coordinate keys are `"x,y"` strings; the map is nested by row then column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldDocument {
    pub map: BTreeMap<i32, BTreeMap<i32, TerrainCode>>,
    #[serde(default)]
    pub town_types: BTreeMap<String, TownSize>,
    #[serde(default)]
    pub town_names: BTreeMap<String, String>,
    #[serde(default)]
    pub mineshafts: Vec<[i32; 2]>,
    #[serde(default)]
    pub town_layouts: BTreeMap<String, TownLayout>,
    /// `[town_x, town_y, house_x, house_y]`
    #[serde(default)]
    pub looted_houses: Vec<[i32; 4]>,
    #[serde(default)]
    pub forest_wood: BTreeMap<String, u32>,
    /// Keyed by `"x,y,profession"`
    #[serde(default)]
    pub npc_names: BTreeMap<String, String>,
    pub seed: u32,
    #[serde(default)]
    pub fort_inventories: BTreeMap<String, Vec<Weapon>>,
}

fn parse_key(key: &str) -> WayfarerResult<Position> {
    key.parse::<Position>()
}

fn parse_npc_key(key: &str) -> WayfarerResult<(Position, Profession)> {
    let (coords, profession) = key
        .rsplit_once(',')
        .ok_or_else(|| WayfarerError::Deserialization(format!("bad npc key '{key}'")))?;
    let profession = Profession::from_name(profession).ok_or_else(|| {
        WayfarerError::Deserialization(format!("unknown profession '{profession}'"))
    })?;
    Ok((parse_key(coords)?, profession))
}

fn keyed<T: Clone>(map: &HashMap<Position, T>) -> BTreeMap<String, T> {
    map.iter().map(|(pos, value)| (pos.to_key(), value.clone())).collect()
}

fn unkeyed<T>(map: BTreeMap<String, T>) -> WayfarerResult<HashMap<Position, T>> {
    map.into_iter()
        .map(|(key, value)| Ok((parse_key(&key)?, value)))
        .collect()
}

impl WorldDocument {
    /// Snapshot of every visited tile and all cached side state.
    pub fn capture(world: &WorldState) -> Self {
        let mut map: BTreeMap<i32, BTreeMap<i32, TerrainCode>> = BTreeMap::new();
        for (pos, terrain) in world.visited_tiles() {
            map.entry(pos.y).or_default().insert(pos.x, terrain);
        }

        let mut mineshafts: Vec<[i32; 2]> =
            world.mineshafts.iter().map(|pos| [pos.x, pos.y]).collect();
        mineshafts.sort_unstable();

        let mut looted_houses: Vec<[i32; 4]> = world
            .looted_houses
            .iter()
            .map(|(town, house)| [town.x, town.y, house.x, house.y])
            .collect();
        looted_houses.sort_unstable();

        Self {
            map,
            town_types: keyed(&world.town_sizes),
            town_names: keyed(&world.town_names),
            mineshafts,
            town_layouts: keyed(&world.town_layouts),
            looted_houses,
            forest_wood: keyed(&world.forest_wood),
            npc_names: world
                .npc_names
                .iter()
                .map(|((pos, profession), name)| {
                    (format!("{},{}", pos.to_key(), profession), name.clone())
                })
                .collect(),
            seed: world.seed(),
            fort_inventories: keyed(&world.fort_inventories),
        }
    }

    /// Rebuilds the world. Visited tiles come from the document; everything
    /// else regenerates from the stored seed.
    pub fn restore(self) -> WayfarerResult<WorldState> {
        let config = GenerationConfig::new(self.seed);

        let mut tiles = HashMap::new();
        for (y, row) in self.map {
            for (x, terrain) in row {
                tiles.insert(Position::new(x, y), terrain);
            }
        }

        let mut fort_inventories = unkeyed(self.fort_inventories)?;
        for (pos, stock) in fort_inventories.iter_mut() {
            stock.sort_by_key(|weapon| weapon.tier);
            if stock.len() != usize::from(WeaponTier::MAX) {
                warn!("fort at {pos} was saved with {} weapons", stock.len());
            }
        }

        let npc_names = self
            .npc_names
            .into_iter()
            .map(|(key, name)| Ok((parse_npc_key(&key)?, name)))
            .collect::<WayfarerResult<HashMap<_, _>>>()?;

        // Fresh stream for post-load rolls, distinct from the new-game stream.
        let rng = StdRng::seed_from_u64(u64::from(self.seed) ^ ((tiles.len() as u64) << 32));

        Ok(WorldState {
            classifier: TerrainClassifier::new(config),
            tiles,
            town_sizes: unkeyed(self.town_types)?,
            town_names: unkeyed(self.town_names)?,
            mineshafts: self
                .mineshafts
                .into_iter()
                .map(|[x, y]| Position::new(x, y))
                .collect::<HashSet<_>>(),
            town_layouts: unkeyed(self.town_layouts)?,
            looted_houses: self
                .looted_houses
                .into_iter()
                .map(|[tx, ty, hx, hy]| (Position::new(tx, ty), Position::new(hx, hy)))
                .collect(),
            forest_wood: unkeyed(self.forest_wood)?,
            npc_names,
            fort_inventories,
            rng,
        })
    }
}

impl SaveDocument {
    pub fn capture(player: &PlayerState, world: &WorldState) -> Self {
        Self {
            inventory: player.inventory().clone(),
            coins: player.coins(),
            player_x: player.position.x,
            player_y: player.position.y,
            world: WorldDocument::capture(world),
            weapons: player.weapons().clone(),
            current_hunting_weapon_id: player.current_hunting_weapon_id,
            current_combat_weapon_id: player.current_combat_weapon_id,
            health: player.health(),
            energy: player.energy(),
        }
    }

    /// Rebuilds the player and the world.
    ///
    /// Equipped ids that point at no owned weapon fall back to the best owned
    /// weapon of that category, or to a fresh starting weapon.
    pub fn restore(self) -> WayfarerResult<(PlayerState, WorldState)> {
        let mut world = self.world.restore()?;

        let mut player = PlayerState::empty();
        player.position = Position::new(self.player_x, self.player_y);
        player.set_coins(self.coins);
        player.set_inventory(self.inventory);
        player.set_health(self.health);
        player.set_energy(self.energy);
        for (id, mut weapon) in self.weapons {
            if weapon.id != id {
                warn!("weapon saved under {id} carries id {}", weapon.id);
                weapon.id = id;
            }
            player.add_weapon(weapon);
        }

        for (category, saved) in [
            (WeaponCategory::Hunting, self.current_hunting_weapon_id),
            (WeaponCategory::Combat, self.current_combat_weapon_id),
        ] {
            let owned = saved.filter(|id| player.weapons().contains_key(id));
            let id = match owned {
                Some(id) => id,
                None => {
                    warn!("no valid equipped {} weapon in save", category.name());
                    fallback_weapon(&mut player, category, &mut world)
                }
            };
            player.equip(id)?;
        }

        Ok((player, world))
    }

    /// Writes the document as JSON.
    pub fn write_to(&self, path: &Path) -> WayfarerResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("saved game to {}", path.display());
        Ok(())
    }

    /// Reads a document; nothing is changed if the file is missing or malformed.
    pub fn read_from(path: &Path) -> WayfarerResult<Self> {
        if !path.exists() {
            return Err(WayfarerError::SaveNotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| WayfarerError::Deserialization(e.to_string()))
    }
}

fn fallback_weapon(
    player: &mut PlayerState,
    category: WeaponCategory,
    world: &mut WorldState,
) -> WeaponId {
    if let Some(best) = player.weapons_of(category).last() {
        return best.id;
    }
    let (name, weapon_type) = match category {
        WeaponCategory::Hunting => ("Old Revolver", WeaponType::Hunting),
        WeaponCategory::Combat => ("Rusty Sword", WeaponType::Combat),
    };
    let weapon = Weapon::named(name, weapon_type, WeaponTier::LOWEST, &mut world.rng);
    let id = weapon.id;
    player.add_weapon(weapon);
    id
}
