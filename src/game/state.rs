//! # Game State Module
//!
//! The session context that ties the player, the world and any running fight
//! together.
//!
//! Every player-facing operation lives here and returns either a message to
//! show or a [`WayfarerError`] whose text explains what went wrong. Checks run
//! before anything is mutated, so a failed operation leaves the game as it
//! was.

use crate::game::economy::{self, MealKind, Metal, Tool, ToolTier};
use crate::game::player::item_names;
use crate::{
    config, CombatEvent, CombatPhase, CombatSession, Direction, EncounterGenerator,
    GenerationConfig, Generator, Ledger, PlayerState, Position, Profession, SaveDocument,
    TerrainCode, TownSize, WayfarerError, WayfarerResult, Weapon, WeaponCategory, WeaponId,
    WeaponTier, WeaponType, WorldState,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::time::Duration;

/// Items that can turn up in an unlit house, with their relative weights.
const HOUSE_LOOT: [(&str, f64); 6] = [
    ("lockpick", 0.3),
    ("iron ore", 0.2),
    ("copper ore", 0.4),
    ("silver ore", 0.1),
    ("gold ore", 0.05),
    ("diamond", 0.02),
];

/// Chance that a successful burglary yields items rather than coins.
fn house_item_chance(size: TownSize) -> f64 {
    match size {
        TownSize::Small => 0.7,
        TownSize::Medium => 0.5,
        TownSize::Large => 0.3,
    }
}

fn house_coin_range(size: TownSize) -> (u64, u64) {
    match size {
        TownSize::Small => (10, 30),
        TownSize::Medium => (20, 50),
        TownSize::Large => (40, 100),
    }
}

fn flavor_lines(terrain: TerrainCode, size: Option<TownSize>) -> &'static [&'static str] {
    match terrain {
        TerrainCode::Plains => &[
            "Rolling plains stretch out before you",
            "Tall grass sways in the breeze",
            "Open grassland runs to the horizon",
            "A quiet meadow surrounds you",
        ],
        TerrainCode::Town => match size.unwrap_or(TownSize::Small) {
            TownSize::Small => &[
                "a quiet village sits among the fields",
                "a small settlement goes about its day",
            ],
            TownSize::Medium => &[
                "a thriving town spreads out ahead",
                "a busy market square draws your eye",
            ],
            TownSize::Large => &[
                "a sprawling city rises around you",
                "grand buildings line the crowded streets",
            ],
        },
        TerrainCode::Temple => &[
            "An ancient temple looms over you",
            "Weathered stone ruins keep their secrets",
        ],
        TerrainCode::Mineshaft => &[
            "A dark mineshaft drops into the earth",
            "Old mining gear lies around a deep shaft",
        ],
        TerrainCode::Stronghold(1) => &["A stronghold stands before you, the first of three"],
        TerrainCode::Stronghold(2) => &["A better fortified stronghold, the second of three"],
        TerrainCode::Stronghold(_) => &["The final stronghold, the most heavily guarded of all"],
        TerrainCode::Fort => &["A formidable fort towers over the road"],
        TerrainCode::DeepOcean => &[
            "Your boat rides the long ocean swell",
            "Deep water stretches in every direction",
        ],
        TerrainCode::Beach => &[
            "Soft sand crunches beneath your feet",
            "Small waves lap at the shore",
        ],
        TerrainCode::Coast => &[
            "Shallow coastal water shimmers around you",
            "The coastline curves away ahead",
        ],
        TerrainCode::Forest => &[
            "Tall trees close in overhead",
            "Sunlight filters through the leaves",
        ],
    }
}

/// Counters for the current session; not saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatistics {
    pub steps_taken: u64,
    pub enemies_defeated: u32,
    pub fights_lost: u32,
    pub fights_fled: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    pub wood_cut: u64,
    pub houses_searched: u32,
}

impl SessionStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the counters from one combat event.
    pub fn update_from_event(&mut self, event: &CombatEvent) {
        match event {
            CombatEvent::PlayerHit { damage, .. } => self.damage_dealt += u64::from(*damage),
            CombatEvent::EnemyHit { damage } => self.damage_taken += u64::from(*damage),
            CombatEvent::EnemyDefeated { .. } => self.enemies_defeated += 1,
            CombatEvent::PlayerDefeated { .. } => self.fights_lost += 1,
            CombatEvent::Escaped => self.fights_fled += 1,
            CombatEvent::Healed { .. } | CombatEvent::EscapeFailed => {}
        }
    }
}

/// A running game: player, world, optional fight and the session RNG.
#[derive(Debug)]
pub struct GameState {
    pub player: PlayerState,
    pub world: WorldState,
    pub statistics: SessionStatistics,
    combat: Option<CombatSession>,
    rng: StdRng,
}

/// The fight in `combat`, unless there is none or it has ended.
fn running(combat: &mut Option<CombatSession>) -> WayfarerResult<&mut CombatSession> {
    combat
        .as_mut()
        .filter(|session| !session.is_over())
        .ok_or_else(|| WayfarerError::InvalidAction("You are not in combat.".to_string()))
}

fn session_rng(world: &WorldState) -> StdRng {
    StdRng::seed_from_u64(u64::from(world.seed()) ^ ((world.visited_count() as u64) << 32))
}

impl GameState {
    /// Starts a new game on the standard world for `seed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::{GameState, Ledger, Position};
    ///
    /// let game = GameState::new(42);
    /// assert_eq!(game.player.position, Position::origin());
    /// assert_eq!(game.player.item_count("bullets"), 100);
    /// ```
    pub fn new(seed: u32) -> Self {
        Self::from_world(WorldState::new(seed))
    }

    /// Starts a new game on a world built from `config`.
    pub fn with_config(config: GenerationConfig) -> WayfarerResult<Self> {
        Ok(Self::from_world(WorldState::with_config(config)?))
    }

    fn from_world(world: WorldState) -> Self {
        let mut rng = session_rng(&world);
        let player = PlayerState::new(&mut rng);
        info!("new game with seed {}", world.seed());
        Self {
            player,
            world,
            statistics: SessionStatistics::new(),
            combat: None,
            rng,
        }
    }

    /// Resumes a game from already restored parts.
    pub fn from_parts(player: PlayerState, world: WorldState) -> Self {
        let rng = session_rng(&world);
        Self {
            player,
            world,
            statistics: SessionStatistics::new(),
            combat: None,
            rng,
        }
    }

    /// Reads a saved game from `path`.
    pub fn load(path: &Path) -> WayfarerResult<Self> {
        let (player, world) = SaveDocument::read_from(path)?.restore()?;
        Ok(Self::from_parts(player, world))
    }

    pub fn position(&self) -> Position {
        self.player.position
    }

    pub fn current_terrain(&mut self) -> TerrainCode {
        self.world.terrain_at(self.player.position)
    }

    fn require_terrain(&mut self, wanted: TerrainCode, message: &str) -> WayfarerResult<()> {
        if self.current_terrain() != wanted {
            return Err(WayfarerError::InvalidTerrainAction(message.to_string()));
        }
        Ok(())
    }

    fn require_town(&mut self) -> WayfarerResult<()> {
        self.require_terrain(TerrainCode::Town, "You need to be in a town to do that.")
    }

    fn require_peace(&self) -> WayfarerResult<()> {
        if self.in_combat() {
            return Err(WayfarerError::InvalidAction(
                "You can't do that in the middle of a fight!".to_string(),
            ));
        }
        Ok(())
    }

    // Movement and description

    /// Steps one tile in `direction` and describes the new location.
    ///
    /// Deep ocean is only reachable with a boat.
    pub fn move_player(&mut self, direction: Direction) -> WayfarerResult<String> {
        self.require_peace()?;
        let target = self.player.position + direction.to_delta();
        let has_boat = self.player.has_item(item_names::BOAT);
        if !self.world.can_enter(target, has_boat) {
            return Err(WayfarerError::InvalidTerrainAction(
                "The water is too deep to cross without a boat.".to_string(),
            ));
        }

        self.player.position = target;
        let radius = self.world.config().viewport_radius;
        self.world.ensure_area(target, radius);
        self.statistics.steps_taken += 1;
        debug!("player moved {} to {}", direction.name(), target);
        Ok(self.current_terrain_description())
    }

    /// Describes the player's tile and lists the different terrain around it.
    pub fn current_terrain_description(&mut self) -> String {
        let here = self.player.position;
        let terrain = self.world.terrain_at(here);
        let size = self.world.town_size(here);
        let flavor = flavor_lines(terrain, size)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or_default();

        let mut description = match terrain {
            TerrainCode::Town => format!("Welcome to {}, {}", self.world.town_name(here), flavor),
            _ => flavor.to_string(),
        };

        match terrain {
            TerrainCode::Forest => {
                let wood = self.world.wood_remaining(here);
                if self.player.has_item(item_names::AXE) {
                    description.push_str(&format!(". There are {wood} trees suitable for cutting"));
                } else {
                    description.push_str(". You'll need an axe to harvest wood here");
                }
            }
            TerrainCode::Coast | TerrainCode::DeepOcean => {
                if self.player.has_item(item_names::FISHING_ROD) {
                    description.push_str(". The waters look promising for fishing");
                } else {
                    description.push_str(". A fishing rod would be useful here");
                }
            }
            _ => {}
        }

        let surroundings: Vec<String> = Direction::all()
            .into_iter()
            .filter_map(|direction| {
                let nearby = self.world.terrain_at(here + direction.to_delta());
                (nearby != terrain)
                    .then(|| format!("{} to the {}", nearby.describe(), direction.name()))
            })
            .collect();

        match surroundings.as_slice() {
            [] => {}
            [only] => description.push_str(&format!(". There is {only}")),
            [rest @ .., last] => {
                description.push_str(&format!(". You can see {} and {last}", rest.join(", ")));
            }
        }
        description
    }

    // Trading and crafting

    /// Buys from a town vendor. A hunting rifle also arrives as a weapon.
    pub fn buy(&mut self, vendor: Profession, item: &str, amount: u32) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        let message = economy::buy_item(&mut self.player, vendor, item, amount)?;

        if item == item_names::HUNTING_RIFLE {
            let tier = WeaponTier::new(3)?;
            for _ in 0..amount {
                let rifle = Weapon::new(WeaponType::HuntingRifle, tier, &mut self.rng);
                self.take_weapon(rifle);
            }
        }
        info!("{message}");
        Ok(message)
    }

    /// Sells to a town vendor.
    pub fn sell(&mut self, vendor: Profession, item: &str, amount: u32) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        let message = economy::sell_item(&mut self.player, vendor, item, amount)?;
        info!("{message}");
        Ok(message)
    }

    /// Weapons for sale at the fort the player stands on.
    pub fn fort_stock(&mut self) -> WayfarerResult<Vec<Weapon>> {
        self.require_terrain(TerrainCode::Fort, "There is no fort here.")?;
        let here = self.player.position;
        Ok(self.world.fort_inventory(here)?.to_vec())
    }

    /// Buys the weapon with `id` from the fort the player stands on.
    ///
    /// The fort restocks the same tier; the new weapon is equipped when it
    /// beats the current combat weapon.
    pub fn buy_fort_weapon(&mut self, id: WeaponId) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_terrain(TerrainCode::Fort, "There is no fort here.")?;
        let here = self.player.position;
        let cost = self.world.fort_weapon(here, id)?.cost();
        self.player.ensure_coins(cost)?;

        let weapon = self.world.purchase_from_fort(here, id)?;
        self.player.remove_coins(cost)?;
        let message = format!("Bought {} for {cost} coins", weapon.name);
        self.take_weapon(weapon);
        info!("{message}");
        Ok(message)
    }

    /// Adds a weapon, equipping it when it outranks the one in its slot.
    fn take_weapon(&mut self, weapon: Weapon) {
        let id = weapon.id;
        let upgrade = self
            .player
            .equipped(weapon.category())
            .map_or(true, |current| weapon.tier > current.tier);
        self.player.add_weapon(weapon);
        if upgrade {
            // The weapon was just added, so equipping cannot fail.
            let _ = self.player.equip(id);
        }
    }

    pub fn smelt(&mut self, metal: Metal) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        economy::smelt(&mut self.player, metal)
    }

    pub fn cook_meal(&mut self, kind: MealKind) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        economy::craft_meal(&mut self.player, kind)
    }

    pub fn craft_bullets(&mut self) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        economy::craft_bullets(&mut self.player)
    }

    pub fn upgrade_tool(&mut self, tool: Tool, target: ToolTier) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        economy::upgrade_tool(&mut self.player, tool, target)
    }

    /// Pays for the next upgrade of the owned weapon with `id`.
    pub fn attempt_weapon_upgrade(&mut self, id: WeaponId) -> WayfarerResult<String> {
        self.require_peace()?;
        self.require_town()?;
        let mut weapon = self.player.weapon(id)?.clone();
        let message = economy::upgrade_weapon(&mut self.player, &mut weapon)?;
        self.player.add_weapon(weapon);
        info!("{message}");
        Ok(message)
    }

    // Gathering

    /// Cuts 1 to 5 wood from the forest the player stands in.
    pub fn attempt_woodcutting(&mut self) -> WayfarerResult<String> {
        self.require_peace()?;
        if !self.player.has_item(item_names::AXE) {
            return Err(WayfarerError::InvalidTerrainAction(
                "You need an axe to cut trees!".to_string(),
            ));
        }
        self.require_terrain(TerrainCode::Forest, "You can only cut trees in the forest!")?;

        let here = self.player.position;
        let available = self.world.wood_remaining(here);
        if available == 0 {
            return Err(WayfarerError::InvalidTerrainAction(
                "This forest has been depleted of wood!".to_string(),
            ));
        }

        let amount = self.rng.gen_range(1..=5).min(available);
        let depleted = self.world.deplete_forest(here, amount);
        self.player.add_item(item_names::WOOD, amount);
        self.statistics.wood_cut += u64::from(amount);

        let mut message = format!("You cut down some trees and got {amount} wood!");
        if depleted {
            message.push_str(" The forest has been depleted and turned into plains.");
        }
        Ok(message)
    }

    /// Best version of `tool` the player owns.
    pub fn tool_tier(&self, tool: Tool) -> Option<ToolTier> {
        economy::tool_tier(&self.player, tool)
    }

    /// Plains can be dug with a shovel, mineshafts need a pickaxe.
    pub fn can_mine(&mut self) -> bool {
        match self.current_terrain() {
            TerrainCode::Plains => self.tool_tier(Tool::Shovel).is_some(),
            TerrainCode::Mineshaft => self.tool_tier(Tool::Pickaxe).is_some(),
            _ => false,
        }
    }

    pub fn can_hunt(&mut self) -> bool {
        matches!(
            self.current_terrain(),
            TerrainCode::Plains | TerrainCode::Forest
        )
    }

    // Town interiors

    /// Sneaks into the house at `house` inside the current town.
    ///
    /// Lit houses are occupied: half the time the guards catch the player and
    /// take every coin. Unlit houses yield loot half the time and are then
    /// marked as searched for good.
    pub fn attempt_house_entry(&mut self, house: Position) -> WayfarerResult<String> {
        self.require_peace()?;
        let town = self.player.position;
        let lit = self
            .world
            .enter_town(town)?
            .house_lit(house)
            .ok_or_else(|| WayfarerError::InvalidAction(format!("there is no house at {house}")))?;
        if self.world.house_looted(town, house) {
            return Err(WayfarerError::InvalidAction(
                "You've already searched this house.".to_string(),
            ));
        }

        if lit {
            if self.rng.gen_bool(0.5) {
                info!("caught breaking into {house} in town {town}");
                self.player.set_coins(0);
                return Ok("You were caught! The guards confiscated all your coins.".to_string());
            }
            return Ok("The house is occupied. Better leave before someone notices.".to_string());
        }

        self.world.mark_house_looted(town, house);
        self.statistics.houses_searched += 1;
        if !self.rng.gen_bool(0.5) {
            return Ok("The house is empty, and you found nothing of value.".to_string());
        }

        let size = self.world.town_size(town).unwrap_or(TownSize::Small);
        if self.rng.gen_bool(house_item_chance(size)) {
            let item = HOUSE_LOOT
                .choose_weighted(&mut self.rng, |(_, weight)| *weight)
                .map(|(item, _)| *item)
                .unwrap_or(HOUSE_LOOT[0].0);
            let amount = self.rng.gen_range(1..=2);
            self.player.add_item(item, amount);
            Ok(format!("You snuck in and found {amount} {item}!"))
        } else {
            let (low, high) = house_coin_range(size);
            let coins = self.rng.gen_range(low..=high);
            self.player.add_coins(coins);
            Ok(format!("You snuck in and found {coins} coins!"))
        }
    }

    // Weapons and supplies

    /// Equips the next owned weapon of `category`, cycling by tier.
    pub fn switch_weapon(&mut self, category: WeaponCategory) -> WayfarerResult<String> {
        let weapons = self.player.weapons_of(category);
        if weapons.is_empty() {
            return Err(WayfarerError::WeaponNotFound(format!(
                "no {} weapons available",
                category.name()
            )));
        }

        let current = self.player.equipped_id(category);
        let next = weapons
            .iter()
            .position(|weapon| Some(weapon.id) == current)
            .map_or(0, |index| (index + 1) % weapons.len());
        let (id, name) = (weapons[next].id, weapons[next].name.clone());
        self.player.equip(id)?;
        Ok(format!("Switched to {name}"))
    }

    /// Eats the first meal in the pack when health or energy is low.
    ///
    /// Returns the message when a meal was eaten.
    pub fn consume_meal_if_needed(&mut self) -> Option<String> {
        if self.player.health() > config::MEAL_THRESHOLD
            && self.player.energy() > config::MEAL_THRESHOLD
        {
            return None;
        }

        let meal = self
            .player
            .inventory()
            .keys()
            .find(|item| item.ends_with(item_names::MEAL_SUFFIX))
            .cloned()?;
        self.player.remove_item(&meal, 1).ok()?;
        self.player.heal(config::MEAL_HEAL_AMOUNT);
        self.player.restore_energy(config::MEAL_HEAL_AMOUNT);
        Some(format!("Consumed {meal} and restored health and energy"))
    }

    /// Spends one bullet; false when there are none.
    pub fn use_bullet(&mut self) -> bool {
        self.player.remove_item(item_names::BULLETS, 1).is_ok()
    }

    /// Fires the equipped hunting weapon at `now`.
    ///
    /// A bullet is spent only when the shot actually fires; a weapon that is
    /// still cooling down returns 0.
    pub fn shoot_hunting_weapon(&mut self, now: Duration) -> WayfarerResult<u32> {
        if !self.player.has_item(item_names::BULLETS) {
            return Err(WayfarerError::ItemNotFound(item_names::BULLETS.to_string()));
        }
        let weapon = self
            .player
            .equipped_mut(WeaponCategory::Hunting)
            .ok_or_else(|| WayfarerError::WeaponNotFound("no hunting weapon equipped".to_string()))?;
        if !weapon.can_shoot(now) {
            return Ok(0);
        }

        let damage = weapon.shoot(now, &mut self.rng);
        self.use_bullet();
        Ok(damage)
    }

    // Combat

    pub fn combat(&self) -> Option<&CombatSession> {
        self.combat.as_ref()
    }

    /// Whether a fight is still running.
    pub fn in_combat(&self) -> bool {
        self.combat.as_ref().is_some_and(|session| !session.is_over())
    }

    /// Challenges the stronghold the player stands on.
    pub fn start_combat(&mut self) -> WayfarerResult<String> {
        self.require_peace()?;
        let here = self.player.position;
        let tier = self.world.stronghold_tier(here).ok_or_else(|| {
            WayfarerError::InvalidTerrainAction("There is no stronghold here.".to_string())
        })?;
        if self.player.equipped(WeaponCategory::Combat).is_none() {
            return Err(WayfarerError::WeaponNotFound(
                "no combat weapon equipped".to_string(),
            ));
        }

        let surroundings = self.world.surrounding_terrains(here);
        let enemy = EncounterGenerator::new(tier, surroundings).generate(self.world.config(), &mut self.rng)?;
        let message = format!(
            "A {} (tier {}, {} HP) blocks your way!",
            enemy.name(),
            enemy.tier(),
            enemy.hp
        );
        self.combat = Some(CombatSession::new(enemy));
        Ok(message)
    }

    /// Lets the enemy answer when the player's action left it the turn.
    fn finish_round(&mut self, mut events: Vec<CombatEvent>) -> WayfarerResult<String> {
        if let Ok(session) = running(&mut self.combat) {
            if session.phase() == CombatPhase::EnemyTurn {
                events.extend(session.resolve_enemy_turn(&mut self.player, &mut self.rng)?);
            }
        }

        for event in &events {
            self.statistics.update_from_event(event);
        }
        Ok(events
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Strikes with the equipped combat weapon.
    pub fn combat_attack(&mut self) -> WayfarerResult<String> {
        let weapon = self
            .player
            .equipped(WeaponCategory::Combat)
            .cloned()
            .ok_or_else(|| WayfarerError::WeaponNotFound("no combat weapon equipped".to_string()))?;
        let session = running(&mut self.combat)?;
        let events = session.resolve_player_attack(&weapon, &mut self.player, &mut self.rng)?;
        self.finish_round(events)
    }

    pub fn combat_flee(&mut self) -> WayfarerResult<String> {
        let events = running(&mut self.combat)?.attempt_flee(&mut self.rng)?;
        self.finish_round(events)
    }

    /// Eats a meal mid-fight.
    pub fn combat_heal(&mut self, item: &str) -> WayfarerResult<String> {
        let session = running(&mut self.combat)?;
        let events = session.use_healing_item(item, &mut self.player)?;
        self.finish_round(events)
    }

    // Persistence

    /// Writes the game to `path`.
    pub fn save_game(&self, path: &Path) -> WayfarerResult<String> {
        SaveDocument::capture(&self.player, &self.world).write_to(path)?;
        Ok("Game saved successfully!".to_string())
    }

    /// Replaces this game with the one saved at `path`.
    ///
    /// The file is fully parsed first; on error the current game is kept.
    pub fn load_game(&mut self, path: &Path) -> WayfarerResult<String> {
        let (player, world) = SaveDocument::read_from(path)?.restore()?;
        *self = Self::from_parts(player, world);
        Ok("Game loaded successfully!".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiceConfig, TownCell, TownLayout};
    use tempfile::TempDir;

    fn plains_game() -> GameState {
        GameState::with_config(GenerationConfig::for_testing(7)).unwrap()
    }

    fn place(game: &mut GameState, pos: Position, terrain: TerrainCode) {
        game.world.tiles.insert(pos, terrain);
    }

    fn town_game(size: TownSize) -> GameState {
        let mut game = plains_game();
        place(&mut game, Position::origin(), TerrainCode::Town);
        game.world.town_sizes.insert(Position::origin(), size);
        game
    }

    #[test]
    fn test_new_game_defaults() {
        let game = GameState::new(42);
        assert_eq!(game.position(), Position::origin());
        assert_eq!(game.player.coins(), 0);
        assert_eq!(game.player.item_count("bullets"), 100);
        assert_eq!(game.player.weapons().len(), 2);
        assert!(!game.in_combat());
    }

    #[test]
    fn test_move_updates_position_and_area() {
        let mut game = plains_game();
        let description = game.move_player(Direction::East).unwrap();
        assert_eq!(game.position(), Position::new(1, 0));
        assert!(!description.is_empty());
        assert!(game.world.known_terrain(Position::new(3, 2)).is_some());
        assert_eq!(game.statistics.steps_taken, 1);
    }

    #[test]
    fn test_deep_ocean_needs_boat() {
        let mut game = plains_game();
        place(&mut game, Position::new(0, -1), TerrainCode::DeepOcean);
        assert!(matches!(
            game.move_player(Direction::North),
            Err(WayfarerError::InvalidTerrainAction(_))
        ));
        assert_eq!(game.position(), Position::origin());

        game.player.add_item("boat", 1);
        game.move_player(Direction::North).unwrap();
        assert_eq!(game.position(), Position::new(0, -1));
    }

    #[test]
    fn test_description_lists_neighbors() {
        let mut game = plains_game();
        place(&mut game, Position::new(0, -1), TerrainCode::Temple);
        let description = game.current_terrain_description();
        assert!(description.ends_with(". There is a temple to the north"), "{description}");

        place(&mut game, Position::new(1, 0), TerrainCode::Fort);
        let description = game.current_terrain_description();
        assert!(
            description.ends_with(". You can see a temple to the north and a fort to the east"),
            "{description}"
        );
    }

    #[test]
    fn test_town_description_welcomes() {
        let mut game = town_game(TownSize::Large);
        let name = game.world.town_name(Position::origin());
        let description = game.current_terrain_description();
        assert!(description.starts_with(&format!("Welcome to {name}, ")));
    }

    #[test]
    fn test_trading_needs_town() {
        let mut game = plains_game();
        game.player.add_coins(500);
        assert!(matches!(
            game.buy(Profession::Lumberjack, "axe", 1),
            Err(WayfarerError::InvalidTerrainAction(_))
        ));

        let mut game = town_game(TownSize::Small);
        game.player.add_coins(500);
        game.buy(Profession::Lumberjack, "axe", 1).unwrap();
        assert_eq!(game.player.coins(), 350);
        assert!(game.player.has_item("axe"));
    }

    #[test]
    fn test_hunting_rifle_arrives_equipped() {
        let mut game = town_game(TownSize::Medium);
        game.player.add_coins(500);
        game.buy(Profession::Gunsmith, "hunting rifle", 1).unwrap();

        let equipped = game.player.equipped(WeaponCategory::Hunting).unwrap();
        assert_eq!(equipped.weapon_type, WeaponType::HuntingRifle);
        assert_eq!(equipped.tier.get(), 3);
        assert!(game.player.has_item("hunting rifle"));
    }

    #[test]
    fn test_fort_purchase_restocks_and_equips() {
        let mut game = plains_game();
        place(&mut game, Position::origin(), TerrainCode::Fort);
        game.player.add_coins(100_000);

        let stock = game.fort_stock().unwrap();
        let target = stock.iter().find(|weapon| weapon.tier.get() == 4).unwrap().clone();
        let message = game.buy_fort_weapon(target.id).unwrap();
        assert!(message.starts_with(&format!("Bought {}", target.name)));
        assert_eq!(game.player.coins(), 100_000 - target.cost());
        assert_eq!(game.player.equipped_id(WeaponCategory::Combat), Some(target.id));

        let restocked = game.fort_stock().unwrap();
        assert_eq!(restocked.len(), 5);
        assert!(restocked.iter().all(|weapon| weapon.id != target.id));
        assert_eq!(restocked.iter().filter(|w| w.tier.get() == 4).count(), 1);
    }

    #[test]
    fn test_fort_purchase_without_coins_keeps_stock() {
        let mut game = plains_game();
        place(&mut game, Position::origin(), TerrainCode::Fort);
        let before = game.fort_stock().unwrap();
        let id = before[4].id;
        assert!(matches!(
            game.buy_fort_weapon(id),
            Err(WayfarerError::InsufficientFunds { .. })
        ));
        assert_eq!(game.fort_stock().unwrap(), before);
    }

    #[test]
    fn test_weapon_upgrade_is_atomic() {
        let mut game = town_game(TownSize::Small);
        let sword = game.player.equipped_id(WeaponCategory::Combat).unwrap();
        assert!(game.attempt_weapon_upgrade(sword).is_err());
        assert_eq!(game.player.weapon(sword).unwrap().upgrade_level, 0);

        game.player.add_coins(100);
        game.player.add_item("copper bar", 1);
        game.player.add_item("iron bar", 1);
        game.attempt_weapon_upgrade(sword).unwrap();
        assert_eq!(game.player.weapon(sword).unwrap().upgrade_level, 1);
        assert_eq!(game.player.coins(), 0);
    }

    #[test]
    fn test_woodcutting_depletes_forest() {
        let mut game = plains_game();
        place(&mut game, Position::origin(), TerrainCode::Forest);
        assert!(game.attempt_woodcutting().is_err());

        game.player.add_item("axe", 1);
        let mut cuts = 0;
        while game.current_terrain() == TerrainCode::Forest {
            game.attempt_woodcutting().unwrap();
            cuts += 1;
            assert!(cuts <= 20);
        }
        assert_eq!(game.player.item_count("wood"), 20);
        assert_eq!(game.current_terrain(), TerrainCode::Plains);
        assert!(matches!(
            game.attempt_woodcutting(),
            Err(WayfarerError::InvalidTerrainAction(message)) if message.contains("forest")
        ));
    }

    #[test]
    fn test_mining_and_hunting_affordances() {
        let mut game = plains_game();
        assert!(game.can_hunt());
        assert!(!game.can_mine());
        game.player.add_item("copper shovel", 1);
        assert!(game.can_mine());
        assert_eq!(game.tool_tier(Tool::Shovel), Some(ToolTier::Copper));

        place(&mut game, Position::origin(), TerrainCode::Mineshaft);
        assert!(!game.can_mine());
        assert!(!game.can_hunt());
        game.player.add_item("pickaxe", 1);
        assert!(game.can_mine());
    }

    fn town_with_house(lit: bool) -> (GameState, Position) {
        let mut game = town_game(TownSize::Small);
        let house = Position::new(0, 0);
        let mut layout = TownLayout::empty();
        layout.set_cell(house, TownCell::House { lit });
        assert!(game.world.store_town_layout(Position::origin(), layout));
        (game, house)
    }

    #[test]
    fn test_unlit_house_is_searched_once() {
        let (mut game, house) = town_with_house(false);
        game.attempt_house_entry(house).unwrap();
        assert!(game.world.house_looted(Position::origin(), house));
        assert!(game.attempt_house_entry(house).is_err());
        assert!(game.attempt_house_entry(Position::new(5, 5)).is_err());
    }

    #[test]
    fn test_lit_house_either_warns_or_confiscates() {
        for _ in 0..10 {
            let (mut game, house) = town_with_house(true);
            game.player.add_coins(300);
            let message = game.attempt_house_entry(house).unwrap();
            if message.starts_with("You were caught") {
                assert_eq!(game.player.coins(), 0);
            } else {
                assert_eq!(game.player.coins(), 300);
            }
            assert!(!game.world.house_looted(Position::origin(), house));
        }
    }

    #[test]
    fn test_switch_weapon_cycles_by_tier() {
        let mut game = plains_game();
        let sword = game.player.equipped_id(WeaponCategory::Combat).unwrap();
        let saber = Weapon::with_dice(
            "Saber",
            WeaponType::Combat,
            WeaponTier::new(2).unwrap(),
            DiceConfig::new(2, 6, 2),
        );
        let saber_id = saber.id;
        game.player.add_weapon(saber);

        assert_eq!(game.switch_weapon(WeaponCategory::Combat).unwrap(), "Switched to Saber");
        assert_eq!(game.player.equipped_id(WeaponCategory::Combat), Some(saber_id));
        game.switch_weapon(WeaponCategory::Combat).unwrap();
        assert_eq!(game.player.equipped_id(WeaponCategory::Combat), Some(sword));
    }

    #[test]
    fn test_meals_only_when_needed() {
        let mut game = plains_game();
        game.player.add_item("bear meal", 1);
        assert_eq!(game.consume_meal_if_needed(), None);

        game.player.set_health(60);
        game.player.set_energy(90);
        assert!(game.consume_meal_if_needed().is_some());
        assert_eq!(game.player.health(), 85);
        assert_eq!(game.player.energy(), 100);
        assert!(!game.player.has_item("bear meal"));

        game.player.set_health(10);
        assert_eq!(game.consume_meal_if_needed(), None);
    }

    #[test]
    fn test_bullet_spent_only_when_shot_fires() {
        let mut game = plains_game();
        game.shoot_hunting_weapon(Duration::from_secs(10)).unwrap();
        assert_eq!(game.player.item_count("bullets"), 99);

        let blocked = game.shoot_hunting_weapon(Duration::from_secs(10)).unwrap();
        assert_eq!(blocked, 0);
        assert_eq!(game.player.item_count("bullets"), 99);

        assert!(game.shoot_hunting_weapon(Duration::from_secs(20)).unwrap() > 0);
        assert_eq!(game.player.item_count("bullets"), 98);
    }

    #[test]
    fn test_shooting_without_bullets_fails() {
        let mut game = plains_game();
        game.player.remove_item("bullets", 100).unwrap();
        assert!(!game.use_bullet());
        assert!(matches!(
            game.shoot_hunting_weapon(Duration::ZERO),
            Err(WayfarerError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_combat_only_on_strongholds() {
        let mut game = plains_game();
        assert!(matches!(
            game.start_combat(),
            Err(WayfarerError::InvalidTerrainAction(_))
        ));
        assert!(game.combat_attack().is_err());
    }

    #[test]
    fn test_combat_runs_to_an_end() {
        let mut game = plains_game();
        place(&mut game, Position::origin(), TerrainCode::Stronghold(1));
        game.start_combat().unwrap();
        assert!(game.in_combat());
        assert!(game.move_player(Direction::East).is_err());

        let mut rounds = 0;
        while game.in_combat() {
            game.combat_attack().unwrap();
            rounds += 1;
            assert!(rounds < 200);
        }
        let phase = game.combat().unwrap().phase();
        assert!(matches!(phase, CombatPhase::Victory | CombatPhase::Defeat));
        assert!(game.statistics.damage_dealt > 0);
        assert!(game.combat_attack().is_err());
        game.move_player(Direction::East).unwrap();
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("save.json");

        let mut game = plains_game();
        game.player.add_coins(77);
        game.move_player(Direction::South).unwrap();
        assert_eq!(game.save_game(&path).unwrap(), "Game saved successfully!");

        let mut other = GameState::new(1);
        other.load_game(&path).unwrap();
        assert_eq!(other.position(), Position::new(0, 1));
        assert_eq!(other.player.coins(), 77);
        assert_eq!(other.world.seed(), 7);
    }

    #[test]
    fn test_failed_load_keeps_game() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        let mut game = GameState::new(3);
        game.player.add_coins(5);

        assert!(matches!(
            game.load_game(&missing),
            Err(WayfarerError::SaveNotFound(_))
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(game.load_game(&broken).is_err());
        assert_eq!(game.player.coins(), 5);
        assert_eq!(game.world.seed(), 3);
    }
}
