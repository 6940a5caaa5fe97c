//! # Player State
//!
//! The player's position, purse, inventory, weapons and vitals.

use crate::utils::add_capped;
use crate::{
    config, Position, WayfarerError, WayfarerResult, Weapon, WeaponCategory, WeaponId, WeaponTier,
    WeaponType,
};
use rand::Rng;
use std::collections::BTreeMap;

/// Coins and item counts that actions read and write.
///
/// Removal methods check before they mutate, so a failed removal leaves the
/// ledger untouched.
pub trait Ledger {
    fn coins(&self) -> u64;

    fn add_coins(&mut self, amount: u64);

    /// Takes `amount` coins, failing with `InsufficientFunds` when short.
    fn remove_coins(&mut self, amount: u64) -> WayfarerResult<()>;

    fn item_count(&self, item: &str) -> u32;

    fn add_item(&mut self, item: &str, count: u32);

    /// Takes `count` of `item`, failing with `InsufficientMaterials` when short.
    fn remove_item(&mut self, item: &str, count: u32) -> WayfarerResult<()>;

    fn has_item(&self, item: &str) -> bool {
        self.item_count(item) > 0
    }

    /// Fails unless the ledger holds at least `amount` coins.
    fn ensure_coins(&self, amount: u64) -> WayfarerResult<()> {
        let available = self.coins();
        if available < amount {
            return Err(WayfarerError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    /// Fails unless the ledger holds at least `count` of `item`.
    fn ensure_items(&self, item: &str, count: u32) -> WayfarerResult<()> {
        if self.item_count(item) < count {
            return Err(WayfarerError::InsufficientMaterials(format!("{count} {item}")));
        }
        Ok(())
    }
}

/// Everything about the player that survives a save.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub position: Position,
    coins: u64,
    inventory: BTreeMap<String, u32>,
    weapons: BTreeMap<WeaponId, Weapon>,
    pub current_hunting_weapon_id: Option<WeaponId>,
    pub current_combat_weapon_id: Option<WeaponId>,
    health: u32,
    energy: u32,
}

/// Inventory item names shared across the game.
pub mod item_names {
    pub const BULLETS: &str = "bullets";
    pub const BOAT: &str = "boat";
    pub const AXE: &str = "axe";
    pub const WOOD: &str = "wood";
    pub const FISHING_ROD: &str = "fishing rod";
    pub const HUNTING_RIFLE: &str = "hunting rifle";
    pub const COPPER_BAR: &str = "copper bar";
    pub const IRON_BAR: &str = "iron bar";
    pub const SILVER_ORE: &str = "silver ore";
    pub const MEAL_SUFFIX: &str = " meal";
}

impl PlayerState {
    /// Creates a fresh player at the origin with the two starting weapons.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let tier = WeaponTier::LOWEST;
        let revolver = Weapon::named("Old Revolver", WeaponType::Hunting, tier, rng);
        let sword = Weapon::named("Rusty Sword", WeaponType::Combat, tier, rng);

        let mut player = Self::empty();
        player.inventory.insert(item_names::BULLETS.to_string(), config::STARTING_BULLETS);
        player.current_hunting_weapon_id = Some(revolver.id);
        player.current_combat_weapon_id = Some(sword.id);
        player.add_weapon(revolver);
        player.add_weapon(sword);
        player
    }

    /// Creates a player with nothing at all.
    pub fn empty() -> Self {
        Self {
            position: Position::origin(),
            coins: 0,
            inventory: BTreeMap::new(),
            weapons: BTreeMap::new(),
            current_hunting_weapon_id: None,
            current_combat_weapon_id: None,
            health: config::DEFAULT_PLAYER_HEALTH,
            energy: config::DEFAULT_PLAYER_ENERGY,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    /// Sets health, clamped to the stat maximum.
    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(config::MAX_STAT);
    }

    /// Sets energy, clamped to the stat maximum.
    pub fn set_energy(&mut self, energy: u32) {
        self.energy = energy.min(config::MAX_STAT);
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = add_capped(self.health, amount, config::MAX_STAT);
    }

    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = add_capped(self.energy, amount, config::MAX_STAT);
    }

    /// Sets the purse directly; used by load and by penalties.
    pub fn set_coins(&mut self, coins: u64) {
        self.coins = coins;
    }

    pub fn inventory(&self) -> &BTreeMap<String, u32> {
        &self.inventory
    }

    /// Replaces the inventory, dropping zero-count entries.
    pub fn set_inventory(&mut self, inventory: BTreeMap<String, u32>) {
        self.inventory = inventory.into_iter().filter(|(_, count)| *count > 0).collect();
    }

    pub fn weapons(&self) -> &BTreeMap<WeaponId, Weapon> {
        &self.weapons
    }

    pub fn weapon(&self, id: WeaponId) -> WayfarerResult<&Weapon> {
        self.weapons
            .get(&id)
            .ok_or_else(|| WayfarerError::WeaponNotFound(id.to_string()))
    }

    pub fn weapon_mut(&mut self, id: WeaponId) -> WayfarerResult<&mut Weapon> {
        self.weapons
            .get_mut(&id)
            .ok_or_else(|| WayfarerError::WeaponNotFound(id.to_string()))
    }

    pub fn add_weapon(&mut self, weapon: Weapon) {
        self.weapons.insert(weapon.id, weapon);
    }

    /// Id of the equipped weapon in `category`.
    pub fn equipped_id(&self, category: WeaponCategory) -> Option<WeaponId> {
        match category {
            WeaponCategory::Combat => self.current_combat_weapon_id,
            WeaponCategory::Hunting => self.current_hunting_weapon_id,
        }
    }

    /// Equips the weapon with `id` in its own category.
    pub fn equip(&mut self, id: WeaponId) -> WayfarerResult<()> {
        let category = self.weapon(id)?.category();
        match category {
            WeaponCategory::Combat => self.current_combat_weapon_id = Some(id),
            WeaponCategory::Hunting => self.current_hunting_weapon_id = Some(id),
        }
        Ok(())
    }

    /// The equipped weapon in `category`, if it is still owned.
    pub fn equipped(&self, category: WeaponCategory) -> Option<&Weapon> {
        self.equipped_id(category).and_then(|id| self.weapons.get(&id))
    }

    pub fn equipped_mut(&mut self, category: WeaponCategory) -> Option<&mut Weapon> {
        let id = self.equipped_id(category)?;
        self.weapons.get_mut(&id)
    }

    /// Owned weapons of `category`, lowest tier first.
    pub fn weapons_of(&self, category: WeaponCategory) -> Vec<&Weapon> {
        let mut weapons: Vec<&Weapon> = self
            .weapons
            .values()
            .filter(|weapon| weapon.category() == category)
            .collect();
        weapons.sort_by_key(|weapon| weapon.tier);
        weapons
    }
}

impl Ledger for PlayerState {
    fn coins(&self) -> u64 {
        self.coins
    }

    fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
    }

    fn remove_coins(&mut self, amount: u64) -> WayfarerResult<()> {
        self.ensure_coins(amount)?;
        self.coins -= amount;
        Ok(())
    }

    fn item_count(&self, item: &str) -> u32 {
        self.inventory.get(item).copied().unwrap_or(0)
    }

    fn add_item(&mut self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.inventory.entry(item.to_string()).or_insert(0) += count;
    }

    fn remove_item(&mut self, item: &str, count: u32) -> WayfarerResult<()> {
        self.ensure_items(item, count)?;
        if let Some(held) = self.inventory.get_mut(item) {
            *held -= count;
            if *held == 0 {
                self.inventory.remove(item);
            }
        }
        Ok(())
    }
}
