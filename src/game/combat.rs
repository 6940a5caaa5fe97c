//! # Combat
//!
//! Turn-based fights against stronghold enemies.
//!
//! A [`CombatSession`] moves through
//! `AwaitingPlayerAction -> EnemyTurn -> AwaitingPlayerAction ...` until it
//! reaches one of the terminal phases `Victory`, `Defeat` or `Fled`. Every
//! resolver returns the events it produced so the caller can show them.

use crate::{config, DiceConfig, Ledger, TerrainCode, WayfarerError, WayfarerResult, Weapon};
use log::info;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

/// Terrain family an enemy comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyPool {
    City,
    Forest,
    Plains,
    Water,
}

impl EnemyPool {
    /// Pool drawn for a neighboring terrain; unknown terrain falls back to city.
    pub fn for_terrain(terrain: TerrainCode) -> Self {
        match terrain {
            TerrainCode::Town => EnemyPool::City,
            TerrainCode::Forest => EnemyPool::Forest,
            TerrainCode::Plains => EnemyPool::Plains,
            TerrainCode::DeepOcean | TerrainCode::Coast | TerrainCode::Beach => EnemyPool::Water,
            _ => EnemyPool::City,
        }
    }

    /// The pool's enemies, tier 1 first.
    pub fn enemies(self) -> [EnemyKind; 3] {
        match self {
            EnemyPool::City => [EnemyKind::Bandit, EnemyKind::Guard, EnemyKind::Knight],
            EnemyPool::Forest => [EnemyKind::Wolf, EnemyKind::Archer, EnemyKind::Ent],
            EnemyPool::Plains => [EnemyKind::Tourist, EnemyKind::Hunter, EnemyKind::Buffalo],
            EnemyPool::Water => [EnemyKind::Crab, EnemyKind::Shark, EnemyKind::Merman],
        }
    }

    /// Enemy for a stronghold tier, clamped to 1-3.
    pub fn enemy_for_tier(self, tier: u8) -> EnemyKind {
        let index = usize::from(tier.clamp(1, 3)) - 1;
        self.enemies()[index]
    }
}

/// Every enemy type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Bandit,
    Guard,
    Knight,
    Wolf,
    Archer,
    Ent,
    Tourist,
    Hunter,
    Buffalo,
    Crab,
    Shark,
    Merman,
}

/// Fixed statistics of an enemy type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub name: &'static str,
    pub tier: u8,
    pub hp: u32,
    /// Nominal damage shown to the player; hits use the tier dice
    pub base_damage: u32,
    pub drops: DropTable,
}

/// Rewards for defeating an enemy: a coin range plus items that drop
/// independently with their own chance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTable {
    pub coins: (u64, u64),
    pub items: &'static [(&'static str, f64)],
}

/// What a defeated enemy left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Loot {
    pub coins: u64,
    pub items: BTreeMap<String, u32>,
}

impl DropTable {
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Loot {
        let (low, high) = self.coins;
        let mut loot = Loot {
            coins: rng.gen_range(low..=high),
            items: BTreeMap::new(),
        };
        for &(item, chance) in self.items {
            if rng.gen::<f64>() < chance {
                loot.items.insert(item.to_string(), 1);
            }
        }
        loot
    }

    /// Whether `item` can ever drop from this table.
    pub fn can_drop(&self, item: &str) -> bool {
        self.items.iter().any(|(name, _)| *name == item)
    }
}

const fn enemy(
    name: &'static str,
    tier: u8,
    hp: u32,
    base_damage: u32,
    coins: (u64, u64),
    items: &'static [(&'static str, f64)],
) -> EnemyStats {
    EnemyStats {
        name,
        tier,
        hp,
        base_damage,
        drops: DropTable { coins, items },
    }
}

/// Statistics of every [`EnemyKind`], in declaration order.
pub const ENEMY_TABLE: [EnemyStats; 12] = [
    enemy("Bandit", 1, 30, 5, (10, 20), &[("lockpick", 0.3)]),
    enemy("Guard", 2, 50, 8, (20, 40), &[("iron bar", 0.2)]),
    enemy("Knight", 3, 80, 12, (40, 80), &[("advanced map", 0.1)]),
    enemy("Wolf", 1, 25, 6, (8, 15), &[("wolf pelt", 0.5)]),
    enemy("Archer", 2, 40, 10, (15, 30), &[("arrows", 0.4)]),
    enemy("Ent", 3, 100, 15, (30, 60), &[("magic wood", 0.3)]),
    enemy("Tourist", 1, 20, 3, (15, 25), &[("map", 0.4)]),
    enemy("Hunter", 2, 45, 7, (25, 45), &[("bullets", 0.3)]),
    enemy("Buffalo", 3, 90, 14, (35, 70), &[("leather", 0.5)]),
    enemy("Crab", 1, 22, 4, (12, 18), &[("crab meat", 0.6)]),
    enemy("Shark", 2, 55, 9, (22, 38), &[("shark fin", 0.3)]),
    enemy("Merman", 3, 70, 11, (45, 75), &[("pearl", 0.2)]),
];

impl EnemyKind {
    pub fn stats(self) -> &'static EnemyStats {
        &ENEMY_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.stats().name
    }
}

/// Damage dice of every enemy of a tier.
pub fn enemy_dice(tier: u8) -> DiceConfig {
    match tier {
        0 | 1 => DiceConfig::new(1, 6, 1),
        2 => DiceConfig::new(2, 6, 2),
        _ => DiceConfig::new(3, 8, 3),
    }
}

/// An enemy in a running fight.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hp: u32,
    pub max_hp: u32,
    pub dice: DiceConfig,
}

impl Enemy {
    pub fn new(kind: EnemyKind) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            hp: stats.hp,
            max_hp: stats.hp,
            dice: enemy_dice(stats.tier),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn tier(&self) -> u8 {
        self.kind.stats().tier
    }

    /// Applies a hit; returns true when the enemy is down.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        self.hp = self.hp.saturating_sub(damage);
        self.hp == 0
    }

    pub fn attack<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.dice.roll(rng)
    }

    pub fn drops(&self) -> &'static DropTable {
        &self.kind.stats().drops
    }
}

/// Where a combat session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    AwaitingPlayerAction,
    EnemyTurn,
    Victory,
    Defeat,
    Fled,
}

impl CombatPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CombatPhase::Victory | CombatPhase::Defeat | CombatPhase::Fled
        )
    }
}

/// Something that happened during a combat step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    PlayerHit { weapon: String, damage: u32 },
    EnemyHit { damage: u32 },
    Healed { item: String, amount: u32 },
    EscapeFailed,
    Escaped,
    EnemyDefeated { loot: Loot },
    PlayerDefeated { coins_lost: u64 },
}

/// A fight between the player and one enemy.
#[derive(Debug, Clone)]
pub struct CombatSession {
    enemy: Enemy,
    player_hp: u32,
    phase: CombatPhase,
}

impl CombatSession {
    /// Starts a fight; the player always enters with full combat HP.
    pub fn new(enemy: Enemy) -> Self {
        info!("combat started against {} (tier {})", enemy.name(), enemy.tier());
        Self {
            enemy,
            player_hp: config::COMBAT_PLAYER_HP,
            phase: CombatPhase::AwaitingPlayerAction,
        }
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn player_hp(&self) -> u32 {
        self.player_hp
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    fn expect_phase(&self, wanted: CombatPhase) -> WayfarerResult<()> {
        if self.phase != wanted {
            return Err(WayfarerError::InvalidAction(format!(
                "combat is in phase {:?}, not {:?}",
                self.phase, wanted
            )));
        }
        Ok(())
    }

    /// Strikes the enemy with `weapon`.
    ///
    /// Killing the enemy ends the fight and pays its loot into `ledger`;
    /// otherwise the enemy gets its turn.
    pub fn resolve_player_attack<L, R>(
        &mut self,
        weapon: &Weapon,
        ledger: &mut L,
        rng: &mut R,
    ) -> WayfarerResult<Vec<CombatEvent>>
    where
        L: Ledger + ?Sized,
        R: Rng + ?Sized,
    {
        self.expect_phase(CombatPhase::AwaitingPlayerAction)?;

        let damage = weapon.roll_damage(rng);
        let mut events = vec![CombatEvent::PlayerHit {
            weapon: weapon.name.clone(),
            damage,
        }];

        if self.enemy.take_damage(damage) {
            let loot = self.enemy.drops().roll(rng);
            ledger.add_coins(loot.coins);
            for (item, count) in &loot.items {
                ledger.add_item(item, *count);
            }
            info!("defeated {} and looted {} coins", self.enemy.name(), loot.coins);
            self.phase = CombatPhase::Victory;
            events.push(CombatEvent::EnemyDefeated { loot });
        } else {
            self.phase = CombatPhase::EnemyTurn;
        }
        Ok(events)
    }

    /// Lets the enemy strike back.
    ///
    /// Dropping to 0 HP ends the fight and costs a quarter of the player's coins.
    pub fn resolve_enemy_turn<L, R>(
        &mut self,
        ledger: &mut L,
        rng: &mut R,
    ) -> WayfarerResult<Vec<CombatEvent>>
    where
        L: Ledger + ?Sized,
        R: Rng + ?Sized,
    {
        self.expect_phase(CombatPhase::EnemyTurn)?;

        let damage = self.enemy.attack(rng);
        self.player_hp = self.player_hp.saturating_sub(damage);
        let mut events = vec![CombatEvent::EnemyHit { damage }];

        if self.player_hp == 0 {
            let coins_lost = ledger.coins() / 4;
            ledger.remove_coins(coins_lost)?;
            info!("defeated by {}, lost {} coins", self.enemy.name(), coins_lost);
            self.phase = CombatPhase::Defeat;
            events.push(CombatEvent::PlayerDefeated { coins_lost });
        } else {
            self.phase = CombatPhase::AwaitingPlayerAction;
        }
        Ok(events)
    }

    /// Tries to run away; a failed attempt hands the turn to the enemy.
    pub fn attempt_flee<R: Rng + ?Sized>(&mut self, rng: &mut R) -> WayfarerResult<Vec<CombatEvent>> {
        self.expect_phase(CombatPhase::AwaitingPlayerAction)?;

        if rng.gen::<f64>() < config::FLEE_CHANCE {
            info!("fled from {}", self.enemy.name());
            self.phase = CombatPhase::Fled;
            Ok(vec![CombatEvent::Escaped])
        } else {
            self.phase = CombatPhase::EnemyTurn;
            Ok(vec![CombatEvent::EscapeFailed])
        }
    }

    /// Eats a healing item from `ledger` instead of attacking.
    ///
    /// The enemy still gets its turn afterwards.
    pub fn use_healing_item<L: Ledger + ?Sized>(
        &mut self,
        item: &str,
        ledger: &mut L,
    ) -> WayfarerResult<Vec<CombatEvent>> {
        self.expect_phase(CombatPhase::AwaitingPlayerAction)?;
        if !is_healing_item(item) {
            return Err(WayfarerError::ItemNotFound(format!("{item} is not a meal")));
        }
        if !ledger.has_item(item) {
            return Err(WayfarerError::ItemNotFound(item.to_string()));
        }

        ledger.remove_item(item, 1)?;
        let before = self.player_hp;
        self.player_hp = (self.player_hp + config::MEAL_HEAL_AMOUNT).min(config::COMBAT_PLAYER_HP);
        self.phase = CombatPhase::EnemyTurn;
        Ok(vec![CombatEvent::Healed {
            item: item.to_string(),
            amount: self.player_hp - before,
        }])
    }
}

/// Meals that can be eaten mid-fight.
pub const HEALING_ITEMS: [&str; 4] = ["chicken meal", "venison meal", "bear meal", "bird meal"];

pub fn is_healing_item(item: &str) -> bool {
    HEALING_ITEMS.contains(&item)
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::PlayerHit { weapon, damage } => {
                write!(f, "You hit with your {weapon} for {damage} damage!")
            }
            CombatEvent::EnemyHit { damage } => write!(f, "The enemy hits you for {damage} damage!"),
            CombatEvent::Healed { item, amount } => write!(f, "Used {item} to heal {amount} HP!"),
            CombatEvent::EscapeFailed => f.write_str("Couldn't escape!"),
            CombatEvent::Escaped => f.write_str("You successfully ran away!"),
            CombatEvent::EnemyDefeated { loot } => {
                write!(f, "Victory! You received {} coins", loot.coins)?;
                for (item, count) in &loot.items {
                    write!(f, ", {count} {item}")?;
                }
                Ok(())
            }
            CombatEvent::PlayerDefeated { coins_lost } => {
                write!(f, "You were defeated! You lost {coins_lost} coins.")
            }
        }
    }
}
