//! # Weapons
//!
//! Tiered dice weapons: configuration tables, procedural naming, pricing,
//! upgrades and the shot cooldown state machine.
//!
//! A weapon's damage distribution is a [`DiceConfig`] value drawn from the
//! tier's option table when the weapon is created. Upgrades replace that value
//! with a transformed copy; rolling damage never mutates the weapon.

use crate::generation::names;
use crate::utils::math::round_to_tenth;
use crate::{new_weapon_id, WayfarerError, WayfarerResult, WeaponId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A damage distribution: `count` dice with `sides` faces plus a flat modifier.
///
/// Serialized as the triple `[count, sides, modifier]`.
///
/// # Examples
///
/// ```
/// use wayfarer::DiceConfig;
///
/// let dice = DiceConfig::new(1, 6, 2);
/// assert_eq!(dice.average(), 5.5);
/// assert_eq!(dice.min_roll(), 3);
/// assert_eq!(dice.max_roll(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32, u32)", into = "(u32, u32, u32)")]
pub struct DiceConfig {
    pub count: u32,
    pub sides: u32,
    pub modifier: u32,
}

impl DiceConfig {
    /// Creates a dice configuration.
    pub const fn new(count: u32, sides: u32, modifier: u32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Exact expected value of a roll.
    pub fn average(self) -> f64 {
        self.count as f64 * (self.sides as f64 + 1.0) / 2.0 + self.modifier as f64
    }

    /// Smallest possible roll.
    pub fn min_roll(self) -> u32 {
        self.count + self.modifier
    }

    /// Largest possible roll.
    pub fn max_roll(self) -> u32 {
        self.count * self.sides + self.modifier
    }

    /// Rolls every die once and adds the modifier.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        let dice: u32 = (0..self.count)
            .map(|_| rng.gen_range(1..=self.sides.max(1)))
            .sum();
        dice + self.modifier
    }

    /// Returns the configuration after reaching upgrade `level`.
    ///
    /// Level 1 adds to the modifier, level 2 adds a die, every later level adds both.
    pub fn upgraded(self, level: u32) -> Self {
        match level {
            0 => self,
            1 => Self::new(self.count, self.sides, self.modifier + 1),
            2 => Self::new(self.count + 1, self.sides, self.modifier),
            _ => Self::new(self.count + 1, self.sides, self.modifier + 1),
        }
    }
}

impl From<(u32, u32, u32)> for DiceConfig {
    fn from((count, sides, modifier): (u32, u32, u32)) -> Self {
        Self::new(count, sides, modifier)
    }
}

impl From<DiceConfig> for (u32, u32, u32) {
    fn from(dice: DiceConfig) -> Self {
        (dice.count, dice.sides, dice.modifier)
    }
}

impl fmt::Display for DiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
    }
}

/// Weapon power tier, 1 (weakest) to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeaponTier(u8);

impl WeaponTier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// The weakest tier, carried by starting weapons.
    pub const LOWEST: WeaponTier = WeaponTier(1);

    /// Creates a tier, rejecting values outside 1-5.
    pub fn new(tier: u8) -> WayfarerResult<Self> {
        if (Self::MIN..=Self::MAX).contains(&tier) {
            Ok(Self(tier))
        } else {
            Err(WayfarerError::InvalidState(format!(
                "weapon tier {tier} is outside {}-{}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Every tier in ascending order.
    pub fn all() -> impl Iterator<Item = WeaponTier> {
        (Self::MIN..=Self::MAX).map(WeaponTier)
    }

    /// Numeric tier value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Balance constants for this tier.
    pub fn stats(self) -> &'static TierStats {
        &TIER_TABLE[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for WeaponTier {
    type Error = WayfarerError;

    fn try_from(tier: u8) -> Result<Self, Self::Error> {
        WeaponTier::new(tier)
    }
}

impl From<WeaponTier> for u8 {
    fn from(tier: WeaponTier) -> Self {
        tier.0
    }
}

impl fmt::Display for WeaponTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Balance constants for one weapon tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierStats {
    /// Dice configurations a new weapon of this tier picks from uniformly
    pub dice_options: &'static [DiceConfig],
    /// Shop price before the damage adjustment
    pub base_cost: u64,
    /// Damage band used to normalize the price adjustment
    pub damage_range: (u32, u32),
}

impl TierStats {
    /// Mean of the option table's expected damage values.
    pub fn expected_average(&self) -> f64 {
        let total: f64 = self.dice_options.iter().map(|dice| dice.average()).sum();
        total / self.dice_options.len() as f64
    }
}

/// Tier balance table, indexed by `tier - 1`.
pub const TIER_TABLE: [TierStats; 5] = [
    TierStats {
        dice_options: &[
            DiceConfig::new(1, 6, 2),
            DiceConfig::new(1, 8, 1),
            DiceConfig::new(2, 4, 1),
            DiceConfig::new(2, 3, 2),
        ],
        base_cost: 100,
        damage_range: (4, 8),
    },
    TierStats {
        dice_options: &[
            DiceConfig::new(2, 6, 2),
            DiceConfig::new(3, 4, 2),
            DiceConfig::new(2, 8, 1),
            DiceConfig::new(1, 10, 4),
            DiceConfig::new(2, 5, 3),
        ],
        base_cost: 300,
        damage_range: (6, 14),
    },
    TierStats {
        dice_options: &[
            DiceConfig::new(3, 8, 4),
            DiceConfig::new(2, 12, 2),
            DiceConfig::new(4, 6, 3),
            DiceConfig::new(3, 10, 2),
            DiceConfig::new(5, 4, 5),
        ],
        base_cost: 600,
        damage_range: (12, 28),
    },
    TierStats {
        dice_options: &[
            DiceConfig::new(4, 10, 6),
            DiceConfig::new(6, 6, 8),
            DiceConfig::new(3, 12, 8),
            DiceConfig::new(5, 8, 6),
            DiceConfig::new(4, 12, 4),
        ],
        base_cost: 1200,
        damage_range: (16, 46),
    },
    TierStats {
        dice_options: &[
            DiceConfig::new(6, 12, 10),
            DiceConfig::new(8, 8, 12),
            DiceConfig::new(5, 20, 5),
            DiceConfig::new(7, 10, 10),
            DiceConfig::new(10, 6, 15),
        ],
        base_cost: 2500,
        damage_range: (28, 82),
    },
];

/// Broad weapon category; each category has its own equipped slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponCategory {
    /// Melee weapons used in stronghold combat
    Combat,
    /// Ranged weapons used for hunting
    Hunting,
}

impl WeaponCategory {
    /// Lowercase category name.
    pub fn name(self) -> &'static str {
        match self {
            WeaponCategory::Combat => "combat",
            WeaponCategory::Hunting => "hunting",
        }
    }
}

/// Concrete weapon type, including the named hunting variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Combat,
    Hunting,
    Revolver,
    HuntingRifle,
}

impl WeaponType {
    /// Category (and equipped slot) this type belongs to.
    pub fn category(self) -> WeaponCategory {
        match self {
            WeaponType::Combat => WeaponCategory::Combat,
            WeaponType::Hunting | WeaponType::Revolver | WeaponType::HuntingRifle => {
                WeaponCategory::Hunting
            }
        }
    }
}

/// Materials and coins needed for a weapon's next upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCost {
    pub copper_bars: u32,
    pub iron_bars: u32,
    pub coins: u64,
}

impl fmt::Display for UpgradeCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} copper bars, {} iron bars, and {} coins",
            self.copper_bars, self.iron_bars, self.coins
        )
    }
}

/// Shot readiness of a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FireState {
    #[default]
    Ready,
    /// Reloading since the stored timestamp
    Reloading { since: Duration },
}

/// A weapon owned by the player or stocked by a fort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: WeaponId,
    pub name: String,
    pub weapon_type: WeaponType,
    pub tier: WeaponTier,
    pub dice_config: DiceConfig,
    #[serde(default)]
    pub upgrade_level: u32,
    /// Reload state of weapons that need reloading
    #[serde(skip)]
    pub fire_state: FireState,
    /// Timestamp of the last shot for weapons without a reload cycle
    #[serde(skip)]
    pub last_shot: Option<Duration>,
}

impl Weapon {
    /// Creates a weapon with a generated name and a dice configuration drawn
    /// from the tier's option table.
    pub fn new<R: Rng + ?Sized>(weapon_type: WeaponType, tier: WeaponTier, rng: &mut R) -> Self {
        let name = names::weapon_name(tier, rng);
        Self::named(name, weapon_type, tier, rng)
    }

    /// Creates a weapon with a fixed name and a drawn dice configuration.
    pub fn named<R: Rng + ?Sized>(
        name: impl Into<String>,
        weapon_type: WeaponType,
        tier: WeaponTier,
        rng: &mut R,
    ) -> Self {
        let options = tier.stats().dice_options;
        let dice = options.choose(rng).copied().unwrap_or(options[0]);
        Self::with_dice(name, weapon_type, tier, dice)
    }

    /// Creates a weapon with an explicit dice configuration.
    pub fn with_dice(
        name: impl Into<String>,
        weapon_type: WeaponType,
        tier: WeaponTier,
        dice_config: DiceConfig,
    ) -> Self {
        Self {
            id: new_weapon_id(),
            name: name.into(),
            weapon_type,
            tier,
            dice_config,
            upgrade_level: 0,
            fire_state: FireState::Ready,
            last_shot: None,
        }
    }

    /// Category (equipped slot) of this weapon.
    pub fn category(&self) -> WeaponCategory {
        self.weapon_type.category()
    }

    /// Average damage per hit, rounded to one decimal.
    pub fn average_damage(&self) -> f64 {
        round_to_tenth(self.dice_config.average())
    }

    /// Rolls damage for one hit.
    pub fn roll_damage<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        self.dice_config.roll(rng)
    }

    /// Shop price: the tier's base cost scaled by how strong this weapon's
    /// dice are within the tier.
    pub fn cost(&self) -> u64 {
        let stats = self.tier.stats();
        let damage_factor = self.average_damage() / f64::from(stats.damage_range.1);
        (stats.base_cost as f64 * (0.8 + damage_factor * 0.4)) as u64
    }

    /// Materials needed for the next upgrade.
    pub fn upgrade_cost(&self) -> UpgradeCost {
        let tier = u32::from(self.tier.get());
        UpgradeCost {
            copper_bars: tier + self.upgrade_level,
            iron_bars: tier.saturating_sub(1).max(1) + self.upgrade_level,
            coins: u64::from(tier) * 100 * u64::from(self.upgrade_level + 1),
        }
    }

    /// Raises the upgrade level by one and improves the dice accordingly.
    pub fn apply_upgrade(&mut self) {
        self.upgrade_level += 1;
        self.dice_config = self.dice_config.upgraded(self.upgrade_level);
    }

    /// Whether this weapon goes through a reload cycle after every shot.
    pub fn needs_reload(&self) -> bool {
        self.category() == WeaponCategory::Hunting && self.tier.get() >= 3
    }

    /// Time between shots for the current tier and upgrade level.
    pub fn cooldown(&self) -> Duration {
        let mut base = 2.0 - f64::from(self.tier.get()) * 0.2;
        if self.category() == WeaponCategory::Hunting {
            base += 1.0;
        }
        let reduction = 0.15 * f64::from(self.upgrade_level);
        Duration::from_secs_f64((base * (1.0 - reduction)).max(0.5))
    }

    /// Whether a shot at `now` would fire.
    pub fn can_shoot(&self, now: Duration) -> bool {
        if self.needs_reload() {
            match self.fire_state {
                FireState::Ready => true,
                FireState::Reloading { since } => now.saturating_sub(since) >= self.cooldown(),
            }
        } else {
            match self.last_shot {
                Some(last) => now.saturating_sub(last) >= self.cooldown(),
                None => true,
            }
        }
    }

    /// Fires the weapon at `now`.
    ///
    /// Returns 0 and leaves the weapon untouched when it is not ready;
    /// otherwise returns the rolled damage and restarts the cooldown.
    pub fn shoot<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> u32 {
        if !self.can_shoot(now) {
            return 0;
        }

        self.last_shot = Some(now);
        if self.needs_reload() {
            self.fire_state = FireState::Reloading { since: now };
        }
        self.roll_damage(rng)
    }

    /// Starts a reload cycle on weapons that have one.
    pub fn start_reload(&mut self, now: Duration) {
        if self.needs_reload() {
            self.fire_state = FireState::Reloading { since: now };
        }
    }

    /// Time left before the weapon can fire again.
    pub fn remaining_cooldown(&self, now: Duration) -> Duration {
        let started = if self.needs_reload() {
            match self.fire_state {
                FireState::Ready => return Duration::ZERO,
                FireState::Reloading { since } => since,
            }
        } else {
            match self.last_shot {
                Some(last) => last,
                None => return Duration::ZERO,
            }
        };
        self.cooldown().saturating_sub(now.saturating_sub(started))
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (tier {}, {}, avg: {})",
            self.name,
            self.tier,
            self.dice_config,
            self.average_damage()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tier(value: u8) -> WeaponTier {
        WeaponTier::new(value).unwrap()
    }

    #[test]
    fn test_tier_bounds() {
        assert!(WeaponTier::new(0).is_err());
        assert!(WeaponTier::new(6).is_err());
        assert_eq!(WeaponTier::all().count(), 5);
    }

    #[test]
    fn test_tier_one_scenario() {
        let weapon = Weapon::with_dice("Blade", WeaponType::Combat, tier(1), DiceConfig::new(1, 6, 2));
        assert_eq!(weapon.average_damage(), 5.5);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let damage = weapon.roll_damage(&mut rng);
            assert!((3..=8).contains(&damage));
        }
    }

    #[test]
    fn test_expected_damage_increases_with_tier() {
        let averages: Vec<f64> = TIER_TABLE.iter().map(|t| t.expected_average()).collect();
        for pair in averages.windows(2) {
            assert!(pair[1] > pair[0], "{averages:?}");
        }
    }

    #[test]
    fn test_new_weapon_uses_tier_table() {
        let mut rng = StdRng::seed_from_u64(3);
        for t in WeaponTier::all() {
            let weapon = Weapon::new(WeaponType::Combat, t, &mut rng);
            assert!(t.stats().dice_options.contains(&weapon.dice_config));
            assert_eq!(weapon.upgrade_level, 0);
            let words = weapon.name.split_whitespace().count();
            match t.get() {
                1 => assert_eq!(words, 1),
                2 => assert_eq!(words, 2),
                _ => assert!(words >= 4, "{}", weapon.name),
            }
        }
    }

    #[test]
    fn test_cost_formula() {
        // 1d6+2: 100 * (0.8 + 0.4 * 5.5 / 8) = 107.5
        let weapon = Weapon::with_dice("Blade", WeaponType::Combat, tier(1), DiceConfig::new(1, 6, 2));
        assert_eq!(weapon.cost(), 107);

        // 6d12+10: 2500 * (0.8 + 0.4 * 49 / 82) = 2597.56...
        let weapon = Weapon::with_dice("Edge", WeaponType::Combat, tier(5), DiceConfig::new(6, 12, 10));
        assert_eq!(weapon.cost(), 2597);
    }

    #[test]
    fn test_upgrade_progression() {
        let mut weapon =
            Weapon::with_dice("Blade", WeaponType::Combat, tier(2), DiceConfig::new(2, 6, 2));
        assert_eq!(
            weapon.upgrade_cost(),
            UpgradeCost {
                copper_bars: 2,
                iron_bars: 1,
                coins: 200
            }
        );

        weapon.apply_upgrade();
        assert_eq!(weapon.dice_config, DiceConfig::new(2, 6, 3));
        assert_eq!(weapon.average_damage(), 10.0);

        weapon.apply_upgrade();
        assert_eq!(weapon.dice_config, DiceConfig::new(3, 6, 3));

        weapon.apply_upgrade();
        assert_eq!(weapon.dice_config, DiceConfig::new(4, 6, 4));
        weapon.apply_upgrade();
        assert_eq!(weapon.dice_config, DiceConfig::new(5, 6, 5));

        assert_eq!(weapon.upgrade_level, 4);
        assert_eq!(weapon.upgrade_cost().coins, 1000);
        assert_eq!(weapon.upgrade_cost().copper_bars, 6);
        assert_eq!(weapon.upgrade_cost().iron_bars, 5);
    }

    #[test]
    fn test_cooldown_formula() {
        let close = |d: Duration, secs: f64| (d.as_secs_f64() - secs).abs() < 1e-6;

        let mut sword = Weapon::with_dice("Blade", WeaponType::Combat, tier(1), DiceConfig::new(1, 6, 2));
        assert!(close(sword.cooldown(), 1.8));

        let rifle = Weapon::with_dice("Rifle", WeaponType::HuntingRifle, tier(3), DiceConfig::new(3, 8, 4));
        assert!(close(rifle.cooldown(), 2.4));

        sword.apply_upgrade();
        assert!(close(sword.cooldown(), 1.8 * 0.85));

        for _ in 0..10 {
            sword.apply_upgrade();
        }
        assert!(close(sword.cooldown(), 0.5));
    }

    #[test]
    fn test_reload_state_machine() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut rifle =
            Weapon::with_dice("Rifle", WeaponType::HuntingRifle, tier(3), DiceConfig::new(3, 8, 4));
        assert!(rifle.needs_reload());

        let start = Duration::from_secs(10);
        assert!(rifle.shoot(start, &mut rng) >= 7);
        assert_eq!(rifle.fire_state, FireState::Reloading { since: start });

        let early = start + Duration::from_secs(1);
        assert_eq!(rifle.shoot(early, &mut rng), 0);
        assert_eq!(rifle.fire_state, FireState::Reloading { since: start });
        assert!(rifle.remaining_cooldown(early) > Duration::ZERO);

        let later = start + rifle.cooldown();
        assert!(rifle.can_shoot(later));
        assert!(rifle.shoot(later, &mut rng) > 0);
        assert_eq!(rifle.fire_state, FireState::Reloading { since: later });
    }

    #[test]
    fn test_last_shot_cooldown() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut revolver =
            Weapon::with_dice("Old Revolver", WeaponType::Hunting, tier(1), DiceConfig::new(1, 6, 2));
        assert!(!revolver.needs_reload());

        let start = Duration::from_secs(1);
        assert!(revolver.shoot(start, &mut rng) > 0);
        assert_eq!(revolver.fire_state, FireState::Ready);
        assert_eq!(revolver.shoot(start + Duration::from_secs(1), &mut rng), 0);
        assert!(revolver.shoot(start + Duration::from_secs(3), &mut rng) > 0);
    }

    #[test]
    fn test_weapon_serialization_shape() {
        let weapon = Weapon::with_dice("Blade", WeaponType::HuntingRifle, tier(3), DiceConfig::new(3, 8, 4));
        let value = serde_json::to_value(&weapon).unwrap();
        assert_eq!(value["weapon_type"], "hunting_rifle");
        assert_eq!(value["tier"], 3);
        assert_eq!(value["dice_config"], serde_json::json!([3, 8, 4]));
        assert!(value.get("fire_state").is_none());

        let back: Weapon = serde_json::from_value(value).unwrap();
        assert_eq!(back, weapon);
    }
}
