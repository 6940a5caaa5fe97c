//! # Economy
//!
//! Vendor price lists and the crafting recipes run by town shops.
//!
//! Every operation checks coins and materials before touching the ledger, so
//! a failed trade leaves everything as it was.

use crate::game::player::item_names;
use crate::{Ledger, Profession, WayfarerError, WayfarerResult, Weapon};
use std::fmt;

/// What each vendor pays for goods the player brings in.
const VENDOR_BUYS: &[(Profession, &[(&str, u64)])] = &[
    (
        Profession::Chef,
        &[
            ("chicken meat", 20),
            ("venison", 60),
            ("bear meat", 40),
            ("bird meat", 100),
        ],
    ),
    (
        Profession::Blacksmith,
        &[("silver ore", 200), ("gold ore", 500), ("diamond", 1000)],
    ),
    (
        Profession::Fisher,
        &[
            ("cod", 30),
            ("bass", 45),
            ("trout", 60),
            ("salmon", 80),
            ("angelfish", 100),
            ("hammerhead shark", 150),
        ],
    ),
    (Profession::Lumberjack, &[("wood", 5)]),
];

/// What each vendor charges for its wares.
const VENDOR_SELLS: &[(Profession, &[(&str, u64)])] = &[
    (Profession::Chef, &[("pork", 50)]),
    (Profession::Toolsmith, &[("shovel", 200), ("pickaxe", 350)]),
    (Profession::Gunsmith, &[("hunting rifle", 500)]),
    (Profession::Fisher, &[("fishing rod", 250), ("boat", 1000)]),
    (Profession::Lumberjack, &[("axe", 150), ("advanced map", 300)]),
];

fn lookup(table: &[(Profession, &[(&str, u64)])], vendor: Profession, item: &str) -> Option<u64> {
    table
        .iter()
        .find(|(profession, _)| *profession == vendor)
        .and_then(|(_, prices)| prices.iter().find(|(name, _)| *name == item))
        .map(|(_, price)| *price)
}

/// Price `vendor` pays for one `item`, if it buys it at all.
pub fn vendor_buy_price(vendor: Profession, item: &str) -> Option<u64> {
    lookup(VENDOR_BUYS, vendor, item)
}

/// Price `vendor` charges for one `item`, if it sells it at all.
pub fn vendor_sell_price(vendor: Profession, item: &str) -> Option<u64> {
    lookup(VENDOR_SELLS, vendor, item)
}

/// Everything `vendor` sells, with prices.
pub fn vendor_wares(vendor: Profession) -> &'static [(&'static str, u64)] {
    VENDOR_SELLS
        .iter()
        .find(|(profession, _)| *profession == vendor)
        .map_or(&[], |(_, wares)| *wares)
}

/// Everything `vendor` buys, with prices.
pub fn vendor_wants(vendor: Profession) -> &'static [(&'static str, u64)] {
    VENDOR_BUYS
        .iter()
        .find(|(profession, _)| *profession == vendor)
        .map_or(&[], |(_, wants)| *wants)
}

fn check_amount(amount: u32) -> WayfarerResult<()> {
    if amount == 0 {
        return Err(WayfarerError::InvalidAction(
            "amount must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Buys `amount` of `item` from `vendor` into the ledger.
pub fn buy_item<L: Ledger + ?Sized>(
    ledger: &mut L,
    vendor: Profession,
    item: &str,
    amount: u32,
) -> WayfarerResult<String> {
    check_amount(amount)?;
    let price = vendor_sell_price(vendor, item)
        .ok_or_else(|| WayfarerError::ItemNotFound(format!("the {vendor} doesn't sell {item}")))?;
    let total = price * u64::from(amount);

    ledger.remove_coins(total)?;
    ledger.add_item(item, amount);
    Ok(format!("Bought {amount} {item} for {total} coins"))
}

/// Sells `amount` of `item` from the ledger to `vendor`.
pub fn sell_item<L: Ledger + ?Sized>(
    ledger: &mut L,
    vendor: Profession,
    item: &str,
    amount: u32,
) -> WayfarerResult<String> {
    check_amount(amount)?;
    let price = vendor_buy_price(vendor, item)
        .ok_or_else(|| WayfarerError::ItemNotFound(format!("the {vendor} doesn't buy {item}")))?;
    let total = price * u64::from(amount);

    ledger.remove_item(item, amount)?;
    ledger.add_coins(total);
    Ok(format!("Sold {amount} {item} for {total} coins"))
}

/// Metals the blacksmith smelts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metal {
    Copper,
    Iron,
}

impl Metal {
    pub fn ore(self) -> &'static str {
        match self {
            Metal::Copper => "copper ore",
            Metal::Iron => "iron ore",
        }
    }

    pub fn bar(self) -> &'static str {
        match self {
            Metal::Copper => item_names::COPPER_BAR,
            Metal::Iron => item_names::IRON_BAR,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "copper" => Some(Metal::Copper),
            "iron" => Some(Metal::Iron),
            _ => None,
        }
    }
}

/// Ore needed per bar.
pub const ORE_PER_BAR: u32 = 5;

/// Smelts ore into one bar.
pub fn smelt<L: Ledger + ?Sized>(ledger: &mut L, metal: Metal) -> WayfarerResult<String> {
    ledger.remove_item(metal.ore(), ORE_PER_BAR)?;
    ledger.add_item(metal.bar(), 1);
    Ok(format!("Smelted {ORE_PER_BAR} {} into 1 {}", metal.ore(), metal.bar()))
}

/// Meat the chef can turn into meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealKind {
    Chicken,
    Venison,
    Bear,
    Bird,
}

impl MealKind {
    pub const ALL: [MealKind; 4] = [
        MealKind::Chicken,
        MealKind::Venison,
        MealKind::Bear,
        MealKind::Bird,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MealKind::Chicken => "chicken",
            MealKind::Venison => "venison",
            MealKind::Bear => "bear",
            MealKind::Bird => "bird",
        }
    }

    pub fn meat(self) -> &'static str {
        match self {
            MealKind::Chicken => "chicken meat",
            MealKind::Venison => "venison",
            MealKind::Bear => "bear meat",
            MealKind::Bird => "bird meat",
        }
    }

    pub fn meal(self) -> &'static str {
        match self {
            MealKind::Chicken => "chicken meal",
            MealKind::Venison => "venison meal",
            MealKind::Bear => "bear meal",
            MealKind::Bird => "bird meal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        MealKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Meat needed per meal.
pub const MEAT_PER_MEAL: u32 = 5;

/// Cooks raw meat into one meal.
pub fn craft_meal<L: Ledger + ?Sized>(ledger: &mut L, kind: MealKind) -> WayfarerResult<String> {
    ledger.remove_item(kind.meat(), MEAT_PER_MEAL)?;
    ledger.add_item(kind.meal(), 1);
    Ok(format!("Cooked a {}", kind.meal()))
}

/// Bullets cast from one silver ore.
pub const BULLETS_PER_SILVER: u32 = 20;

/// Casts bullets from a silver ore.
pub fn craft_bullets<L: Ledger + ?Sized>(ledger: &mut L) -> WayfarerResult<String> {
    ledger.remove_item(item_names::SILVER_ORE, 1)?;
    ledger.add_item(item_names::BULLETS, BULLETS_PER_SILVER);
    Ok(format!("Crafted {BULLETS_PER_SILVER} bullets from 1 silver ore"))
}

/// Digging tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Shovel,
    Pickaxe,
}

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Shovel => "shovel",
            Tool::Pickaxe => "pickaxe",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "shovel" => Some(Tool::Shovel),
            "pickaxe" => Some(Tool::Pickaxe),
            _ => None,
        }
    }

    /// Inventory item for this tool at `tier`.
    pub fn item(self, tier: ToolTier) -> String {
        match tier {
            ToolTier::Basic => self.name().to_string(),
            ToolTier::Copper => format!("copper {}", self.name()),
            ToolTier::Iron => format!("iron {}", self.name()),
        }
    }
}

/// Quality of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolTier {
    Basic,
    Copper,
    Iron,
}

impl ToolTier {
    pub fn name(self) -> &'static str {
        match self {
            ToolTier::Basic => "basic",
            ToolTier::Copper => "copper",
            ToolTier::Iron => "iron",
        }
    }

    /// Price of upgrading `tool` to this tier: coins plus bars.
    pub fn upgrade_cost(self, tool: Tool) -> Option<(u64, Metal, u32)> {
        match (tool, self) {
            (_, ToolTier::Basic) => None,
            (Tool::Shovel, ToolTier::Copper) => Some((100, Metal::Copper, 2)),
            (Tool::Shovel, ToolTier::Iron) => Some((250, Metal::Iron, 3)),
            (Tool::Pickaxe, ToolTier::Copper) => Some((150, Metal::Copper, 3)),
            (Tool::Pickaxe, ToolTier::Iron) => Some((300, Metal::Iron, 4)),
        }
    }

    fn previous(self) -> Option<ToolTier> {
        match self {
            ToolTier::Basic => None,
            ToolTier::Copper => Some(ToolTier::Basic),
            ToolTier::Iron => Some(ToolTier::Copper),
        }
    }
}

impl fmt::Display for ToolTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Best version of `tool` the ledger holds.
pub fn tool_tier<L: Ledger + ?Sized>(ledger: &L, tool: Tool) -> Option<ToolTier> {
    [ToolTier::Iron, ToolTier::Copper, ToolTier::Basic]
        .into_iter()
        .find(|tier| ledger.has_item(&tool.item(*tier)))
}

/// Upgrades `tool` one step to `target`, trading in the previous version.
pub fn upgrade_tool<L: Ledger + ?Sized>(
    ledger: &mut L,
    tool: Tool,
    target: ToolTier,
) -> WayfarerResult<String> {
    let (coins, metal, bars) = target.upgrade_cost(tool).ok_or_else(|| {
        WayfarerError::InvalidAction(format!("a {} cannot be upgraded to {target}", tool.name()))
    })?;
    let previous = target
        .previous()
        .map(|tier| tool.item(tier))
        .unwrap_or_default();
    if !ledger.has_item(&previous) {
        return Err(WayfarerError::ItemNotFound(previous));
    }
    ledger.ensure_coins(coins)?;
    ledger.ensure_items(metal.bar(), bars)?;

    ledger.remove_coins(coins)?;
    ledger.remove_item(metal.bar(), bars)?;
    ledger.remove_item(&previous, 1)?;
    let upgraded = tool.item(target);
    ledger.add_item(&upgraded, 1);
    Ok(format!("Upgraded your {previous} to a {upgraded}"))
}

/// Pays for and applies the next upgrade of `weapon`.
pub fn upgrade_weapon<L: Ledger + ?Sized>(
    ledger: &mut L,
    weapon: &mut Weapon,
) -> WayfarerResult<String> {
    let cost = weapon.upgrade_cost();
    if ledger.item_count(item_names::COPPER_BAR) < cost.copper_bars
        || ledger.item_count(item_names::IRON_BAR) < cost.iron_bars
        || ledger.coins() < cost.coins
    {
        return Err(WayfarerError::InsufficientMaterials(cost.to_string()));
    }

    ledger.remove_item(item_names::COPPER_BAR, cost.copper_bars)?;
    ledger.remove_item(item_names::IRON_BAR, cost.iron_bars)?;
    ledger.remove_coins(cost.coins)?;
    weapon.apply_upgrade();
    Ok(format!(
        "Upgraded {} to level {}. New damage: {} (avg: {})",
        weapon.name,
        weapon.upgrade_level,
        weapon.dice_config,
        weapon.average_damage()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiceConfig, PlayerState, WeaponTier, WeaponType};

    fn rich_player() -> PlayerState {
        let mut player = PlayerState::empty();
        player.add_coins(1000);
        player
    }

    #[test]
    fn test_price_lookup() {
        assert_eq!(vendor_buy_price(Profession::Fisher, "salmon"), Some(80));
        assert_eq!(vendor_buy_price(Profession::Fisher, "wood"), None);
        assert_eq!(vendor_sell_price(Profession::Fisher, "boat"), Some(1000));
        assert_eq!(vendor_sell_price(Profession::Blacksmith, "boat"), None);
        assert!(vendor_wares(Profession::Blacksmith).is_empty());
        assert_eq!(vendor_wants(Profession::Lumberjack), &[("wood", 5)]);
    }

    #[test]
    fn test_buy_and_sell() {
        let mut player = rich_player();
        buy_item(&mut player, Profession::Lumberjack, "axe", 2).unwrap();
        assert_eq!(player.coins(), 700);
        assert_eq!(player.item_count("axe"), 2);

        player.add_item("wood", 10);
        sell_item(&mut player, Profession::Lumberjack, "wood", 10).unwrap();
        assert_eq!(player.coins(), 750);
        assert_eq!(player.item_count("wood"), 0);
    }

    #[test]
    fn test_failed_trades_change_nothing() {
        let mut player = rich_player();
        assert!(matches!(
            buy_item(&mut player, Profession::Fisher, "boat", 2),
            Err(WayfarerError::InsufficientFunds { needed: 2000, available: 1000 })
        ));
        assert!(sell_item(&mut player, Profession::Chef, "venison", 1).is_err());
        assert!(buy_item(&mut player, Profession::Chef, "diamond", 1).is_err());
        assert!(buy_item(&mut player, Profession::Chef, "pork", 0).is_err());
        assert_eq!(player.coins(), 1000);
        assert!(player.inventory().is_empty());
    }

    #[test]
    fn test_smelting_and_cooking() {
        let mut player = PlayerState::empty();
        player.add_item("iron ore", 7);
        smelt(&mut player, Metal::Iron).unwrap();
        assert_eq!(player.item_count("iron bar"), 1);
        assert_eq!(player.item_count("iron ore"), 2);
        assert!(smelt(&mut player, Metal::Iron).is_err());
        assert!(smelt(&mut player, Metal::Copper).is_err());

        player.add_item("bear meat", 5);
        craft_meal(&mut player, MealKind::Bear).unwrap();
        assert_eq!(player.item_count("bear meal"), 1);
        assert!(craft_meal(&mut player, MealKind::Bird).is_err());
    }

    #[test]
    fn test_bullets_from_silver() {
        let mut player = PlayerState::empty();
        assert!(craft_bullets(&mut player).is_err());
        player.add_item("silver ore", 1);
        craft_bullets(&mut player).unwrap();
        assert_eq!(player.item_count("bullets"), 20);
        assert_eq!(player.item_count("silver ore"), 0);
    }

    #[test]
    fn test_tool_upgrades_step_by_step() {
        let mut player = rich_player();
        player.add_item("shovel", 1);
        player.add_item("copper bar", 2);
        player.add_item("iron bar", 3);
        assert_eq!(tool_tier(&player, Tool::Shovel), Some(ToolTier::Basic));

        assert!(upgrade_tool(&mut player, Tool::Shovel, ToolTier::Iron).is_err());
        upgrade_tool(&mut player, Tool::Shovel, ToolTier::Copper).unwrap();
        assert_eq!(tool_tier(&player, Tool::Shovel), Some(ToolTier::Copper));
        assert_eq!(player.coins(), 900);
        assert_eq!(player.item_count("shovel"), 0);

        upgrade_tool(&mut player, Tool::Shovel, ToolTier::Iron).unwrap();
        assert_eq!(tool_tier(&player, Tool::Shovel), Some(ToolTier::Iron));
        assert_eq!(player.coins(), 650);
        assert_eq!(tool_tier(&player, Tool::Pickaxe), None);
    }

    #[test]
    fn test_tool_upgrade_without_bars_is_atomic() {
        let mut player = rich_player();
        player.add_item("pickaxe", 1);
        player.add_item("copper bar", 2);
        assert!(upgrade_tool(&mut player, Tool::Pickaxe, ToolTier::Copper).is_err());
        assert_eq!(player.coins(), 1000);
        assert_eq!(player.item_count("pickaxe"), 1);
        assert_eq!(player.item_count("copper bar"), 2);
    }

    #[test]
    fn test_weapon_upgrade_costs_and_effect() {
        let mut player = rich_player();
        let mut weapon = Weapon::with_dice(
            "Saber",
            WeaponType::Combat,
            WeaponTier::new(2).unwrap(),
            DiceConfig::new(2, 6, 2),
        );
        assert!(upgrade_weapon(&mut player, &mut weapon).is_err());
        assert_eq!(weapon.upgrade_level, 0);

        player.add_item("copper bar", 2);
        player.add_item("iron bar", 1);
        upgrade_weapon(&mut player, &mut weapon).unwrap();
        assert_eq!(weapon.upgrade_level, 1);
        assert_eq!(weapon.dice_config, DiceConfig::new(2, 6, 3));
        assert_eq!(player.coins(), 800);
        assert!(player.inventory().is_empty());
    }
}
