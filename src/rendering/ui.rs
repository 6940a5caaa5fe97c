//! # User Interface Elements
//!
//! Text panels for the player's status, inventory, weapons and shop listings.

use crate::game::economy::{vendor_wants, vendor_wares};
use crate::{Ledger, PlayerState, Profession, Weapon, WeaponCategory};
use std::fmt::Write;

pub const HELP_TEXT: &str = "\
Movement:  n s e w ne nw se sw (or: go <direction>)
Looking:   look, map, status, inventory, weapons, town
Gathering: chop, shoot, eat
Towns:     buy <vendor> <item> [amount], sell <vendor> <item> [amount]
           smelt <copper|iron>, cook <chicken|venison|bear|bird>, bullets
           upgrade weapon [combat|hunting], upgrade <shovel|pickaxe> <copper|iron>
           enter <x> <y>   (sneak into a house shown by `town`)
Forts:     fort, fort buy <n>
Combat:    fight, attack, flee, heal <meal>, switch [combat|hunting]
Game:      save, load, history, help, quit";

/// One-line summary of the player's vitals and purse.
pub fn render_status(player: &PlayerState) -> String {
    format!(
        "Position {} | Health {} | Energy {} | Coins {}",
        player.position,
        player.health(),
        player.energy(),
        player.coins()
    )
}

pub fn render_inventory(player: &PlayerState) -> String {
    if player.inventory().is_empty() {
        return "Your pack is empty.".to_string();
    }
    let mut output = String::from("Inventory:");
    for (item, count) in player.inventory() {
        let _ = write!(output, "\n  {count:>4} {item}");
    }
    output
}

/// Owned weapons by category, marking the equipped ones with `*`.
pub fn render_weapons(player: &PlayerState) -> String {
    let mut output = String::new();
    for category in [WeaponCategory::Combat, WeaponCategory::Hunting] {
        if !output.is_empty() {
            output.push('\n');
        }
        let _ = write!(output, "{} weapons:", category.name());
        let equipped = player.equipped_id(category);
        for weapon in player.weapons_of(category) {
            let marker = if Some(weapon.id) == equipped { '*' } else { ' ' };
            let _ = write!(output, "\n {marker} {weapon}");
        }
    }
    output
}

/// Numbered fort listing, matching `fort buy <n>`.
pub fn render_fort_stock(stock: &[Weapon]) -> String {
    let mut output = String::from("The fort keeper offers:");
    for (index, weapon) in stock.iter().enumerate() {
        let _ = write!(output, "\n  {}. {} - {} coins", index + 1, weapon, weapon.cost());
    }
    output
}

/// What a vendor sells and buys.
pub fn render_vendor(profession: Profession, name: &str) -> String {
    let mut output = format!("{name} the {profession}");
    let wares = vendor_wares(profession);
    if !wares.is_empty() {
        output.push_str("\n  sells:");
        for (item, price) in wares {
            let _ = write!(output, " {item} ({price})");
        }
    }
    let wants = vendor_wants(profession);
    if !wants.is_empty() {
        output.push_str("\n  buys:");
        for (item, price) in wants {
            let _ = write!(output, " {item} ({price})");
        }
    }
    output
}
