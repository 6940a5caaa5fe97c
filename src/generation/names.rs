//! # Name Generation
//!
//! Word-list combinatorics for weapon, town and townsfolk names.

use crate::{Profession, TownSize, WeaponTier};
use rand::seq::SliceRandom;
use rand::Rng;

const WEAPON_PREFIXES: &[&str] = &[
    "Rusty", "Ancient", "Gleaming", "Shadow", "Light", "Burning", "Frozen", "Mystic", "Arcane",
    "Divine", "Infernal", "Blessed", "Cursed", "Royal", "Forgotten", "Deadly", "Swift", "Mighty",
    "Vengeful", "Savage", "Precise", "Brutal", "Elegant", "Vicious",
];

const WEAPON_NOUNS: &[&str] = &[
    "Blade", "Sword", "Saber", "Rapier", "Claymore", "Dagger", "Slicer", "Cutter", "Reaver",
    "Fang", "Edge", "Bane", "Slayer", "Cleaver", "Maul", "Destroyer", "Vanquisher",
];

const WEAPON_SUFFIXES: &[&str] = &[
    "of Power", "of Might", "of Glory", "of Triumph", "of Victory", "of Ruin", "of Doom",
    "of Despair", "of Sorrow", "of Agony", "of Souls", "of Eternity", "of Infinity",
    "of the Lion", "of the Dragon", "of the Phoenix", "of the Serpent",
];

/// Town name prefixes, indexed by [`TownSize::index`].
const TOWN_PREFIXES: [&[&str]; 3] = [
    &[
        "Little", "Quiet", "Peaceful", "Hidden", "Green", "Sunny", "Cozy", "Meadow", "Pine",
        "Brook",
    ],
    &[
        "Silver", "Golden", "River", "Lake", "Forest", "Market", "Harbor", "Mill", "Bridge",
        "Trade",
    ],
    &[
        "Royal", "Grand", "Imperial", "Great", "Capital", "Crown", "High", "Stone", "Castle",
        "King's",
    ],
];

const TOWN_SUFFIXES: [&[&str]; 3] = [
    &[
        "hamlet", "brook", "crossing", "meadow", "grove", "glen", "vale", "rest", "garden",
        "spring",
    ],
    &[
        "port", "town", "market", "bridge", "mill", "ford", "haven", "cross", "field", "wood",
    ],
    &[
        "city", "keep", "castle", "gate", "spire", "throne", "realm", "crown", "shire", "hold",
    ],
];

const FIRST_NAMES: &[&str] = &[
    "John", "William", "Thomas", "Henry", "Edward", "Arthur", "Mary", "Elizabeth", "Anne",
    "Margaret", "James", "Robert", "George", "Charles", "Richard", "Emma", "Sarah", "Catherine",
    "Alice", "Jane",
];

fn surname_roots(profession: Profession) -> &'static [&'static str] {
    match profession {
        Profession::Fisher => &[
            "Sea", "Storm", "Wave", "Salt", "Tide", "Shore", "Shell", "Harbor", "Bay", "Net",
        ],
        Profession::Lumberjack => &[
            "Wood", "Oak", "Pine", "Forest", "Axe", "Timber", "Cedar", "Maple", "Birch", "Elm",
        ],
        Profession::Blacksmith => &[
            "Iron", "Steel", "Forge", "Hammer", "Fire", "Anvil", "Coal", "Flame", "Metal",
            "Bronze",
        ],
        Profession::Toolsmith => &[
            "Craft", "Smith", "Work", "Tool", "Metal", "Gear", "Wrench", "Maker", "Builder",
            "Trade",
        ],
        Profession::Gunsmith => &[
            "Gun", "Powder", "Shot", "Arms", "Steel", "Flint", "Barrel", "Trigger", "Bullet",
            "Lead",
        ],
        Profession::Chef => &[
            "Pan", "Cook", "Spice", "Kitchen", "Salt", "Pepper", "Sage", "Thyme", "Baker", "Brew",
        ],
    }
}

fn pick<R: Rng + ?Sized>(words: &[&'static str], rng: &mut R) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

/// Generates a weapon name; higher tiers get longer names.
///
/// Tier 1 is a bare noun, tier 2 adds a prefix, tier 3 and up add a suffix too.
pub fn weapon_name<R: Rng + ?Sized>(tier: WeaponTier, rng: &mut R) -> String {
    match tier.get() {
        1 => pick(WEAPON_NOUNS, rng).to_string(),
        2 => format!("{} {}", pick(WEAPON_PREFIXES, rng), pick(WEAPON_NOUNS, rng)),
        _ => format!(
            "{} {} {}",
            pick(WEAPON_PREFIXES, rng),
            pick(WEAPON_NOUNS, rng),
            pick(WEAPON_SUFFIXES, rng)
        ),
    }
}

/// Generates a town name from the word lists of its size class.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use wayfarer::{generation::names, TownSize};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let name = names::town_name(TownSize::Large, &mut rng);
/// assert_eq!(name.split(' ').count(), 2);
/// ```
pub fn town_name<R: Rng + ?Sized>(size: TownSize, rng: &mut R) -> String {
    let prefix = pick(TOWN_PREFIXES[size.index()], rng);
    let suffix = pick(TOWN_SUFFIXES[size.index()], rng);
    format!("{} {}", prefix, capitalize(suffix))
}

/// Generates a townsperson's name.
///
/// Surnames come from the profession's word list with either a trade ending
/// ("smith" for smiths, "son" otherwise) or a place ending ("worth" or "ton").
pub fn npc_name<R: Rng + ?Sized>(profession: Profession, rng: &mut R) -> String {
    let root = pick(surname_roots(profession), rng);
    let ending = if rng.gen_bool(0.5) {
        if profession.name().contains("smith") {
            "smith"
        } else {
            "son"
        }
    } else if rng.gen_bool(0.5) {
        "worth"
    } else {
        "ton"
    };
    format!("{} {}{}", pick(FIRST_NAMES, rng), root, ending)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_weapon_name_complexity_by_tier() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let t1 = weapon_name(WeaponTier::new(1).unwrap(), &mut rng);
            assert!(WEAPON_NOUNS.contains(&t1.as_str()));

            let t2 = weapon_name(WeaponTier::new(2).unwrap(), &mut rng);
            let (prefix, noun) = t2.split_once(' ').unwrap();
            assert!(WEAPON_PREFIXES.contains(&prefix));
            assert!(WEAPON_NOUNS.contains(&noun));

            let t5 = weapon_name(WeaponTier::new(5).unwrap(), &mut rng);
            assert!(WEAPON_SUFFIXES.iter().any(|suffix| t5.ends_with(suffix)));
        }
    }

    #[test]
    fn test_town_name_uses_size_lists() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..30 {
            let name = town_name(TownSize::Small, &mut rng);
            let (prefix, suffix) = name.split_once(' ').unwrap();
            assert!(TOWN_PREFIXES[0].contains(&prefix));
            assert!(TOWN_SUFFIXES[0]
                .iter()
                .any(|s| capitalize(s) == suffix));
        }
    }

    #[test]
    fn test_npc_name_endings() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let name = npc_name(Profession::Gunsmith, &mut rng);
            let (first, last) = name.split_once(' ').unwrap();
            assert!(FIRST_NAMES.contains(&first));
            assert!(["smith", "worth", "ton"].iter().any(|end| last.ends_with(end)));

            let name = npc_name(Profession::Fisher, &mut rng);
            assert!(["son", "worth", "ton"].iter().any(|end| name.ends_with(end)));
        }
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hamlet"), "Hamlet");
        assert_eq!(capitalize(""), "");
    }
}
