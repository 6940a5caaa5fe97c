//! # Command Definitions
//!
//! The text commands a player can type, and their parser.

use crate::game::economy::{MealKind, Metal, Tool, ToolTier};
use crate::{Direction, Position, Profession, WayfarerError, WayfarerResult, WeaponCategory};
use std::str::FromStr;

/// One parsed line of player input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Move(Direction),
    Look,
    Map,
    Inventory,
    Weapons,
    Status,
    /// Show the layout of the current town
    Town,
    /// Sneak into the house at the given town coordinates
    EnterHouse(Position),
    Chop,
    Eat,
    Shoot,
    Fight,
    Attack,
    Flee,
    Heal(String),
    Buy {
        vendor: Profession,
        item: String,
        amount: u32,
    },
    Sell {
        vendor: Profession,
        item: String,
        amount: u32,
    },
    FortStock,
    /// Buy the n-th weapon (1-based) of the fort listing
    FortBuy(usize),
    Smelt(Metal),
    Cook(MealKind),
    CraftBullets,
    UpgradeTool(Tool, ToolTier),
    UpgradeWeapon(WeaponCategory),
    Switch(WeaponCategory),
    Save,
    Load,
    /// Show the most recent messages
    History,
    Help,
    Quit,
}

fn invalid(message: impl Into<String>) -> WayfarerError {
    WayfarerError::InvalidAction(message.into())
}

/// Parses a direction word: full names and their short forms.
pub fn parse_direction(word: &str) -> Option<Direction> {
    let direction = match word {
        "n" | "north" => Direction::North,
        "s" | "south" => Direction::South,
        "e" | "east" => Direction::East,
        "w" | "west" => Direction::West,
        "ne" | "northeast" => Direction::Northeast,
        "nw" | "northwest" => Direction::Northwest,
        "se" | "southeast" => Direction::Southeast,
        "sw" | "southwest" => Direction::Southwest,
        _ => return None,
    };
    Some(direction)
}

fn parse_category(word: Option<&str>) -> WayfarerResult<WeaponCategory> {
    match word {
        None | Some("combat") => Ok(WeaponCategory::Combat),
        Some("hunting") => Ok(WeaponCategory::Hunting),
        Some(other) => Err(invalid(format!("unknown weapon category '{other}'"))),
    }
}

fn parse_number<T: FromStr>(word: Option<&str>, what: &str) -> WayfarerResult<T> {
    let word = word.ok_or_else(|| invalid(format!("missing {what}")))?;
    word.parse()
        .map_err(|_| invalid(format!("'{word}' is not a valid {what}")))
}

/// Parses `<vendor> <item words...> [amount]`.
fn parse_trade(words: &[&str]) -> WayfarerResult<(Profession, String, u32)> {
    let (vendor, rest) = words
        .split_first()
        .ok_or_else(|| invalid("usage: buy|sell <vendor> <item> [amount]"))?;
    let vendor =
        Profession::from_name(vendor).ok_or_else(|| invalid(format!("unknown vendor '{vendor}'")))?;

    let (amount, item_words) = match rest.split_last() {
        Some((last, init)) if !init.is_empty() => match last.parse::<u32>() {
            Ok(amount) => (amount, init),
            Err(_) => (1, rest),
        },
        _ => (1, rest),
    };
    if item_words.is_empty() {
        return Err(invalid("missing item name"));
    }
    Ok((vendor, item_words.join(" "), amount))
}

fn parse_upgrade(words: &[&str]) -> WayfarerResult<Command> {
    match words {
        ["weapon", rest @ ..] => Ok(Command::UpgradeWeapon(parse_category(rest.first().copied())?)),
        [tool, tier] => {
            let tool = Tool::from_name(tool).ok_or_else(|| invalid(format!("unknown tool '{tool}'")))?;
            let tier = match *tier {
                "copper" => ToolTier::Copper,
                "iron" => ToolTier::Iron,
                other => return Err(invalid(format!("unknown tool tier '{other}'"))),
            };
            Ok(Command::UpgradeTool(tool, tier))
        }
        _ => Err(invalid("usage: upgrade weapon [combat|hunting] | upgrade <shovel|pickaxe> <copper|iron>")),
    }
}

impl FromStr for Command {
    type Err = WayfarerError;

    /// Parses a line; words are case-insensitive and separated by whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::{Command, Direction, Profession};
    ///
    /// assert_eq!("n".parse::<Command>().unwrap(), Command::Move(Direction::North));
    /// assert_eq!(
    ///     "sell fisher hammerhead shark 2".parse::<Command>().unwrap(),
    ///     Command::Sell { vendor: Profession::Fisher, item: "hammerhead shark".into(), amount: 2 }
    /// );
    /// ```
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let lowered = line.trim().to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let Some((&verb, args)) = words.split_first() else {
            return Err(invalid("empty command"));
        };

        if let Some(direction) = parse_direction(verb) {
            return Ok(Command::Move(direction));
        }

        let command = match (verb, args) {
            ("go" | "move", [direction]) => Command::Move(
                parse_direction(direction)
                    .ok_or_else(|| invalid(format!("unknown direction '{direction}'")))?,
            ),
            ("look" | "l", []) => Command::Look,
            ("map" | "m", []) => Command::Map,
            ("inventory" | "inv" | "i", []) => Command::Inventory,
            ("weapons", []) => Command::Weapons,
            ("status" | "stats", []) => Command::Status,
            ("town", []) => Command::Town,
            ("enter", [x, y]) => Command::EnterHouse(Position::new(
                parse_number(Some(*x), "x coordinate")?,
                parse_number(Some(*y), "y coordinate")?,
            )),
            ("chop" | "cut", []) => Command::Chop,
            ("eat", []) => Command::Eat,
            ("shoot", []) => Command::Shoot,
            ("fight" | "challenge", []) => Command::Fight,
            ("attack" | "a", []) => Command::Attack,
            ("flee" | "run", []) => Command::Flee,
            ("heal", [_, ..]) => Command::Heal(args.join(" ")),
            ("buy", _) => {
                let (vendor, item, amount) = parse_trade(args)?;
                Command::Buy { vendor, item, amount }
            }
            ("sell", _) => {
                let (vendor, item, amount) = parse_trade(args)?;
                Command::Sell { vendor, item, amount }
            }
            ("fort", []) => Command::FortStock,
            ("fort", ["buy", index]) => Command::FortBuy(parse_number(Some(*index), "listing number")?),
            ("smelt", [metal]) => Command::Smelt(
                Metal::from_name(metal).ok_or_else(|| invalid(format!("cannot smelt '{metal}'")))?,
            ),
            ("cook", [meat]) => Command::Cook(
                MealKind::from_name(meat).ok_or_else(|| invalid(format!("cannot cook '{meat}'")))?,
            ),
            ("bullets", []) => Command::CraftBullets,
            ("upgrade", _) => parse_upgrade(args)?,
            ("switch", _) => Command::Switch(parse_category(args.first().copied())?),
            ("save", []) => Command::Save,
            ("load", []) => Command::Load,
            ("history" | "log", []) => Command::History,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit" | "q", []) => Command::Quit,
            _ => return Err(invalid(format!("unknown command '{}'", line.trim()))),
        };
        Ok(command)
    }
}
