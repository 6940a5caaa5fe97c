//! # Input Module
//!
//! Turns typed lines into [`Command`]s and runs them against a [`GameState`].

pub mod commands;

pub use commands::*;

use crate::rendering::{
    render_fort_stock, render_inventory, render_status, render_town, render_vendor,
    render_viewport, render_weapons, HELP_TEXT,
};
use crate::{Clock, GameState, WayfarerError, WayfarerResult};
use log::debug;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// What the front end should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Show this text and keep going
    Text(String),
    /// Show the front end's message history
    History,
    Quit,
}

/// Executes parsed commands for one session.
///
/// Owns the pieces a command needs besides the game itself: where saves go
/// and the clock used for weapon cooldowns.
pub struct InputHandler<C: Clock> {
    /// File used by `save` and `load`
    pub save_path: PathBuf,
    /// Radius of the square drawn by `map`
    pub map_radius: i32,
    clock: C,
}

impl<C: Clock> InputHandler<C> {
    /// Creates a handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::{GameState, InputHandler, Reply, SystemClock};
    ///
    /// let handler = InputHandler::new("save_game.json", SystemClock::new());
    /// let mut game = GameState::new(42);
    /// assert_eq!(handler.handle_line("quit", &mut game).unwrap(), Reply::Quit);
    /// ```
    pub fn new(save_path: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            save_path: save_path.into(),
            map_radius: 7,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Parses and runs one line.
    pub fn handle_line(&self, line: &str, game: &mut GameState) -> WayfarerResult<Reply> {
        let command: Command = line.parse()?;
        debug!("command {command:?}");
        self.execute(command, game)
    }

    /// Runs one command.
    pub fn execute(&self, command: Command, game: &mut GameState) -> WayfarerResult<Reply> {
        let text = match command {
            Command::Quit => return Ok(Reply::Quit),
            Command::History => return Ok(Reply::History),
            Command::Help => HELP_TEXT.to_string(),
            Command::Move(direction) => game.move_player(direction)?,
            Command::Look => game.current_terrain_description(),
            Command::Map => {
                let here = game.position();
                render_viewport(&mut game.world, here, self.map_radius)
            }
            Command::Status => render_status(&game.player),
            Command::Inventory => render_inventory(&game.player),
            Command::Weapons => render_weapons(&game.player),
            Command::Town => self.describe_town(game)?,
            Command::EnterHouse(house) => game.attempt_house_entry(house)?,
            Command::Chop => game.attempt_woodcutting()?,
            Command::Eat => game
                .consume_meal_if_needed()
                .unwrap_or_else(|| "No need to eat, or no meals in your pack.".to_string()),
            Command::Shoot => match game.shoot_hunting_weapon(self.clock.now())? {
                0 => "Your weapon isn't ready yet.".to_string(),
                damage => format!("You fire and deal {damage} damage."),
            },
            Command::Fight => game.start_combat()?,
            Command::Attack => game.combat_attack()?,
            Command::Flee => game.combat_flee()?,
            Command::Heal(item) => game.combat_heal(&item)?,
            Command::Buy {
                vendor,
                item,
                amount,
            } => game.buy(vendor, &item, amount)?,
            Command::Sell {
                vendor,
                item,
                amount,
            } => game.sell(vendor, &item, amount)?,
            Command::FortStock => render_fort_stock(&game.fort_stock()?),
            Command::FortBuy(number) => {
                let stock = game.fort_stock()?;
                let weapon = number
                    .checked_sub(1)
                    .and_then(|index| stock.get(index))
                    .ok_or_else(|| {
                        WayfarerError::InvalidAction(format!(
                            "choose a weapon between 1 and {}",
                            stock.len()
                        ))
                    })?;
                game.buy_fort_weapon(weapon.id)?
            }
            Command::Smelt(metal) => game.smelt(metal)?,
            Command::Cook(kind) => game.cook_meal(kind)?,
            Command::CraftBullets => game.craft_bullets()?,
            Command::UpgradeTool(tool, tier) => game.upgrade_tool(tool, tier)?,
            Command::UpgradeWeapon(category) => {
                let id = game.player.equipped_id(category).ok_or_else(|| {
                    WayfarerError::WeaponNotFound(format!("no {} weapon equipped", category.name()))
                })?;
                game.attempt_weapon_upgrade(id)?
            }
            Command::Switch(category) => game.switch_weapon(category)?,
            Command::Save => game.save_game(&self.save_path)?,
            Command::Load => game.load_game(&self.save_path)?,
        };
        Ok(Reply::Text(text))
    }

    /// Town map followed by the vendors that trade there.
    fn describe_town(&self, game: &mut GameState) -> WayfarerResult<String> {
        let here = game.position();
        let layout = game.world.enter_town(here)?.clone();
        let name = game.world.town_name(here);

        let mut output = format!("{name}\n{}", render_town(&layout, |house| game.world.house_looted(here, house)));
        let professions: BTreeSet<_> = layout
            .vendors()
            .into_iter()
            .map(|(_, profession)| profession)
            .collect();
        for profession in professions {
            let vendor = game.world.npc_name(here, profession);
            output.push('\n');
            output.push_str(&render_vendor(profession, &vendor));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenerationConfig, Ledger, ManualClock, Position, TerrainCode};
    use std::time::Duration;
    use tempfile::TempDir;

    fn handler(dir: &TempDir) -> InputHandler<ManualClock> {
        InputHandler::new(dir.path().join("save.json"), ManualClock::new(Duration::from_secs(5)))
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn test_moves_and_map() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        let mut game = GameState::with_config(GenerationConfig::for_testing(2)).unwrap();

        handler.handle_line("e", &mut game).unwrap();
        assert_eq!(game.position(), Position::new(1, 0));
        let map = text(handler.handle_line("map", &mut game).unwrap());
        assert_eq!(map.lines().count(), 15);
    }

    #[test]
    fn test_errors_pass_through() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        let mut game = GameState::with_config(GenerationConfig::for_testing(2)).unwrap();

        assert!(handler.handle_line("chop", &mut game).is_err());
        assert!(handler.handle_line("fort", &mut game).is_err());
        assert!(handler.handle_line("town", &mut game).is_err());
        assert!(handler.handle_line("juggle", &mut game).is_err());
    }

    #[test]
    fn test_front_end_replies() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        let mut game = GameState::with_config(GenerationConfig::for_testing(2)).unwrap();

        assert_eq!(handler.handle_line("history", &mut game).unwrap(), Reply::History);
        assert_eq!(handler.handle_line("q", &mut game).unwrap(), Reply::Quit);
    }

    #[test]
    fn test_shoot_uses_clock() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        let mut game = GameState::with_config(GenerationConfig::for_testing(2)).unwrap();

        let first = text(handler.handle_line("shoot", &mut game).unwrap());
        assert!(first.starts_with("You fire"));
        let second = text(handler.handle_line("shoot", &mut game).unwrap());
        assert_eq!(second, "Your weapon isn't ready yet.");
        handler.clock().advance(Duration::from_secs(5));
        let third = text(handler.handle_line("shoot", &mut game).unwrap());
        assert!(third.starts_with("You fire"));
        assert_eq!(game.player.item_count("bullets"), 98);
    }

    #[test]
    fn test_save_and_load_commands() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        let mut game = GameState::with_config(GenerationConfig::for_testing(2)).unwrap();
        game.player.add_coins(9);

        handler.handle_line("save", &mut game).unwrap();
        game.player.add_coins(100);
        handler.handle_line("load", &mut game).unwrap();
        assert_eq!(game.player.coins(), 9);
    }

    #[test]
    fn test_town_listing() {
        let dir = TempDir::new().unwrap();
        let handler = handler(&dir);
        let config = GenerationConfig {
            town_chance: 1.0,
            ..GenerationConfig::for_testing(4)
        };
        let mut game = GameState::with_config(config).unwrap();
        assert_eq!(game.current_terrain(), TerrainCode::Town);

        let listing = text(handler.handle_line("town", &mut game).unwrap());
        let name = game.world.town_name(Position::origin());
        assert!(listing.starts_with(&name));
        assert!(listing.contains(" the "));
    }
}
