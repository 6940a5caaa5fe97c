//! Integration test to ensure a game can start up and be played through the
//! public interface.

use std::time::Duration;
use wayfarer::{
    Command, Direction, GameState, GenerationConfig, InputHandler, Ledger, ManualClock, Position,
    Reply, TerrainCode, WayfarerResult, WeaponCategory,
};

#[test]
fn test_basic_startup() -> WayfarerResult<()> {
    let mut game = GameState::new(12345);

    assert_eq!(game.position(), Position::origin());
    assert_eq!(game.player.coins(), 0);
    assert_eq!(game.player.item_count("bullets"), 100);
    assert_eq!(game.player.health(), 100);
    assert_eq!(game.player.energy(), 100);

    // The 5x5 area around the origin is classified up front
    for y in -2..=2 {
        for x in -2..=2 {
            assert!(game.world.known_terrain(Position::new(x, y)).is_some());
        }
    }

    let description = game.current_terrain_description();
    assert!(!description.is_empty());
    Ok(())
}

#[test]
fn test_player_starts_with_default_weapons() {
    let game = GameState::new(1);

    let sword = game.player.equipped(WeaponCategory::Combat).unwrap();
    assert_eq!(sword.name, "Rusty Sword");
    assert_eq!(sword.tier.get(), 1);

    let revolver = game.player.equipped(WeaponCategory::Hunting).unwrap();
    assert_eq!(revolver.name, "Old Revolver");
    assert_eq!(revolver.tier.get(), 1);
}

#[test]
fn test_scripted_session() -> WayfarerResult<()> {
    let dir = tempfile::tempdir()?;
    let handler = InputHandler::new(dir.path().join("session.json"), ManualClock::new(Duration::ZERO));
    let mut game = GameState::with_config(GenerationConfig::for_testing(9))?;

    for line in ["e", "e", "s", "look", "status", "inventory", "weapons", "map"] {
        assert!(matches!(handler.handle_line(line, &mut game)?, Reply::Text(_)));
    }
    assert_eq!(game.position(), Position::new(2, 1));

    handler.execute(Command::Save, &mut game)?;
    assert!(dir.path().join("session.json").exists());
    assert_eq!(handler.handle_line("quit", &mut game)?, Reply::Quit);
    Ok(())
}

#[test]
fn test_walking_keeps_viewport_classified() -> WayfarerResult<()> {
    let mut game = GameState::with_config(GenerationConfig::for_testing(3))?;
    for _ in 0..6 {
        game.move_player(Direction::North)?;
    }
    let here = game.position();
    assert_eq!(here, Position::new(0, -6));
    for y in here.y - 2..=here.y + 2 {
        for x in here.x - 2..=here.x + 2 {
            assert_eq!(
                game.world.known_terrain(Position::new(x, y)),
                Some(TerrainCode::Plains)
            );
        }
    }
    Ok(())
}
