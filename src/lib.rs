//! # Wayfarer
//!
//! Core of a single-player exploration RPG: an infinite, lazily generated world
//! map with persistent per-tile state, and a dice-based weapon and combat model.
//!
//! ## Architecture Overview
//!
//! - **World**: sparse, lazily classified map store keyed by integer coordinates
//! - **Generation**: coherent noise, terrain classification, town interiors,
//!   names, fort stock and encounter selection
//! - **Weapons & Combat**: tiered dice weapons and a turn-based combat session
//! - **Game State**: the session context tying the world, the player and the
//!   economy together, plus the JSON persistence boundary
//!
//! The front end (windows, minigames, accounts) is a collaborator that calls into
//! [`GameState`] and the world operations; this crate ships only a small text
//! front end for driving a session from a terminal.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

use std::path::PathBuf;

/// Core error type for the Wayfarer game engine.
///
/// Every variant renders a message suitable for showing to the player.
#[derive(thiserror::Error, Debug)]
pub enum WayfarerError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Not enough coins for a trade or upgrade
    #[error("Not enough coins: need {needed}, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// Not enough items or materials for a craft or upgrade
    #[error("Not enough materials. Need: {0}")]
    InsufficientMaterials(String),

    /// Action attempted on the wrong terrain or without the right tool
    #[error("{0}")]
    InvalidTerrainAction(String),

    /// Item lookup failed
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Weapon lookup failed
    #[error("Weapon not found: {0}")]
    WeaponNotFound(String),

    /// No save file at the given path
    #[error("No save file found at {}", .0.display())]
    SaveNotFound(PathBuf),

    /// Save document could not be read back into a game
    #[error("Error loading save file: {0}")]
    Deserialization(String),

    /// Action is not legal right now
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Wayfarer codebase.
pub type WayfarerResult<T> = Result<T, WayfarerError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Upper bound for player health and energy
    pub const MAX_STAT: u32 = 100;

    /// Default player starting health
    pub const DEFAULT_PLAYER_HEALTH: u32 = 100;

    /// Default player starting energy
    pub const DEFAULT_PLAYER_ENERGY: u32 = 100;

    /// Bullets in the inventory of a new game
    pub const STARTING_BULLETS: u32 = 100;

    /// Hit points the player brings into every combat session
    pub const COMBAT_PLAYER_HP: u32 = 100;

    /// Hit points restored by a meal, in and out of combat
    pub const MEAL_HEAL_AMOUNT: u32 = 25;

    /// Health or energy at or below which a meal is eaten automatically
    pub const MEAL_THRESHOLD: u32 = 75;

    /// Chance to escape a combat session
    pub const FLEE_CHANCE: f64 = 0.5;

    /// Default save file name
    pub const DEFAULT_SAVE_FILE: &str = "save_game.json";
}
