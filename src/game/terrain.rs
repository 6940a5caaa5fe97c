//! # Terrain
//!
//! Terrain categories, town size classes and town professions.

use crate::{WayfarerError, WayfarerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terrain category of a world tile.
///
/// Serialized with the short codes used by the save document (`P`, `T`, `X`,
/// `M`, `S1`..`S3`, `F_F`, `O`, `B`, `C`, `F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TerrainCode {
    Plains,
    Town,
    Temple,
    Mineshaft,
    /// Stronghold with tier 1-3
    Stronghold(u8),
    Fort,
    DeepOcean,
    Beach,
    Coast,
    Forest,
}

impl TerrainCode {
    /// Short code used in the save document and the ASCII map.
    pub fn code(self) -> &'static str {
        match self {
            TerrainCode::Plains => "P",
            TerrainCode::Town => "T",
            TerrainCode::Temple => "X",
            TerrainCode::Mineshaft => "M",
            TerrainCode::Stronghold(1) => "S1",
            TerrainCode::Stronghold(2) => "S2",
            TerrainCode::Stronghold(_) => "S3",
            TerrainCode::Fort => "F_F",
            TerrainCode::DeepOcean => "O",
            TerrainCode::Beach => "B",
            TerrainCode::Coast => "C",
            TerrainCode::Forest => "F",
        }
    }

    /// Parses a short terrain code.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::TerrainCode;
    ///
    /// assert_eq!(TerrainCode::from_code("S2").unwrap(), TerrainCode::Stronghold(2));
    /// assert!(TerrainCode::from_code("Q").is_err());
    /// ```
    pub fn from_code(code: &str) -> WayfarerResult<Self> {
        let terrain = match code {
            "P" => TerrainCode::Plains,
            "T" => TerrainCode::Town,
            "X" => TerrainCode::Temple,
            "M" => TerrainCode::Mineshaft,
            "S1" => TerrainCode::Stronghold(1),
            "S2" => TerrainCode::Stronghold(2),
            "S3" => TerrainCode::Stronghold(3),
            "F_F" => TerrainCode::Fort,
            "O" => TerrainCode::DeepOcean,
            "B" => TerrainCode::Beach,
            "C" => TerrainCode::Coast,
            "F" => TerrainCode::Forest,
            other => {
                return Err(WayfarerError::Deserialization(format!(
                    "unknown terrain code '{other}'"
                )))
            }
        };
        Ok(terrain)
    }

    /// Whether the tile is one of the water categories.
    pub fn is_water(self) -> bool {
        matches!(
            self,
            TerrainCode::DeepOcean | TerrainCode::Beach | TerrainCode::Coast
        )
    }

    /// Stronghold tier, or `None` for any other terrain.
    pub fn stronghold_tier(self) -> Option<u8> {
        match self {
            TerrainCode::Stronghold(tier) => Some(tier),
            _ => None,
        }
    }

    /// Short phrase used when describing neighboring tiles.
    pub fn describe(self) -> &'static str {
        match self {
            TerrainCode::Plains => "plains",
            TerrainCode::Town => "a town",
            TerrainCode::Temple => "a temple",
            TerrainCode::Mineshaft => "a mineshaft",
            TerrainCode::Stronghold(1) => "a stronghold (tier 1)",
            TerrainCode::Stronghold(2) => "a stronghold (tier 2)",
            TerrainCode::Stronghold(_) => "a stronghold (tier 3)",
            TerrainCode::Fort => "a fort",
            TerrainCode::DeepOcean => "ocean",
            TerrainCode::Beach => "a beach",
            TerrainCode::Coast => "the coast",
            TerrainCode::Forest => "a forest",
        }
    }
}

impl fmt::Display for TerrainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<TerrainCode> for String {
    fn from(terrain: TerrainCode) -> Self {
        terrain.code().to_string()
    }
}

impl TryFrom<String> for TerrainCode {
    type Error = WayfarerError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        TerrainCode::from_code(&code)
    }
}

/// Size class of a town, fixed when the town tile is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TownSize {
    Small,
    Medium,
    Large,
}

impl TownSize {
    /// All size classes, in ascending order.
    pub const ALL: [TownSize; 3] = [TownSize::Small, TownSize::Medium, TownSize::Large];

    /// Lowercase name of the size class.
    pub fn name(self) -> &'static str {
        match self {
            TownSize::Small => "small",
            TownSize::Medium => "medium",
            TownSize::Large => "large",
        }
    }

    /// Index into per-size tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for TownSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Town residents with a shop or workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profession {
    Fisher,
    Lumberjack,
    Blacksmith,
    Toolsmith,
    Gunsmith,
    Chef,
}

impl Profession {
    /// Every profession that can run a town shop.
    pub const ALL: [Profession; 6] = [
        Profession::Chef,
        Profession::Blacksmith,
        Profession::Toolsmith,
        Profession::Gunsmith,
        Profession::Fisher,
        Profession::Lumberjack,
    ];

    /// Lowercase name used in save keys and commands.
    pub fn name(self) -> &'static str {
        match self {
            Profession::Fisher => "fisher",
            Profession::Lumberjack => "lumberjack",
            Profession::Blacksmith => "blacksmith",
            Profession::Toolsmith => "toolsmith",
            Profession::Gunsmith => "gunsmith",
            Profession::Chef => "chef",
        }
    }

    /// Parses a lowercase profession name.
    pub fn from_name(name: &str) -> Option<Self> {
        Profession::ALL
            .into_iter()
            .find(|profession| profession.name() == name)
    }

    /// Map symbol of this profession's shop inside a town.
    pub fn shop_symbol(self) -> char {
        match self {
            Profession::Chef => 'C',
            Profession::Blacksmith => 'S',
            Profession::Toolsmith => 'T',
            Profession::Gunsmith => 'G',
            Profession::Fisher => 'F',
            Profession::Lumberjack => 'L',
        }
    }

    /// Inverse of [`Profession::shop_symbol`].
    pub fn from_shop_symbol(symbol: char) -> Option<Self> {
        Profession::ALL
            .into_iter()
            .find(|profession| profession.shop_symbol() == symbol)
    }
}

impl fmt::Display for Profession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
