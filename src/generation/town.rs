//! # Town Interiors
//!
//! Grid layouts for the inside of a town: a market square in the middle,
//! vendor stalls around it, and roads lined with houses leading outward.
//!
//! A layout is generated once, the first time a town is entered, and stored
//! in the world from then on.

use crate::{
    GenerationConfig, Generator, Position, Profession, TownSize, WayfarerError, WayfarerResult,
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Width and height of every town interior.
pub const TOWN_GRID_SIZE: i32 = 15;

/// One cell of a town interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TownCell {
    Empty,
    Market,
    Road,
    Vendor(Profession),
    House { lit: bool },
}

impl TownCell {
    /// Map symbol for this cell.
    pub fn symbol(self) -> char {
        match self {
            TownCell::Empty => '.',
            TownCell::Market => 'M',
            TownCell::Road => '#',
            TownCell::Vendor(profession) => profession.shop_symbol(),
            TownCell::House { lit: true } => 'H',
            TownCell::House { lit: false } => 'h',
        }
    }

    /// Parses a map symbol.
    pub fn from_symbol(symbol: char) -> WayfarerResult<Self> {
        match symbol {
            '.' => Ok(TownCell::Empty),
            'M' => Ok(TownCell::Market),
            '#' => Ok(TownCell::Road),
            'H' => Ok(TownCell::House { lit: true }),
            'h' => Ok(TownCell::House { lit: false }),
            other => Profession::from_shop_symbol(other)
                .map(TownCell::Vendor)
                .ok_or_else(|| {
                    WayfarerError::Deserialization(format!("unknown town cell '{other}'"))
                }),
        }
    }

    pub fn is_house(self) -> bool {
        matches!(self, TownCell::House { .. })
    }
}

/// Generated interior of one town.
///
/// Stored in save files as a list of row strings plus a map of house
/// positions to whether their lights are on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TownLayoutRecord", into = "TownLayoutRecord")]
pub struct TownLayout {
    cells: Vec<Vec<TownCell>>,
    house_lights: BTreeMap<Position, bool>,
}

impl TownLayout {
    /// Creates an empty layout of the standard size.
    pub fn empty() -> Self {
        let size = TOWN_GRID_SIZE as usize;
        Self {
            cells: vec![vec![TownCell::Empty; size]; size],
            house_lights: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.cells.first().map_or(0, |row| row.len() as i32)
    }

    pub fn height(&self) -> i32 {
        self.cells.len() as i32
    }

    /// Where the player stands on entering: the middle of the market.
    pub fn center(&self) -> Position {
        Position::new(self.width() / 2, self.height() / 2)
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width() && pos.y < self.height()
    }

    /// Cell at `pos`, or `None` outside the grid.
    pub fn cell(&self, pos: Position) -> Option<TownCell> {
        if !self.is_in_bounds(pos) {
            return None;
        }
        Some(self.cells[pos.y as usize][pos.x as usize])
    }

    pub(crate) fn set_cell(&mut self, pos: Position, cell: TownCell) {
        if self.is_in_bounds(pos) {
            self.cells[pos.y as usize][pos.x as usize] = cell;
            if let TownCell::House { lit } = cell {
                self.house_lights.insert(pos, lit);
            }
        }
    }

    fn is_empty_at(&self, pos: Position) -> bool {
        self.cell(pos) == Some(TownCell::Empty)
    }

    /// Whether the house at `pos` has its lights on; `None` if there is no house.
    pub fn house_lit(&self, pos: Position) -> Option<bool> {
        self.house_lights.get(&pos).copied()
    }

    /// Every house with its light flag, in position order.
    pub fn houses(&self) -> impl Iterator<Item = (Position, bool)> + '_ {
        self.house_lights.iter().map(|(pos, lit)| (*pos, *lit))
    }

    /// Every vendor stall.
    pub fn vendors(&self) -> Vec<(Position, Profession)> {
        self.positions()
            .filter_map(|pos| match self.cell(pos) {
                Some(TownCell::Vendor(profession)) => Some((pos, profession)),
                _ => None,
            })
            .collect()
    }

    /// Number of cells of the given kind.
    pub fn count(&self, wanted: impl Fn(TownCell) -> bool) -> usize {
        self.cells.iter().flatten().filter(|cell| wanted(**cell)).count()
    }

    fn positions(&self) -> impl Iterator<Item = Position> {
        let (width, height) = (self.width(), self.height());
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Rows as symbol strings, top to bottom.
    pub fn rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }
}

/// On-disk form of a [`TownLayout`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TownLayoutRecord {
    grid: Vec<String>,
    house_lights: BTreeMap<String, bool>,
}

impl From<TownLayout> for TownLayoutRecord {
    fn from(layout: TownLayout) -> Self {
        Self {
            grid: layout.rows(),
            house_lights: layout
                .house_lights
                .iter()
                .map(|(pos, lit)| (pos.to_key(), *lit))
                .collect(),
        }
    }
}

impl TryFrom<TownLayoutRecord> for TownLayout {
    type Error = WayfarerError;

    fn try_from(record: TownLayoutRecord) -> WayfarerResult<Self> {
        let cells = record
            .grid
            .iter()
            .map(|row| row.chars().map(TownCell::from_symbol).collect())
            .collect::<WayfarerResult<Vec<Vec<TownCell>>>>()?;
        let width = cells.first().map_or(0, Vec::len);
        if cells.iter().any(|row| row.len() != width) {
            return Err(WayfarerError::Deserialization(
                "town grid rows differ in length".to_string(),
            ));
        }

        let mut house_lights = BTreeMap::new();
        for (key, lit) in record.house_lights {
            house_lights.insert(key.parse::<Position>()?, lit);
        }
        Ok(Self {
            cells,
            house_lights,
        })
    }
}

/// Size-dependent knobs of the town generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TownParameters {
    /// Market cells grown from the center
    pub market_tiles: usize,
    /// Inclusive vendor count range
    pub vendors: (usize, usize),
    /// Shortest road grown from a perimeter cell
    pub min_road_length: usize,
    /// Houses appear beside a road cell with probability 1 / (denominator + 1)
    pub house_chance_denominator: u32,
}

impl TownParameters {
    pub fn for_size(size: TownSize) -> Self {
        match size {
            TownSize::Small => Self {
                market_tiles: 6,
                vendors: (3, 4),
                min_road_length: 3,
                house_chance_denominator: 3,
            },
            TownSize::Medium => Self {
                market_tiles: 12,
                vendors: (4, 6),
                min_road_length: 5,
                house_chance_denominator: 2,
            },
            TownSize::Large => Self {
                market_tiles: 20,
                vendors: (6, 8),
                min_road_length: 7,
                house_chance_denominator: 1,
            },
        }
    }

    pub fn max_road_length(&self) -> usize {
        self.min_road_length + 5
    }
}

/// Generates town interiors for one size class.
#[derive(Debug, Clone)]
pub struct TownLayoutGenerator {
    pub size: TownSize,
    pub params: TownParameters,
    /// Upper bound on market growth draws
    pub max_growth_attempts: u32,
}

const CARDINALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

impl TownLayoutGenerator {
    pub fn new(size: TownSize) -> Self {
        Self {
            size,
            params: TownParameters::for_size(size),
            max_growth_attempts: 1000,
        }
    }

    /// Grows the market outward from the center by random attachment.
    fn grow_market(&self, layout: &mut TownLayout, rng: &mut StdRng) -> Vec<Position> {
        let center = layout.center();
        layout.set_cell(center, TownCell::Market);
        let mut market = vec![center];

        let mut attempts = 0;
        while market.len() < self.params.market_tiles && attempts < self.max_growth_attempts {
            attempts += 1;
            let Some(&from) = market.choose(rng) else {
                break;
            };
            let next = CARDINALS
                .iter()
                .map(|(dx, dy)| Position::new(from.x + dx, from.y + dy))
                .find(|pos| layout.is_empty_at(*pos));
            if let Some(pos) = next {
                layout.set_cell(pos, TownCell::Market);
                market.push(pos);
            }
        }
        market
    }

    /// Empty cells touching the market, in grid order.
    fn market_perimeter(&self, layout: &TownLayout, market: &[Position]) -> Vec<Position> {
        let mut seen = HashSet::new();
        let mut perimeter = Vec::new();
        for tile in market {
            for (dx, dy) in CARDINALS {
                let pos = Position::new(tile.x + dx, tile.y + dy);
                if layout.is_empty_at(pos) && seen.insert(pos) {
                    perimeter.push(pos);
                }
            }
        }
        perimeter.sort_by_key(|pos| (pos.y, pos.x));
        perimeter
    }

    fn place_vendors(
        &self,
        layout: &mut TownLayout,
        perimeter: &mut Vec<Position>,
        rng: &mut StdRng,
    ) {
        let (min, max) = self.params.vendors;
        let upper = max.min(perimeter.len());
        let count = if upper <= min {
            upper
        } else {
            rng.gen_range(min..=upper)
        };

        for _ in 0..count {
            if perimeter.is_empty() {
                break;
            }
            let pos = perimeter.remove(rng.gen_range(0..perimeter.len()));
            let profession = Profession::ALL
                .choose(rng)
                .copied()
                .unwrap_or(Profession::Chef);
            layout.set_cell(pos, TownCell::Vendor(profession));
        }
    }

    /// Grows a road from `start` along the axis pointing at or away from the
    /// center, placing houses beside it.
    fn lay_road(&self, layout: &mut TownLayout, start: Position, rng: &mut StdRng) {
        let center = layout.center();
        let dx = if (start.x - center.x).abs() <= (start.y - center.y).abs() {
            0
        } else if start.x < center.x {
            1
        } else {
            -1
        };
        let dy = if dx != 0 {
            0
        } else if start.y < center.y {
            1
        } else {
            -1
        };

        layout.set_cell(start, TownCell::Road);
        let mut length = 1;
        for direction in [-1, 1] {
            let mut current = Position::new(start.x + dx * direction, start.y + dy * direction);
            while length < self.params.min_road_length && layout.is_empty_at(current) {
                layout.set_cell(current, TownCell::Road);
                length += 1;

                for (side_x, side_y) in [(-dy, dx), (dy, -dx)] {
                    let house = Position::new(current.x + side_x, current.y + side_y);
                    if layout.is_empty_at(house)
                        && rng.gen_range(0..=self.params.house_chance_denominator) == 0
                    {
                        let lit = rng.gen_bool(0.5);
                        layout.set_cell(house, TownCell::House { lit });
                    }
                }

                current = Position::new(current.x + dx * direction, current.y + dy * direction);
                if length >= self.params.max_road_length() {
                    break;
                }
            }
        }
    }
}

impl Generator<TownLayout> for TownLayoutGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WayfarerResult<TownLayout> {
        let mut layout = TownLayout::empty();
        let market = self.grow_market(&mut layout, rng);
        let mut perimeter = self.market_perimeter(&layout, &market);
        self.place_vendors(&mut layout, &mut perimeter, rng);

        for start in perimeter {
            if layout.is_empty_at(start) {
                self.lay_road(&mut layout, start, rng);
            }
        }

        debug!(
            "generated {} town: {} market, {} vendors, {} houses",
            self.size,
            market.len(),
            layout.vendors().len(),
            layout.house_lights.len()
        );
        self.validate(&layout, config)?;
        Ok(layout)
    }

    fn validate(&self, layout: &TownLayout, _config: &GenerationConfig) -> WayfarerResult<()> {
        if layout.cell(layout.center()) != Some(TownCell::Market) {
            return Err(WayfarerError::InvalidState(
                "town center is not a market".to_string(),
            ));
        }
        let (_, max_vendors) = self.params.vendors;
        if layout.vendors().len() > max_vendors {
            return Err(WayfarerError::InvalidState(format!(
                "town has more than {max_vendors} vendors"
            )));
        }
        let houses = layout.count(TownCell::is_house);
        if houses != layout.house_lights.len() {
            return Err(WayfarerError::InvalidState(
                "house light flags do not match the grid".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "TownLayoutGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_rng;

    fn generate(size: TownSize, seed: u32) -> TownLayout {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = create_rng(&config);
        TownLayoutGenerator::new(size).generate(&config, &mut rng).unwrap()
    }

    #[test]
    fn test_market_size_by_town_size() {
        for (size, market) in [
            (TownSize::Small, 6),
            (TownSize::Medium, 12),
            (TownSize::Large, 20),
        ] {
            let layout = generate(size, 11);
            assert_eq!(layout.count(|cell| cell == TownCell::Market), market);
            assert_eq!(layout.cell(layout.center()), Some(TownCell::Market));
        }
    }

    #[test]
    fn test_vendor_count_within_range() {
        for seed in 0..20 {
            let layout = generate(TownSize::Medium, seed);
            let vendors = layout.vendors().len();
            assert!((4..=6).contains(&vendors), "{vendors} vendors");
        }
    }

    #[test]
    fn test_house_lights_match_grid() {
        for seed in 0..10 {
            let layout = generate(TownSize::Large, seed);
            for (pos, lit) in layout.houses() {
                assert_eq!(layout.cell(pos), Some(TownCell::House { lit }));
            }
        }
    }

    #[test]
    fn test_same_rng_same_layout() {
        assert_eq!(generate(TownSize::Small, 5), generate(TownSize::Small, 5));
    }

    #[test]
    fn test_layout_serializes_as_rows() {
        let layout = generate(TownSize::Medium, 8);
        let json = serde_json::to_value(&layout).unwrap();
        let grid = json["grid"].as_array().unwrap();
        assert_eq!(grid.len(), TOWN_GRID_SIZE as usize);
        assert_eq!(grid[7].as_str().unwrap().chars().nth(7), Some('M'));

        let back: TownLayout = serde_json::from_value(json).unwrap();
        assert_eq!(back, layout);
    }

    #[test]
    fn test_bad_symbol_rejected() {
        let json = serde_json::json!({ "grid": ["..Z"], "house_lights": {} });
        assert!(serde_json::from_value::<TownLayout>(json).is_err());
    }

    #[test]
    fn test_out_of_bounds_cell() {
        let layout = TownLayout::empty();
        assert_eq!(layout.cell(Position::new(-1, 0)), None);
        assert_eq!(layout.cell(Position::new(0, TOWN_GRID_SIZE)), None);
        assert_eq!(layout.cell(Position::new(0, 0)), Some(TownCell::Empty));
    }
}
