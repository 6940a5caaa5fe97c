//! # Display Management
//!
//! ASCII drawing of the world map and town interiors, plus the message log
//! shown under them.

use crate::game::{Position, TerrainCode, WorldState};
use crate::TownLayout;
use std::collections::VecDeque;

/// Map character for a terrain type.
pub fn terrain_glyph(terrain: TerrainCode) -> char {
    match terrain {
        TerrainCode::Plains => '.',
        TerrainCode::Town => 'T',
        TerrainCode::Temple => 'X',
        TerrainCode::Mineshaft => 'M',
        TerrainCode::Stronghold(tier) => char::from_digit(u32::from(tier.clamp(1, 3)), 10).unwrap_or('S'),
        TerrainCode::Fort => 'F',
        TerrainCode::DeepOcean => '~',
        TerrainCode::Beach => ':',
        TerrainCode::Coast => '-',
        TerrainCode::Forest => '^',
    }
}

/// Draws the square of side `2 * radius + 1` around `center`, classifying
/// tiles as needed. The player is drawn as `@` in the middle.
///
/// # Examples
///
/// ```
/// use wayfarer::{render_viewport, Position, WorldState};
///
/// let mut world = WorldState::new(42);
/// let map = render_viewport(&mut world, Position::origin(), 2);
/// assert_eq!(map.lines().count(), 5);
/// assert_eq!(map.lines().nth(2).unwrap().chars().nth(2), Some('@'));
/// ```
pub fn render_viewport(world: &mut WorldState, center: Position, radius: i32) -> String {
    let mut lines = Vec::with_capacity((2 * radius + 1).max(0) as usize);
    for y in center.y - radius..=center.y + radius {
        let line: String = (center.x - radius..=center.x + radius)
            .map(|x| {
                let pos = Position::new(x, y);
                if pos == center {
                    '@'
                } else {
                    terrain_glyph(world.terrain_at(pos))
                }
            })
            .collect();
        lines.push(line);
    }
    lines.join("\n")
}

/// Draws every tile classified so far; unknown tiles are blank.
///
/// Nothing new is classified.
pub fn render_known_map(world: &WorldState, player: Option<Position>) -> String {
    let tiles: Vec<(Position, TerrainCode)> = world.visited_tiles().collect();
    let Some(first) = tiles.first().map(|(pos, _)| *pos) else {
        return String::new();
    };
    let (mut min, mut max) = (first, first);
    for (pos, _) in &tiles {
        min = Position::new(min.x.min(pos.x), min.y.min(pos.y));
        max = Position::new(max.x.max(pos.x), max.y.max(pos.y));
    }

    (min.y..=max.y)
        .map(|y| {
            (min.x..=max.x)
                .map(|x| {
                    let pos = Position::new(x, y);
                    if Some(pos) == player {
                        '@'
                    } else {
                        world.known_terrain(pos).map_or(' ', terrain_glyph)
                    }
                })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Draws a town interior with column and row numbers so house coordinates
/// can be read off. Searched houses show as `x`.
pub fn render_town(layout: &TownLayout, looted: impl Fn(Position) -> bool) -> String {
    let width = layout.width();
    let mut output = String::from("   ");
    for x in 0..width {
        output.push(char::from_digit((x % 10) as u32, 10).unwrap_or(' '));
    }

    for y in 0..layout.height() {
        output.push_str(&format!("\n{y:>2} "));
        for x in 0..width {
            let pos = Position::new(x, y);
            let symbol = match layout.cell(pos) {
                Some(cell) if cell.is_house() && looted(pos) => 'x',
                Some(cell) => cell.symbol(),
                None => ' ',
            };
            output.push(symbol);
        }
    }
    output
}

/// Recent messages, oldest first.
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: VecDeque<String>,
    max_messages: usize,
}

impl MessageLog {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages,
        }
    }

    /// Appends a message, dropping the oldest once full.
    pub fn push(&mut self, message: impl Into<String>) {
        if self.max_messages == 0 {
            return;
        }
        if self.messages.len() == self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(100)
    }
}
