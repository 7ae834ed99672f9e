//! # World Module
//!
//! The tile grid of a single dungeon floor and its fog-of-war mask.

use crate::generation::{GenerationDegraded, Room};
use crate::Position;
use serde::{Deserialize, Serialize};

/// A single cell of the dungeon grid.
///
/// Tiles are fixed once generation finishes, except that chests and traps
/// move to their consumed variant when the hero interacts with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Solid rock outside the carved layout
    Void,
    /// Plain walkable floor
    Floor,
    /// Wall extruded around carved space
    Wall,
    /// A door at the mouth of a corridor
    Door,
    /// An unopened chest
    Chest,
    /// A chest that has already been looted
    OpenedChest,
    /// Stairs down to the next floor
    Stairs,
    /// Shallow water, safe to wade through
    Water,
    /// Lava that burns whoever steps on it
    Lava,
    /// A trap, hidden until the hero walks near it
    Trap { revealed: bool },
    /// A trap that has already gone off
    SprungTrap,
    /// Overgrown floor
    Grass,
}

impl Tile {
    /// Whether an entity can stand on this tile.
    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Void | Tile::Wall)
    }

    /// Whether this tile was carved as room or corridor space.
    pub fn is_carved(self) -> bool {
        matches!(self, Tile::Floor | Tile::Grass | Tile::Door)
    }

    /// Whether enemies and chests may be placed here.
    pub fn is_open_ground(self) -> bool {
        matches!(self, Tile::Floor | Tile::Grass)
    }

    /// Single-character rendering used by the ASCII dump.
    pub fn glyph(self) -> char {
        match self {
            Tile::Void => ' ',
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::Door => '+',
            Tile::Chest => '=',
            Tile::OpenedChest => '_',
            Tile::Stairs => '>',
            Tile::Water => '~',
            Tile::Lava => '%',
            Tile::Trap { revealed: true } => '^',
            Tile::Trap { revealed: false } => '.',
            Tile::SprungTrap => ',',
            Tile::Grass => '"',
        }
    }
}

/// One dungeon floor: the tile grid, its rooms and the fog-of-war mask.
///
/// A dungeon is created once per floor and thrown away when the party takes
/// the stairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Floor number, starting at 1
    pub floor: u32,
    /// Rooms in placement order
    pub rooms: Vec<Room>,
    /// Where the party enters the floor
    pub spawn: Position,
    /// Where the stairs down are
    pub stairs: Position,
    /// Enemy spawn points, in placement order
    pub enemy_spawns: Vec<Position>,
    /// Chest locations, in placement order
    pub chest_positions: Vec<Position>,
    /// Rooms the generator tried to place
    pub requested_rooms: u32,
    tiles: Vec<Vec<Tile>>,
    explored: Vec<Vec<bool>>,
}

impl Dungeon {
    /// Creates a new dungeon filled with void.
    pub fn new(width: u32, height: u32, floor: u32) -> Self {
        let center = Position::new(width as i32 / 2, height as i32 / 2);
        Self {
            width,
            height,
            floor,
            rooms: Vec::new(),
            spawn: center,
            stairs: center,
            enemy_spawns: Vec::new(),
            chest_positions: Vec::new(),
            requested_rooms: 0,
            tiles: vec![vec![Tile::Void; width as usize]; height as usize],
            explored: vec![vec![false; width as usize]; height as usize],
        }
    }

    /// Builds a hand-authored single-room floor.
    ///
    /// Used when generation could not place any room at all. The grid is
    /// enlarged to at least 9x7 so the 7x5 room and its walls fit.
    pub fn fallback(width: u32, height: u32, floor: u32) -> Self {
        let width = width.max(9);
        let height = height.max(7);
        let mut dungeon = Self::new(width, height, floor);

        let room = Room::new((width as i32 - 7) / 2, (height as i32 - 5) / 2, 7, 5);
        for pos in room.positions() {
            dungeon.set_tile(pos, Tile::Floor);
        }
        dungeon.extrude_walls();

        let center = room.center();
        dungeon.spawn = Position::new(room.x + 1, center.y);
        dungeon.stairs = Position::new(room.right() - 2, center.y);
        dungeon.set_tile(dungeon.stairs, Tile::Stairs);
        dungeon.rooms.push(room);
        dungeon.requested_rooms = 1;
        dungeon
    }

    /// Checks if a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Gets the tile at `(x, y)`; anything outside the grid reads as void.
    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        self.tile(Position::new(x, y)).unwrap_or(Tile::Void)
    }

    /// Gets the tile at a position, if it is inside the grid.
    pub fn tile(&self, pos: Position) -> Option<Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.tiles[pos.y as usize][pos.x as usize])
    }

    /// Sets a tile. Returns false if the position is outside the grid.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> bool {
        if !self.in_bounds(pos) {
            return false;
        }
        self.tiles[pos.y as usize][pos.x as usize] = tile;
        true
    }

    /// Checks whether an entity can stand at `pos`.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(Tile::is_passable)
    }

    /// Checks whether `(x, y)` has been revealed.
    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        let pos = Position::new(x, y);
        self.in_bounds(pos) && self.explored[y as usize][x as usize]
    }

    /// Marks every tile within Euclidean `radius` of `center` as explored.
    ///
    /// Idempotent, and never hides a tile again.
    pub fn reveal_around(&mut self, center: Position, radius: u32) {
        let r = radius as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let pos = Position::new(center.x + dx, center.y + dy);
                if center.euclidean_distance(pos) > radius as f64 {
                    continue;
                }
                if self.in_bounds(pos) {
                    self.explored[pos.y as usize][pos.x as usize] = true;
                }
            }
        }
    }

    /// Reveals hidden traps within Chebyshev `radius` of `center`.
    ///
    /// Returns how many traps were newly revealed.
    pub fn reveal_traps_near(&mut self, center: Position, radius: u32) -> usize {
        let r = radius as i32;
        let mut revealed = 0;
        for dy in -r..=r {
            for dx in -r..=r {
                let pos = Position::new(center.x + dx, center.y + dy);
                if self.tile(pos) == Some(Tile::Trap { revealed: false }) {
                    self.set_tile(pos, Tile::Trap { revealed: true });
                    revealed += 1;
                }
            }
        }
        revealed
    }

    /// Number of explored tiles.
    pub fn explored_count(&self) -> usize {
        self.explored.iter().flatten().filter(|&&e| e).count()
    }

    /// Counts tiles matching a predicate.
    pub fn count_tiles(&self, predicate: impl Fn(Tile) -> bool) -> usize {
        self.tiles.iter().flatten().filter(|&&t| predicate(t)).count()
    }

    /// Iterates over every position and its tile, row by row.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, &tile)| (Position::new(x as i32, y as i32), tile))
        })
    }

    /// Reports if fewer rooms were placed than requested.
    pub fn degradation(&self) -> Option<GenerationDegraded> {
        let placed = self.rooms.len() as u32;
        (placed < self.requested_rooms).then_some(GenerationDegraded {
            requested: self.requested_rooms,
            placed,
        })
    }

    /// Turns every void tile touching carved space (8-neighbourhood) into wall.
    ///
    /// Must run once, after every room and corridor has been carved.
    pub(crate) fn extrude_walls(&mut self) {
        let mut walls = Vec::new();
        for (pos, tile) in self.iter_tiles() {
            if tile != Tile::Void {
                continue;
            }
            let touches_carved = pos
                .adjacent_positions()
                .into_iter()
                .any(|n| self.tile(n).is_some_and(Tile::is_carved));
            if touches_carved {
                walls.push(pos);
            }
        }
        for pos in walls {
            self.set_tile(pos, Tile::Wall);
        }
    }

    /// Renders the floor as text, one row per line.
    ///
    /// With `fog` set, unexplored tiles are drawn blank.
    pub fn render_ascii(&self, fog: bool) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if fog && !self.explored[y][x] {
                    out.push(' ');
                } else {
                    out.push(tile.glyph());
                }
            }
            out.push('\n');
        }
        out
    }
}
