//! # Dungeon Generation
//!
//! Room-and-corridor floor layouts.
//!
//! The generator works in fixed passes over a void-filled grid:
//! 1. Place non-overlapping rooms by bounded rejection sampling
//! 2. Join consecutive rooms with L-shaped corridors
//! 3. Extrude walls around everything carved
//! 4. Put doors on corridor mouths
//! 5. Mark the spawn point and the stairs
//! 6. Scatter chests, enemy spawns, a water or lava patch, and traps
//!
//! Every pass draws from the same [`GameRng`], so a seed fully determines the
//! floor.

use crate::{Dungeon, GameRng, GenerationConfig, Position, Room, Tile};
use log::{debug, warn};

/// Room-and-corridor dungeon generator.
///
/// # Examples
///
/// ```
/// use cairn::{DungeonGenerator, GameRng, GenerationConfig};
///
/// let generator = DungeonGenerator::new(GenerationConfig::default());
/// let mut rng = GameRng::new(42);
/// let dungeon = generator.generate(40, 30, 1, &mut rng);
/// assert!(!dungeon.rooms.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator {
    /// Tunables for every pass
    pub config: GenerationConfig,
}

impl DungeonGenerator {
    /// Creates a new generator from a configuration.
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Generates one floor.
    ///
    /// Never fails. When fewer rooms fit than requested the floor is still
    /// returned and [`Dungeon::degradation`] reports the shortfall; with no
    /// rooms at all, spawn and stairs both sit at the grid center.
    pub fn generate(&self, width: u32, height: u32, floor: u32, rng: &mut GameRng) -> Dungeon {
        let mut dungeon = Dungeon::new(width, height, floor);
        dungeon.requested_rooms = self.config.requested_rooms(floor);

        self.place_rooms(&mut dungeon, rng);
        self.connect_rooms(&mut dungeon, rng);
        dungeon.extrude_walls();
        self.add_doors(&mut dungeon, rng);
        self.place_spawn_and_stairs(&mut dungeon);
        self.place_chests(&mut dungeon, rng);
        self.place_enemy_spawns(&mut dungeon, rng);
        self.place_liquid_patch(&mut dungeon, rng);
        self.place_traps(&mut dungeon, rng);

        if let Some(degraded) = dungeon.degradation() {
            warn!("Floor {} generation degraded: {}", floor, degraded);
        }
        debug!(
            "Generated floor {}: {} rooms, {} enemy spawns, {} chests",
            floor,
            dungeon.rooms.len(),
            dungeon.enemy_spawns.len(),
            dungeon.chest_positions.len()
        );

        dungeon
    }

    /// Places rooms by rejection sampling until enough fit or attempts run out.
    fn place_rooms(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        let config = &self.config;
        let requested = dungeon.requested_rooms as usize;

        for _ in 0..config.max_placement_attempts {
            if dungeon.rooms.len() >= requested {
                break;
            }

            let w = rng.range(config.min_room_width as i32, config.max_room_width as i32);
            let h = rng.range(config.min_room_height as i32, config.max_room_height as i32);
            let max_x = dungeon.width as i32 - w - 1;
            let max_y = dungeon.height as i32 - h - 1;
            if max_x < 1 || max_y < 1 {
                // Too large for this grid
                continue;
            }
            let x = rng.range(1, max_x);
            let y = rng.range(1, max_y);

            let candidate = Room::new(x, y, w as u32, h as u32);
            if dungeon
                .rooms
                .iter()
                .any(|existing| candidate.intersects(existing, 1))
            {
                continue;
            }

            let ground = if dungeon.floor >= config.grass_min_floor && rng.chance(config.grass_chance)
            {
                Tile::Grass
            } else {
                Tile::Floor
            };
            for pos in candidate.positions() {
                dungeon.set_tile(pos, ground);
            }
            dungeon.rooms.push(candidate);
        }
    }

    /// Joins each room to the next one in placement order.
    fn connect_rooms(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        for i in 1..dungeon.rooms.len() {
            let a = dungeon.rooms[i - 1].center();
            let b = dungeon.rooms[i].center();

            if rng.chance(0.5) {
                carve_horizontal(dungeon, a.x, b.x, a.y);
                carve_vertical(dungeon, a.y, b.y, b.x);
            } else {
                carve_vertical(dungeon, a.y, b.y, a.x);
                carve_horizontal(dungeon, a.x, b.x, b.y);
            }

            dungeon.rooms[i - 1].add_connection(i);
            dungeon.rooms[i].add_connection(i - 1);
        }
    }

    /// Turns corridor tiles just outside a room edge into doors.
    ///
    /// A candidate must be plain floor flanked by wall on both sides across
    /// the corridor, so doors only appear in one-tile-wide openings.
    fn add_doors(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        if self.config.door_chance <= 0.0 {
            return;
        }

        let mut mouths = Vec::new();
        for room in &dungeon.rooms {
            for y in room.y..room.bottom() {
                mouths.push((Position::new(room.x - 1, y), false));
                mouths.push((Position::new(room.right(), y), false));
            }
            for x in room.x..room.right() {
                mouths.push((Position::new(x, room.y - 1), true));
                mouths.push((Position::new(x, room.bottom()), true));
            }
        }

        for (pos, horizontal_wall) in mouths {
            if dungeon.tile(pos) != Some(Tile::Floor) {
                continue;
            }
            let (side_a, side_b) = if horizontal_wall {
                (Position::new(pos.x - 1, pos.y), Position::new(pos.x + 1, pos.y))
            } else {
                (Position::new(pos.x, pos.y - 1), Position::new(pos.x, pos.y + 1))
            };
            let flanked =
                dungeon.tile(side_a) == Some(Tile::Wall) && dungeon.tile(side_b) == Some(Tile::Wall);
            if flanked && rng.chance(self.config.door_chance) {
                dungeon.set_tile(pos, Tile::Door);
            }
        }
    }

    /// Spawn at the first room's center, stairs at the last room's center.
    fn place_spawn_and_stairs(&self, dungeon: &mut Dungeon) {
        let (Some(first), Some(last)) = (dungeon.rooms.first(), dungeon.rooms.last()) else {
            return;
        };
        dungeon.spawn = first.center();
        dungeon.stairs = last.center();
        dungeon.set_tile(dungeon.stairs, Tile::Stairs);
    }

    /// At most one chest in each interior room (neither first nor last).
    fn place_chests(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        for i in interior_rooms(dungeon) {
            if !rng.chance(self.config.chest_chance) {
                continue;
            }
            let pos = random_interior_point(&dungeon.rooms[i], rng);
            if dungeon.tile(pos) == Some(Tile::Floor) {
                dungeon.set_tile(pos, Tile::Chest);
                dungeon.chest_positions.push(pos);
            }
        }
    }

    /// One to `2 + floor/2` enemy spawns in every room except the spawn room.
    fn place_enemy_spawns(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        let max_per_room = 2 + dungeon.floor as i32 / 2;
        for i in 1..dungeon.rooms.len() {
            let count = rng.range(1, max_per_room);
            for _ in 0..count {
                let pos = random_interior_point(&dungeon.rooms[i], rng);
                let open = dungeon.tile(pos).is_some_and(Tile::is_open_ground);
                if open && !dungeon.enemy_spawns.contains(&pos) {
                    dungeon.enemy_spawns.push(pos);
                }
            }
        }
    }

    /// A single 3x3 water or lava patch centered in a random interior room.
    fn place_liquid_patch(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        if dungeon.floor < self.config.feature_min_floor || dungeon.rooms.len() <= 3 {
            return;
        }
        let candidates: Vec<usize> = interior_rooms(dungeon).collect();
        let Some(&room_index) = rng.choose(&candidates) else {
            return;
        };

        let liquid = if dungeon.floor < self.config.lava_min_floor {
            Tile::Water
        } else {
            Tile::Lava
        };
        let center = dungeon.rooms[room_index].center();

        for dy in -1..=1 {
            for dx in -1..=1 {
                let pos = Position::new(center.x + dx, center.y + dy);
                if dungeon.tile(pos) != Some(Tile::Floor) {
                    continue;
                }
                // The center is always flooded so the patch stays in one piece
                if pos == center || rng.chance(self.config.feature_fill_chance) {
                    dungeon.set_tile(pos, liquid);
                }
            }
        }
    }

    /// At most one hidden trap in each non-spawn room.
    fn place_traps(&self, dungeon: &mut Dungeon, rng: &mut GameRng) {
        for i in 1..dungeon.rooms.len() {
            if !rng.chance(self.config.trap_chance) {
                continue;
            }
            let pos = random_interior_point(&dungeon.rooms[i], rng);
            if dungeon.tile(pos) == Some(Tile::Floor) {
                dungeon.set_tile(pos, Tile::Trap { revealed: false });
            }
        }
    }
}

/// Indices of rooms that are neither the spawn room nor the stairs room.
fn interior_rooms(dungeon: &Dungeon) -> impl Iterator<Item = usize> {
    1..dungeon.rooms.len().saturating_sub(1)
}

/// A random point at least one tile in from the room's edge.
fn random_interior_point(room: &Room, rng: &mut GameRng) -> Position {
    let x = room.x + rng.range(1, room.width as i32 - 2);
    let y = room.y + rng.range(1, room.height as i32 - 2);
    Position::new(x, y)
}

fn carve_horizontal(dungeon: &mut Dungeon, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        carve(dungeon, Position::new(x, y));
    }
}

fn carve_vertical(dungeon: &mut Dungeon, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        carve(dungeon, Position::new(x, y));
    }
}

/// Corridors only ever turn void into floor; rooms they cross keep their tiles.
fn carve(dungeon: &mut Dungeon, pos: Position) {
    if dungeon.tile(pos) == Some(Tile::Void) {
        dungeon.set_tile(pos, Tile::Floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reachable_from;

    fn generate(seed: u64, floor: u32) -> Dungeon {
        let generator = DungeonGenerator::default();
        let mut rng = GameRng::new(seed);
        generator.generate(40, 30, floor, &mut rng)
    }

    #[test]
    fn test_generator_places_rooms() {
        let dungeon = generate(42, 1);
        assert!(!dungeon.rooms.is_empty());
        assert!(dungeon.rooms.len() <= 8);
        assert_eq!(dungeon.requested_rooms, 8);
        assert_eq!(dungeon.spawn, dungeon.rooms[0].center());
        assert_eq!(dungeon.tile(dungeon.stairs), Some(Tile::Stairs));
    }

    #[test]
    fn test_rooms_respect_buffer_and_bounds() {
        for seed in 0..20 {
            let dungeon = generate(seed, 3);
            for (i, a) in dungeon.rooms.iter().enumerate() {
                assert!(a.x >= 1 && a.y >= 1);
                assert!(a.right() <= 39 && a.bottom() <= 29);
                for b in dungeon.rooms.iter().skip(i + 1) {
                    assert!(!a.intersects(b, 1));
                }
            }
        }
    }

    #[test]
    fn test_consecutive_rooms_are_linked() {
        let dungeon = generate(7, 2);
        for i in 1..dungeon.rooms.len() {
            assert!(dungeon.rooms[i].connections.contains(&(i - 1)));
            assert!(dungeon.rooms[i - 1].connections.contains(&i));
        }
    }

    #[test]
    fn test_every_carved_tile_is_reachable() {
        for seed in 0..10 {
            let dungeon = generate(seed, 4);
            let reached = reachable_from(dungeon.spawn, |p| dungeon.is_passable(p));
            for (pos, tile) in dungeon.iter_tiles() {
                if tile.is_carved() {
                    assert!(reached.contains(&pos), "seed {} tile {:?} unreachable", seed, pos);
                }
            }
        }
    }

    #[test]
    fn test_walls_enclose_carved_space() {
        let dungeon = generate(3, 1);
        for (pos, tile) in dungeon.iter_tiles() {
            if tile.is_passable() {
                for n in pos.adjacent_positions() {
                    assert_ne!(dungeon.tile(n), Some(Tile::Void));
                    assert!(dungeon.in_bounds(n));
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_floor() {
        assert_eq!(generate(1234, 2), generate(1234, 2));
        assert_ne!(generate(1234, 2), generate(4321, 2));
    }

    #[test]
    fn test_spawn_room_has_no_enemies() {
        for seed in 0..10 {
            let dungeon = generate(seed, 2);
            let spawn_room = &dungeon.rooms[0];
            assert!(dungeon.enemy_spawns.iter().all(|&p| !spawn_room.contains(p)));
        }
    }

    #[test]
    fn test_chests_only_in_interior_rooms() {
        for seed in 0..10 {
            let dungeon = generate(seed, 1);
            let first = &dungeon.rooms[0];
            let last = &dungeon.rooms[dungeon.rooms.len() - 1];
            for &chest in &dungeon.chest_positions {
                assert_eq!(dungeon.tile(chest), Some(Tile::Chest));
                assert!(!first.contains(chest) && !last.contains(chest));
            }
        }
    }

    #[test]
    fn test_liquid_depends_on_floor() {
        let count = |d: &Dungeon, tile: Tile| d.count_tiles(|t| t == tile);
        let mut config = GenerationConfig::default();
        config.grass_chance = 0.0;
        config.chest_chance = 0.0;
        let generator = DungeonGenerator::new(config);

        for seed in 0..10 {
            let first_floor = generate(seed, 1);
            assert_eq!(count(&first_floor, Tile::Water) + count(&first_floor, Tile::Lava), 0);

            let shallow = generator.generate(40, 30, 2, &mut GameRng::new(seed));
            assert_eq!(count(&shallow, Tile::Lava), 0);
            if shallow.rooms.len() > 3 {
                assert!((1..=9).contains(&count(&shallow, Tile::Water)));
            }

            let deep = generator.generate(40, 30, 5, &mut GameRng::new(seed));
            assert_eq!(count(&deep, Tile::Water), 0);
            if deep.rooms.len() > 3 {
                assert!((1..=9).contains(&count(&deep, Tile::Lava)));
            }
        }
    }

    #[test]
    fn test_tiny_grid_degrades_without_panicking() {
        let generator = DungeonGenerator::default();
        let mut rng = GameRng::new(9);
        let dungeon = generator.generate(5, 5, 1, &mut rng);

        assert!(dungeon.rooms.is_empty());
        assert_eq!(dungeon.spawn, Position::new(2, 2));
        assert_eq!(dungeon.stairs, dungeon.spawn);
        assert_eq!(dungeon.degradation().map(|d| d.placed), Some(0));
    }

    #[test]
    fn test_doors_disabled() {
        let generator = DungeonGenerator::new(GenerationConfig::for_testing());
        let mut rng = GameRng::new(11);
        let dungeon = generator.generate(40, 30, 6, &mut rng);
        assert_eq!(dungeon.count_tiles(|t| t == Tile::Door), 0);
        assert_eq!(dungeon.count_tiles(|t| matches!(t, Tile::Trap { .. })), 0);
        assert_eq!(dungeon.count_tiles(|t| t == Tile::Lava), 0);
    }

    #[test]
    fn test_doors_sit_in_wall_gaps() {
        let mut config = GenerationConfig::default();
        config.door_chance = 1.0;
        let generator = DungeonGenerator::new(config);

        for seed in 0..10 {
            let mut rng = GameRng::new(seed);
            let dungeon = generator.generate(40, 30, 1, &mut rng);
            for (pos, tile) in dungeon.iter_tiles() {
                if tile != Tile::Door {
                    continue;
                }
                let wall = |dx: i32, dy: i32| {
                    dungeon.tile(Position::new(pos.x + dx, pos.y + dy)) == Some(Tile::Wall)
                };
                assert!((wall(-1, 0) && wall(1, 0)) || (wall(0, -1) && wall(0, 1)));
                assert!(dungeon.rooms.iter().all(|r| !r.contains(pos)));
            }
        }
    }
}
