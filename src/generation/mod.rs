//! # Generation Module
//!
//! Procedural content generation for dungeon floors, enemy rosters and loot.
//!
//! Every generator here is driven by a caller-supplied [`GameRng`], so a floor
//! is fully determined by its configuration, its floor number and the state of
//! the random stream when generation starts.
//!
//! [`GameRng`]: crate::GameRng

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::{CairnError, CairnResult, Position};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for procedural generation.
///
/// Every tunable of the room-and-corridor generator lives here. The defaults
/// reproduce the classic layout: 40x30 grids, 6 + 2 per floor rooms and
/// 200 placement attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Smallest room width
    pub min_room_width: u32,
    /// Largest room width
    pub max_room_width: u32,
    /// Smallest room height
    pub min_room_height: u32,
    /// Largest room height
    pub max_room_height: u32,
    /// Rooms requested on every floor
    pub base_rooms: u32,
    /// Extra rooms requested per floor number
    pub rooms_per_floor: u32,
    /// Placement attempts before giving up on more rooms
    pub max_placement_attempts: u32,
    /// Chance that a room is carved as grass
    pub grass_chance: f64,
    /// First floor on which grass rooms can appear
    pub grass_min_floor: u32,
    /// Chance that an interior room holds a chest
    pub chest_chance: f64,
    /// Chance that a non-spawn room holds a trap
    pub trap_chance: f64,
    /// Chance that a corridor mouth becomes a door
    pub door_chance: f64,
    /// First floor with a water or lava patch
    pub feature_min_floor: u32,
    /// Chance that each tile around the patch center is flooded
    pub feature_fill_chance: f64,
    /// First floor where the patch is lava instead of water
    pub lava_min_floor: u32,
    /// Fog-of-war reveal radius around the hero
    pub sight_radius: u32,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.requested_rooms(1), 8);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            width: crate::config::DEFAULT_DUNGEON_WIDTH,
            height: crate::config::DEFAULT_DUNGEON_HEIGHT,
            min_room_width: 4,
            max_room_width: 9,
            min_room_height: 4,
            max_room_height: 7,
            base_rooms: 6,
            rooms_per_floor: 2,
            max_placement_attempts: 200,
            grass_chance: 0.15,
            grass_min_floor: 2,
            chest_chance: 0.5,
            trap_chance: 0.3,
            door_chance: 0.3,
            feature_min_floor: 2,
            feature_fill_chance: 0.6,
            lava_min_floor: 4,
            sight_radius: crate::config::SIGHT_RADIUS,
        }
    }

    /// Creates a configuration with no doors, traps or hazards.
    ///
    /// Useful when a test needs the bare room-and-corridor skeleton.
    pub fn for_testing() -> Self {
        Self {
            door_chance: 0.0,
            trap_chance: 0.0,
            feature_min_floor: u32::MAX,
            ..Self::new()
        }
    }

    /// Number of rooms the generator tries to place on `floor`.
    pub fn requested_rooms(&self, floor: u32) -> u32 {
        self.base_rooms
            .saturating_add(self.rooms_per_floor.saturating_mul(floor))
    }

    /// Checks that the ranges and probabilities make sense.
    pub fn validate(&self) -> CairnResult<()> {
        if self.min_room_width < 3 || self.min_room_height < 3 {
            return Err(CairnError::InvalidState(
                "rooms must be at least 3x3".to_string(),
            ));
        }
        if self.min_room_width > self.max_room_width || self.min_room_height > self.max_room_height
        {
            return Err(CairnError::InvalidState(
                "minimum room size exceeds maximum".to_string(),
            ));
        }

        let probabilities = [
            ("grass_chance", self.grass_chance),
            ("chest_chance", self.chest_chance),
            ("trap_chance", self.trap_chance),
            ("door_chance", self.door_chance),
            ("feature_fill_chance", self.feature_fill_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(CairnError::InvalidState(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }

    /// Loads and validates a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> CairnResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Reported when fewer rooms were placed than requested.
///
/// This is never a hard failure: the floor is still playable with whatever
/// was placed, and a floor with no rooms at all is swapped for a fallback
/// layout by the session.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error("placed {placed} of {requested} requested rooms")]
pub struct GenerationDegraded {
    /// Rooms the generator tried to place
    pub requested: u32,
    /// Rooms that were actually placed
    pub placed: u32,
}

/// An axis-aligned rectangular room.
///
/// The whole rectangle is walkable; walls are extruded around it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Indices of rooms joined to this one by a corridor
    pub connections: Vec<usize>,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use cairn::{Position, Room};
    ///
    /// let room = Room::new(5, 5, 8, 6);
    /// assert_eq!(room.center(), Position::new(9, 8));
    /// assert!(room.contains(Position::new(12, 10)));
    /// assert!(!room.contains(Position::new(13, 10)));
    /// ```
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            connections: Vec::new(),
        }
    }

    /// One past the rightmost column.
    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.x + self.width as i32 / 2,
            self.y + self.height as i32 / 2,
        )
    }

    /// Gets the area of the room in tiles.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.y >= self.y && pos.x < self.right() && pos.y < self.bottom()
    }

    /// Checks if this room, grown by `margin` tiles on every side, overlaps
    /// another room.
    pub fn intersects(&self, other: &Room, margin: i32) -> bool {
        self.x - margin < other.right()
            && self.right() + margin > other.x
            && self.y - margin < other.bottom()
            && self.bottom() + margin > other.y
    }

    /// Gets every tile position covered by the room.
    pub fn positions(&self) -> Vec<Position> {
        (self.y..self.bottom())
            .flat_map(|y| (self.x..self.right()).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Gets the positions at least one tile in from the room's edge.
    pub fn interior_positions(&self) -> Vec<Position> {
        ((self.y + 1)..(self.bottom() - 1))
            .flat_map(|y| ((self.x + 1)..(self.right() - 1)).map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Adds a connection to another room.
    pub fn add_connection(&mut self, room_index: usize) {
        if !self.connections.contains(&room_index) {
            self.connections.push(room_index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.width, 40);
        assert_eq!(config.height, 30);
        assert_eq!(config.requested_rooms(1), 8);
        assert_eq!(config.requested_rooms(5), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let mut config = GenerationConfig::new();
        config.min_room_width = 10;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::new();
        config.door_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = GenerationConfig::new();
        config.min_room_height = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "base_rooms": 3, "door_chance": 0.0 }}"#).unwrap();

        let config = GenerationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.base_rooms, 3);
        assert_eq!(config.door_chance, 0.0);
        assert_eq!(config.max_room_width, 9);
    }

    #[test]
    fn test_config_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "trap_chance": -0.5 }}"#).unwrap();
        assert!(GenerationConfig::from_json_file(file.path()).is_err());

        assert!(GenerationConfig::from_json_file("/definitely/not/here.json").is_err());
    }

    #[test]
    fn test_room_geometry() {
        let room = Room::new(5, 5, 10, 8);

        assert_eq!(room.right(), 15);
        assert_eq!(room.bottom(), 13);
        assert_eq!(room.center(), Position::new(10, 9));
        assert_eq!(room.area(), 80);

        assert!(room.contains(Position::new(5, 5)));
        assert!(room.contains(Position::new(14, 12)));
        assert!(!room.contains(Position::new(4, 5)));
        assert!(!room.contains(Position::new(15, 12)));
    }

    #[test]
    fn test_room_intersects_with_margin() {
        let room1 = Room::new(5, 5, 4, 4);
        // Touching edges overlap once the one-tile buffer is applied
        let touching = Room::new(9, 5, 4, 4);
        // One tile gap is enough
        let gapped = Room::new(10, 5, 4, 4);

        assert!(!room1.intersects(&touching, 0));
        assert!(room1.intersects(&touching, 1));
        assert!(!room1.intersects(&gapped, 1));
        assert!(!gapped.intersects(&room1, 1));
    }

    #[test]
    fn test_room_positions() {
        let room = Room::new(2, 3, 4, 5);
        assert_eq!(room.positions().len(), 20);

        let interior = room.interior_positions();
        assert_eq!(interior.len(), 2 * 3);
        assert!(interior.iter().all(|&p| room.contains(p)));
        assert!(!interior.contains(&Position::new(2, 3)));
    }

    #[test]
    fn test_room_connections() {
        let mut room = Room::new(5, 5, 10, 8);
        assert!(room.connections.is_empty());

        room.add_connection(2);
        room.add_connection(3);
        room.add_connection(2);
        assert_eq!(room.connections, vec![2, 3]);
    }

    #[test]
    fn test_degraded_display() {
        let degraded = GenerationDegraded {
            requested: 8,
            placed: 5,
        };
        assert_eq!(degraded.to_string(), "placed 5 of 8 requested rooms");
    }
}
