//! # Encounter Generation
//!
//! Decides which enemies stand on a freshly generated floor.

use crate::{Dungeon, EnemyKind, GameRng, Position};
use log::debug;

/// Every this many floors a boss guards the way down.
pub const BOSS_FLOOR_INTERVAL: u32 = 3;

/// Enemy kinds that can spawn on `floor`. Floors past 5 share one roster.
pub fn roster_for_floor(floor: u32) -> &'static [EnemyKind] {
    match floor {
        0 | 1 => &[EnemyKind::Slime, EnemyKind::Goblin],
        2 => &[EnemyKind::Goblin, EnemyKind::Skeleton],
        3 => &[EnemyKind::Skeleton, EnemyKind::Orc],
        4 => &[EnemyKind::Orc, EnemyKind::Skeleton, EnemyKind::Goblin],
        _ => &[EnemyKind::Orc, EnemyKind::Dragon],
    }
}

/// Whether `floor` has a boss.
pub fn is_boss_floor(floor: u32) -> bool {
    floor > 0 && floor % BOSS_FLOOR_INTERVAL == 0
}

/// An enemy to place on the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub level: u32,
    pub position: Position,
}

/// Rolls an enemy for every spawn point of `dungeon`, plus the boss.
///
/// Regular enemies are drawn from the floor's roster at level
/// `floor + (-1..=1)`, never below 1. On boss floors a Lich of level `floor`
/// waits at the center of the second-to-last room, or the last room when
/// there are only two.
pub fn populate(dungeon: &Dungeon, rng: &mut GameRng) -> Vec<EnemySpawn> {
    let floor = dungeon.floor;
    let roster = roster_for_floor(floor);
    let mut spawns: Vec<EnemySpawn> = dungeon
        .enemy_spawns
        .iter()
        .filter_map(|&position| {
            let kind = *rng.choose(roster)?;
            let level = (floor as i32 + rng.range(-1, 1)).max(1) as u32;
            Some(EnemySpawn {
                kind,
                level,
                position,
            })
        })
        .collect();

    if is_boss_floor(floor) {
        let rooms = &dungeon.rooms;
        let lair = if rooms.len() > 2 {
            rooms.get(rooms.len() - 2)
        } else {
            rooms.last()
        };
        if let Some(room) = lair {
            spawns.push(EnemySpawn {
                kind: EnemyKind::Lich,
                level: floor,
                position: room.center(),
            });
        }
    }

    debug!("floor {}: {} enemies", floor, spawns.len());
    spawns
}
