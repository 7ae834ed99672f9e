//! Generator invariants checked over many seeds and floors.

use cairn::{
    modifier, reachable_from, roll_stat, Dungeon, DungeonGenerator, GameRng, GenerationConfig,
    Position, Tile,
};
use proptest::prelude::*;

fn generate(seed: u64, floor: u32) -> Dungeon {
    DungeonGenerator::new(GenerationConfig::new()).generate(40, 30, floor, &mut GameRng::new(seed))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn rooms_never_overlap(seed in any::<u64>(), floor in 1u32..12) {
        let dungeon = generate(seed, floor);
        for (i, a) in dungeon.rooms.iter().enumerate() {
            for b in dungeon.rooms.iter().skip(i + 1) {
                prop_assert!(!a.intersects(b, 1), "{:?} overlaps {:?}", a, b);
            }
        }
        prop_assert!(dungeon.rooms.len() as u32 <= dungeon.requested_rooms);
    }

    #[test]
    fn carved_tiles_reachable_from_spawn(seed in any::<u64>(), floor in 1u32..12) {
        let dungeon = generate(seed, floor);
        let reached = reachable_from(dungeon.spawn, |p| dungeon.is_passable(p));
        for (pos, tile) in dungeon.iter_tiles() {
            if tile.is_carved() {
                prop_assert!(reached.contains(&pos), "{:?} at {:?} is cut off", tile, pos);
            }
        }
        prop_assert!(reached.contains(&dungeon.stairs));
    }

    #[test]
    fn same_seed_same_floor(seed in any::<u64>(), floor in 1u32..8) {
        prop_assert_eq!(generate(seed, floor), generate(seed, floor));
    }

    #[test]
    fn fog_only_lifts(seed in any::<u64>(), x in 0i32..40, y in 0i32..30, radius in 0u32..6) {
        let mut dungeon = generate(seed, 1);
        let center = Position::new(x, y);
        dungeon.reveal_around(center, radius);
        let once = dungeon.clone();
        dungeon.reveal_around(center, radius);
        prop_assert_eq!(&dungeon, &once);
        prop_assert!(dungeon.is_explored(x, y));

        dungeon.reveal_around(Position::new(0, 0), 2);
        for (pos, _) in once.iter_tiles() {
            if once.is_explored(pos.x, pos.y) {
                prop_assert!(dungeon.is_explored(pos.x, pos.y));
            }
        }
    }

    #[test]
    fn modifier_is_floor_half(score in 1u8..=30) {
        let expected = ((score as f64 - 10.0) / 2.0).floor() as i8;
        prop_assert_eq!(modifier(score), expected);
    }
}

#[test]
fn test_seed_42_layout_is_stable() {
    let first = generate(42, 1);
    let second = generate(42, 1);
    assert_eq!(first.requested_rooms, 8);
    assert_eq!(first.rooms, second.rooms);
    assert_eq!(first.stairs, second.stairs);
    assert_eq!(first.tile(first.stairs), Some(Tile::Stairs));
}

#[test]
fn test_roll_stat_distribution() {
    let mut rng = GameRng::new(2024);
    let samples = 100_000;
    let mut counts = [0u32; 19];
    let mut total = 0u64;
    for _ in 0..samples {
        let score = roll_stat(&mut rng);
        assert!((3..=18).contains(&score));
        counts[score as usize] += 1;
        total += score as u64;
    }
    let mean = total as f64 / samples as f64;
    assert!((mean - 12.24).abs() < 0.1, "mean was {}", mean);

    let mode = (3..=18).max_by_key(|&s| counts[s]).unwrap();
    assert!(mode == 12 || mode == 13, "mode was {}", mode);
}

#[test]
fn test_modifier_table() {
    for (score, expected) in [(1, -5), (3, -4), (8, -1), (9, -1), (10, 0), (11, 0), (15, 2), (18, 4), (20, 5)] {
        assert_eq!(modifier(score), expected, "score {}", score);
    }
}

#[test]
fn test_degenerate_grids_fall_back_cleanly() {
    let generator = DungeonGenerator::default();
    for (width, height) in [(1, 1), (3, 3), (6, 4)] {
        let dungeon = generator.generate(width, height, 1, &mut GameRng::new(1));
        assert!(dungeon.rooms.is_empty());
        assert_eq!(dungeon.spawn, dungeon.stairs);
        assert!(dungeon.degradation().is_some());

        let fallback = Dungeon::fallback(width, height, 1);
        assert_eq!(fallback.rooms.len(), 1);
        assert!(fallback.is_passable(fallback.spawn));
        assert_eq!(fallback.tile(fallback.stairs), Some(Tile::Stairs));
    }
}
