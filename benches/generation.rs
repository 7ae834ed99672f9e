//! Benchmarks for floor generation and combat resolution.

use cairn::{
    AbilityScores, Autopilot, ClassKind, CombatState, DungeonGenerator, EnemyKind, Entity,
    EntityArena, GameRng, GameState, GenerationConfig, Phase, PlayerAction,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn benchmark_generate_floor(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("generate_floor");
    let generator = DungeonGenerator::new(GenerationConfig::new());

    for floor in [1, 4, 9] {
        group.bench_with_input(BenchmarkId::new("floor", floor), &floor, |bencher, &floor| {
            let mut rng = GameRng::new(42);
            bencher.iter(|| black_box(generator.generate(40, 30, floor, &mut rng)));
        });
    }

    group.finish();
}

fn benchmark_duel(criterion: &mut Criterion) {
    criterion.bench_function("warrior_vs_goblin", |bencher| {
        let mut seed = 0;
        bencher.iter(|| {
            seed += 1;
            let mut rng = GameRng::new(seed);
            let mut arena = EntityArena::new();
            let hero = arena.push(Entity::hero_with(
                ClassKind::Warrior,
                "Hero",
                AbilityScores::new(16, 12, 14, 10, 10, 10),
            ));
            let goblin = arena.push(Entity::enemy_with(
                EnemyKind::Goblin,
                1,
                AbilityScores::default(),
            ));
            let mut combat = CombatState::new(&arena, vec![hero], vec![goblin], &mut rng);
            while !combat.is_over() {
                let result = if combat.phase() == Phase::PlayerTurn {
                    combat.submit_player_action(
                        &mut arena,
                        PlayerAction::Attack { target: goblin },
                        &mut rng,
                    )
                } else {
                    combat.run_ai_turn(&mut arena, &mut rng)
                };
                if result.is_err() {
                    break;
                }
            }
            black_box(combat.phase())
        });
    });
}

fn benchmark_autopilot_floor(criterion: &mut Criterion) {
    criterion.bench_function("autopilot_first_floor", |bencher| {
        bencher.iter(|| {
            let mut game = GameState::new_game(ClassKind::Ranger, 7);
            black_box(Autopilot::diving().run(&mut game, 500, 1).ok())
        });
    });
}

criterion_group!(
    benches,
    benchmark_generate_floor,
    benchmark_duel,
    benchmark_autopilot_floor
);
criterion_main!(benches);
