use criterion::{black_box, criterion_group, criterion_main, Criterion};

use liminal_core::balance::{run_room_census, CensusConfig};
use liminal_core::corruption::CorruptionRng;
use liminal_core::encounter::{spawn_encounter, spawn_opening_encounter};
use liminal_core::engine::{EngineConfig, GameEngine};
use liminal_core::gameflow::InputKey;
use liminal_core::generation::{generate_room, Direction, RoomType};
use liminal_core::scene::HeadlessScene;

fn bench_room_generation(c: &mut Criterion) {
    let mut rng = CorruptionRng::from_seed(42);
    c.bench_function("generate_room_level_0", |b| {
        b.iter(|| generate_room(&mut rng, black_box(0)).unwrap())
    });

    let mut rng = CorruptionRng::from_seed(42);
    c.bench_function("generate_room_level_50", |b| {
        b.iter(|| generate_room(&mut rng, black_box(50)).unwrap())
    });
}

fn bench_encounters(c: &mut Criterion) {
    let mut rng = CorruptionRng::from_seed(7);
    c.bench_function("spawn_encounter_corrupted", |b| {
        b.iter(|| spawn_encounter(&mut rng, black_box(RoomType::Corrupted), 10).unwrap())
    });

    let mut rng = CorruptionRng::from_seed(7);
    c.bench_function("spawn_opening_encounter", |b| {
        b.iter(|| spawn_opening_encounter(&mut rng).unwrap())
    });
}

fn bench_transition(c: &mut Criterion) {
    let mut scene = HeadlessScene::new();
    let mut engine = GameEngine::new(EngineConfig::seeded(3));
    engine.start(&mut scene);
    engine.tick(0.0, &[InputKey::Space], &mut scene).unwrap();
    engine.tick(0.0, &[InputKey::Space], &mut scene).unwrap();

    c.bench_function("room_transition_full_fade", |b| {
        b.iter(|| {
            engine.transition(black_box(Direction::North), &mut scene);
            for _ in 0..8 {
                engine.tick(0.1, &[], &mut scene).unwrap();
            }
        })
    });
}

fn bench_census(c: &mut Criterion) {
    let config = CensusConfig {
        rooms: 1_000,
        ..Default::default()
    };
    c.bench_function("room_census_1k", |b| {
        b.iter(|| run_room_census(black_box(&config)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_room_generation,
    bench_encounters,
    bench_transition,
    bench_census
);
criterion_main!(benches);
