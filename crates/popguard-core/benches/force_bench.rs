use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use popguard_core::config::GameConfig;
use popguard_core::game::Game;
use popguard_core::resolver::{FieldEntity, ForceSimulator};
use popguard_core::round::RoundState;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A packed field like the one at the end of a spawn phase.
fn packed_field(defenders: usize, enemies: usize) -> Vec<FieldEntity> {
    let mut entities = Vec::with_capacity(defenders + enemies);
    for i in 0..defenders {
        let angle = i as f32 * 2.4;
        let radius = (i as f32).sqrt() * 0.6;
        entities.push(FieldEntity::defender(
            Vec2::from_angle(angle) * radius,
            i % 10 == 0,
        ));
    }
    for i in 0..enemies {
        let angle = i as f32 * std::f32::consts::TAU / enemies as f32;
        entities.push(FieldEntity::enemy(Vec2::from_angle(angle) * 30.0));
    }
    entities
}

fn bench_force_pass(c: &mut Criterion) {
    let simulator = ForceSimulator::default();
    let field = packed_field(110, 20);
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    c.bench_function("force_pass_110", |b| {
        b.iter(|| {
            let mut entities = field.clone();
            black_box(simulator.compute(&mut entities, true, &mut rng))
        })
    });
}

fn bench_spawn_phase(c: &mut Criterion) {
    // Full StartRound: every spawn plus the growing force pass
    c.bench_function("spawn_phase", |b| {
        b.iter(|| {
            let mut game = Game::new(GameConfig::default(), black_box(42)).unwrap();
            while game.phase() != RoundState::PlayRound {
                game.step();
            }
            black_box(game.state_hash())
        })
    });
}

criterion_group!(benches, bench_force_pass, bench_spawn_phase);
criterion_main!(benches);
