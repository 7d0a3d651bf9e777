use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use hero_squad::core::config::SquadConfig;
use hero_squad::core::types::HeroId;
use hero_squad::squad::{
    resolve_spacing, HeroSnapshot, SpacingParams, SquadArchetype, SquadWorld, StepContext,
};

fn make_world(squads: u32) -> (SquadWorld, Vec<(HeroId, Vec3)>) {
    let archetype = Arc::new(SquadArchetype::builtin("legionaries").expect("builtin archetype"));
    let mut world = SquadWorld::new(SquadConfig::default()).expect("default config");
    let mut heroes = Vec::new();
    for i in 0..squads {
        let hero = HeroId::new(i);
        let position = Vec3::new((i % 16) as f32 * 20.0, 0.0, (i / 16) as f32 * 20.0);
        world.spawn_squad(hero, Arc::clone(&archetype), position, Vec3::Z);
        heroes.push((hero, position));
    }
    (world, heroes)
}

fn bench_world_step(c: &mut Criterion) {
    let dt = 0.05;
    let mut group = c.benchmark_group("squad/world_step");

    for &n in &[16u32, 256u32] {
        let (mut world, mut heroes) = make_world(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &_n| {
            b.iter(|| {
                let mut ctx = StepContext::new(dt);
                for (hero, position) in heroes.iter_mut() {
                    // Heroes keep walking so units keep breaking and reforming
                    position.z += 3.0 * dt;
                    ctx = ctx.with_hero(*hero, HeroSnapshot::new(*position, Vec3::Z));
                }
                world.step(&ctx);
                black_box(world.tick());
            })
        });
    }

    group.finish();
}

fn bench_spacing(c: &mut Criterion) {
    let params = SpacingParams {
        min_separation: 0.8,
        repel_strength: 1.0,
        max_push: 0.5,
    };
    let mut group = c.benchmark_group("squad/resolve_spacing");

    for &n in &[12usize, 48usize] {
        let positions: Vec<Vec3> = (0..n)
            .map(|i| Vec3::new((i % 6) as f32 * 0.5, 0.0, (i / 6) as f32 * 0.5))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &positions, |b, positions| {
            b.iter(|| black_box(resolve_spacing(positions, &params)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_world_step, bench_spacing);
criterion_main!(benches);
