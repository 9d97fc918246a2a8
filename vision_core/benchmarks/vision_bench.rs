use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use vision_core::{
    build_vision_map, is_visible, Alliance, EntityRecord, EntityStatus, EntityStore, FogMask,
    MapBounds, VisionRadiusResolver,
};

const ASSET_TYPES: [&str; 7] = ["turret", "drone", "rover", "camera", "sensor", "person", "truck"];

fn random_store(count: usize, seed: u64) -> EntityStore {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let alliance = if rng.gen_bool(0.7) {
                Alliance::Friendly
            } else {
                Alliance::Hostile
            };
            let mut record = EntityRecord::new(format!("unit-{i}"))
                .with_alliance(alliance)
                .with_asset_type(ASSET_TYPES[rng.gen_range(0..ASSET_TYPES.len())])
                .at(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0));
            if rng.gen_bool(0.1) {
                record = record.with_status(EntityStatus::Destroyed);
            }
            record
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("vision_build");
    let resolver = VisionRadiusResolver::default();

    for count in [100usize, 500, 1000, 5000] {
        let store = random_store(count, 7);
        group.bench_with_input(BenchmarkId::new("entities", count), &store, |b, store| {
            b.iter(|| build_vision_map(black_box(store), &resolver))
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("vision_query");
    let resolver = VisionRadiusResolver::default();

    for count in [100usize, 1000] {
        let circles = build_vision_map(&random_store(count, 11), &resolver);
        group.bench_with_input(BenchmarkId::new("point", count), &circles, |b, circles| {
            b.iter(|| is_visible(black_box(123.0), black_box(-77.0), circles))
        });
        group.bench_with_input(BenchmarkId::new("fog_mask_64", count), &circles, |b, circles| {
            b.iter(|| FogMask::rasterize(circles, MapBounds::default(), 64, 64))
        });
    }

    group.finish();
}

criterion_group!(vision_benches, bench_build, bench_query);
criterion_main!(vision_benches);
