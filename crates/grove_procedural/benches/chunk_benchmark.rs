//! Benchmark for chunk generation and editing.
//!
//! Run with: cargo bench --package grove_procedural --bench chunk_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use grove_procedural::{
    ChunkCoord, EditParams, GenerationConfig, MaterialId, TerrainGenerator, WorldType, PAD,
};

fn benchmark_single_chunk(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42);

    let mut group = c.benchmark_group("chunk_generation");
    group.sample_size(10);
    group.bench_function("single_chunk", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(generator.generate_chunk(ChunkCoord::new(coord, coord / 2), &[]))
        });
    });
    group.finish();
}

fn benchmark_chunk_ring(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42);

    let mut group = c.benchmark_group("chunk_ring");
    group.sample_size(10);
    group.throughput(Throughput::Elements(9));
    group.bench_function("3x3_chunks", |b| {
        b.iter(|| {
            for z in -1..=1 {
                for x in -1..=1 {
                    black_box(generator.generate_chunk(ChunkCoord::new(x, z), &[]));
                }
            }
        });
    });
    group.finish();
}

fn benchmark_archipelago(c: &mut Criterion) {
    let generator = TerrainGenerator::new(GenerationConfig {
        world_type: WorldType::Archipelago,
        ..GenerationConfig::with_seed(42)
    });

    let mut group = c.benchmark_group("chunk_generation");
    group.sample_size(10);
    group.bench_function("archipelago_chunk", |b| {
        b.iter(|| black_box(generator.generate_chunk(ChunkCoord::new(3, -2), &[])));
    });
    group.finish();
}

fn benchmark_height_queries(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42);

    c.bench_function("get_height_at", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x += 1.0;
            black_box(generator.get_height_at(black_box(x), black_box(x * 0.5)))
        });
    });
}

fn benchmark_dig(c: &mut Criterion) {
    let generator = TerrainGenerator::with_seed(42);
    let chunk = generator.generate_chunk(ChunkCoord::new(0, 0), &[]);
    let params = EditParams {
        center: [PAD as f32 + 16.0, 40.0, PAD as f32 + 16.0],
        radius: 4.0,
        delta: -2.0,
        material: MaterialId::Air,
    };

    c.bench_function("dig_radius_4", |b| {
        b.iter(|| {
            let mut target = chunk.clone();
            black_box(generator.modify_chunk(&mut target, &params))
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = benchmark_single_chunk,
              benchmark_chunk_ring,
              benchmark_archipelago,
              benchmark_height_queries,
              benchmark_dig
}

criterion_main!(benches);
