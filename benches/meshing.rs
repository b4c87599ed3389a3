/// Benchmark suite for chunk meshing and streaming
/// Covers single-chunk meshing across block densities and whole streaming ticks
use cgmath::Point3;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use voxel_streaming::prelude::*;

struct Air;

impl BlockSource for Air {
    fn block_at(&self, _coord: BlockCoord) -> Block {
        Block::AIR
    }
}

fn filled_chunk(mut fill: impl FnMut(LocalBlockCoord) -> Block) -> Box<BlockArray> {
    let mut blocks = Box::new([Block::AIR; CHUNK_VOLUME]);
    for (index, block) in blocks.iter_mut().enumerate() {
        *block = fill(LocalBlockCoord::from_index(index));
    }
    blocks
}

fn bench_mesh_solid(c: &mut Criterion) {
    c.bench_function("mesh_solid", |b| {
        let blocks = filled_chunk(|_| Block::new(BlockType::STONE));
        let mut arena = ArenaAllocator::new(64 * 1024, 1024 * 1024);
        let mut mesher = ChunkMesher::new();
        b.iter(|| {
            mesher.build(ChunkCoord::default(), black_box(&blocks), &Air, &arena);
            arena.clear();
            black_box(mesher.opaque_vertices().len())
        });
    });
}

fn bench_mesh_checkerboard(c: &mut Criterion) {
    c.bench_function("mesh_checkerboard", |b| {
        // Every block is exposed on every side, the worst case for culling and AO.
        let blocks = filled_chunk(|local| {
            if (local.x() + local.y() + local.z()) % 2 == 0 {
                Block::new(BlockType::DIRT)
            } else {
                Block::AIR
            }
        });
        let mut arena = ArenaAllocator::new(64 * 1024, 1024 * 1024);
        let mut mesher = ChunkMesher::new();
        b.iter(|| {
            mesher.build(ChunkCoord::default(), black_box(&blocks), &Air, &arena);
            arena.clear();
            black_box(mesher.opaque_vertices().len())
        });
    });
}

fn bench_mesh_terrain(c: &mut Criterion) {
    c.bench_function("mesh_terrain", |b| {
        let mut generator = HeightmapGenerator::new(1);
        let coord = ChunkCoord::new(0, 1, 0);
        let mut blocks = Box::new([Block::AIR; CHUNK_VOLUME]);
        generator.generate_chunk(coord, &mut blocks);

        let mut arena = ArenaAllocator::new(64 * 1024, 1024 * 1024);
        let mut mesher = ChunkMesher::new();
        b.iter(|| {
            mesher.build(coord, black_box(&blocks), &Air, &arena);
            arena.clear();
            black_box(mesher.opaque_vertices().len() + mesher.transparent_vertices().len())
        });
    });
}

fn bench_stream_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_settle");
    group.sample_size(10);

    for distance in [1, 2, 3].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(distance), distance, |b, &distance| {
            b.iter(|| {
                let config = StreamingConfig {
                    load_distance: distance,
                    render_distance: distance,
                    max_chunk_loads_per_tick: 512,
                    max_chunk_remeshes_per_tick: 512,
                    ..StreamingConfig::default()
                };
                let mut world = World::new(config, HeightmapGenerator::new(7)).unwrap();
                world.update(black_box(Point3::new(0.0, 60.0, 0.0)));
                black_box(world.opaque_chunk_render_list().count())
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_mesh_solid,
    bench_mesh_checkerboard,
    bench_mesh_terrain,
    bench_stream_settle
);
criterion_main!(benches);
