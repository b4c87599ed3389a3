use cgmath::Point3;
use voxel_streaming::prelude::*;

fn config(load_distance: i32, render_distance: i32) -> StreamingConfig {
    StreamingConfig {
        load_distance,
        render_distance,
        ..StreamingConfig::default()
    }
}

fn stone_below(height: i32) -> FlatGenerator {
    FlatGenerator::new(height, Block::new(BlockType::STONE))
}

fn origin() -> Point3<f32> {
    Point3::new(0.5, 0.5, 0.5)
}

/// Center of chunk `(x, 0, 0)`.
fn in_chunk_x(x: i32) -> Point3<f32> {
    Point3::new((x * CHUNK_DIMENSION) as f32 + 16.0, 0.5, 0.5)
}

/// Ticks until a tick does no work at all.
fn settle<G: ChunkGenerator>(world: &mut World<G>, position: Point3<f32>) {
    for _ in 0..256 {
        if world.update(position) == StreamingStats::default() {
            return;
        }
    }
    panic!("world did not settle");
}

fn cube(radius: i32) -> impl Iterator<Item = ChunkCoord> {
    (-radius..=radius).flat_map(move |x| {
        (-radius..=radius)
            .flat_map(move |y| (-radius..=radius).map(move |z| ChunkCoord::new(x, y, z)))
    })
}

#[test]
fn test_load_queue_is_nearest_first() {
    let mut world = World::new(
        StreamingConfig {
            max_chunk_loads_per_tick: 1,
            ..config(1, 1)
        },
        stone_below(0),
    )
    .unwrap();

    let stats = world.update(origin());
    assert_eq!(stats.chunks_loaded, 1);
    assert!(world.is_loaded(ChunkCoord::new(0, 0, 0)));

    let pending = world.pending_loads();
    assert_eq!(pending.len(), 26);

    let norms: Vec<i32> = pending.iter().map(|coord| coord.norm_sq()).collect();
    assert!(norms[..6].iter().all(|&n| n == 1));
    assert!(norms[6..18].iter().all(|&n| n == 2));
    assert!(norms[18..].iter().all(|&n| n == 3));

    // Equidistant chunks keep y, z, x enumeration order.
    assert_eq!(
        &pending[..6],
        &[
            ChunkCoord::new(0, -1, 0),
            ChunkCoord::new(0, 0, -1),
            ChunkCoord::new(-1, 0, 0),
            ChunkCoord::new(1, 0, 0),
            ChunkCoord::new(0, 0, 1),
            ChunkCoord::new(0, 1, 0),
        ]
    );

    world.update(origin());
    assert!(world.is_loaded(ChunkCoord::new(0, -1, 0)));
    assert_eq!(world.pending_loads().len(), 25);

    for coord in cube(1) {
        let queued = world.pending_loads().contains(&coord);
        assert_ne!(queued, world.is_loaded(coord), "{coord:?} must be exactly one of queued or loaded");
    }
}

#[test]
fn test_loaded_chunks_match_their_coordinates() {
    let mut world = World::new(config(1, 1), stone_below(8)).unwrap();
    settle(&mut world, origin());

    assert_eq!(world.loaded_chunk_count(), 27);
    assert_eq!(world.allocator().live_chunks(), 27);
    assert_eq!(world.allocator().live_block_data(), 27);
    assert!(world.pending_loads().is_empty());

    for coord in cube(1) {
        let chunk = world.get_chunk(coord).expect("every chunk in the load cube is loaded");
        assert_eq!(chunk.coord(), coord);
    }
    assert!(world.get_chunk(ChunkCoord::new(2, 0, 0)).is_none());
}

#[test]
fn test_chunks_beyond_load_distance_are_evicted() {
    let mut world = World::new(config(1, 1), stone_below(8)).unwrap();
    settle(&mut world, origin());

    // One chunk over: the x = -1 slab leaves the cube, the x = 0 slab stays.
    let stats = world.update(in_chunk_x(1));
    assert_eq!(stats.chunks_evicted, 9);
    assert_eq!(stats.chunks_loaded, 9);
    assert!(!world.is_loaded(ChunkCoord::new(-1, 0, 0)));
    assert!(world.is_loaded(ChunkCoord::new(0, 1, 1)));
    assert!(world.is_loaded(ChunkCoord::new(2, -1, 0)));

    // Two more: only the x = 2 slab survives.
    let stats = world.update(in_chunk_x(3));
    assert_eq!(stats.chunks_evicted, 18);
    assert_eq!(stats.chunks_loaded, 18);
    assert_eq!(world.loaded_chunk_count(), 27);
    assert_eq!(world.allocator().live_chunks(), 27);
    assert!(world.allocator().live_chunks() <= world.allocator().max_chunks());

    for coord in cube(1) {
        let shifted = coord + ChunkCoord::new(3, 0, 0);
        assert!(world.is_loaded(shifted), "{shifted:?} should be loaded");
    }
    assert_eq!(world.player_chunk(), Some(ChunkCoord::new(3, 0, 0)));
    assert_eq!(world.total_stats().chunks_evicted, 27);
}

#[test]
fn test_block_edits_round_trip() {
    let mut world = World::new(config(1, 1), stone_below(4)).unwrap();
    settle(&mut world, origin());

    let coord = BlockCoord::new(-3, 20, 7);
    assert_eq!(world.get_block(coord), Block::AIR);

    assert!(world.place_block(Block::new(BlockType::LOG), coord));
    assert_eq!(world.get_block(coord), Block::new(BlockType::LOG));
    assert_eq!(world.chunk_state(coord.chunk()), ChunkState::Dirty);

    world.update(origin());
    assert_eq!(world.chunk_state(coord.chunk()), ChunkState::Meshed);

    assert!(world.break_block(BlockCoord::new(0, 3, 0)));
    assert_eq!(world.get_block(BlockCoord::new(0, 3, 0)), Block::AIR);
    assert_eq!(world.get_block(BlockCoord::new(0, 2, 0)), Block::new(BlockType::STONE));
}

#[test]
fn test_edits_in_unloaded_chunks_are_dropped() {
    let mut world = World::new(config(1, 1), stone_below(4)).unwrap();
    settle(&mut world, origin());

    let far = BlockCoord::new(1000, 0, 0);
    assert!(!world.place_block(Block::new(BlockType::STONE), far));
    assert_eq!(world.get_block(far), Block::AIR);
    assert_eq!(world.dropped_edit_count(), 1);
    assert_eq!(world.chunk_state(far.chunk()), ChunkState::Unloaded);
}

#[test]
fn test_edits_on_chunk_borders_dirty_the_neighbours() {
    let mut world = World::new(
        StreamingConfig {
            max_chunk_remeshes_per_tick: 64,
            ..config(1, 1)
        },
        stone_below(16),
    )
    .unwrap();
    settle(&mut world, origin());
    assert!(cube(1).all(|coord| world.chunk_state(coord) == ChunkState::Meshed));

    assert!(world.break_block(BlockCoord::new(0, 0, 0)));

    let dirty: Vec<ChunkCoord> = cube(1)
        .filter(|coord| world.chunk_state(*coord) == ChunkState::Dirty)
        .collect();
    let mut expected = vec![
        ChunkCoord::new(0, 0, 0),
        ChunkCoord::new(-1, 0, 0),
        ChunkCoord::new(0, -1, 0),
        ChunkCoord::new(0, 0, -1),
    ];
    expected.sort();
    assert_eq!(dirty, expected);

    settle(&mut world, origin());

    // Interior edits only touch the owning chunk.
    assert!(world.place_block(Block::new(BlockType::SAND), BlockCoord::new(5, 5, 5)));
    let dirty = cube(1)
        .filter(|coord| world.chunk_state(*coord) == ChunkState::Dirty)
        .count();
    assert_eq!(dirty, 1);

    // The far corner of a chunk touches its +x, +y and +z neighbours.
    settle(&mut world, origin());
    assert!(world.place_block(Block::new(BlockType::SAND), BlockCoord::new(31, 31, 31)));
    for coord in [
        ChunkCoord::new(0, 0, 0),
        ChunkCoord::new(1, 0, 0),
        ChunkCoord::new(0, 1, 0),
        ChunkCoord::new(0, 0, 1),
    ] {
        assert_eq!(world.chunk_state(coord), ChunkState::Dirty);
    }
}

#[test]
fn test_remeshing_is_capped_and_nearest_first() {
    let sparse_stone = |coord: BlockCoord| {
        if (coord.x + coord.y + coord.z).rem_euclid(7) == 0 {
            Block::new(BlockType::STONE)
        } else {
            Block::AIR
        }
    };
    let mut world = World::new(
        StreamingConfig {
            max_chunk_loads_per_tick: 200,
            max_chunk_remeshes_per_tick: 4,
            ..config(2, 2)
        },
        sparse_stone,
    )
    .unwrap();

    let stats = world.update(origin());
    assert_eq!(stats.chunks_loaded, 125);
    assert_eq!(stats.chunks_remeshed, 4);
    assert_eq!(stats.empty_chunks_skipped, 0);

    let meshed: Vec<ChunkCoord> = cube(2)
        .filter(|coord| world.chunk_state(*coord) == ChunkState::Meshed)
        .collect();
    assert_eq!(meshed.len(), 4);
    assert!(meshed.contains(&ChunkCoord::new(0, 0, 0)));
    assert!(meshed.iter().all(|coord| coord.norm_sq() <= 1));

    let mut ticks = 1;
    while cube(2).any(|coord| world.chunk_state(coord) == ChunkState::Dirty) {
        assert!(world.update(origin()).chunks_remeshed <= 4);
        ticks += 1;
    }
    assert_eq!(ticks, 32);
    assert_eq!(world.total_stats().chunks_remeshed, 125);
}

#[test]
fn test_settled_world_does_no_work() {
    let mut world = World::new(config(1, 1), stone_below(16)).unwrap();
    settle(&mut world, origin());

    let before = world.total_stats();
    for _ in 0..3 {
        assert_eq!(world.update(origin()), StreamingStats::default());
    }
    // Moving inside the same chunk is not a chunk change.
    assert_eq!(world.update(Point3::new(20.0, 30.0, 1.0)), StreamingStats::default());
    assert_eq!(world.total_stats(), before);
}

#[test]
fn test_render_lists_hold_visible_geometry_in_range() {
    let mut world = World::new(
        StreamingConfig {
            max_chunk_remeshes_per_tick: 200,
            ..config(2, 1)
        },
        stone_below(16),
    )
    .unwrap();
    settle(&mut world, origin());

    // Buried chunks have no visible faces, chunks above the surface are empty, so only the
    // surface layer inside the render distance has opaque geometry.
    let opaque: Vec<ChunkCoord> = world.opaque_chunk_render_list().map(|chunk| chunk.coord()).collect();
    assert_eq!(opaque.len(), 9);
    assert_eq!(opaque[0], ChunkCoord::new(0, 0, 0));
    assert!(opaque.iter().all(|coord| coord.y == 0 && coord.x.abs() <= 1 && coord.z.abs() <= 1));
    assert_eq!(world.transparent_chunk_render_list().count(), 0);

    let surface = world.get_chunk(ChunkCoord::new(0, 0, 0)).unwrap();
    assert_eq!(
        surface.mesh().num_opaque_vertices(),
        CHUNK_DIMENSION as usize * CHUNK_DIMENSION as usize * 6
    );
}

#[test]
fn test_water_chunks_join_the_transparent_list() {
    let lake = |coord: BlockCoord| match coord.y {
        y if y < 0 => Block::new(BlockType::STONE),
        0..=3 => Block::new(BlockType::WATER),
        _ => Block::AIR,
    };
    let mut world = World::new(config(1, 1), lake).unwrap();
    settle(&mut world, origin());

    let transparent: Vec<ChunkCoord> = world
        .transparent_chunk_render_list()
        .map(|chunk| chunk.coord())
        .collect();
    assert_eq!(transparent.len(), 9);
    assert!(transparent.iter().all(|coord| coord.y == 0));
}

#[test]
fn test_chunk_states_follow_the_lifecycle() {
    let mut world = World::new(
        StreamingConfig {
            max_chunk_loads_per_tick: 1,
            ..config(1, 1)
        },
        stone_below(4),
    )
    .unwrap();

    assert_eq!(world.chunk_state(ChunkCoord::new(0, 0, 0)), ChunkState::Unloaded);
    world.update(origin());

    assert_eq!(world.chunk_state(ChunkCoord::new(0, 0, 0)), ChunkState::Meshed);
    assert_eq!(world.chunk_state(ChunkCoord::new(1, 1, 1)), ChunkState::Queued);
    assert_eq!(world.chunk_state(ChunkCoord::new(5, 0, 0)), ChunkState::Unloaded);

    // Loading the chunk below makes the origin chunk stale again.
    world.update(origin());
    assert!(world.is_loaded(ChunkCoord::new(0, -1, 0)));
    assert_eq!(world.last_tick_stats().chunks_remeshed, 2);
}

#[test]
fn test_undersized_allocator_is_rejected() {
    let result = World::with_allocator(config(1, 1), ChunkAllocator::new(10), stone_below(0));
    assert!(matches!(
        result,
        Err(ConfigError::InsufficientChunkCapacity { capacity: 10, required: 27 })
    ));

    assert!(World::new(config(1, 2), stone_below(0)).is_err());
}

#[test]
fn test_smallest_accepted_frame_arena_survives_streaming() {
    let minimal = StreamingConfig {
        frame_arena_committed: 4096,
        frame_arena_reserved: config(1, 1).min_frame_arena_bytes(),
        ..config(1, 1)
    };
    let mut world = World::new(minimal.clone(), stone_below(8)).unwrap();

    settle(&mut world, origin());
    assert_eq!(world.loaded_chunk_count(), 27);
    for x in 1..=4 {
        settle(&mut world, in_chunk_x(x));
    }
    assert!(world.total_stats().chunks_evicted > 0);
    assert!(world.total_stats().chunks_remeshed > 0);

    let undersized = StreamingConfig {
        frame_arena_reserved: 8192,
        ..minimal
    };
    assert!(matches!(
        World::new(undersized, stone_below(8)),
        Err(ConfigError::InvalidArenaSize { reserved: 8192, .. })
    ));
}

#[test]
fn test_zero_load_budget_is_rejected() {
    let result = World::new(
        StreamingConfig {
            max_chunk_loads_per_tick: 0,
            ..config(1, 1)
        },
        stone_below(0),
    );
    assert!(matches!(result, Err(ConfigError::ZeroLoadBudget)));
}

#[test]
fn test_engine_ticks_follow_the_player() {
    let mut engine = EngineState::new(config(1, 1), stone_below(4)).unwrap();

    let report = engine.process_tick(&origin());
    assert_eq!(report.tick, 1);
    assert_eq!(report.player_chunk, ChunkCoord::new(0, 0, 0));
    assert_eq!(report.stats.chunks_loaded, 27);

    let report = engine.process_tick(&in_chunk_x(-1));
    assert_eq!(report.tick, 2);
    assert_eq!(report.player_chunk, ChunkCoord::new(-1, 0, 0));
    assert_eq!(report.stats.chunks_evicted, 9);
    assert_eq!(engine.ticks(), 2);
    assert_eq!(engine.world().player_chunk(), Some(ChunkCoord::new(-1, 0, 0)));
}

#[test]
fn test_raycast_picks_loaded_terrain() {
    let mut world = World::new(config(1, 1), stone_below(4)).unwrap();
    settle(&mut world, origin());

    let hit = world
        .raycast(Point3::new(2.5, 10.5, 2.5), cgmath::Vector3::new(0.0, -1.0, 0.0), 32.0)
        .expect("terrain is below the ray");
    assert_eq!(hit.block, BlockCoord::new(2, 3, 2));
    assert_eq!(hit.side, BlockSide::TOP);
    assert_eq!(hit.block_value, Block::new(BlockType::STONE));

    assert!(world.place_block(Block::new(BlockType::DIRT), hit.adjacent_block()));
    assert_eq!(world.get_block(BlockCoord::new(2, 4, 2)), Block::new(BlockType::DIRT));
}
