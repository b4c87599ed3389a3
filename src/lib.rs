#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Streaming
//!
//! A voxel chunk streaming and meshing engine.
//!
//! This crate keeps a cube of 32³-block chunks loaded around a moving player, generates
//! terrain for chunks as they come into range, evicts them as they leave it, and turns
//! their blocks into packed vertex meshes with face culling and baked ambient occlusion.
//!
//! ## Key Modules
//!
//! * `core` - Memory primitives: object pool, bump arena and LRU cache
//! * `engine_state` - The world, its chunks, the mesher and the tick driver
//!
//! ## Architecture
//!
//! The engine separates:
//! * Storage (chunk headers and block arrays in fixed-capacity pools)
//! * Streaming policy (load queue, eviction, remesh budget, render lists)
//! * Meshing (culling and ambient occlusion into 64-bit vertices)
//! * Terrain generation (pluggable through `ChunkGenerator`)
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_streaming::prelude::*;
//!
//! let config = StreamingConfig {
//!     load_distance: 2,
//!     render_distance: 2,
//!     ..StreamingConfig::default()
//! };
//! let mut world = World::new(config, HeightmapGenerator::new(42)).unwrap();
//!
//! for _ in 0..4 {
//!     world.update(Point3::new(0.0, 64.0, 0.0));
//! }
//! for chunk in world.opaque_chunk_render_list() {
//!     let _bytes = chunk.mesh().opaque().as_bytes();
//! }
//! ```
//!
//! ## Performance Considerations
//!
//! * Chunk memory is reserved up front from the load distance
//! * Loading and remeshing are budgeted per tick
//! * Meshing reuses scratch buffers and a rolled-back arena

use cgmath::{Point3, Vector3};
use log::info;

pub mod core;
pub mod engine_state;

use engine_state::{
    config::EngineConfig,
    voxels::generation::HeightmapGenerator,
    EngineState,
};

/// Environment variable naming the JSON configuration file read by [`run`].
pub const CONFIG_ENV_VAR: &str = "VOXEL_STREAMING_CONFIG";

/// Every tick divisible by this, the simulated player edits a block.
const EDIT_INTERVAL: u32 = 8;
/// How far down the simulated player can reach.
const REACH: f32 = 96.0;

/// Commonly used types.
pub mod prelude {
    pub use crate::core::{ArenaAllocator, LruCache, PoolAllocator, PoolHandle};
    pub use crate::engine_state::{
        config::{ConfigError, EngineConfig, StreamingConfig},
        rendering::{ChunkMesh, ChunkMesher, ChunkVertex},
        voxels::{
            block::{block_side::BlockSide, block_type::BlockType, Block},
            chunk::{Chunk, ChunkAllocator, ChunkRef, BlockArray, CHUNK_DIMENSION, CHUNK_VOLUME},
            coords::{BlockCoord, ChunkCoord, LocalBlockCoord},
            generation::{ChunkGenerator, FlatGenerator, HeightmapGenerator},
            raycast::RaycastHit,
            world::{BlockSource, ChunkState, StreamingStats, World},
        },
        EngineState, PlayerPositionProvider, TickReport,
    };
}

fn load_config() -> EngineConfig {
    let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
        info!("{} not set, using the default configuration", CONFIG_ENV_VAR);
        return EngineConfig::default();
    };

    match EngineConfig::load(&path) {
        Ok(config) => {
            info!("Loaded configuration from {}", path);
            config
        }
        Err(err) => {
            log::error!("Failed to load configuration from {}: {}", path, err);
            log::warn!("Falling back to the default configuration");
            EngineConfig::default()
        }
    }
}

/// Runs the headless driver: a simulated player walks across generated terrain,
/// digging and building as it goes, while the world streams around it.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = load_config();
    let place_block = match config.place_block() {
        Ok(block) => block,
        Err(err) => {
            log::error!("{}", err);
            return;
        }
    };

    let generator = HeightmapGenerator::new(config.seed);
    let spawn_height = generator.surface_height(0, 0) as f32 + 2.0;
    let mut engine = match EngineState::new(config.streaming.clone(), generator) {
        Ok(engine) => engine,
        Err(err) => {
            log::error!("Invalid streaming configuration: {}", err);
            return;
        }
    };

    let mut position = Point3::new(0.5, spawn_height, 0.5);
    let mut slowest_tick = web_time::Duration::ZERO;
    let mut edits = 0usize;

    for tick in 1..=config.ticks {
        let report = engine.process_tick(&position);
        slowest_tick = slowest_tick.max(report.duration);

        if tick % EDIT_INTERVAL == 0 {
            let world = engine.world_mut();
            if let Some(hit) = world.raycast(position, Vector3::new(0.0, -1.0, 0.0), REACH) {
                let edited = if fastrand::bool() {
                    world.break_block(hit.block)
                } else {
                    world.place_block(place_block, hit.adjacent_block())
                };
                if edited {
                    edits += 1;
                    log::debug!(
                        "Edited ({}, {}, {}) hit on its {:?} face",
                        hit.block.x,
                        hit.block.y,
                        hit.block.z,
                        hit.side
                    );
                }
            }
        }

        position.x += config.player_speed;
        position.z += fastrand::f32() - 0.5;
    }

    let world = engine.world();
    let totals = world.total_stats();
    info!(
        "Ran {} ticks: {} chunks loaded, {} evicted, {} remeshed, {} empty skipped",
        engine.ticks(),
        totals.chunks_loaded,
        totals.chunks_evicted,
        totals.chunks_remeshed,
        totals.empty_chunks_skipped
    );
    info!(
        "{} chunks resident, {} opaque and {} transparent in the render lists, {} edits ({} dropped)",
        world.loaded_chunk_count(),
        world.opaque_chunk_render_list().count(),
        world.transparent_chunk_render_list().count(),
        edits,
        world.dropped_edit_count()
    );
    info!("Slowest tick took {:?}", slowest_tick);
}
