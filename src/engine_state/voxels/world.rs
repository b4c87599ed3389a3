//! # World Module
//!
//! This module provides the `World` struct, which streams chunks in and out around the
//! player and keeps their meshes in sync with the blocks they hold.
//!
//! ## Architecture
//!
//! The world exclusively owns every loaded chunk. Chunks live in a [`ChunkAllocator`]
//! and are found through a hash map from chunk coordinate to handle. Around that map the
//! world keeps three derived collections:
//! - the load queue: missing coordinates inside the load distance, nearest first, with a
//!   cursor marking how far loading has progressed
//! - the distance list: every loaded chunk, nearest first, which bounds remeshing to the
//!   closest dirty chunks
//! - the render lists: chunks inside the render distance that have opaque or transparent
//!   geometry
//!
//! ## Chunk Lifecycle
//!
//! ```text
//! Unloaded -> Queued -> Loaded -> (Dirty <-> Meshed) -> Evicted
//! ```
//!
//! A tick runs the steps below in order. The first three only run when the player has
//! crossed into a different chunk since the previous tick.
//! 1. rebuild the load queue around the player's chunk
//! 2. evict every chunk farther than the load distance (Chebyshev)
//! 3. resort the distance list
//! 4. load up to `max_chunk_loads_per_tick` chunks from the queue
//! 5. rebuild up to `max_chunk_remeshes_per_tick` dirty meshes, nearest first
//! 6. rebuild the render lists
//!
//! ## Performance Considerations
//!
//! - Block lookups are a hash lookup plus an array index
//! - Loading and remeshing are budgeted per tick to bound frame time; dirty chunks
//!   beyond the budget wait for a later tick
//! - Scratch memory for meshing and eviction comes from an arena that is rolled back
//!   after every use

use std::collections::HashMap;

use cgmath::{Point3, Vector3};
use web_time::Instant;

use crate::core::ArenaAllocator;
use crate::engine_state::config::{ConfigError, StreamingConfig};
use crate::engine_state::rendering::meshing::ChunkMesher;

use super::block::{block_side::BlockSide, Block};
use super::chunk::{ChunkAllocator, ChunkHandle, ChunkRef};
use super::coords::{BlockCoord, ChunkCoord};
use super::generation::ChunkGenerator;
use super::raycast::{raycast, RaycastHit};

/// Read access to blocks by world coordinate.
pub trait BlockSource {
    /// The block at `coord`, or air if its chunk is not loaded.
    fn block_at(&self, coord: BlockCoord) -> Block;
}

/// Where a chunk coordinate currently is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChunkState {
    /// Neither loaded nor waiting to load
    Unloaded,
    /// Waiting in the load queue
    Queued,
    /// Loaded with a stale mesh
    Dirty,
    /// Loaded with an up-to-date mesh
    Meshed,
}

/// Work done by the streaming loop.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Chunks generated and inserted
    pub chunks_loaded: usize,
    /// Chunks evicted for being out of range
    pub chunks_evicted: usize,
    /// Meshes rebuilt
    pub chunks_remeshed: usize,
    /// Dirty all-air chunks whose mesh was cleared without meshing
    pub empty_chunks_skipped: usize,
}

impl StreamingStats {
    fn accumulate(&mut self, other: &StreamingStats) {
        self.chunks_loaded += other.chunks_loaded;
        self.chunks_evicted += other.chunks_evicted;
        self.chunks_remeshed += other.chunks_remeshed;
        self.empty_chunks_skipped += other.empty_chunks_skipped;
    }
}

/// Block lookups over the loaded chunks, borrowing only the map and the allocator so
/// the mesher can run while the rest of the world is mutably borrowed.
struct LoadedChunks<'a> {
    chunks: &'a HashMap<ChunkCoord, ChunkHandle>,
    allocator: &'a ChunkAllocator,
}

impl BlockSource for LoadedChunks<'_> {
    fn block_at(&self, coord: BlockCoord) -> Block {
        self.chunks
            .get(&coord.chunk())
            .and_then(|handle| self.allocator.chunk_and_blocks(*handle))
            .map_or(Block::AIR, |(_, blocks)| blocks[coord.local().to_index()])
    }
}

/// A streamed voxel world.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_streaming::prelude::*;
///
/// let config = StreamingConfig {
///     load_distance: 1,
///     render_distance: 1,
///     ..StreamingConfig::default()
/// };
/// let mut world = World::new(config, FlatGenerator::new(0, Block::new(BlockType::STONE))).unwrap();
/// world.update(Point3::new(0.0, 0.0, 0.0));
///
/// assert_eq!(world.loaded_chunk_count(), 27);
/// assert!(world.place_block(Block::new(BlockType::LOG), BlockCoord::new(3, 0, 3)));
/// assert_eq!(world.get_block(BlockCoord::new(3, 0, 3)), Block::new(BlockType::LOG));
/// ```
pub struct World<G: ChunkGenerator> {
    config: StreamingConfig,
    allocator: ChunkAllocator,
    chunks: HashMap<ChunkCoord, ChunkHandle>,
    load_queue: Vec<ChunkCoord>,
    load_cursor: usize,
    chunks_by_distance: Vec<ChunkHandle>,
    opaque_render_list: Vec<ChunkHandle>,
    transparent_render_list: Vec<ChunkHandle>,
    player_chunk: Option<ChunkCoord>,
    mesher: ChunkMesher,
    frame_arena: ArenaAllocator,
    generator: G,
    last_tick: StreamingStats,
    totals: StreamingStats,
    dropped_edits: usize,
}

impl<G: ChunkGenerator> World<G> {
    /// Creates an empty world with a chunk allocator sized from `config`.
    ///
    /// # Arguments
    /// * `config` - Streaming parameters, validated here
    /// * `generator` - Source of block data for newly loaded chunks
    pub fn new(config: StreamingConfig, generator: G) -> Result<Self, ConfigError> {
        config.validate()?;
        let allocator = ChunkAllocator::new(config.chunk_capacity());
        Self::with_allocator(config, allocator, generator)
    }

    /// Creates an empty world that stores its chunks in `allocator`.
    ///
    /// The allocator must be empty and able to hold every chunk inside the load
    /// distance.
    pub fn with_allocator(
        config: StreamingConfig,
        allocator: ChunkAllocator,
        generator: G,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = allocator.max_chunks().min(allocator.max_block_data());
        if capacity < config.chunks_in_load_cube() {
            return Err(ConfigError::InsufficientChunkCapacity {
                capacity,
                required: config.chunks_in_load_cube(),
            });
        }

        log::info!(
            "Creating world: load distance {}, render distance {}, {} chunk slots",
            config.load_distance,
            config.render_distance,
            capacity
        );

        let frame_arena =
            ArenaAllocator::new(config.frame_arena_committed, config.frame_arena_reserved);

        Ok(World {
            config,
            allocator,
            chunks: HashMap::new(),
            load_queue: Vec::new(),
            load_cursor: 0,
            chunks_by_distance: Vec::new(),
            opaque_render_list: Vec::new(),
            transparent_render_list: Vec::new(),
            player_chunk: None,
            mesher: ChunkMesher::new(),
            frame_arena,
            generator,
            last_tick: StreamingStats::default(),
            totals: StreamingStats::default(),
            dropped_edits: 0,
        })
    }

    /// Runs one streaming tick for a player standing at `player_position`.
    ///
    /// # Returns
    /// The work done during this tick.
    pub fn update(&mut self, player_position: Point3<f32>) -> StreamingStats {
        let player_chunk = ChunkCoord::from_world_position(player_position);
        self.last_tick = StreamingStats::default();

        if self.player_chunk != Some(player_chunk) {
            log::debug!(
                "Player entered chunk ({}, {}, {})",
                player_chunk.x,
                player_chunk.y,
                player_chunk.z
            );
            self.player_chunk = Some(player_chunk);
            self.rebuild_load_queue(player_chunk);
            self.unload_chunks(player_chunk);
            self.sort_chunks_by_distance(player_chunk);
        }

        if self.load_chunks() > 0 {
            self.sort_chunks_by_distance(player_chunk);
        }
        self.update_chunk_meshes();
        self.update_render_lists(player_chunk);

        self.totals.accumulate(&self.last_tick);
        self.last_tick
    }

    fn rebuild_load_queue(&mut self, player_chunk: ChunkCoord) {
        self.load_queue.clear();
        self.load_cursor = 0;

        let distance = self.config.load_distance;
        for y in -distance..=distance {
            for z in -distance..=distance {
                for x in -distance..=distance {
                    let coord = player_chunk + ChunkCoord::new(x, y, z);
                    if !self.chunks.contains_key(&coord) {
                        self.load_queue.push(coord);
                    }
                }
            }
        }

        // Stable, so equidistant chunks keep their enumeration order.
        self.load_queue
            .sort_by_key(|coord| coord.distance_sq(player_chunk));

        log::debug!("Load queue rebuilt with {} chunks", self.load_queue.len());
    }

    fn unload_chunks(&mut self, player_chunk: ChunkCoord) {
        let distance = self.config.load_distance;
        let out_of_range = |coord: &&ChunkCoord| coord.chebyshev_distance(player_chunk) > distance;

        let count = self.chunks.keys().filter(out_of_range).count();
        if count == 0 {
            return;
        }

        let marker = self.frame_arena.marker();
        let evicted = self.frame_arena.alloc_slice::<ChunkCoord>(count);
        for (slot, coord) in evicted.iter_mut().zip(self.chunks.keys().filter(out_of_range)) {
            *slot = *coord;
        }

        for coord in evicted.iter() {
            if let Some(handle) = self.chunks.remove(coord) {
                log::trace!("Evicting chunk ({}, {}, {})", coord.x, coord.y, coord.z);
                self.allocator.destroy_chunk(handle);
            }
        }
        self.frame_arena.restore_marker(marker);

        self.last_tick.chunks_evicted += count;
    }

    fn sort_chunks_by_distance(&mut self, player_chunk: ChunkCoord) {
        let allocator = &self.allocator;
        self.chunks_by_distance
            .retain(|handle| allocator.chunk(*handle).is_some());
        self.chunks_by_distance.sort_unstable_by_key(|handle| {
            allocator
                .chunk(*handle)
                .map(|chunk| (chunk.coord().distance_sq(player_chunk), chunk.coord()))
        });
    }

    /// Loads chunks from the front of the queue. Returns how many were loaded.
    fn load_chunks(&mut self) -> usize {
        let mut loaded = 0;

        while loaded < self.config.max_chunk_loads_per_tick
            && self.load_cursor < self.load_queue.len()
        {
            let coord = self.load_queue[self.load_cursor];
            self.load_cursor += 1;
            if self.chunks.contains_key(&coord) {
                continue;
            }

            // New terrain can expose or hide faces along the shared borders.
            for side in BlockSide::all() {
                self.trigger_rebuild(coord.neighbor(side));
            }

            let handle = self.allocator.create_chunk(coord);
            if let Some((chunk, blocks)) = self.allocator.chunk_and_blocks_mut(handle) {
                self.generator.generate_chunk(coord, blocks);
                chunk.update_occupancy(blocks);
            }
            log::trace!("Loaded chunk ({}, {}, {})", coord.x, coord.y, coord.z);

            self.chunks.insert(coord, handle);
            self.chunks_by_distance.push(handle);
            loaded += 1;
        }

        self.last_tick.chunks_loaded += loaded;
        loaded
    }

    fn update_chunk_meshes(&mut self) {
        let budget = self.config.max_chunk_remeshes_per_tick;
        let mut remeshed = 0;

        for &handle in &self.chunks_by_distance {
            let Some(chunk) = self.allocator.chunk(handle) else {
                continue;
            };
            if !chunk.needs_rebuild() {
                continue;
            }

            if !chunk.potentially_has_blocks() {
                if let Some(chunk) = self.allocator.chunk_mut(handle) {
                    chunk.mesh.clear();
                    chunk.finish_rebuild();
                }
                self.last_tick.empty_chunks_skipped += 1;
                continue;
            }

            if remeshed == budget {
                break;
            }

            let start = Instant::now();
            let marker = self.frame_arena.marker();
            if let Some((chunk, blocks)) = self.allocator.chunk_and_blocks(handle) {
                let world = LoadedChunks {
                    chunks: &self.chunks,
                    allocator: &self.allocator,
                };
                self.mesher
                    .build(chunk.coord(), blocks, &world, &self.frame_arena);
            }
            self.frame_arena.restore_marker(marker);

            if let Some(chunk) = self.allocator.chunk_mut(handle) {
                self.mesher.upload(&mut chunk.mesh);
                chunk.finish_rebuild();
                log::trace!(
                    "Remeshed chunk ({}, {}, {}): {} opaque, {} transparent vertices in {:?}",
                    chunk.coord().x,
                    chunk.coord().y,
                    chunk.coord().z,
                    chunk.mesh().num_opaque_vertices(),
                    chunk.mesh().num_transparent_vertices(),
                    start.elapsed()
                );
            }
            remeshed += 1;
        }

        self.last_tick.chunks_remeshed += remeshed;
    }

    fn update_render_lists(&mut self, player_chunk: ChunkCoord) {
        self.opaque_render_list.clear();
        self.transparent_render_list.clear();

        for &handle in &self.chunks_by_distance {
            let Some(chunk) = self.allocator.chunk(handle) else {
                continue;
            };
            if chunk.coord().chebyshev_distance(player_chunk) > self.config.render_distance {
                continue;
            }
            if chunk.mesh().num_opaque_vertices() > 0 {
                self.opaque_render_list.push(handle);
            }
            if chunk.mesh().num_transparent_vertices() > 0 {
                self.transparent_render_list.push(handle);
            }
        }
    }

    fn trigger_rebuild(&mut self, coord: ChunkCoord) {
        if let Some(chunk) = self
            .chunks
            .get(&coord)
            .and_then(|handle| self.allocator.chunk_mut(*handle))
        {
            chunk.trigger_rebuild();
        }
    }

    fn view(&self) -> LoadedChunks<'_> {
        LoadedChunks {
            chunks: &self.chunks,
            allocator: &self.allocator,
        }
    }

    /// The block at `coord`, or air if its chunk is not loaded.
    pub fn get_block(&self, coord: BlockCoord) -> Block {
        self.view().block_at(coord)
    }

    /// Writes `block` at `coord`.
    ///
    /// Marks the owning chunk dirty, plus every loaded neighbour sharing a chunk face
    /// the block touches.
    ///
    /// # Returns
    /// `false`, leaving the world untouched, if the owning chunk is not loaded.
    pub fn place_block(&mut self, block: Block, coord: BlockCoord) -> bool {
        let chunk_coord = coord.chunk();
        let local = coord.local();

        let edited = self
            .chunks
            .get(&chunk_coord)
            .and_then(|handle| self.allocator.chunk_and_blocks_mut(*handle))
            .map(|(chunk, blocks)| chunk.set_block(blocks, local, block))
            .is_some();
        if !edited {
            log::warn!(
                "Dropped edit at ({}, {}, {}): chunk not loaded",
                coord.x,
                coord.y,
                coord.z
            );
            self.dropped_edits += 1;
            return false;
        }

        for side in local.boundary_sides() {
            self.trigger_rebuild(chunk_coord.neighbor(side));
        }
        true
    }

    /// Replaces the block at `coord` with air. See [`World::place_block`].
    pub fn break_block(&mut self, coord: BlockCoord) -> bool {
        self.place_block(Block::AIR, coord)
    }

    /// The loaded chunk at `coord`.
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<ChunkRef<'_>> {
        let handle = self.chunks.get(&coord)?;
        let (chunk, blocks) = self.allocator.chunk_and_blocks(*handle)?;
        Some(ChunkRef::new(chunk, blocks))
    }

    /// Lifecycle state of `coord`.
    pub fn chunk_state(&self, coord: ChunkCoord) -> ChunkState {
        match self.get_chunk(coord) {
            Some(chunk) if chunk.needs_rebuild() => ChunkState::Dirty,
            Some(_) => ChunkState::Meshed,
            None if self.pending_loads().contains(&coord) => ChunkState::Queued,
            None => ChunkState::Unloaded,
        }
    }

    fn resolve<'a>(&'a self, handles: &'a [ChunkHandle]) -> impl Iterator<Item = ChunkRef<'a>> + 'a {
        handles.iter().filter_map(move |handle| {
            self.allocator
                .chunk_and_blocks(*handle)
                .map(|(chunk, blocks)| ChunkRef::new(chunk, blocks))
        })
    }

    /// Chunks with opaque geometry inside the render distance, nearest first.
    pub fn opaque_chunk_render_list(&self) -> impl Iterator<Item = ChunkRef<'_>> + '_ {
        self.resolve(&self.opaque_render_list)
    }

    /// Chunks with transparent geometry inside the render distance, nearest first.
    pub fn transparent_chunk_render_list(&self) -> impl Iterator<Item = ChunkRef<'_>> + '_ {
        self.resolve(&self.transparent_render_list)
    }

    /// Loaded chunks, nearest first.
    pub fn chunks_by_distance(&self) -> impl Iterator<Item = ChunkRef<'_>> + '_ {
        self.resolve(&self.chunks_by_distance)
    }

    /// Coordinates still waiting to be loaded, in load order.
    pub fn pending_loads(&self) -> &[ChunkCoord] {
        &self.load_queue[self.load_cursor..]
    }

    /// Casts a ray through the loaded world. See [`raycast`].
    pub fn raycast(
        &self,
        origin: Point3<f32>,
        direction: Vector3<f32>,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        raycast(&self.view(), origin, direction, max_distance)
    }

    /// Number of loaded chunks.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the chunk at `coord` is loaded.
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// The chunk the player stood in on the last tick.
    pub fn player_chunk(&self) -> Option<ChunkCoord> {
        self.player_chunk
    }

    /// The streaming parameters.
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The storage backing the loaded chunks.
    pub fn allocator(&self) -> &ChunkAllocator {
        &self.allocator
    }

    /// The terrain source.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Work done by the most recent tick.
    pub fn last_tick_stats(&self) -> StreamingStats {
        self.last_tick
    }

    /// Work done since the world was created.
    pub fn total_stats(&self) -> StreamingStats {
        self.totals
    }

    /// Number of edits dropped because their chunk was not loaded.
    pub fn dropped_edit_count(&self) -> usize {
        self.dropped_edits
    }
}

impl<G: ChunkGenerator> BlockSource for World<G> {
    fn block_at(&self, coord: BlockCoord) -> Block {
        self.get_block(coord)
    }
}
