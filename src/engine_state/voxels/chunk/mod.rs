//! # Chunk Module
//!
//! This module provides the `Chunk` header and related functionality for managing
//! 32x32x32 blocks of voxel data.
//!
//! ## Storage
//!
//! A chunk is split in two parts that live in separate pools of the
//! [`ChunkAllocator`]:
//! - the header (`Chunk`): coordinate, mesh and bookkeeping flags
//! - the block array (`BlockArray`): `CHUNK_VOLUME` blocks, densely packed and indexed
//!   by [`LocalBlockCoord::to_index`]
//!
//! The header refers to its array through a generation-checked handle, so the two can
//! be recycled independently while block arrays stay contiguous.
//!
//! ### Performance Characteristics
//! - **Block Lookup**: O(1), a single array index
//! - **Memory Usage**: one byte per block plus a small header
//! - **Empty Chunks**: `potentially_has_blocks` lets all-air chunks skip meshing

use super::block::Block;
use super::coords::{ChunkCoord, LocalBlockCoord};
use crate::engine_state::rendering::meshing::ChunkMesh;

pub use chunk_allocator::{BlockDataHandle, ChunkAllocator, ChunkHandle};
pub use chunk_iteration::ChunkBlockIterator;

pub mod chunk_allocator;
pub mod chunk_iteration;

/// log2 of the chunk dimension.
pub const CHUNK_BITS: u32 = 5;
/// The dimension (width, height, depth) of a chunk in blocks.
pub const CHUNK_DIMENSION: i32 = 1 << CHUNK_BITS;
/// Mask extracting a local coordinate from a world coordinate.
pub const CHUNK_MASK: i32 = CHUNK_DIMENSION - 1;
/// The number of blocks in a single 2D plane of a chunk (CHUNK_DIMENSION²).
pub const CHUNK_PLANE_SIZE: usize = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;
/// The total number of blocks in a chunk (CHUNK_DIMENSION³).
pub const CHUNK_VOLUME: usize = CHUNK_PLANE_SIZE * CHUNK_DIMENSION as usize;
/// The dimension of a chunk including an extra layer of blocks on each side for neighbor lookups.
pub const CHUNK_DIMENSION_WRAPPED: usize = CHUNK_DIMENSION as usize + 2;
/// The number of blocks in a wrapped 2D chunk plane.
pub const CHUNK_PLANE_SIZE_WRAPPED: usize = CHUNK_DIMENSION_WRAPPED * CHUNK_DIMENSION_WRAPPED;
/// The total number of blocks in a wrapped chunk.
pub const CHUNK_SIZE_WRAPPED: usize = CHUNK_PLANE_SIZE_WRAPPED * CHUNK_DIMENSION_WRAPPED;

/// Block storage of one chunk.
pub type BlockArray = [Block; CHUNK_VOLUME];

/// Header of a loaded chunk.
///
/// Chunks are the unit of loading, meshing and eviction. The header owns the chunk's
/// mesh and tracks whether that mesh is stale relative to the block data.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    block_data: BlockDataHandle,
    pub(crate) mesh: ChunkMesh,
    needs_rebuild: bool,
    potentially_has_blocks: bool,
}

impl Chunk {
    /// Creates a header for freshly generated block data.
    ///
    /// New chunks start dirty so their first mesh is built on the next rebuild step.
    ///
    /// # Arguments
    /// * `coord` - The chunk coordinates of the new chunk
    /// * `block_data` - Handle to the chunk's block array
    pub fn new(coord: ChunkCoord, block_data: BlockDataHandle) -> Self {
        Chunk {
            coord,
            block_data,
            mesh: ChunkMesh::default(),
            needs_rebuild: true,
            potentially_has_blocks: true,
        }
    }

    /// Position of this chunk in chunk space.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Handle to this chunk's block array.
    pub fn block_data(&self) -> BlockDataHandle {
        self.block_data
    }

    /// The most recently built mesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Whether the mesh is stale.
    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Whether the chunk may contain non-air blocks. `false` guarantees an empty chunk.
    pub fn potentially_has_blocks(&self) -> bool {
        self.potentially_has_blocks
    }

    /// Marks the mesh stale.
    pub fn trigger_rebuild(&mut self) {
        self.needs_rebuild = true;
    }

    pub(crate) fn finish_rebuild(&mut self) {
        self.needs_rebuild = false;
    }

    /// Recomputes `potentially_has_blocks` from the full block array.
    pub fn update_occupancy(&mut self, blocks: &BlockArray) {
        self.potentially_has_blocks = blocks.iter().any(|block| !block.is_air());
    }

    /// Writes `block` at `local` and marks the mesh stale.
    ///
    /// # Arguments
    /// * `blocks` - This chunk's block array
    /// * `local` - Position of the block inside the chunk
    /// * `block` - The new block
    pub fn set_block(&mut self, blocks: &mut BlockArray, local: LocalBlockCoord, block: Block) {
        blocks[local.to_index()] = block;
        if !block.is_air() {
            self.potentially_has_blocks = true;
        }
        self.needs_rebuild = true;
    }
}

/// Read-only view pairing a chunk header with its block array.
#[derive(Copy, Clone)]
pub struct ChunkRef<'a> {
    chunk: &'a Chunk,
    blocks: &'a BlockArray,
}

impl<'a> ChunkRef<'a> {
    pub(crate) fn new(chunk: &'a Chunk, blocks: &'a BlockArray) -> Self {
        ChunkRef { chunk, blocks }
    }

    /// The chunk header.
    pub fn chunk(&self) -> &'a Chunk {
        self.chunk
    }

    /// Position of the chunk in chunk space.
    pub fn coord(&self) -> ChunkCoord {
        self.chunk.coord()
    }

    /// The block at `local`.
    pub fn block(&self, local: LocalBlockCoord) -> Block {
        self.blocks[local.to_index()]
    }

    /// The whole block array.
    pub fn blocks(&self) -> &'a BlockArray {
        self.blocks
    }

    /// The chunk's current mesh.
    pub fn mesh(&self) -> &'a ChunkMesh {
        self.chunk.mesh()
    }

    /// Whether the mesh is stale.
    pub fn needs_rebuild(&self) -> bool {
        self.chunk.needs_rebuild()
    }

    /// Iterates over the chunk's non-air blocks.
    pub fn iter_blocks(&self) -> ChunkBlockIterator<'a> {
        ChunkBlockIterator::new(self.blocks)
    }
}

impl std::fmt::Debug for ChunkRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkRef")
            .field("coord", &self.coord())
            .field("needs_rebuild", &self.needs_rebuild())
            .finish()
    }
}
