//! # Chunk Allocator Module
//!
//! Two [`PoolAllocator`]s sized to the loaded working set: one for chunk headers, one
//! for block arrays.
//!
//! ## Architecture
//!
//! Headers and block arrays are allocated and freed independently so each pool can be
//! recycled on its own schedule. [`ChunkAllocator::create_chunk`] and
//! [`ChunkAllocator::destroy_chunk`] wrap the common pairing of the two.
//!
//! The allocator is an ordinary value owned by the world that uses it. Running out of
//! slots means the capacity derived from the load distance was wrong, so exhaustion is
//! fatal rather than an error the caller could recover from.

use super::{BlockArray, Chunk, CHUNK_DIMENSION, CHUNK_VOLUME};
use crate::core::{PoolAllocator, PoolHandle};
use crate::engine_state::voxels::block::Block;
use crate::engine_state::voxels::coords::ChunkCoord;

/// Handle to a chunk header.
pub type ChunkHandle = PoolHandle<Chunk>;
/// Handle to a chunk's block array.
pub type BlockDataHandle = PoolHandle<BlockArray>;

/// Fixed-capacity storage for chunk headers and block arrays.
#[derive(Debug)]
pub struct ChunkAllocator {
    chunks: PoolAllocator<Chunk>,
    block_data: PoolAllocator<BlockArray>,
}

impl ChunkAllocator {
    /// Creates pools holding up to `max_chunks` headers and as many block arrays.
    pub fn new(max_chunks: usize) -> Self {
        log::info!(
            "Chunk allocator: {} chunks, {} KiB of block data per chunk",
            max_chunks,
            CHUNK_VOLUME * std::mem::size_of::<Block>() / 1024
        );

        ChunkAllocator {
            chunks: PoolAllocator::new(max_chunks),
            block_data: PoolAllocator::new(max_chunks),
        }
    }

    /// Capacity bound for a given load distance: `(load_distance + 1)³ × CHUNK_DIMENSION`.
    ///
    /// This always covers the `(2 × load_distance + 1)³` cube of loaded chunks.
    ///
    /// # Returns
    /// `None` if the load distance is negative or the bound overflows `usize`.
    pub fn capacity_for_load_distance(load_distance: i32) -> Option<usize> {
        let side = usize::try_from(load_distance).ok()?.checked_add(1)?;
        side.checked_mul(side)?.checked_mul(side)?.checked_mul(CHUNK_DIMENSION as usize)
    }

    /// Allocates an all-air block array.
    ///
    /// # Panics
    /// Panics if every block array slot is in use.
    pub fn alloc_block_data(&mut self) -> BlockDataHandle {
        match self.block_data.alloc([Block::AIR; CHUNK_VOLUME]) {
            Some(handle) => handle,
            None => {
                log::error!(
                    "Block data pool exhausted at {} arrays",
                    self.block_data.capacity()
                );
                panic!("block data pool exhausted");
            }
        }
    }

    /// Returns a block array to its pool.
    pub fn free_block_data(&mut self, handle: BlockDataHandle) {
        self.block_data.dealloc(handle);
    }

    /// Stores a chunk header.
    ///
    /// # Panics
    /// Panics if every header slot is in use.
    pub fn alloc_chunk(&mut self, chunk: Chunk) -> ChunkHandle {
        match self.chunks.alloc(chunk) {
            Some(handle) => handle,
            None => {
                log::error!("Chunk pool exhausted at {} chunks", self.chunks.capacity());
                panic!("chunk pool exhausted");
            }
        }
    }

    /// Removes a chunk header and returns it. The block array it refers to stays
    /// allocated.
    pub fn free_chunk(&mut self, handle: ChunkHandle) -> Chunk {
        self.chunks.dealloc(handle)
    }

    /// Allocates a header and an all-air block array for `coord`.
    pub fn create_chunk(&mut self, coord: ChunkCoord) -> ChunkHandle {
        let block_data = self.alloc_block_data();
        self.alloc_chunk(Chunk::new(coord, block_data))
    }

    /// Frees a header together with its block array.
    pub fn destroy_chunk(&mut self, handle: ChunkHandle) {
        let chunk = self.free_chunk(handle);
        self.free_block_data(chunk.block_data());
    }

    /// Borrows a chunk header.
    pub fn chunk(&self, handle: ChunkHandle) -> Option<&Chunk> {
        self.chunks.get(handle)
    }

    /// Mutably borrows a chunk header.
    pub fn chunk_mut(&mut self, handle: ChunkHandle) -> Option<&mut Chunk> {
        self.chunks.get_mut(handle)
    }

    /// Borrows a block array.
    pub fn blocks(&self, handle: BlockDataHandle) -> Option<&BlockArray> {
        self.block_data.get(handle)
    }

    /// Mutably borrows a block array.
    pub fn blocks_mut(&mut self, handle: BlockDataHandle) -> Option<&mut BlockArray> {
        self.block_data.get_mut(handle)
    }

    /// Borrows a chunk header together with its block array.
    pub fn chunk_and_blocks(&self, handle: ChunkHandle) -> Option<(&Chunk, &BlockArray)> {
        let chunk = self.chunks.get(handle)?;
        let blocks = self.block_data.get(chunk.block_data())?;
        Some((chunk, blocks))
    }

    /// Mutably borrows a chunk header together with its block array.
    pub fn chunk_and_blocks_mut(
        &mut self,
        handle: ChunkHandle,
    ) -> Option<(&mut Chunk, &mut BlockArray)> {
        let chunk = self.chunks.get_mut(handle)?;
        let blocks = self.block_data.get_mut(chunk.block_data())?;
        Some((chunk, blocks))
    }

    /// Frees every header and block array. All outstanding handles become stale.
    pub fn reset(&mut self) {
        self.chunks.reset();
        self.block_data.reset();
    }

    /// Number of live chunk headers.
    pub fn live_chunks(&self) -> usize {
        self.chunks.live_count()
    }

    /// Number of live block arrays.
    pub fn live_block_data(&self) -> usize {
        self.block_data.live_count()
    }

    /// Maximum number of chunk headers.
    pub fn max_chunks(&self) -> usize {
        self.chunks.capacity()
    }

    /// Maximum number of block arrays.
    pub fn max_block_data(&self) -> usize {
        self.block_data.capacity()
    }
}
