//! # Chunk Generation Module
//!
//! Terrain sources the world asks for block data when it loads a chunk.
//!
//! ## Key Components
//!
//! * `ChunkGenerator` - The trait the world drives, one call per loaded chunk
//! * `FlatGenerator` - A single material below a fixed height
//! * `HeightmapGenerator` - Layered terrain over an octave Perlin heightmap
//!
//! Any `FnMut(BlockCoord) -> Block` closure is also a generator, which keeps tests and
//! one-off worlds short.

use super::block::Block;
use super::chunk::BlockArray;
use super::coords::{BlockCoord, ChunkCoord, LocalBlockCoord};

pub mod heightmap;

pub use heightmap::HeightmapGenerator;

/// Produces the blocks of a chunk.
pub trait ChunkGenerator {
    /// Fills every block of the chunk at `coord`.
    ///
    /// # Arguments
    /// * `coord` - The chunk being loaded
    /// * `blocks` - The chunk's block array, all air on entry
    fn generate_chunk(&mut self, coord: ChunkCoord, blocks: &mut BlockArray);
}

impl<F> ChunkGenerator for F
where
    F: FnMut(BlockCoord) -> Block,
{
    fn generate_chunk(&mut self, coord: ChunkCoord, blocks: &mut BlockArray) {
        for (index, block) in blocks.iter_mut().enumerate() {
            *block = (*self)(BlockCoord::from_parts(coord, LocalBlockCoord::from_index(index)));
        }
    }
}

/// Fills everything below `height` with one block.
#[derive(Debug, Clone, Copy)]
pub struct FlatGenerator {
    /// First world y that is air
    pub height: i32,
    /// Material below `height`
    pub block: Block,
}

impl FlatGenerator {
    /// Creates a flat generator.
    pub fn new(height: i32, block: Block) -> Self {
        FlatGenerator { height, block }
    }
}

impl ChunkGenerator for FlatGenerator {
    fn generate_chunk(&mut self, coord: ChunkCoord, blocks: &mut BlockArray) {
        let origin = coord.origin_block();
        for (index, block) in blocks.iter_mut().enumerate() {
            let y = origin.y + LocalBlockCoord::from_index(index).y() as i32;
            *block = if y < self.height { self.block } else { Block::AIR };
        }
    }
}
