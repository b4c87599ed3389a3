//! # Chunk Iteration Module
//!
//! This module provides an iterator over the non-air blocks of a chunk's block array,
//! in array order (x fastest, then y, then z).

use crate::engine_state::voxels::block::Block;
use crate::engine_state::voxels::coords::LocalBlockCoord;

use super::BlockArray;

/// An iterator over all non-air blocks in a chunk.
///
/// Air blocks are skipped, so the iterator yields exactly the blocks that can produce
/// geometry, together with their position inside the chunk.
pub struct ChunkBlockIterator<'a> {
    /// The block array being iterated over
    blocks: &'a BlockArray,
    /// Index of the next block to examine
    next_index: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first block.
    ///
    /// # Arguments
    /// * `blocks` - The block array to iterate over
    pub fn new(blocks: &'a BlockArray) -> Self {
        ChunkBlockIterator {
            blocks,
            next_index: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (LocalBlockCoord, Block);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(block) = self.blocks.get(self.next_index).copied() {
            let index = self.next_index;
            self.next_index += 1;
            if !block.is_air() {
                return Some((LocalBlockCoord::from_index(index), block));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.blocks.len() - self.next_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::chunk::CHUNK_VOLUME;

    #[test]
    fn test_yields_only_solid_blocks_in_order() {
        let mut blocks = Box::new([Block::AIR; CHUNK_VOLUME]);
        let first = LocalBlockCoord::new(1, 0, 0);
        let second = LocalBlockCoord::new(0, 2, 3);
        blocks[second.to_index()] = Block::new(BlockType::DIRT);
        blocks[first.to_index()] = Block::new(BlockType::LOG);

        let found: Vec<_> = ChunkBlockIterator::new(&blocks).collect();

        assert_eq!(
            found,
            vec![
                (first, Block::new(BlockType::LOG)),
                (second, Block::new(BlockType::DIRT)),
            ]
        );
    }
}
