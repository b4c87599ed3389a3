//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine.
//! It includes block type definitions, block face handling, and the block value stored
//! in chunk arrays together with the visibility predicates the mesher relies on.

use block_side::BlockSide;
use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each block type to its texture atlas index for each face.
///
/// The outer array is indexed by `BlockType` as a `usize`.
/// The inner array contains 6 texture indices in `BlockSide` order:
/// [Front, Back, Left, Right, Top, Bottom]
pub static BLOCK_TYPE_TO_TEXTURE_INDICES: [[u8; 6]; 9] = [
    [0, 0, 0, 0, 0, 0], // AIR
    [1, 1, 1, 1, 1, 1], // GRASS
    [0, 0, 0, 0, 0, 0], // DIRT
    [3, 3, 3, 3, 3, 3], // STONE
    [4, 4, 4, 4, 5, 5], // LOG (bark sides, end-grain caps)
    [6, 6, 6, 6, 6, 6], // LEAVES
    [7, 7, 7, 7, 7, 7], // SAND
    [8, 8, 8, 8, 8, 8], // WATER
    [9, 9, 9, 9, 9, 9], // SNOW
];

/// Represents a single voxel block in the world.
///
/// This is a lightweight structure that stores only the essential block data.
/// The actual block properties are looked up from the block type.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and the `Pod` derive let whole chunk arrays be zeroed and
/// copied as raw bytes; an all-zero block is air.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// The empty block, also returned for lookups into unloaded space.
    pub const AIR: Block = Block::new(BlockType::AIR);

    /// Creates a new block of the specified type.
    ///
    /// # Arguments
    /// * `block_type` - The type of block to create
    ///
    /// # Returns
    /// A new `Block` instance with the specified type.
    pub const fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// Decodes the stored type of this block.
    pub fn block_type(self) -> BlockType {
        BlockType::get_block_type_from_int(self.block_type)
    }

    /// Whether this block is air.
    pub fn is_air(self) -> bool {
        self.block_type() == BlockType::AIR
    }

    /// Whether faces behind this block stay visible (air and water).
    pub fn is_transparent(self) -> bool {
        matches!(self.block_type(), BlockType::AIR | BlockType::WATER)
    }

    /// Whether light passes through this block (transparent blocks and leaves).
    pub fn is_translucent(self) -> bool {
        matches!(
            self.block_type(),
            BlockType::AIR | BlockType::WATER | BlockType::LEAVES
        )
    }

    /// Whether a player can target this block with a raycast.
    pub fn is_interactable(self) -> bool {
        !matches!(self.block_type(), BlockType::AIR | BlockType::WATER)
    }

    /// Whether this block darkens neighbouring vertices for ambient occlusion.
    pub fn occludes_light(self) -> bool {
        !self.is_transparent()
    }

    /// The texture atlas index used for `side` of this block.
    pub fn texture_index(self, side: BlockSide) -> u8 {
        BLOCK_TYPE_TO_TEXTURE_INDICES[self.block_type() as usize][side as usize]
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_block_is_air() {
        let block: Block = bytemuck::Zeroable::zeroed();
        assert_eq!(block, Block::AIR);
        assert!(block.is_air());
    }

    #[test]
    fn test_visibility_predicates() {
        let water = Block::new(BlockType::WATER);
        let leaves = Block::new(BlockType::LEAVES);
        let stone = Block::new(BlockType::STONE);

        assert!(water.is_transparent() && water.is_translucent() && !water.is_interactable());
        assert!(!leaves.is_transparent() && leaves.is_translucent() && leaves.is_interactable());
        assert!(!stone.is_transparent() && !stone.is_translucent() && stone.is_interactable());
        assert!(!Block::AIR.is_interactable());
        assert!(leaves.occludes_light());
    }

    #[test]
    fn test_log_caps_use_end_grain_texture() {
        let log = Block::new(BlockType::LOG);
        assert_eq!(log.texture_index(BlockSide::FRONT), 4);
        assert_eq!(log.texture_index(BlockSide::TOP), 5);
        assert_eq!(log.texture_index(BlockSide::BOTTOM), 5);
    }
}
