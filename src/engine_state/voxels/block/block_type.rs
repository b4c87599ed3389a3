//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification, conversion, and
//! lookup by name.

use std::fmt;

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminants are the values stored in chunk block arrays, so the order of the
/// variants is part of the in-memory format. The `FromPrimitive` derive allows
/// conversion back from the stored integer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Transparent, never meshed.
    AIR,

    /// Grass-topped soil.
    GRASS,

    /// Plain soil found under grass.
    DIRT,

    /// The bulk of the terrain below the soil layers.
    STONE,

    /// A tree trunk, with distinct end-grain textures on its top and bottom faces.
    LOG,

    /// Tree foliage. Translucent: faces of solid blocks behind it stay visible, but it
    /// still darkens neighbouring vertices.
    LEAVES,

    /// Beach and sea-floor material.
    SAND,

    /// Transparent liquid, meshed into the transparent vertex buffer.
    WATER,

    /// Ground cover above the snow line.
    SNOW,
}

/// Lower-case name of every block type, keyed for lookups from configuration files.
static BLOCK_TYPE_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::AIR,
    "grass" => BlockType::GRASS,
    "dirt" => BlockType::DIRT,
    "stone" => BlockType::STONE,
    "log" => BlockType::LOG,
    "leaves" => BlockType::LEAVES,
    "sand" => BlockType::SAND,
    "water" => BlockType::WATER,
    "snow" => BlockType::SNOW,
};

impl BlockType {
    /// Every block type, in storage order.
    pub const ALL: [BlockType; 9] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::LOG,
        BlockType::LEAVES,
        BlockType::SAND,
        BlockType::WATER,
        BlockType::SNOW,
    ];

    /// Converts a stored `BlockTypeSize` back to a `BlockType`.
    ///
    /// # Arguments
    /// * `btype` - The block type as stored in a chunk
    ///
    /// # Returns
    /// The corresponding `BlockType`, or `BlockType::AIR` for values that do not name a
    /// block type.
    pub fn get_block_type_from_int(btype: BlockTypeSize) -> Self {
        num::FromPrimitive::from_u8(btype).unwrap_or(BlockType::AIR)
    }

    /// Looks up a block type by its lower-case name.
    ///
    /// # Returns
    /// `None` if no block type has that name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPE_NAMES.get(name).copied()
    }

    /// The human-readable name of this block type.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::AIR => "Air",
            BlockType::GRASS => "Grass",
            BlockType::DIRT => "Dirt",
            BlockType::STONE => "Stone",
            BlockType::LOG => "Log",
            BlockType::LEAVES => "Leaves",
            BlockType::SAND => "Sand",
            BlockType::WATER => "Water",
            BlockType::SNOW => "Snow",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
