//! Packed vertex format for chunk meshes.
//!
//! This module defines the 64-bit vertex emitted by the mesher and the attribute layout
//! a renderer needs to bind it. The bit layout must match the vertex shader's decode
//! order exactly.
//!
//! # Bit Layout
//!
//! ```text
//! word 0 (location 0)
//!   bits  0..6   x offset inside the chunk (0..=32)
//!   bits  6..12  y offset
//!   bits 12..18  z offset
//!   bits 18..26  texture atlas index
//!   bit  26      u corner
//!   bit  27      v corner
//!   bits 28..31  face id (BlockSide)
//! word 1 (location 1)
//!   bits  0..2   ambient occlusion level (0 = darkest, 3 = unoccluded)
//! ```

use crate::engine_state::voxels::{block::block_side::BlockSide, chunk::CHUNK_DIMENSION};

const POSITION_BITS: u32 = 6;
const POSITION_MASK: u32 = (1 << POSITION_BITS) - 1;
const X_SHIFT: u32 = 0;
const Y_SHIFT: u32 = 6;
const Z_SHIFT: u32 = 12;
const TEXTURE_SHIFT: u32 = 18;
const TEXTURE_MASK: u32 = 0xff;
const U_SHIFT: u32 = 26;
const V_SHIFT: u32 = 27;
const FACE_SHIFT: u32 = 28;
const FACE_MASK: u32 = 0x7;
const AO_MASK: u32 = 0x3;

/// Highest ambient occlusion level, meaning no occlusion at all.
pub const MAX_AMBIENT_OCCLUSION: u8 = 3;

/// Shader input type of a vertex attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    /// A single unsigned 32-bit integer.
    Uint32,
}

/// Describes one attribute of [`ChunkVertex`] for pipeline creation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Byte offset from the start of the vertex
    pub offset: u64,
    /// Shader input location
    pub shader_location: u32,
    /// Attribute type
    pub format: VertexFormat,
}

/// A single vertex of a chunk mesh, packed into two 32-bit words.
///
/// Positions are offsets inside the owning chunk, so a vertex only means something
/// together with its chunk's coordinate.
///
/// # Memory Layout
/// - Packed position, texture, UV corner and face: u32 (4 bytes)
/// - Ambient occlusion: u32 (4 bytes)
///
/// Total size: 8 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ChunkVertex {
    packed: u32,
    ambient_occlusion: u32,
}

impl ChunkVertex {
    /// Byte distance between consecutive vertices.
    pub const STRIDE: u64 = std::mem::size_of::<ChunkVertex>() as u64;

    /// Attribute layout matching the shader's decode order.
    pub const ATTRIBUTES: [VertexAttribute; 2] = [
        VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: VertexFormat::Uint32,
        },
        VertexAttribute {
            offset: 4,
            shader_location: 1,
            format: VertexFormat::Uint32,
        },
    ];

    /// Creates a unit-cube corner vertex, as stored in the face tables.
    ///
    /// # Arguments
    /// * `x`, `y`, `z` - Corner of the unit cube, each 0 or 1
    /// * `u`, `v` - Texture corner, each 0 or 1
    /// * `side` - The face this vertex belongs to
    pub const fn corner(x: u32, y: u32, z: u32, u: u32, v: u32, side: BlockSide) -> Self {
        ChunkVertex {
            packed: x << X_SHIFT
                | y << Y_SHIFT
                | z << Z_SHIFT
                | u << U_SHIFT
                | v << V_SHIFT
                | (side as u32) << FACE_SHIFT,
            ambient_occlusion: MAX_AMBIENT_OCCLUSION as u32,
        }
    }

    /// Moves this vertex by a block offset inside the chunk.
    ///
    /// # Panics
    /// Panics if any resulting offset exceeds the chunk dimension.
    pub fn translated(self, dx: u32, dy: u32, dz: u32) -> Self {
        let (x, y, z) = (self.x() + dx, self.y() + dy, self.z() + dz);
        let limit = CHUNK_DIMENSION as u32;
        assert!(
            x <= limit && y <= limit && z <= limit,
            "vertex offset ({x}, {y}, {z}) exceeds the chunk dimension"
        );

        let cleared = self.packed
            & !(POSITION_MASK << X_SHIFT | POSITION_MASK << Y_SHIFT | POSITION_MASK << Z_SHIFT);
        ChunkVertex {
            packed: cleared | x << X_SHIFT | y << Y_SHIFT | z << Z_SHIFT,
            ..self
        }
    }

    /// Returns this vertex with its texture atlas index replaced.
    pub fn with_texture_index(self, texture_index: u8) -> Self {
        ChunkVertex {
            packed: self.packed & !(TEXTURE_MASK << TEXTURE_SHIFT)
                | (texture_index as u32) << TEXTURE_SHIFT,
            ..self
        }
    }

    /// Returns this vertex with its ambient occlusion level replaced.
    ///
    /// # Panics
    /// Panics if `level` is above [`MAX_AMBIENT_OCCLUSION`].
    pub fn with_ambient_occlusion(self, level: u8) -> Self {
        assert!(
            level <= MAX_AMBIENT_OCCLUSION,
            "ambient occlusion level {level} out of range"
        );
        ChunkVertex {
            ambient_occlusion: level as u32,
            ..self
        }
    }

    /// X offset inside the chunk.
    pub fn x(self) -> u32 {
        (self.packed >> X_SHIFT) & POSITION_MASK
    }

    /// Y offset inside the chunk.
    pub fn y(self) -> u32 {
        (self.packed >> Y_SHIFT) & POSITION_MASK
    }

    /// Z offset inside the chunk.
    pub fn z(self) -> u32 {
        (self.packed >> Z_SHIFT) & POSITION_MASK
    }

    /// Texture atlas index.
    pub fn texture_index(self) -> u8 {
        ((self.packed >> TEXTURE_SHIFT) & TEXTURE_MASK) as u8
    }

    /// Texture corner, each component 0 or 1.
    pub fn uv(self) -> (u32, u32) {
        ((self.packed >> U_SHIFT) & 1, (self.packed >> V_SHIFT) & 1)
    }

    /// The face this vertex belongs to.
    pub fn side(self) -> BlockSide {
        let id = ((self.packed >> FACE_SHIFT) & FACE_MASK) as usize;
        BlockSide::from_index(id).unwrap_or(BlockSide::FRONT)
    }

    /// Ambient occlusion level, 0 to 3.
    pub fn ambient_occlusion(self) -> u8 {
        (self.ambient_occlusion & AO_MASK) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_decode_independently() {
        let vertex = ChunkVertex::corner(1, 0, 1, 1, 0, BlockSide::TOP)
            .translated(31, 7, 2)
            .with_texture_index(200)
            .with_ambient_occlusion(1);

        assert_eq!((vertex.x(), vertex.y(), vertex.z()), (32, 7, 3));
        assert_eq!(vertex.texture_index(), 200);
        assert_eq!(vertex.uv(), (1, 0));
        assert_eq!(vertex.side(), BlockSide::TOP);
        assert_eq!(vertex.ambient_occlusion(), 1);
    }

    #[test]
    fn test_layout_is_two_words() {
        assert_eq!(ChunkVertex::STRIDE, 8);
        let vertex = ChunkVertex::corner(1, 1, 1, 0, 0, BlockSide::BOTTOM).with_ambient_occlusion(2);
        let words: [u32; 2] = bytemuck::cast(vertex);
        assert_eq!(words[0], 1 | 1 << 6 | 1 << 12 | 5 << 28);
        assert_eq!(words[1], 2);
    }

    #[test]
    #[should_panic(expected = "exceeds the chunk dimension")]
    fn test_offset_past_chunk_panics() {
        ChunkVertex::corner(1, 0, 0, 0, 0, BlockSide::RIGHT).translated(32, 0, 0);
    }
}
