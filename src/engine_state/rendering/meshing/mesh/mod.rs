//! Mesh generation building blocks for voxel rendering.
//!
//! This module provides the pieces the chunk mesher assembles geometry from.
//!
//! # Architecture
//! - [`ChunkMesh`]: The opaque and transparent vertex buffers of a chunk
//! - [`FACE_VERTICES`]: The two triangles of every block face
//! - [`ambient_occlusion`]: Per-vertex darkening from the cells around a face corner
//! - [`is_face_visible`]: Face culling between a block and its neighbour
//!
//! # Performance Considerations
//! - Faces between two identical blocks are never emitted
//! - Vertices are 8 bytes and need no index buffer

pub mod ambient_occlusion;
mod face;
#[allow(clippy::module_inception)]
mod mesh;

pub use face::{FACE_VERTICES, VERTICES_PER_FACE};
pub use mesh::{ChunkMesh, VertexBuffer};

use crate::engine_state::voxels::block::Block;

/// Whether the face of `block` that touches `neighbor` is visible.
///
/// - a face against an identical block is hidden (stone in stone, water in water)
/// - a face against a transparent block (air, water) is visible
/// - a face against a translucent block (leaves) is visible unless `block` is itself
///   translucent
/// - every other face is hidden
pub fn is_face_visible(block: Block, neighbor: Block) -> bool {
    if neighbor == block {
        return false;
    }
    if neighbor.is_transparent() {
        return true;
    }
    neighbor.is_translucent() && !block.is_translucent()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn test_face_culling_rules() {
        let stone = Block::new(BlockType::STONE);
        let dirt = Block::new(BlockType::DIRT);
        let water = Block::new(BlockType::WATER);
        let leaves = Block::new(BlockType::LEAVES);

        assert!(is_face_visible(stone, Block::AIR));
        assert!(!is_face_visible(stone, dirt), "opaque against opaque never emits");
        assert!(is_face_visible(stone, water));
        assert!(is_face_visible(stone, leaves));

        assert!(is_face_visible(water, Block::AIR), "water surface against air");
        assert!(!is_face_visible(water, water));
        assert!(!is_face_visible(water, stone));

        assert!(!is_face_visible(leaves, leaves));
        assert!(is_face_visible(leaves, Block::AIR));
        assert!(!is_face_visible(leaves, stone));
    }
}
