//! Per-vertex ambient occlusion.
//!
//! Every face vertex looks at the three cells that touch its corner in the layer in
//! front of the face: the two cells sharing an edge with the face and the one cell
//! sharing only the corner. The more of them are solid, the darker the vertex.
//!
//! ```text
//!        side2  corner
//!          +------+
//!          | face |  side1
//!          +------+
//! ```

use cgmath::Vector3;

use crate::engine_state::rendering::vertex::{ChunkVertex, MAX_AMBIENT_OCCLUSION};
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Occlusion level from the three samples around a vertex.
///
/// Two solid edge neighbours fully darken the vertex whatever the corner holds;
/// otherwise every solid sample removes one level.
pub fn occlusion_level(side1: bool, side2: bool, corner: bool) -> u8 {
    if side1 && side2 {
        return 0;
    }
    MAX_AMBIENT_OCCLUSION - (side1 as u8 + side2 as u8 + corner as u8)
}

/// Offsets from the block to the `[side1, side2, corner]` cells sampled for `vertex`.
///
/// # Arguments
/// * `side` - The face the vertex belongs to
/// * `vertex` - A unit-cube corner vertex from the face table
pub fn sample_offsets(side: BlockSide, vertex: ChunkVertex) -> [Vector3<i32>; 3] {
    let normal = side.normal();
    let corner = [vertex.x(), vertex.y(), vertex.z()];

    let tangent = |axis: usize| {
        let mut offset = Vector3::new(0, 0, 0);
        offset[axis] = if corner[axis] == 0 { -1 } else { 1 };
        offset
    };
    let first = tangent((side.axis() + 1) % 3);
    let second = tangent((side.axis() + 2) % 3);

    [normal + first, normal + second, normal + first + second]
}

/// Occlusion level of `vertex` on `side` of a block.
///
/// # Arguments
/// * `side` - The face being emitted
/// * `vertex` - A unit-cube corner vertex from the face table
/// * `is_occluder` - Whether the cell at an offset from the block blocks light
pub fn vertex_occlusion(
    side: BlockSide,
    vertex: ChunkVertex,
    mut is_occluder: impl FnMut(Vector3<i32>) -> bool,
) -> u8 {
    let [side1, side2, corner] = sample_offsets(side, vertex);
    occlusion_level(is_occluder(side1), is_occluder(side2), is_occluder(corner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_edges_fully_occlude() {
        assert_eq!(occlusion_level(true, true, false), 0);
        assert_eq!(occlusion_level(true, true, true), 0);
    }

    #[test]
    fn test_levels_count_solid_samples() {
        assert_eq!(occlusion_level(false, false, false), 3);
        assert_eq!(occlusion_level(false, false, true), 2);
        assert_eq!(occlusion_level(true, false, false), 2);
        assert_eq!(occlusion_level(false, true, true), 1);
    }

    #[test]
    fn test_samples_sit_in_front_of_the_face() {
        let vertex = ChunkVertex::corner(1, 1, 0, 0, 0, BlockSide::TOP);
        let [side1, side2, corner] = sample_offsets(BlockSide::TOP, vertex);

        assert_eq!(side1, Vector3::new(0, 1, -1));
        assert_eq!(side2, Vector3::new(1, 1, 0));
        assert_eq!(corner, Vector3::new(1, 1, -1));
    }

    #[test]
    fn test_open_sky_is_unoccluded() {
        for side in BlockSide::all() {
            let vertex = ChunkVertex::corner(0, 0, 0, 0, 0, side);
            assert_eq!(vertex_occlusion(side, vertex, |_| false), 3);
        }
    }
}
