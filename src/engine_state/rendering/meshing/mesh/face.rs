use crate::engine_state::rendering::vertex::ChunkVertex;
use crate::engine_state::voxels::block::block_side::BlockSide;

/// Number of vertices emitted per visible face: two triangles, no index buffer.
pub const VERTICES_PER_FACE: usize = 6;

const fn face(
    side: BlockSide,
    corners: [(u32, u32, u32, u32, u32); VERTICES_PER_FACE],
) -> [ChunkVertex; VERTICES_PER_FACE] {
    let mut vertices = [ChunkVertex::corner(0, 0, 0, 0, 0, side); VERTICES_PER_FACE];
    let mut i = 0;
    while i < VERTICES_PER_FACE {
        let (x, y, z, u, v) = corners[i];
        vertices[i] = ChunkVertex::corner(x, y, z, u, v, side);
        i += 1;
    }
    vertices
}

/// Unit-cube vertices of every face, indexed by `BlockSide`.
///
/// Each face is two triangles sharing a diagonal. Every vertex sits on a cube corner
/// (x, y, z in {0, 1}) with its texture corner (u, v).
pub static FACE_VERTICES: [[ChunkVertex; VERTICES_PER_FACE]; 6] = [
    face(
        BlockSide::FRONT,
        [
            (0, 0, 1, 0, 0),
            (1, 1, 1, 1, 1),
            (0, 1, 1, 0, 1),
            (0, 0, 1, 0, 0),
            (1, 0, 1, 1, 0),
            (1, 1, 1, 1, 1),
        ],
    ),
    face(
        BlockSide::BACK,
        [
            (1, 0, 0, 0, 0),
            (0, 1, 0, 1, 1),
            (1, 1, 0, 0, 1),
            (1, 0, 0, 0, 0),
            (0, 0, 0, 1, 0),
            (0, 1, 0, 1, 1),
        ],
    ),
    face(
        BlockSide::LEFT,
        [
            (0, 0, 0, 0, 0),
            (0, 1, 1, 1, 1),
            (0, 1, 0, 0, 1),
            (0, 0, 0, 0, 0),
            (0, 0, 1, 1, 0),
            (0, 1, 1, 1, 1),
        ],
    ),
    face(
        BlockSide::RIGHT,
        [
            (1, 0, 1, 0, 0),
            (1, 1, 0, 1, 1),
            (1, 1, 1, 0, 1),
            (1, 0, 1, 0, 0),
            (1, 0, 0, 1, 0),
            (1, 1, 0, 1, 1),
        ],
    ),
    face(
        BlockSide::TOP,
        [
            (0, 1, 1, 0, 0),
            (1, 1, 0, 1, 1),
            (0, 1, 0, 0, 1),
            (0, 1, 1, 0, 0),
            (1, 1, 1, 1, 0),
            (1, 1, 0, 1, 1),
        ],
    ),
    face(
        BlockSide::BOTTOM,
        [
            (0, 0, 0, 0, 0),
            (1, 0, 1, 1, 1),
            (0, 0, 1, 0, 1),
            (0, 0, 0, 0, 0),
            (1, 0, 0, 1, 0),
            (1, 0, 1, 1, 1),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_face_lies_on_its_plane() {
        for side in BlockSide::all() {
            let normal = side.normal();
            let plane = if normal[side.axis()] > 0 { 1 } else { 0 };
            for vertex in FACE_VERTICES[side as usize] {
                let position = [vertex.x(), vertex.y(), vertex.z()];
                assert_eq!(position[side.axis()], plane, "{side:?} vertex off its plane");
                assert_eq!(vertex.side(), side);
            }
        }
    }
}
