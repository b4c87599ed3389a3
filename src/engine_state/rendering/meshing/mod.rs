//! Chunk mesh generation.
//!
//! This module turns a chunk's block array into the vertex buffers of its
//! [`ChunkMesh`]. The key goals are:
//! 1. Emit only faces that can be seen, including across chunk borders
//! 2. Bake ambient occlusion into every vertex
//! 3. Never allocate per rebuild once the scratch buffers have warmed up
//!
//! # Architecture
//! - `ChunkMesher`: Owns the scratch buffers and runs the rebuild
//! - `MeshScratch`: Reusable output buffers plus the occluder mask
//! - `mesh/`: Face tables, culling rules and ambient occlusion
//!
//! # Neighbourhood
//! Before emitting anything the mesher copies the chunk and a one-block shell around
//! it into a padded `(D + 2)³` array taken from a scratch arena. Interior cells come
//! straight from the chunk's block array; shell cells come from the surrounding world
//! through [`BlockSource`], which reads unloaded space as air. Every later neighbour or
//! occlusion lookup is then a plain array index, whichever chunk it falls in.
//!
//! # Performance Considerations
//! - Occlusion samples read a bit mask instead of decoding blocks
//! - Output buffers keep their capacity between rebuilds
//! - All-air chunks are skipped before the neighbourhood is gathered

use bitvec::vec::BitVec;
use cgmath::Vector3;

use crate::core::ArenaAllocator;
use crate::engine_state::rendering::vertex::ChunkVertex;
use crate::engine_state::voxels::{
    block::{block_side::BlockSide, Block},
    chunk::{
        BlockArray, Chunk, ChunkBlockIterator, CHUNK_DIMENSION_WRAPPED, CHUNK_PLANE_SIZE_WRAPPED,
        CHUNK_SIZE_WRAPPED,
    },
    coords::{ChunkCoord, LocalBlockCoord},
    world::BlockSource,
};

pub mod mesh;

pub use mesh::{ChunkMesh, VertexBuffer};

use mesh::{ambient_occlusion, is_face_visible, FACE_VERTICES};

/// Index of a cell in the padded neighbourhood, from chunk-local coordinates in
/// `-1..=CHUNK_DIMENSION`.
fn wrapped_index(position: Vector3<i32>) -> usize {
    (position.x + 1) as usize
        + (position.y + 1) as usize * CHUNK_DIMENSION_WRAPPED
        + (position.z + 1) as usize * CHUNK_PLANE_SIZE_WRAPPED
}

/// Reusable buffers for one mesher.
///
/// Owned by a single [`ChunkMesher`], so meshing on several threads only needs one
/// mesher per thread.
#[derive(Debug)]
pub struct MeshScratch {
    /// Vertices for the opaque pass
    opaque: Vec<ChunkVertex>,
    /// Vertices for the transparent pass
    transparent: Vec<ChunkVertex>,
    /// One bit per neighbourhood cell: set when the cell darkens adjacent vertices
    occluders: BitVec,
}

impl MeshScratch {
    fn new() -> Self {
        MeshScratch {
            opaque: Vec::new(),
            transparent: Vec::new(),
            occluders: BitVec::repeat(false, CHUNK_SIZE_WRAPPED),
        }
    }

    fn reset(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
    }
}

/// Builds chunk meshes.
#[derive(Debug)]
pub struct ChunkMesher {
    scratch: MeshScratch,
}

impl Default for ChunkMesher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkMesher {
    /// Creates a mesher with empty scratch buffers.
    pub fn new() -> Self {
        ChunkMesher {
            scratch: MeshScratch::new(),
        }
    }

    /// Meshes a chunk into the scratch buffers.
    ///
    /// The result is available from [`ChunkMesher::opaque_vertices`] and
    /// [`ChunkMesher::transparent_vertices`] until the next build or upload.
    ///
    /// # Arguments
    /// * `coord` - Position of the chunk being meshed
    /// * `blocks` - The chunk's block array
    /// * `world` - Block lookups for the shell around the chunk
    /// * `arena` - Scratch memory for the padded neighbourhood; the caller reclaims it
    pub fn build(
        &mut self,
        coord: ChunkCoord,
        blocks: &BlockArray,
        world: &impl BlockSource,
        arena: &ArenaAllocator,
    ) {
        self.scratch.reset();

        let neighborhood = arena.alloc_slice::<Block>(CHUNK_SIZE_WRAPPED);
        Self::gather_neighborhood(coord, blocks, world, neighborhood);

        let MeshScratch {
            opaque,
            transparent,
            occluders,
        } = &mut self.scratch;

        for (index, block) in neighborhood.iter().enumerate() {
            occluders.set(index, block.occludes_light());
        }

        for (local, block) in ChunkBlockIterator::new(blocks) {
            let position = local.to_vector();
            let target = if block.is_transparent() {
                &mut *transparent
            } else {
                &mut *opaque
            };

            for side in BlockSide::all() {
                let neighbor = neighborhood[wrapped_index(position + side.normal())];
                if !is_face_visible(block, neighbor) {
                    continue;
                }

                let texture_index = block.texture_index(side);
                for corner in FACE_VERTICES[side as usize] {
                    let level = ambient_occlusion::vertex_occlusion(side, corner, |offset| {
                        occluders[wrapped_index(position + offset)]
                    });
                    target.push(
                        corner
                            .translated(local.x() as u32, local.y() as u32, local.z() as u32)
                            .with_texture_index(texture_index)
                            .with_ambient_occlusion(level),
                    );
                }
            }
        }
    }

    /// Copies the chunk and its one-block shell into `neighborhood`.
    fn gather_neighborhood(
        coord: ChunkCoord,
        blocks: &BlockArray,
        world: &impl BlockSource,
        neighborhood: &mut [Block],
    ) {
        let origin = coord.origin_block();
        let extent = CHUNK_DIMENSION_WRAPPED as i32 - 1;

        for z in -1..extent {
            for y in -1..extent {
                for x in -1..extent {
                    let block = match LocalBlockCoord::try_from_offset(x, y, z) {
                        Some(local) => blocks[local.to_index()],
                        None => world.block_at(origin + Vector3::new(x, y, z)),
                    };
                    neighborhood[wrapped_index(Vector3::new(x, y, z))] = block;
                }
            }
        }
    }

    /// Vertices produced by the last build for the opaque pass.
    pub fn opaque_vertices(&self) -> &[ChunkVertex] {
        &self.scratch.opaque
    }

    /// Vertices produced by the last build for the transparent pass.
    pub fn transparent_vertices(&self) -> &[ChunkVertex] {
        &self.scratch.transparent
    }

    /// Moves the last build into `mesh` and resets the scratch buffers.
    pub fn upload(&mut self, mesh: &mut ChunkMesh) {
        mesh.upload(&self.scratch.opaque, &self.scratch.transparent);
        self.scratch.reset();
    }

    /// Rebuilds `chunk`'s mesh in place and clears its dirty flag.
    ///
    /// All-air chunks get an empty mesh without gathering a neighbourhood.
    ///
    /// # Arguments
    /// * `chunk` - The chunk header whose mesh is replaced
    /// * `blocks` - The chunk's block array
    /// * `world` - Block lookups for the shell around the chunk
    /// * `arena` - Scratch memory, rolled back before returning
    pub fn rebuild(
        &mut self,
        chunk: &mut Chunk,
        blocks: &BlockArray,
        world: &impl BlockSource,
        arena: &mut ArenaAllocator,
    ) {
        if chunk.potentially_has_blocks() {
            let marker = arena.marker();
            self.build(chunk.coord(), blocks, world, arena);
            arena.restore_marker(marker);
            self.upload(&mut chunk.mesh);
        } else {
            chunk.mesh.clear();
        }
        chunk.finish_rebuild();
    }
}
