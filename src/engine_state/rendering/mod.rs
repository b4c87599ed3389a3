//! Renderer-facing output of the voxel engine.
//!
//! This module contains everything the engine produces for a renderer: the packed
//! chunk vertex format and the mesher that fills chunk meshes with it. Drawing the
//! meshes is left to whoever consumes the render lists of the world.

pub mod meshing;
pub mod vertex;

// Re-export commonly used types
pub use meshing::{ChunkMesh, ChunkMesher, VertexBuffer};
pub use vertex::{ChunkVertex, VertexAttribute, VertexFormat, MAX_AMBIENT_OCCLUSION};
