//! Mesh data structures for chunk rendering.
//!
//! A chunk mesh holds two vertex buffers: opaque geometry and transparent geometry
//! (water), drawn in separate passes. The buffers are staging copies of what the
//! renderer uploads to the GPU; they are rebuilt in place and never persisted.

use crate::engine_state::rendering::vertex::ChunkVertex;

/// A vertex buffer ready for upload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VertexBuffer {
    vertices: Vec<ChunkVertex>,
}

impl VertexBuffer {
    /// Replaces the buffer contents with `vertices`, reusing the existing allocation.
    pub fn upload(&mut self, vertices: &[ChunkVertex]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
    }

    /// Drops all vertices.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// The stored vertices.
    pub fn vertices(&self) -> &[ChunkVertex] {
        &self.vertices
    }

    /// The stored vertices as raw bytes, in the layout the shader reads.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of stored vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the buffer holds no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// The renderable geometry of one chunk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChunkMesh {
    /// Geometry of opaque and translucent blocks
    opaque: VertexBuffer,
    /// Geometry of transparent blocks
    transparent: VertexBuffer,
}

impl ChunkMesh {
    /// Replaces both buffers.
    ///
    /// # Arguments
    /// * `opaque` - Vertices for the opaque pass
    /// * `transparent` - Vertices for the transparent pass
    pub fn upload(&mut self, opaque: &[ChunkVertex], transparent: &[ChunkVertex]) {
        self.opaque.upload(opaque);
        self.transparent.upload(transparent);
    }

    /// Empties both buffers.
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
    }

    /// The opaque vertex buffer.
    pub fn opaque(&self) -> &VertexBuffer {
        &self.opaque
    }

    /// The transparent vertex buffer.
    pub fn transparent(&self) -> &VertexBuffer {
        &self.transparent
    }

    /// Number of vertices in the opaque buffer.
    pub fn num_opaque_vertices(&self) -> usize {
        self.opaque.len()
    }

    /// Number of vertices in the transparent buffer.
    pub fn num_transparent_vertices(&self) -> usize {
        self.transparent.len()
    }
}
