//! # Voxel Module
//!
//! This module holds the voxel data model and the streamed world built on it.
//!
//! ## Architecture
//!
//! The voxel system is split into these components:
//!
//! * **Block**: block types, their faces and their per-type properties
//! * **Coords**: chunk, world-block and chunk-local coordinates and the conversions between them
//! * **Chunk**: fixed-size 32³ block arrays, their headers and the pools they live in
//! * **Generation**: terrain sources that fill newly loaded chunks
//! * **World**: the chunk store, streaming policy and block edits
//! * **Raycast**: block picking through the loaded world
//!
//! ## Data Flow
//!
//! 1. The world is told where the player is once per tick
//! 2. Missing chunks near the player are generated, distant ones are evicted
//! 3. Block edits and loads mark the affected chunks dirty
//! 4. Dirty chunks nearest the player are remeshed, a bounded number per tick
//! 5. Chunks with geometry inside the render distance are listed for the renderer
//!
//! ## Performance Considerations
//!
//! * Chunk storage comes from fixed-capacity pools sized from the load distance
//! * Per-tick work is budgeted so a large move never stalls one tick
//! * All-air chunks are never meshed

pub mod block;
pub mod chunk;
pub mod coords;
pub mod generation;
pub mod raycast;
pub mod world;
