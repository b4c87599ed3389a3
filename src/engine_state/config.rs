//! # Configuration Module
//!
//! Tunables for chunk streaming and for the headless driver, loaded from JSON.
//!
//! Every field has a default, so a configuration file only needs to list what it
//! changes:
//!
//! ```json
//! { "streaming": { "load_distance": 4, "render_distance": 3 }, "ticks": 200 }
//! ```
//!
//! Capacities are derived from the load distance. Values that would make the streaming
//! loop violate a capacity later are rejected up front by [`StreamingConfig::validate`].

use std::{fs, mem, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxels::block::{block_type::BlockType, Block};
use super::voxels::chunk::{ChunkAllocator, CHUNK_SIZE_WRAPPED};
use super::voxels::coords::ChunkCoord;

/// Errors produced while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for the expected shape.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The load distance is negative, or so large that the chunk counts it implies overflow.
    #[error("load distance {0} is negative or too large")]
    InvalidLoadDistance(i32),
    /// Chunks would be rendered that are never kept loaded.
    #[error("render distance {render} exceeds load distance {load}")]
    RenderDistanceExceedsLoadDistance {
        /// Configured render distance
        render: i32,
        /// Configured load distance
        load: i32,
    },
    /// No chunk would ever be loaded.
    #[error("at least one chunk must be loaded per tick")]
    ZeroLoadBudget,
    /// Dirty chunks would never be remeshed.
    #[error("at least one chunk must be remeshed per tick")]
    ZeroRemeshBudget,
    /// The chunk pools cannot hold every chunk inside the load distance.
    #[error("chunk capacity {capacity} cannot hold the {required} chunks within load distance")]
    InsufficientChunkCapacity {
        /// Configured or allocator capacity
        capacity: usize,
        /// Chunks inside the load cube
        required: usize,
    },
    /// The scratch arena sizes are inconsistent or too small for one tick.
    #[error("frame arena commits {committed} bytes and reserves {reserved}, needs at least {required} reserved")]
    InvalidArenaSize {
        /// Initially committed bytes
        committed: usize,
        /// Reserved bytes
        reserved: usize,
        /// Smallest reservation a tick can run in
        required: usize,
    },
    /// A block name does not match any block type.
    #[error("unknown block name '{0}'")]
    UnknownBlockName(String),
}

/// Parameters of the streaming loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Chebyshev radius, in chunks, of the cube kept loaded around the player
    pub load_distance: i32,
    /// Chebyshev radius, in chunks, of the cube handed to the renderer
    pub render_distance: i32,
    /// Chunks generated per tick at most
    pub max_chunk_loads_per_tick: usize,
    /// Chunk meshes rebuilt per tick at most
    pub max_chunk_remeshes_per_tick: usize,
    /// Overrides the chunk pool capacity derived from the load distance.
    ///
    /// Both chunk pools reserve their full capacity up front, one 32 KiB block array per
    /// slot. The derived bound for the default load distance of 8 is 9³ × 32 = 23 328
    /// slots, roughly 764 MB of block arrays, so memory-constrained hosts should set this
    /// to something closer to the 17³ = 4 913 chunks the load cube actually holds.
    pub max_chunks: Option<usize>,
    /// Bytes of the scratch arena committed up front
    pub frame_arena_committed: usize,
    /// Bytes of address space reserved for the scratch arena
    pub frame_arena_reserved: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        StreamingConfig {
            load_distance: 8,
            render_distance: 8,
            max_chunk_loads_per_tick: 64,
            max_chunk_remeshes_per_tick: 8,
            max_chunks: None,
            frame_arena_committed: 64 * 1024,
            frame_arena_reserved: 16 * 1024 * 1024,
        }
    }
}

impl StreamingConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: StreamingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Number of chunks inside the load cube, `(2 × load_distance + 1)³`.
    ///
    /// Saturates at `usize::MAX` for load distances that [`validate`](Self::validate) rejects.
    pub fn chunks_in_load_cube(&self) -> usize {
        self.checked_chunks_in_load_cube().unwrap_or(usize::MAX)
    }

    /// Capacity of the chunk pools.
    ///
    /// Saturates at `usize::MAX` for load distances that [`validate`](Self::validate) rejects.
    pub fn chunk_capacity(&self) -> usize {
        self.max_chunks
            .or_else(|| ChunkAllocator::capacity_for_load_distance(self.load_distance))
            .unwrap_or(usize::MAX)
    }

    /// Smallest frame arena reservation a tick can run in.
    ///
    /// A remesh copies the chunk plus its one-block shell into the arena, and an unload
    /// pass lists at most every loaded chunk there.
    pub fn min_frame_arena_bytes(&self) -> usize {
        self.checked_min_frame_arena_bytes().unwrap_or(usize::MAX)
    }

    fn checked_chunks_in_load_cube(&self) -> Option<usize> {
        let side = usize::try_from(self.load_distance)
            .ok()?
            .checked_mul(2)?
            .checked_add(1)?;
        side.checked_mul(side)?.checked_mul(side)
    }

    fn checked_min_frame_arena_bytes(&self) -> Option<usize> {
        let neighborhood = CHUNK_SIZE_WRAPPED * mem::size_of::<Block>();
        let evictions = self
            .checked_chunks_in_load_cube()?
            .checked_mul(mem::size_of::<ChunkCoord>())?;
        neighborhood.checked_add(evictions)
    }

    /// Checks that the streaming loop can run within the configured capacities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let load_cube = self.checked_chunks_in_load_cube();
        let derived_capacity = ChunkAllocator::capacity_for_load_distance(self.load_distance);
        let min_arena = self.checked_min_frame_arena_bytes();
        if load_cube.is_none() || derived_capacity.is_none() || min_arena.is_none() {
            return Err(ConfigError::InvalidLoadDistance(self.load_distance));
        }
        if self.render_distance > self.load_distance {
            return Err(ConfigError::RenderDistanceExceedsLoadDistance {
                render: self.render_distance,
                load: self.load_distance,
            });
        }
        if self.max_chunk_loads_per_tick == 0 {
            return Err(ConfigError::ZeroLoadBudget);
        }
        if self.max_chunk_remeshes_per_tick == 0 {
            return Err(ConfigError::ZeroRemeshBudget);
        }
        if self.chunk_capacity() < self.chunks_in_load_cube() {
            return Err(ConfigError::InsufficientChunkCapacity {
                capacity: self.chunk_capacity(),
                required: self.chunks_in_load_cube(),
            });
        }
        let required = self.min_frame_arena_bytes();
        if self.frame_arena_reserved < required
            || self.frame_arena_committed > self.frame_arena_reserved
        {
            return Err(ConfigError::InvalidArenaSize {
                committed: self.frame_arena_committed,
                reserved: self.frame_arena_reserved,
                required,
            });
        }
        Ok(())
    }
}

/// Configuration of the headless driver binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Streaming parameters
    pub streaming: StreamingConfig,
    /// Terrain seed
    pub seed: u32,
    /// Number of ticks to simulate
    pub ticks: u32,
    /// Distance the simulated player walks per tick, in blocks
    pub player_speed: f32,
    /// Name of the block the simulated player places
    pub place_block: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            streaming: StreamingConfig {
                load_distance: 4,
                render_distance: 4,
                ..StreamingConfig::default()
            },
            seed: 0,
            ticks: 240,
            player_speed: 2.0,
            place_block: "stone".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.streaming.validate()?;
        config.place_block()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// The block the simulated player places.
    pub fn place_block(&self) -> Result<Block, ConfigError> {
        BlockType::from_name(&self.place_block.to_lowercase())
            .map(Block::new)
            .ok_or_else(|| ConfigError::UnknownBlockName(self.place_block.clone()))
    }
}
