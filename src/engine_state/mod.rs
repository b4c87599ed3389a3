//! # Engine State Module
//!
//! The core engine module that owns the streamed world and drives it one tick at a time.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `config` - Streaming and driver configuration, loaded from JSON
//! * `rendering` - The chunk vertex format and the mesher
//! * `voxels` - Blocks, chunks, terrain generation and the world
//!
//! ## Architecture
//!
//! The engine state is a thin coordinator. Each tick it asks a
//! [`PlayerPositionProvider`] where the player is, hands that position to the
//! [`World`], and reports what the tick did and how long it took. Everything else
//! (input, cameras, GPU upload) sits outside and talks to the engine through the
//! provider and the world's render lists.
//!
//! ## Performance Considerations
//!
//! * Chunk loading and remeshing are budgeted per tick by the streaming configuration
//! * Tick duration is measured with `web_time` so the same code runs on web targets

use cgmath::Point3;
use web_time::{Duration, Instant};

use config::{ConfigError, StreamingConfig};
use voxels::{
    coords::ChunkCoord,
    generation::ChunkGenerator,
    world::{StreamingStats, World},
};

pub mod config;
pub mod rendering;
pub mod voxels;

/// Supplies the player's position once per tick.
pub trait PlayerPositionProvider {
    /// The player's current position in world space.
    fn player_position(&self) -> Point3<f32>;
}

impl PlayerPositionProvider for Point3<f32> {
    fn player_position(&self) -> Point3<f32> {
        *self
    }
}

/// What a single engine tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Number of the tick, starting at 1
    pub tick: u64,
    /// The chunk the player stood in
    pub player_chunk: ChunkCoord,
    /// Streaming work done during the tick
    pub stats: StreamingStats,
    /// Wall-clock time spent in the tick
    pub duration: Duration,
}

/// The main state container for the voxel engine.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_streaming::prelude::*;
///
/// let config = StreamingConfig {
///     load_distance: 1,
///     render_distance: 1,
///     ..StreamingConfig::default()
/// };
/// let mut engine = EngineState::new(config, FlatGenerator::new(1, Block::new(BlockType::GRASS))).unwrap();
///
/// let report = engine.process_tick(&Point3::new(0.0, 0.0, 0.0));
/// assert_eq!(report.tick, 1);
/// assert_eq!(report.stats.chunks_loaded, 27);
/// ```
pub struct EngineState<G: ChunkGenerator> {
    /// The streamed voxel world
    world: World<G>,
    /// Number of ticks processed so far
    ticks: u64,
}

impl<G: ChunkGenerator> EngineState<G> {
    /// Creates an engine around an empty world.
    ///
    /// # Arguments
    ///
    /// * `config` - Streaming parameters for the world
    /// * `generator` - Terrain source for newly loaded chunks
    ///
    /// # Returns
    ///
    /// An error if `config` is invalid.
    pub fn new(config: StreamingConfig, generator: G) -> Result<Self, ConfigError> {
        Ok(EngineState {
            world: World::new(config, generator)?,
            ticks: 0,
        })
    }

    /// Runs one streaming tick at the position reported by `provider`.
    pub fn process_tick(&mut self, provider: &impl PlayerPositionProvider) -> TickReport {
        let start = Instant::now();
        let position = provider.player_position();

        let stats = self.world.update(position);
        self.ticks += 1;

        let report = TickReport {
            tick: self.ticks,
            player_chunk: ChunkCoord::from_world_position(position),
            stats,
            duration: start.elapsed(),
        };

        log::debug!(
            "Tick {}: loaded {}, evicted {}, remeshed {}, skipped {} empty in {:?}",
            report.tick,
            stats.chunks_loaded,
            stats.chunks_evicted,
            stats.chunks_remeshed,
            stats.empty_chunks_skipped,
            report.duration
        );

        report
    }

    /// Number of ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The streamed world.
    pub fn world(&self) -> &World<G> {
        &self.world
    }

    /// The streamed world, for block edits.
    pub fn world_mut(&mut self) -> &mut World<G> {
        &mut self.world
    }
}
