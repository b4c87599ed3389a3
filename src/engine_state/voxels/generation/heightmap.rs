//! # Heightmap Generator
//!
//! Layered terrain over a 2-D octave Perlin heightmap.
//!
//! ## Architecture
//!
//! Every vertical column of chunks shares one heightmap, so heightmaps are computed per
//! 2-D chunk column and memoised in an [`LruCache`]. Loading a tall stack of chunks then
//! samples the noise once per column instead of once per chunk.
//!
//! Columns are layered from the surface height `h` downwards:
//! - above `h`: water up to the sea level, air above it
//! - at `h`: snow above the snow line, sand at or near the sea level, grass otherwise
//! - the two blocks under `h`: dirt (sand near the sea)
//! - below that: stone

use noise::{NoiseFn, Perlin};

use crate::core::LruCache;
use crate::engine_state::voxels::block::{block_type::BlockType, Block};
use crate::engine_state::voxels::chunk::{BlockArray, CHUNK_BITS, CHUNK_DIMENSION, CHUNK_PLANE_SIZE};
use crate::engine_state::voxels::coords::{ChunkCoord, LocalBlockCoord};

use super::ChunkGenerator;

/// Number of column heightmaps kept in memory.
pub const HEIGHTMAP_CACHE_CAPACITY: usize = 256;

const OCTAVES: u32 = 4;
const PERSISTENCE: f64 = 0.5;
const LACUNARITY: f64 = 2.0;
const BASE_FREQUENCY: f64 = 0.005;
const BASE_AMPLITUDE: f64 = 64.0;
const BASE_HEIGHT: i32 = 60;
const SEA_LEVEL: i32 = 56;
const SNOW_LINE: i32 = 110;
const SOIL_DEPTH: i32 = 2;

/// A 2-D chunk column.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct ColumnCoord {
    x: i32,
    z: i32,
}

/// Surface height of every (x, z) in a chunk column, indexed `x | z << CHUNK_BITS`.
type Heightmap = [i32; CHUNK_PLANE_SIZE];

/// Terrain generator over an octave Perlin heightmap.
pub struct HeightmapGenerator {
    perlin: Perlin,
    heightmaps: LruCache<ColumnCoord, Box<Heightmap>>,
}

impl HeightmapGenerator {
    /// Creates a generator for the given seed.
    pub fn new(seed: u32) -> Self {
        HeightmapGenerator {
            perlin: Perlin::new(seed),
            heightmaps: LruCache::new(HEIGHTMAP_CACHE_CAPACITY),
        }
    }

    /// Surface height of the world column at block `(x, z)`.
    pub fn surface_height(&self, x: i32, z: i32) -> i32 {
        let mut height = 0.0;
        let mut amplitude = BASE_AMPLITUDE;
        let mut frequency = BASE_FREQUENCY;
        for _ in 0..OCTAVES {
            height += self.perlin.get([x as f64 * frequency, z as f64 * frequency]) * amplitude;
            frequency *= LACUNARITY;
            amplitude *= PERSISTENCE;
        }
        height.round() as i32 + BASE_HEIGHT
    }

    /// Number of heightmaps currently cached.
    pub fn cached_columns(&self) -> usize {
        self.heightmaps.len()
    }

    fn heightmap(&mut self, column: ColumnCoord) -> &Heightmap {
        if !self.heightmaps.contains(&column) {
            let mut heights = Box::new([0; CHUNK_PLANE_SIZE]);
            for (index, height) in heights.iter_mut().enumerate() {
                let x = (column.x << CHUNK_BITS) + (index as i32 & (CHUNK_DIMENSION - 1));
                let z = (column.z << CHUNK_BITS) + (index as i32 >> CHUNK_BITS);
                *height = self.surface_height(x, z);
            }
            return self.heightmaps.insert(column, heights);
        }

        match self.heightmaps.get(&column) {
            Some(heights) => heights,
            None => unreachable!("column {column:?} was just checked to be cached"),
        }
    }

    fn block_at(surface: i32, y: i32) -> Block {
        let near_sea = surface <= SEA_LEVEL + 1;
        let block_type = if y > surface {
            if y <= SEA_LEVEL {
                BlockType::WATER
            } else {
                BlockType::AIR
            }
        } else if y == surface {
            if surface >= SNOW_LINE {
                BlockType::SNOW
            } else if near_sea {
                BlockType::SAND
            } else {
                BlockType::GRASS
            }
        } else if y >= surface - SOIL_DEPTH {
            if near_sea {
                BlockType::SAND
            } else {
                BlockType::DIRT
            }
        } else {
            BlockType::STONE
        };
        Block::new(block_type)
    }
}

impl ChunkGenerator for HeightmapGenerator {
    fn generate_chunk(&mut self, coord: ChunkCoord, blocks: &mut BlockArray) {
        let origin_y = coord.origin_block().y;
        let heightmap = self.heightmap(ColumnCoord {
            x: coord.x,
            z: coord.z,
        });

        for (index, block) in blocks.iter_mut().enumerate() {
            let local = LocalBlockCoord::from_index(index);
            let surface = heightmap[local.x() as usize | (local.z() as usize) << CHUNK_BITS];
            *block = Self::block_at(surface, origin_y + local.y() as i32);
        }
    }
}
