//! # Coordinates Module
//!
//! The three coordinate spaces of the voxel world and the conversions between them.
//!
//! ## Key Components
//!
//! * `ChunkCoord` - Position of a chunk, in chunk units
//! * `BlockCoord` - World-space position of a block
//! * `LocalBlockCoord` - Position of a block inside its chunk, packable into an array index
//!
//! ## Conversions
//!
//! A world block coordinate splits into its chunk and local parts with floor division
//! and a non-negative remainder, so block `-1` lives at local `31` of chunk `-1`.
//! Because the chunk dimension is a power of two both operations reduce to shifts and
//! masks.

use std::ops::{Add, Sub};

use cgmath::{Point3, Vector3};

use super::block::block_side::BlockSide;
use super::chunk::{CHUNK_BITS, CHUNK_DIMENSION, CHUNK_MASK};

/// Identifies a chunk in chunk space.
#[repr(C)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, bytemuck::Pod, bytemuck::Zeroable,
)]
pub struct ChunkCoord {
    /// X position in chunks
    pub x: i32,
    /// Y position in chunks
    pub y: i32,
    /// Z position in chunks
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        ChunkCoord { x, y, z }
    }

    /// The chunk containing a floating-point world position.
    ///
    /// # Arguments
    /// * `position` - A world-space position, in blocks
    pub fn from_world_position(position: Point3<f32>) -> Self {
        BlockCoord::from_world_position(position).chunk()
    }

    /// Squared Euclidean length of this coordinate treated as a vector.
    pub fn norm_sq(self) -> i32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Squared Euclidean distance to `other`, in chunks.
    pub fn distance_sq(self, other: ChunkCoord) -> i32 {
        (self - other).norm_sq()
    }

    /// Largest per-axis distance to `other`, in chunks.
    pub fn chebyshev_distance(self, other: ChunkCoord) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// The chunk sharing `side` with this one.
    pub fn neighbor(self, side: BlockSide) -> ChunkCoord {
        self + side.normal()
    }

    /// World coordinate of this chunk's local origin block.
    pub fn origin_block(self) -> BlockCoord {
        BlockCoord::new(
            self.x << CHUNK_BITS,
            self.y << CHUNK_BITS,
            self.z << CHUNK_BITS,
        )
    }
}

impl Add for ChunkCoord {
    type Output = ChunkCoord;

    fn add(self, rhs: ChunkCoord) -> ChunkCoord {
        ChunkCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ChunkCoord {
    type Output = ChunkCoord;

    fn sub(self, rhs: ChunkCoord) -> ChunkCoord {
        ChunkCoord::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Add<Vector3<i32>> for ChunkCoord {
    type Output = ChunkCoord;

    fn add(self, rhs: Vector3<i32>) -> ChunkCoord {
        ChunkCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl From<Point3<i32>> for ChunkCoord {
    fn from(p: Point3<i32>) -> Self {
        ChunkCoord::new(p.x, p.y, p.z)
    }
}

impl From<ChunkCoord> for Point3<i32> {
    fn from(c: ChunkCoord) -> Self {
        Point3::new(c.x, c.y, c.z)
    }
}

/// World-space address of a block.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockCoord {
    /// X position in blocks
    pub x: i32,
    /// Y position in blocks
    pub y: i32,
    /// Z position in blocks
    pub z: i32,
}

impl BlockCoord {
    /// Creates a block coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        BlockCoord { x, y, z }
    }

    /// The block containing a floating-point world position.
    pub fn from_world_position(position: Point3<f32>) -> Self {
        BlockCoord::new(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        )
    }

    /// Reassembles a world coordinate from a chunk and a position inside it.
    pub fn from_parts(chunk: ChunkCoord, local: LocalBlockCoord) -> Self {
        chunk.origin_block() + Vector3::new(local.x as i32, local.y as i32, local.z as i32)
    }

    /// The chunk this block lives in.
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord::new(
            self.x >> CHUNK_BITS,
            self.y >> CHUNK_BITS,
            self.z >> CHUNK_BITS,
        )
    }

    /// This block's position inside its chunk.
    pub fn local(self) -> LocalBlockCoord {
        LocalBlockCoord {
            x: (self.x & CHUNK_MASK) as u8,
            y: (self.y & CHUNK_MASK) as u8,
            z: (self.z & CHUNK_MASK) as u8,
        }
    }
}

impl Add<Vector3<i32>> for BlockCoord {
    type Output = BlockCoord;

    fn add(self, rhs: Vector3<i32>) -> BlockCoord {
        BlockCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl From<Point3<i32>> for BlockCoord {
    fn from(p: Point3<i32>) -> Self {
        BlockCoord::new(p.x, p.y, p.z)
    }
}

/// Position of a block inside its chunk. Every component is in `0..CHUNK_DIMENSION`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocalBlockCoord {
    x: u8,
    y: u8,
    z: u8,
}

impl LocalBlockCoord {
    /// Creates a local coordinate.
    ///
    /// # Panics
    /// Panics if any component is outside the chunk.
    pub fn new(x: u8, y: u8, z: u8) -> Self {
        let dimension = CHUNK_DIMENSION as u8;
        assert!(
            x < dimension && y < dimension && z < dimension,
            "local block coordinate ({x}, {y}, {z}) lies outside the chunk"
        );
        LocalBlockCoord { x, y, z }
    }

    /// Creates a local coordinate from signed components, or `None` if any of them falls
    /// outside the chunk.
    pub fn try_from_offset(x: i32, y: i32, z: i32) -> Option<Self> {
        let inside = |v: i32| (0..CHUNK_DIMENSION).contains(&v);
        (inside(x) && inside(y) && inside(z)).then(|| LocalBlockCoord {
            x: x as u8,
            y: y as u8,
            z: z as u8,
        })
    }

    /// Unpacks an array index produced by [`LocalBlockCoord::to_index`].
    pub fn from_index(index: usize) -> Self {
        let mask = CHUNK_MASK as usize;
        let bits = CHUNK_BITS as usize;
        LocalBlockCoord {
            x: (index & mask) as u8,
            y: ((index >> bits) & mask) as u8,
            z: ((index >> (2 * bits)) & mask) as u8,
        }
    }

    /// Packs this coordinate into a chunk array index, `x | y << k | z << 2k`.
    pub fn to_index(self) -> usize {
        let bits = CHUNK_BITS as usize;
        self.x as usize | (self.y as usize) << bits | (self.z as usize) << (2 * bits)
    }

    /// X component.
    pub fn x(self) -> u8 {
        self.x
    }

    /// Y component.
    pub fn y(self) -> u8 {
        self.y
    }

    /// Z component.
    pub fn z(self) -> u8 {
        self.z
    }

    /// Components as a signed vector, for offset arithmetic.
    pub fn to_vector(self) -> Vector3<i32> {
        Vector3::new(self.x as i32, self.y as i32, self.z as i32)
    }

    /// The chunk faces this block touches.
    ///
    /// A block touches a face when its local coordinate on that face's axis is `0` or
    /// `CHUNK_DIMENSION - 1`. Interior blocks touch none, corner blocks touch three.
    pub fn boundary_sides(self) -> impl Iterator<Item = BlockSide> {
        let last = (CHUNK_DIMENSION - 1) as u8;
        let axis = |v: u8, low: BlockSide, high: BlockSide| match v {
            0 => Some(low),
            v if v == last => Some(high),
            _ => None,
        };
        [
            axis(self.x, BlockSide::LEFT, BlockSide::RIGHT),
            axis(self.y, BlockSide::BOTTOM, BlockSide::TOP),
            axis(self.z, BlockSide::BACK, BlockSide::FRONT),
        ]
        .into_iter()
        .flatten()
    }
}
