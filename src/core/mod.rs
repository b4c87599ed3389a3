//! # Core Module
//!
//! Memory primitives shared by the rest of the crate. Nothing in here knows about
//! voxels.
//!
//! ## Key Components
//! - `PoolAllocator`: fixed-capacity object pool with an intrusive free list and
//!   generation-checked handles
//! - `ArenaAllocator`: bump allocator over a single reservation with marker rollback
//! - `LruCache`: bounded least-recently-used cache for generator intermediates
//!
//! ## Usage
//! ```rust
//! use voxel_streaming::core::{LruCache, PoolAllocator};
//!
//! let mut pool = PoolAllocator::new(8);
//! let handle = pool.alloc([0u8; 16]).unwrap();
//! assert_eq!(pool.live_count(), 1);
//! pool.dealloc(handle);
//!
//! let mut cache = LruCache::new(1);
//! cache.insert("column", 64);
//! assert_eq!(cache.get(&"column"), Some(&64));
//! ```

pub mod arena_allocator;
pub mod lru_cache;
pub mod pool_allocator;

pub use arena_allocator::{ArenaAllocator, ArenaMarker, PAGE_SIZE};
pub use lru_cache::LruCache;
pub use pool_allocator::{PoolAllocator, PoolHandle};
