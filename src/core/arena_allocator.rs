//! # Arena Allocator Module
//!
//! A bump allocator over a single reservation, used for scoped scratch memory such as
//! the per-rebuild neighbourhood copy in the mesher and the eviction list of the unload
//! step.
//!
//! ## Architecture
//!
//! The arena reserves `reserved` bytes once. A bump offset moves forward on every
//! allocation; a second watermark, the committed size, tracks how much of the
//! reservation is considered backing memory and grows in page-sized steps whenever the
//! bump offset crosses it. Nothing is ever freed individually. Instead callers take a
//! [`ArenaMarker`] before a scope and restore it afterwards, reclaiming everything
//! allocated since in O(1).
//!
//! Allocation takes `&self` so that several slices can be live at once. Rolling the
//! offset back takes `&mut self`, which the borrow checker only grants once every slice
//! handed out by the arena has been dropped.
//!
//! ## Performance Considerations
//!
//! * Allocation is a pointer bump plus an alignment mask
//! * Only memory that has actually been bumped past is touched
//! * Only `Pod` types are handed out, so rollback never has to run destructors

use std::{
    alloc::{self, Layout},
    cell::Cell,
    fmt, mem,
    ptr::NonNull,
    slice,
};

/// Granularity of committed-memory growth.
pub const PAGE_SIZE: usize = 4096;

/// A saved bump offset; see [`ArenaAllocator::restore_marker`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArenaMarker(usize);

/// Rounds `value` up to the next multiple of `align`, which must be a power of two.
fn align_up(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

/// A bump-pointer allocator with marker-based bulk rollback.
///
/// # Examples
///
/// ```
/// use voxel_streaming::core::ArenaAllocator;
///
/// let mut arena = ArenaAllocator::new(4096, 1 << 16);
/// let marker = arena.marker();
/// {
///     let scratch = arena.alloc_slice::<u32>(256);
///     scratch[0] = 7;
///     assert_eq!(scratch.len(), 256);
/// }
/// arena.restore_marker(marker);
/// assert_eq!(arena.used(), 0);
/// ```
pub struct ArenaAllocator {
    base: NonNull<u8>,
    layout: Layout,
    offset: Cell<usize>,
    committed: Cell<usize>,
}

impl ArenaAllocator {
    /// Reserves `reserved` bytes and commits the first `committed` of them.
    ///
    /// # Arguments
    /// * `committed` - Initial backing size, rounded up to a whole page
    /// * `reserved` - Hard upper bound on the arena; zero means "same as committed"
    ///
    /// # Panics
    /// Panics if the reservation is empty or `committed` exceeds `reserved`.
    pub fn new(committed: usize, reserved: usize) -> Self {
        let reserved = if reserved == 0 { committed } else { reserved };
        assert!(reserved > 0, "arena reservation must be non-empty");
        assert!(
            committed <= reserved,
            "arena commits {committed} bytes but only reserves {reserved}"
        );

        let reserved = align_up(reserved, PAGE_SIZE);
        let layout = match Layout::from_size_align(reserved, PAGE_SIZE) {
            Ok(layout) => layout,
            Err(err) => panic!("invalid arena layout for {reserved} bytes: {err}"),
        };

        // SAFETY: the layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let Some(base) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };

        log::trace!("Arena reserved {} bytes, committed {}", reserved, committed);

        ArenaAllocator {
            base,
            layout,
            offset: Cell::new(0),
            committed: Cell::new(align_up(committed, PAGE_SIZE).min(reserved)),
        }
    }

    /// Bump-allocates `size` bytes aligned to `align`.
    ///
    /// # Panics
    /// Panics if `align` is not a power of two no larger than [`PAGE_SIZE`], or if the
    /// allocation would run past the reservation.
    pub fn alloc_bytes(&self, size: usize, align: usize) -> NonNull<u8> {
        assert!(
            align.is_power_of_two() && align <= PAGE_SIZE,
            "unsupported arena alignment {align}"
        );

        let start = align_up(self.offset.get(), align);
        let end = start
            .checked_add(size)
            .filter(|end| *end <= self.reserved());
        let Some(end) = end else {
            log::error!(
                "Arena exhausted: {} bytes requested at offset {} of {}",
                size,
                start,
                self.reserved()
            );
            panic!("arena allocation exceeds the reserved region");
        };

        if end > self.committed.get() {
            let committed = align_up(end, PAGE_SIZE).min(self.reserved());
            log::trace!("Arena committed {} -> {} bytes", self.committed.get(), committed);
            self.committed.set(committed);
        }
        self.offset.set(end);

        // SAFETY: start <= reserved, so the pointer stays within the allocation.
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(start)) }
    }

    /// Allocates a zero-initialised slice of `len` values.
    ///
    /// The slice lives until the arena is rolled back past it.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc_slice<T: bytemuck::Pod>(&self, len: usize) -> &mut [T] {
        let Some(size) = mem::size_of::<T>().checked_mul(len) else {
            panic!("arena slice of {len} elements overflows");
        };
        let ptr = self.alloc_bytes(size, mem::align_of::<T>()).cast::<T>();

        // SAFETY: the region is freshly bumped, so it is disjoint from every other live
        // allocation, it is properly aligned for T, and an all-zero bit pattern is a valid
        // T because T is Pod.
        unsafe {
            ptr.as_ptr().write_bytes(0, len);
            slice::from_raw_parts_mut(ptr.as_ptr(), len)
        }
    }

    /// Copies `value` into the arena.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc<T: bytemuck::Pod>(&self, value: T) -> &mut T {
        let slot = &mut self.alloc_slice::<T>(1)[0];
        *slot = value;
        slot
    }

    /// Captures the current bump offset.
    pub fn marker(&self) -> ArenaMarker {
        ArenaMarker(self.offset.get())
    }

    /// Rolls the bump offset back to `marker`, reclaiming everything allocated after it.
    ///
    /// # Panics
    /// Panics if the marker lies beyond the current offset.
    pub fn restore_marker(&mut self, marker: ArenaMarker) {
        assert!(
            marker.0 <= self.offset.get(),
            "arena marker {} is ahead of the current offset {}",
            marker.0,
            self.offset.get()
        );
        self.offset.set(marker.0);
    }

    /// Rolls the arena back to empty. Committed memory is kept.
    pub fn clear(&mut self) {
        self.offset.set(0);
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> usize {
        self.offset.get()
    }

    /// Bytes currently committed.
    pub fn committed(&self) -> usize {
        self.committed.get()
    }

    /// Size of the reservation.
    pub fn reserved(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for ArenaAllocator {
    fn drop(&mut self) {
        // SAFETY: base was allocated in `new` with exactly this layout.
        unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) };
    }
}

impl fmt::Debug for ArenaAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaAllocator")
            .field("used", &self.used())
            .field("committed", &self.committed())
            .field("reserved", &self.reserved())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_are_aligned() {
        let arena = ArenaAllocator::new(PAGE_SIZE, PAGE_SIZE * 4);
        let _byte = arena.alloc_bytes(1, 1);
        let word = arena.alloc_bytes(8, 8);
        let wide = arena.alloc_bytes(4, 64);

        assert_eq!(word.as_ptr() as usize % 8, 0);
        assert_eq!(wide.as_ptr() as usize % 64, 0);
        assert_eq!(arena.used(), 64 + 4);
    }

    #[test]
    fn test_commit_grows_in_pages() {
        let arena = ArenaAllocator::new(0, PAGE_SIZE * 8);
        assert_eq!(arena.committed(), 0);

        arena.alloc_bytes(10, 1);
        assert_eq!(arena.committed(), PAGE_SIZE);

        arena.alloc_bytes(PAGE_SIZE, 1);
        assert_eq!(arena.committed(), PAGE_SIZE * 2);
    }

    #[test]
    fn test_marker_reclaims_scope() {
        let mut arena = ArenaAllocator::new(PAGE_SIZE, PAGE_SIZE * 4);
        arena.alloc_slice::<u64>(4);
        let marker = arena.marker();

        let scratch = arena.alloc_slice::<u32>(100);
        scratch.iter_mut().for_each(|v| *v = 0xdead_beef);
        arena.restore_marker(marker);
        assert_eq!(arena.used(), 32);

        let again = arena.alloc_slice::<u32>(100);
        assert!(again.iter().all(|v| *v == 0), "reused memory must come back zeroed");
    }

    #[test]
    #[should_panic(expected = "exceeds the reserved region")]
    fn test_exceeding_reservation_panics() {
        let arena = ArenaAllocator::new(PAGE_SIZE, PAGE_SIZE);
        arena.alloc_bytes(PAGE_SIZE + 1, 1);
    }

    #[test]
    #[should_panic(expected = "ahead of the current offset")]
    fn test_restoring_future_marker_panics() {
        let mut arena = ArenaAllocator::new(PAGE_SIZE, PAGE_SIZE);
        arena.alloc_bytes(128, 1);
        let marker = arena.marker();
        arena.clear();
        arena.restore_marker(marker);
    }
}
