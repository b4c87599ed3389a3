//! # Pool Allocator Module
//!
//! A fixed-capacity, fixed-object-size allocator with O(1) allocation and
//! deallocation.
//!
//! ## Key Components
//!
//! * `PoolAllocator<T>` - The pool itself, a single reservation of `max_objects` slots
//! * `PoolHandle<T>` - A generation-checked handle to a live object in the pool
//!
//! ## Architecture
//!
//! Every slot is either occupied by a live value or vacant. Vacant slots form an
//! intrusive singly-linked free list: each vacant slot stores the index of the next
//! vacant slot, and the pool keeps the index of the head. Allocation pops the head,
//! deallocation pushes the freed slot back onto the head.
//!
//! Slots beyond the initialised length of the backing storage are implicitly at the
//! tail of the free list. The storage is reserved once up front and never grows past
//! `max_objects`, so the address of every live object stays inside the original
//! reservation for the life of the pool.
//!
//! Handles carry the generation of the slot they were issued for. Freeing a slot bumps
//! its generation, so a stale handle can never reach the value that later reuses the
//! slot.
//!
//! ## Performance Considerations
//!
//! * No per-allocation heap traffic once the slots have been touched
//! * Most-recently-freed slots are reused first, keeping hot memory hot
//! * Not thread safe; the pool assumes a single owner

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// A generation-checked reference to an object living in a [`PoolAllocator`].
///
/// Handles are plain copyable values. They do not keep the object alive and they
/// become stale once the object is deallocated or the pool is reset.
pub struct PoolHandle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolHandle<T> {
    fn new(index: u32, generation: u32) -> Self {
        PoolHandle {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// The slot index this handle points at.
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolHandle<T> {}

impl<T> PartialEq for PoolHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for PoolHandle<T> {}

impl<T> Hash for PoolHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle({}v{})", self.index, self.generation)
    }
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// A fixed-capacity pool of `T` values addressed through [`PoolHandle`]s.
///
/// # Examples
///
/// ```
/// use voxel_streaming::core::PoolAllocator;
///
/// let mut pool = PoolAllocator::new(2);
/// let a = pool.alloc(10u32).unwrap();
/// let _b = pool.alloc(20u32).unwrap();
/// assert!(pool.alloc(30u32).is_none());
///
/// assert_eq!(pool.dealloc(a), 10);
/// assert!(pool.get(a).is_none());
/// ```
pub struct PoolAllocator<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    max_objects: usize,
    live_objects: usize,
}

impl<T> PoolAllocator<T> {
    /// Reserves storage for `max_objects` values.
    ///
    /// # Arguments
    /// * `max_objects` - The fixed capacity of the pool
    ///
    /// # Panics
    /// Panics if `max_objects` is zero or does not fit in a `u32` slot index.
    pub fn new(max_objects: usize) -> Self {
        assert!(max_objects > 0, "a pool needs at least one slot");
        assert!(
            max_objects <= u32::MAX as usize,
            "pool capacity {max_objects} exceeds the slot index range"
        );

        PoolAllocator {
            slots: Vec::with_capacity(max_objects),
            free_head: None,
            max_objects,
            live_objects: 0,
        }
    }

    /// Moves `value` into a free slot.
    ///
    /// # Returns
    /// A handle to the stored value, or `None` when every slot is occupied. The pool
    /// never grows; callers decide whether exhaustion is fatal.
    pub fn alloc(&mut self, value: T) -> Option<PoolHandle<T>> {
        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            let (generation, next_free) = match slot {
                Slot::Vacant {
                    generation,
                    next_free,
                } => (*generation, *next_free),
                Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            *slot = Slot::Occupied { generation, value };
            self.free_head = next_free;
            self.live_objects += 1;
            return Some(PoolHandle::new(index, generation));
        }

        if self.slots.len() < self.max_objects {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied {
                generation: 0,
                value,
            });
            self.live_objects += 1;
            return Some(PoolHandle::new(index, 0));
        }

        None
    }

    /// Returns the slot behind `handle` to the head of the free list.
    ///
    /// # Returns
    /// The value that was stored in the slot.
    ///
    /// # Panics
    /// Panics if the handle is stale, which means it was already freed or the pool was
    /// reset since it was issued.
    pub fn dealloc(&mut self, handle: PoolHandle<T>) -> T {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|slot| matches!(slot, Slot::Occupied { generation, .. } if *generation == handle.generation));
        let Some(slot) = slot else {
            panic!("double free or stale handle {handle:?}");
        };

        let vacant = Slot::Vacant {
            generation: handle.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let Slot::Occupied { value, .. } = std::mem::replace(slot, vacant) else {
            unreachable!("slot was checked to be occupied");
        };

        self.free_head = Some(handle.index);
        self.live_objects -= 1;
        value
    }

    /// Borrows the value behind `handle`, or `None` if the handle is stale.
    pub fn get(&self, handle: PoolHandle<T>) -> Option<&T> {
        match self.slots.get(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Mutably borrows the value behind `handle`, or `None` if the handle is stale.
    pub fn get_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Drops every live value and relinks every slot into the free list.
    ///
    /// All outstanding handles become stale.
    pub fn reset(&mut self) {
        let mut next_free = None;
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            let generation = match slot {
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
                Slot::Vacant { generation, .. } => *generation,
            };
            *slot = Slot::Vacant {
                generation,
                next_free,
            };
            next_free = Some(index as u32);
        }

        self.free_head = next_free;
        self.live_objects = 0;
    }

    /// The number of values currently stored in the pool.
    pub fn live_count(&self) -> usize {
        self.live_objects
    }

    /// The fixed capacity of the pool.
    pub fn capacity(&self) -> usize {
        self.max_objects
    }

    /// Whether another allocation would succeed.
    pub fn is_full(&self) -> bool {
        self.live_objects == self.max_objects
    }
}

impl<T> fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("live_objects", &self.live_objects)
            .field("max_objects", &self.max_objects)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_until_exhausted() {
        let mut pool = PoolAllocator::new(3);
        let handles: Vec<_> = (0..3).map(|i| pool.alloc(i).unwrap()).collect();

        assert!(pool.is_full());
        assert!(pool.alloc(99).is_none(), "a full pool must not grow");
        for (i, handle) in handles.iter().enumerate() {
            assert_eq!(pool.get(*handle), Some(&i));
        }
    }

    #[test]
    fn test_freed_slot_is_reused_first() {
        let mut pool = PoolAllocator::new(4);
        let _a = pool.alloc('a').unwrap();
        let b = pool.alloc('b').unwrap();
        let _c = pool.alloc('c').unwrap();

        pool.dealloc(b);
        let d = pool.alloc('d').unwrap();

        assert_eq!(d.index(), b.index(), "the free-list head should be reused");
        assert_ne!(d, b, "the reused slot must carry a new generation");
        assert!(pool.get(b).is_none());
        assert_eq!(pool.get(d), Some(&'d'));
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut pool = PoolAllocator::new(1);
        let handle = pool.alloc(vec![1, 2]).unwrap();
        pool.get_mut(handle).unwrap().push(3);

        assert_eq!(pool.dealloc(handle), vec![1, 2, 3]);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn test_double_free_panics() {
        let mut pool = PoolAllocator::new(2);
        let handle = pool.alloc(1u8).unwrap();
        pool.dealloc(handle);
        pool.dealloc(handle);
    }

    #[test]
    fn test_reset_invalidates_handles_and_restores_capacity() {
        let mut pool = PoolAllocator::new(2);
        let a = pool.alloc(1).unwrap();
        let b = pool.alloc(2).unwrap();

        pool.reset();

        assert_eq!(pool.live_count(), 0);
        assert!(pool.get(a).is_none());
        assert!(pool.get(b).is_none());
        assert!(pool.alloc(3).is_some());
        assert!(pool.alloc(4).is_some());
        assert!(pool.alloc(5).is_none());
    }
}
