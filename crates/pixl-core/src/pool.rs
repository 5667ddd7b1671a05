/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A small pooling allocator for pixel storage
//!
//! Pixel buffers come and go at a high rate when images are decoded and
//! processed, so instead of hitting the system allocator for every buffer
//! we keep a fixed number of uniformly sized blocks around and hand them
//! out on request.
//!
//! The pool stores raw bytes; callers decide what element type lives in a
//! block. Blocks are always zero filled when rented, decoders rely on that
//! for bytes they never write (e.g row padding).

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytemuck::Pod;
use log::trace;

/// Minimum alignment for every block handed out by the pool
///
/// This makes it possible to reinterpret block memory safely
/// as any pixel component type without worrying about
/// misaligned reads on platforms where those are UB
///
/// 64 covers the widest register types in use
pub const MIN_ALIGNMENT: usize = 64;

/// Default size in bytes of one pooled block
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Default number of blocks the pool will keep around
pub const DEFAULT_POOL_SLOTS: usize = 5;

/// An exclusively owned, aligned, contiguous region of raw bytes
///
/// A block is created zeroed and is freed when dropped, so a block that
/// never makes it back into a pool does not leak.
pub struct MemoryBlock {
    ptr:      NonNull<u8>,
    capacity: usize
}

// Safety: the pointer is uniquely owned by the block and never aliased,
// moving the owner across threads is fine.
unsafe impl Send for MemoryBlock {}

unsafe impl Sync for MemoryBlock {}

impl MemoryBlock {
    /// Allocate a new zeroed block of `capacity` bytes
    ///
    /// Allocation failure is fatal, there is no sensible inline
    /// recovery for a caller that needed pixel storage.
    fn alloc(capacity: usize) -> MemoryBlock {
        // Layout of zero size is rejected by the allocator, keep a one byte floor
        let size = capacity.max(1);
        let layout = Layout::from_size_align(size, MIN_ALIGNMENT).unwrap();

        let ptr = unsafe { alloc_zeroed(layout) };

        let Some(ptr) = NonNull::new(ptr) else {
            handle_alloc_error(layout);
        };

        MemoryBlock { ptr, capacity }
    }

    /// Number of bytes this block can hold
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reset every byte in the block to zero
    fn zero(&mut self) {
        unsafe {
            self.ptr.as_ptr().write_bytes(0, self.capacity);
        }
    }

    /// View the first `elements` items of the block as a slice of `T`
    ///
    /// # Panics
    /// If `elements * size_of::<T>()` exceeds the block capacity, which
    /// indicates a logic error in the owning container.
    pub fn slice_of<T: Pod>(&self, elements: usize) -> &[T] {
        let bytes = elements * core::mem::size_of::<T>();
        assert!(bytes <= self.capacity, "slice overruns block capacity");
        // Safety: the allocation is aligned to MIN_ALIGNMENT which exceeds
        // the alignment of any Pod component we store, the length was
        // checked above and we own the memory exclusively.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr().cast::<T>(), elements) }
    }

    /// Mutable version of [`slice_of`](Self::slice_of)
    pub fn slice_of_mut<T: Pod>(&mut self, elements: usize) -> &mut [T] {
        let bytes = elements * core::mem::size_of::<T>();
        assert!(bytes <= self.capacity, "slice overruns block capacity");
        // Safety: see slice_of, plus we hold &mut self hence no aliasing.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<T>(), elements) }
    }
}

impl Drop for MemoryBlock {
    fn drop(&mut self) {
        let size = self.capacity.max(1);
        let layout = Layout::from_size_align(size, MIN_ALIGNMENT).unwrap();
        // Safety: same layout used for alloc, the pointer is owned by us
        // and dropped exactly once.
        unsafe {
            dealloc(self.ptr.as_ptr(), layout);
        }
    }
}

struct PoolInner {
    block_size: usize,
    slots:      usize,
    cache:      Mutex<Vec<MemoryBlock>>,
    hits:       AtomicU64,
    misses:     AtomicU64
}

/// A fixed capacity cache of uniformly sized memory blocks
///
/// The pool keeps at most [`DEFAULT_POOL_SLOTS`] blocks of exactly one
/// configured byte size. Requests larger than the configured size bypass
/// the cache entirely and are allocated (and later freed) individually.
///
/// Cloning the pool is cheap and yields a handle to the same cache.
///
/// # Example
/// ```
/// use pixl_core::pool::BufferPool;
///
/// let pool = BufferPool::new();
/// let block = pool.rent::<u16>(100);
/// assert!(block.capacity() >= 200);
/// pool.ret(block);
/// ```
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferPool {
    /// Create a pool with the default block size and slot count
    pub fn new() -> BufferPool {
        BufferPool::with_block_size(DEFAULT_BLOCK_SIZE, DEFAULT_POOL_SLOTS)
    }

    /// Create a pool whose cached blocks are all `block_size` bytes,
    /// keeping at most `slots` blocks alive between rents
    pub fn with_block_size(block_size: usize, slots: usize) -> BufferPool {
        BufferPool {
            inner: Arc::new(PoolInner {
                block_size,
                slots,
                cache: Mutex::new(Vec::with_capacity(slots)),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0)
            })
        }
    }

    /// The byte size of blocks this pool caches
    pub fn block_size(&self) -> usize {
        self.inner.block_size
    }

    /// Rent a zeroed block able to hold at least `min_bytes` bytes
    ///
    /// Blocks larger than the pool's configured block size are allocated
    /// with the exact requested capacity and will be freed individually
    /// when returned.
    pub fn rent_bytes(&self, min_bytes: usize) -> MemoryBlock {
        if min_bytes > self.inner.block_size {
            trace!("pool bypass, {} bytes exceeds block size", min_bytes);
            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            return MemoryBlock::alloc(min_bytes);
        }

        let cached = self.inner.cache.lock().unwrap().pop();

        match cached {
            Some(mut block) => {
                // previous owner may have scribbled over it
                block.zero();
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                block
            }
            None => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                MemoryBlock::alloc(self.inner.block_size)
            }
        }
    }

    /// Rent a zeroed block able to hold at least `elements` items of `T`
    pub fn rent<T: Pod>(&self, elements: usize) -> MemoryBlock {
        self.rent_bytes(elements * core::mem::size_of::<T>())
    }

    /// Return a block to the pool
    ///
    /// Only blocks of exactly the configured block size are cached, and
    /// only while there is a free slot; everything else is freed here.
    pub fn ret(&self, block: MemoryBlock) {
        if block.capacity() == self.inner.block_size {
            let mut cache = self.inner.cache.lock().unwrap();

            if cache.len() < self.inner.slots {
                cache.push(block);
                return;
            }
        }
        // drop frees it
    }

    /// Number of rents satisfied from the cache, test observability
    pub fn cache_hits(&self) -> u64 {
        self.inner.hits.load(Ordering::Relaxed)
    }

    /// Number of rents that went to the system allocator
    pub fn cache_misses(&self) -> u64 {
        self.inner.misses.load(Ordering::Relaxed)
    }

    /// Number of blocks currently parked in the cache
    pub fn cached_blocks(&self) -> usize {
        self.inner.cache.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rented_memory_is_zeroed() {
        let pool = BufferPool::with_block_size(64, 2);
        let mut block = pool.rent::<u8>(64);
        block.slice_of_mut::<u8>(64).fill(0xAB);
        pool.ret(block);

        // the same block comes back, but scrubbed
        let block = pool.rent::<u8>(64);
        assert!(block.slice_of::<u8>(64).iter().all(|x| *x == 0));
    }

    #[test]
    fn pooled_size_block_reuses_cache_slot() {
        let pool = BufferPool::with_block_size(256, 5);
        let block = pool.rent::<u8>(100);
        assert_eq!(pool.cache_hits(), 0);
        pool.ret(block);
        assert_eq!(pool.cached_blocks(), 1);

        let _block = pool.rent::<u8>(100);
        assert_eq!(pool.cache_hits(), 1);
        assert_eq!(pool.cached_blocks(), 0);
    }

    #[test]
    fn oversize_block_never_enters_cache() {
        let pool = BufferPool::with_block_size(64, 5);
        let block = pool.rent::<u8>(1000);
        assert_eq!(block.capacity(), 1000);
        pool.ret(block);
        assert_eq!(pool.cached_blocks(), 0);
    }

    #[test]
    fn full_cache_frees_extra_returns() {
        let pool = BufferPool::with_block_size(64, 1);
        let a = pool.rent::<u8>(10);
        let b = pool.rent::<u8>(10);
        pool.ret(a);
        pool.ret(b);
        assert_eq!(pool.cached_blocks(), 1);
    }

    #[test]
    fn rent_is_sized_in_elements() {
        let pool = BufferPool::new();
        let block = pool.rent::<f32>(100);
        assert!(block.capacity() >= 400);
        assert_eq!(block.slice_of::<f32>(100).len(), 100);
    }
}
