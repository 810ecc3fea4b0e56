//! C ABI for [`::blkpool`].
//!
//! ```c
//! typedef struct BlkPool BlkPool;
//!
//! BlkPool *pool_init(void *memory, size_t block_size, size_t num_blocks);
//! void *pool_alloc(BlkPool *pool, size_t size);
//! void pool_free(BlkPool *pool, void *ptr);
//! void pool_destroy(BlkPool *pool);
//! ```
//!
//! Every function accepts null pointers and reports failure only by
//! returning null (or by doing nothing).
use blkpool::{HeapPool, InitError};
use libc::{c_void, size_t};
use std::ptr::{null_mut, slice_from_raw_parts_mut, NonNull};

/// An opaque pool handle.
#[derive(Debug)]
pub struct BlkPool(HeapPool<'static>);

impl BlkPool {
    /// Create a pool of `num_blocks` blocks of `block_size` bytes each over
    /// `memory`, reporting why it failed. [`pool_init`] is this function with
    /// the error mapped to null.
    ///
    /// # Safety
    ///
    /// See [`pool_init`].
    pub unsafe fn from_raw_parts(
        memory: *mut c_void,
        block_size: usize,
        num_blocks: usize,
    ) -> Result<Box<Self>, InitError> {
        let memory = NonNull::new(memory.cast::<u8>()).ok_or(InitError::NullMemory)?;
        let len = block_size
            .checked_mul(num_blocks)
            .ok_or(InitError::SizeOverflow)?;
        // Safety: `memory` is non-null
        let memory = NonNull::new_unchecked(slice_from_raw_parts_mut(memory.as_ptr(), len));

        HeapPool::from_raw_with_capacity(memory, block_size, num_blocks)
            .map(|pool| Box::new(Self(pool)))
    }

    /// Get the underlying pool.
    #[inline]
    pub fn get(&self) -> &HeapPool<'static> {
        &self.0
    }
}

/// Create a pool of `num_blocks` blocks of `block_size` bytes each over the
/// caller-provided `memory`.
///
/// Returns null if `memory` is null, `block_size` or `num_blocks` is zero,
/// `block_size * num_blocks` overflows, or the control table could not be
/// allocated.
///
/// # Safety
///
/// `memory` must be valid for reads and writes of `block_size * num_blocks`
/// bytes until the returned pool is passed to [`pool_destroy`]. The pool
/// never frees `memory`.
#[no_mangle]
pub unsafe extern "C" fn pool_init(
    memory: *mut c_void,
    block_size: size_t,
    num_blocks: size_t,
) -> *mut BlkPool {
    match BlkPool::from_raw_parts(memory, block_size, num_blocks) {
        Ok(pool) => Box::into_raw(pool),
        Err(_) => null_mut(),
    }
}

/// Allocate `size` bytes from `pool`.
///
/// Returns null if `pool` is null, `size` is zero, or no run of free blocks
/// is long enough.
///
/// # Safety
///
/// `pool` must be null or a live pool returned by [`pool_init`].
#[no_mangle]
pub unsafe extern "C" fn pool_alloc(pool: *mut BlkPool, size: size_t) -> *mut c_void {
    match pool.as_mut() {
        Some(pool) => pool
            .0
            .allocate(size)
            .map(|ptr| ptr.cast::<c_void>().as_ptr())
            .unwrap_or(null_mut()),
        None => null_mut(),
    }
}

/// Return the allocation starting at `ptr` to `pool`.
///
/// Does nothing if `pool` or `ptr` is null, or if `ptr` does not point to
/// the start of a live allocation of `pool`.
///
/// # Safety
///
/// `pool` must be null or a live pool returned by [`pool_init`].
#[no_mangle]
pub unsafe extern "C" fn pool_free(pool: *mut BlkPool, ptr: *mut c_void) {
    if let (Some(pool), Some(ptr)) = (pool.as_mut(), NonNull::new(ptr)) {
        pool.0.release(ptr.cast());
    }
}

/// Destroy `pool`, releasing its control table. The memory region passed to
/// [`pool_init`] is not freed.
///
/// Does nothing if `pool` is null.
///
/// # Safety
///
/// `pool` must be null or a live pool returned by [`pool_init`]. It must not
/// be used after this call.
#[no_mangle]
pub unsafe extern "C" fn pool_destroy(pool: *mut BlkPool) {
    if !pool.is_null() {
        drop(Box::from_raw(pool));
    }
}
