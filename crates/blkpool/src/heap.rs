//! Pools with a heap-allocated control table
use alloc::vec::Vec;
use core::{mem::MaybeUninit, ptr::NonNull};

use crate::{pool::check_params, BlockState, InitError, Pool};

/// [`Pool`] whose control table is allocated on the heap.
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
pub type HeapPool<'pool> = Pool<'pool, Vec<BlockState>>;

impl<'pool> Pool<'pool, Vec<BlockState>> {
    /// Construct a pool of `num_blocks` blocks of `block_size` bytes each,
    /// allocating the control table on the heap.
    ///
    /// Returns [`InitError::TableAllocFailed`] instead of aborting if the
    /// control table could not be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use blkpool::HeapPool;
    /// use std::mem::MaybeUninit;
    /// let mut memory = vec![MaybeUninit::uninit(); 4096];
    /// let mut pool = HeapPool::with_capacity(&mut memory, 64, 64).unwrap();
    /// let ptr = pool.allocate(100).unwrap();
    /// assert_eq!(pool.allocation_size(ptr), Some(128));
    /// ```
    #[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
    pub fn with_capacity(
        memory: &'pool mut [MaybeUninit<u8>],
        block_size: usize,
        num_blocks: usize,
    ) -> Result<Self, InitError> {
        let table = alloc_table(block_size, num_blocks)?;
        Self::new(memory, table, block_size)
    }

    /// Construct a pool over a memory region specified by a slice pointer,
    /// allocating the control table on the heap.
    ///
    /// # Safety
    ///
    /// See [`Pool::from_raw`].
    #[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "alloc")))]
    pub unsafe fn from_raw_with_capacity(
        memory: NonNull<[u8]>,
        block_size: usize,
        num_blocks: usize,
    ) -> Result<Self, InitError> {
        let table = alloc_table(block_size, num_blocks)?;
        Self::from_raw(memory, table, block_size)
    }
}

fn alloc_table(block_size: usize, num_blocks: usize) -> Result<Vec<BlockState>, InitError> {
    // Validate before allocating anything
    check_params(block_size, num_blocks)?;

    let mut table = Vec::new();
    table
        .try_reserve_exact(num_blocks)
        .map_err(|_| InitError::TableAllocFailed)?;
    table.resize(num_blocks, BlockState::FREE);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn invalid_params() {
        let mut memory = [MaybeUninit::uninit(); 64];
        assert_eq!(
            HeapPool::with_capacity(&mut memory, 0, 4).unwrap_err(),
            InitError::ZeroBlockSize
        );
        assert_eq!(
            HeapPool::with_capacity(&mut memory, 16, 0).unwrap_err(),
            InitError::ZeroBlockCount
        );
        assert_eq!(
            HeapPool::with_capacity(&mut memory, usize::MAX, 2).unwrap_err(),
            InitError::SizeOverflow
        );
        assert_eq!(
            HeapPool::with_capacity(&mut memory, 16, 5).unwrap_err(),
            InitError::RegionTooSmall {
                required: 80,
                actual: 64
            }
        );
    }

    #[test]
    fn table_alloc_failure() {
        // A region of `usize::MAX` one-byte blocks passes validation, but
        // its control table can't be allocated
        let memory =
            core::ptr::slice_from_raw_parts_mut(NonNull::<u8>::dangling().as_ptr(), usize::MAX);
        let memory = NonNull::new(memory).unwrap();
        let err = unsafe { HeapPool::from_raw_with_capacity(memory, 1, usize::MAX) }.unwrap_err();
        assert_eq!(err, InitError::TableAllocFailed);
        assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
    }

    #[test]
    fn table_is_released_on_drop() {
        let mut memory = [MaybeUninit::uninit(); 64];
        let mut pool = HeapPool::with_capacity(&mut memory, 16, 4).unwrap();
        let ptr = pool.allocate(20).unwrap();
        assert_eq!(pool.free_blocks(), 2);

        let table = pool.into_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].head_len(), Some(2));
        drop(table);

        // The region is usable again
        let pool = HeapPool::with_capacity(&mut memory, 16, 4).unwrap();
        assert!(pool.contains(ptr));
        assert_eq!(pool.free_blocks(), 4);
    }
}
