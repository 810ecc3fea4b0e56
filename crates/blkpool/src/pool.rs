//! The allocator core
use core::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    mem::MaybeUninit,
    num::NonZeroUsize,
    ops::Range,
    ptr::NonNull,
};

use crate::{
    utils::{nonnull_slice_len, nonnull_slice_start},
    AllocError, BlockState, ControlTable, InitError, ReleaseError,
};

#[cfg_attr(doc, svgbobdoc::transform)]
/// A block-granular first-fit allocator over a caller-supplied memory region.
///
/// # Data Structure Overview
///
/// <center>
/// ```svgbob
///                        block_size
///                        |<--->|
///                        ,-----+-----+-----+-----+-----+-----+-----+-----,
///        memory: 'pool = |     |     |     |     |     |     |     |     |
///                        '--+--+-----+-----+--+--+-----+-----+-----+-----'
///                           |                 |
///                           v                 v
///                        ,-----+-----+-----+-----+-----+-----+-----+-----,
///  control_table: Table= |  H  |  C  |  C  |  H  |  0  |  0  |  H  |  0  |
///                        |  3  |     |     |  1  |     |     |  1  |     |
///                        '-----+-----+-----+-----+-----+-----+-----+-----'
///                         \_______________/ \___/ \_________/ \___/ \___/
///                            allocation   allocation  free  allocation free
///
///                                     free_blocks = 3
/// ```
/// </center>
///
/// `H n` is [`BlockState::Head`] of an `n`-block allocation, `C` is
/// [`BlockState::Continuation`], and `0` is [`BlockState::Free`].
///
/// # Properties
///
/// The number of blocks is the length of the control table at construction,
/// which is fixed for the pool's lifetime. An allocation of `size` bytes takes
/// `ceil(size / block_size)` blocks from the lowest-addressed free run that
/// is long enough. Allocations are aligned to the block size only relative to
/// the start of the memory region.
///
/// The control table is stored in `Table` ([`ControlTable`]), which is either
/// a borrowed slice (the default) or, with the `alloc` feature, a `Vec`
/// ([`HeapPool`]).
/// Dropping the pool releases the table (if owned) but never touches the
/// memory region.
///
/// All methods that modify the pool take `&mut self`. If a pool must be
/// shared, wrap it in a lock.
///
/// [`HeapPool`]: crate::HeapPool
pub struct Pool<'pool, Table = &'pool mut [BlockState]> {
    memory: NonNull<u8>,
    block_size: usize,
    num_blocks: usize,
    free_blocks: usize,
    table: Table,
    _phantom: PhantomData<&'pool mut [MaybeUninit<u8>]>,
}

// Safety: The memory region referenced by a particular instance of `Pool` is
//         logically owned by that `Pool`, and `Pool` has no interior
//         mutability, so these are safe as long as `Table` is.
unsafe impl<Table: Send> Send for Pool<'_, Table> {}

// Safety: `&Pool` only reads the control table and never dereferences
//         `memory`, so sharing it is safe as long as sharing `Table` is.
unsafe impl<Table: Sync> Sync for Pool<'_, Table> {}

impl<Table: ControlTable> fmt::Debug for Pool<'_, Table> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("memory", &self.memory)
            .field("block_size", &self.block_size)
            .field("num_blocks", &self.num_blocks())
            .field("free_blocks", &self.free_blocks)
            .finish()
    }
}

impl<'pool, Table: ControlTable> Pool<'pool, Table> {
    /// Construct a pool over `memory`, tracking `table.len()` blocks of
    /// `block_size` bytes each.
    ///
    /// Every entry of `table` is reset to [`BlockState::Free`].
    ///
    /// # Examples
    ///
    /// ```
    /// use blkpool::{BlockState, InitError, Pool};
    /// use std::mem::MaybeUninit;
    /// let mut memory = [MaybeUninit::uninit(); 1024];
    /// let mut table = [BlockState::FREE; 16];
    /// let pool = Pool::new(&mut memory, &mut table[..], 64).unwrap();
    /// assert_eq!(pool.free_blocks(), 16);
    /// drop(pool);
    ///
    /// // 16 blocks of 128 bytes don't fit
    /// assert_eq!(
    ///     Pool::new(&mut memory, &mut table[..], 128).unwrap_err(),
    ///     InitError::RegionTooSmall { required: 2048, actual: 1024 },
    /// );
    /// ```
    ///
    /// The memory region must outlive the pool:
    ///
    /// ```rust,compile_fail
    /// use blkpool::{BlockState, Pool};
    /// use std::mem::MaybeUninit;
    /// let mut table = [BlockState::FREE; 16];
    /// let mut memory = [MaybeUninit::uninit(); 1024];
    /// let pool = Pool::new(&mut memory, &mut table[..], 64).unwrap();
    /// drop(memory); // dropping the memory region first is not allowed
    /// drop(pool);
    /// ```
    pub fn new(
        memory: &'pool mut [MaybeUninit<u8>],
        table: Table,
        block_size: usize,
    ) -> Result<Self, InitError> {
        // Safety: `memory` is a mutable reference, which guarantees the
        // absence of aliasing references. Being `'pool` means it will outlive
        // `self`.
        unsafe {
            Self::from_raw(
                NonNull::new_unchecked(memory as *mut [MaybeUninit<u8>] as *mut [u8]),
                table,
                block_size,
            )
        }
    }

    /// Construct a pool over a memory region specified by a slice pointer.
    ///
    /// See [`Self::new`].
    ///
    /// # Safety
    ///
    /// The memory region will be considered owned by `self`. It must be
    /// valid for reads and writes and must outlive `self`.
    pub unsafe fn from_raw(
        memory: NonNull<[u8]>,
        mut table: Table,
        block_size: usize,
    ) -> Result<Self, InitError> {
        let num_blocks = table.len();
        let required = check_params(block_size, num_blocks)?;

        let actual = nonnull_slice_len(memory);
        if actual < required {
            return Err(InitError::RegionTooSmall { required, actual });
        }

        table.fill(BlockState::FREE);

        Ok(Self {
            memory: nonnull_slice_start(memory),
            block_size,
            num_blocks,
            free_blocks: num_blocks,
            table,
            _phantom: PhantomData,
        })
    }

    /// Tear down the pool and give back its control table.
    ///
    /// The memory region is left untouched.
    #[inline]
    pub fn into_table(self) -> Table {
        self.table
    }

    /// Get the block size in bytes.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Get the total number of blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// Get the number of blocks not covered by any allocation.
    #[inline]
    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    #[inline]
    pub fn used_blocks(&self) -> usize {
        self.num_blocks() - self.free_blocks
    }

    /// Get the size of the managed span in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        // This never overflows; it was checked on construction
        self.block_size * self.num_blocks
    }

    #[inline]
    pub fn free_bytes(&self) -> usize {
        self.block_size * self.free_blocks
    }

    /// Get the control table.
    #[inline]
    pub fn control_table(&self) -> &[BlockState] {
        &self.table
    }

    /// Get the state of the block at `index`.
    #[inline]
    pub fn block_state(&self, index: usize) -> Option<BlockState> {
        self.table.get(index).copied()
    }

    /// Get the length (in blocks) of the longest run of free blocks.
    ///
    /// An allocation of `size` bytes succeeds if and only if
    /// `ceil(size / block_size)` is not greater than this value.
    pub fn largest_free_run(&self) -> usize {
        let mut largest = 0;
        let mut run = 0;
        for state in self.table.iter() {
            if state.is_free() {
                run += 1;
                largest = largest.max(run);
            } else {
                run = 0;
            }
        }
        largest
    }

    /// Iterate over the block index ranges of live allocations in address
    /// order.
    #[inline]
    pub fn allocations(&self) -> Allocations<'_> {
        Allocations {
            table: &self.table[..],
            index: 0,
        }
    }

    /// Check if `ptr` points into the managed span.
    #[inline]
    pub fn contains(&self, ptr: NonNull<u8>) -> bool {
        let start = self.memory.as_ptr() as usize;
        let ptr = ptr.as_ptr() as usize;
        ptr >= start && ptr - start < self.capacity()
    }

    /// Get the usable size (`N * block_size` bytes) of the allocation
    /// starting at `ptr`. Returns `None` if `ptr` does not point to the start
    /// of a live allocation.
    pub fn allocation_size(&self, ptr: NonNull<u8>) -> Option<usize> {
        let index = self.block_index(ptr).ok()?;
        self.table[index]
            .head_len()
            .map(|len| len * self.block_size)
    }

    /// Attempt to allocate `size` bytes.
    ///
    /// Returns the starting address of the allocated memory on success;
    /// `None` otherwise. See [`Self::try_allocate`] for the failure reasons.
    ///
    /// # Time Complexity
    ///
    /// This method will complete in linear time (`O(num_blocks)`).
    #[inline]
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        self.try_allocate(size).ok()
    }

    /// Attempt to allocate `size` bytes, reporting why the allocation failed.
    ///
    /// The pool is not modified on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use blkpool::{AllocError, BlockState, Pool};
    /// use std::mem::MaybeUninit;
    /// let mut memory = [MaybeUninit::uninit(); 128];
    /// let mut table = [BlockState::FREE; 8];
    /// let mut pool = Pool::new(&mut memory, &mut table[..], 16).unwrap();
    ///
    /// assert_eq!(pool.try_allocate(0), Err(AllocError::ZeroSize));
    /// assert_eq!(pool.try_allocate(129), Err(AllocError::Exhausted));
    ///
    /// // 17 bytes round up to two blocks
    /// pool.try_allocate(17).unwrap();
    /// assert_eq!(pool.free_blocks(), 6);
    /// ```
    pub fn try_allocate(&mut self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let num_needed = self.blocks_for(size).ok_or(AllocError::ZeroSize)?;

        // Reject early if the total free space is insufficient. Passing this
        // check does not guarantee success; the free space might be
        // fragmented.
        if size > self.free_bytes() {
            return Err(AllocError::Exhausted);
        }

        let index = self
            .find_free_run(num_needed.get())
            .ok_or(AllocError::Fragmented)?;

        self.mark_allocated(index, num_needed);
        self.free_blocks -= num_needed.get();

        Ok(self.block_ptr(index))
    }

    /// Similar to [`Self::allocate`] but fills the allocated blocks with
    /// zeros.
    #[inline]
    pub fn allocate_zeroed(&mut self, size: usize) -> Option<NonNull<u8>> {
        self.try_allocate_zeroed(size).ok()
    }

    /// Similar to [`Self::try_allocate`] but fills the allocated blocks with
    /// zeros.
    pub fn try_allocate_zeroed(&mut self, size: usize) -> Result<NonNull<u8>, AllocError> {
        let ptr = self.try_allocate(size)?;
        let len = self.blocks_for(size).map_or(0, NonZeroUsize::get);
        // Safety: `ptr..ptr + len * block_size` is the span of the new
        //         allocation, which is inside the memory region
        unsafe { ptr.as_ptr().write_bytes(0, len * self.block_size) };
        Ok(ptr)
    }

    /// Deallocate a previously allocated memory block.
    ///
    /// Pointers that do not point to the start of a live allocation (e.g.,
    /// double frees, interior pointers, pointers outside the pool) are
    /// silently ignored. See [`Self::try_release`].
    ///
    /// # Time Complexity
    ///
    /// This method will complete in linear time (`O(num_blocks)`).
    #[inline]
    pub fn release(&mut self, ptr: NonNull<u8>) {
        let _ = self.try_release(ptr);
    }

    /// Deallocate a previously allocated memory block, reporting the number
    /// of blocks freed or why nothing was freed.
    ///
    /// The pool is not modified on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use blkpool::{BlockState, Pool, ReleaseError};
    /// use std::mem::MaybeUninit;
    /// let mut memory = [MaybeUninit::uninit(); 128];
    /// let mut table = [BlockState::FREE; 8];
    /// let mut pool = Pool::new(&mut memory, &mut table[..], 16).unwrap();
    ///
    /// let ptr = pool.allocate(48).unwrap();
    /// assert_eq!(pool.try_release(ptr), Ok(3));
    /// assert_eq!(pool.try_release(ptr), Err(ReleaseError::NotAllocated));
    /// ```
    pub fn try_release(&mut self, ptr: NonNull<u8>) -> Result<usize, ReleaseError> {
        let index = self.block_index(ptr)?;

        let len = match self.table[index] {
            BlockState::Free => return Err(ReleaseError::NotAllocated),
            BlockState::Continuation => return Err(ReleaseError::InteriorPointer),
            BlockState::Head(len) => len.get(),
        };

        let span = match index.checked_add(len) {
            Some(end) if end <= self.num_blocks => index..end,
            _ => return Err(ReleaseError::Corrupted),
        };

        self.table[span].fill(BlockState::FREE);
        self.free_blocks += len;

        Ok(len)
    }

    /// Calculate `ceil(size / block_size)` without overflowing. Returns `None`
    /// if `size` is zero.
    #[inline]
    fn blocks_for(&self, size: usize) -> Option<NonZeroUsize> {
        NonZeroUsize::new(size / self.block_size + (size % self.block_size != 0) as usize)
    }

    /// Find the block index of `ptr`.
    fn block_index(&self, ptr: NonNull<u8>) -> Result<usize, ReleaseError> {
        let offset = (ptr.as_ptr() as usize)
            .checked_sub(self.memory.as_ptr() as usize)
            .ok_or(ReleaseError::OutOfRange)?;

        if offset % self.block_size != 0 {
            return Err(ReleaseError::Misaligned);
        }

        let index = offset / self.block_size;
        if index >= self.num_blocks {
            return Err(ReleaseError::OutOfRange);
        }

        Ok(index)
    }

    /// Find the lowest index `i` such that the blocks `i..i + num_needed` are
    /// all free.
    fn find_free_run(&self, num_needed: usize) -> Option<usize> {
        debug_assert!(num_needed > 0);

        let mut run_start = 0;
        let mut i = 0;
        while i < self.num_blocks {
            match self.table[i] {
                BlockState::Free => {
                    i += 1;
                    if i - run_start == num_needed {
                        return Some(run_start);
                    }
                }
                // Skip over the whole allocation
                BlockState::Head(len) => {
                    i += len.get();
                    run_start = i;
                }
                BlockState::Continuation => {
                    i += 1;
                    run_start = i;
                }
            }
        }

        None
    }

    /// Mark `index..index + len` as a new allocation.
    fn mark_allocated(&mut self, index: usize, len: NonZeroUsize) {
        let span = &mut self.table[index..index + len.get()];
        debug_assert!(span.iter().all(|state| state.is_free()));

        span[0] = BlockState::Head(len);
        span[1..].fill(BlockState::Continuation);
    }

    #[inline]
    fn block_ptr(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index < self.num_blocks);
        // Safety: `index * block_size` is inside the memory region, which
        //         starts at the non-null address `memory`
        unsafe { NonNull::new_unchecked(self.memory.as_ptr().add(index * self.block_size)) }
    }
}

/// Validate the pool parameters and calculate the required region size.
pub(crate) fn check_params(block_size: usize, num_blocks: usize) -> Result<usize, InitError> {
    if block_size == 0 {
        return Err(InitError::ZeroBlockSize);
    }
    if num_blocks == 0 {
        return Err(InitError::ZeroBlockCount);
    }
    block_size
        .checked_mul(num_blocks)
        .ok_or(InitError::SizeOverflow)
}

/// An iterator over the live allocations of a [`Pool`], returned by
/// [`Pool::allocations`].
#[derive(Debug, Clone)]
pub struct Allocations<'a> {
    table: &'a [BlockState],
    index: usize,
}

impl Iterator for Allocations<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(state) = self.table.get(self.index) {
            let start = self.index;
            match state.head_len() {
                Some(len) => {
                    self.index += len;
                    return Some(start..start + len);
                }
                None => self.index += 1,
            }
        }
        None
    }
}

impl FusedIterator for Allocations<'_> {}
