//! This crate implements a fixed-capacity, block-granular memory allocator
//! over a single memory region provided by an application.
//!
//!  - **The memory pool is provided by an application.** Examples of
//!    potential memory pool sources include: a `static` array, a memory block
//!    allocated by another memory allocator for arena allocation.
//!
//!  - **Metadata lives out of band.** Occupancy is tracked in a separate
//!    control table holding one [`BlockState`] per block, so the whole region
//!    is usable payload.
//!
//!  - **First fit, nothing else.** An allocation takes the lowest-addressed
//!    run of free blocks that is long enough. Every operation completes in
//!    `O(num_blocks)` time.
//!
//!  - **This crate supports `#![no_std]`.** The `alloc` feature adds
//!    [`HeapPool`], whose control table is allocated on the heap.
//!
//! The allocator can't grow its pool, and it doesn't care about alignment
//! beyond the block size. Misuse (double free, interior or foreign pointers)
//! is silently ignored by [`Pool::release`]; [`Pool::try_release`] tells you
//! why nothing happened.
//!
//! # Examples
//!
//! ```rust
//! use blkpool::{BlockState, Pool};
//! use std::mem::MaybeUninit;
//!
//! let mut memory = [MaybeUninit::uninit(); 320];
//! let mut table = [BlockState::FREE; 320];
//!
//! // 320 blocks, one byte each
//! let mut pool = Pool::new(&mut memory, &mut table[..], 1).unwrap();
//!
//! let ptr1 = pool.allocate(64).unwrap();
//! assert_eq!(pool.free_blocks(), 256);
//!
//! let ptr2 = pool.allocate(32).unwrap();
//! assert_eq!(ptr2.as_ptr() as usize - ptr1.as_ptr() as usize, 64);
//!
//! pool.release(ptr1);
//! pool.release(ptr2);
//! assert_eq!(pool.free_blocks(), 320);
//!
//! // The lowest-addressed fit is reused
//! assert_eq!(pool.allocate(96), Some(ptr1));
//! ```
//!
//! Failure reasons are available through the `try_` methods:
//!
//! ```rust
//! use blkpool::{AllocError, BlockState, Pool};
//! use std::mem::MaybeUninit;
//!
//! let mut memory = [MaybeUninit::uninit(); 64];
//! let mut table = [BlockState::FREE; 4];
//! let mut pool = Pool::new(&mut memory, &mut table[..], 16).unwrap();
//!
//! let a = pool.allocate(16).unwrap();
//! let _b = pool.allocate(16).unwrap();
//! let _c = pool.allocate(16).unwrap();
//! pool.release(a);
//!
//! // Two free blocks in total, but not adjacent
//! assert_eq!(pool.free_blocks(), 2);
//! assert_eq!(pool.try_allocate(32), Err(AllocError::Fragmented));
//! ```
//!
//! # Details
//!
//! ## Representation
//!
//!  - Each control table entry is a [`BlockState`]: free, the head of an
//!    `n`-block allocation, or a continuation of the nearest preceding head.
//!    There are no in-band headers.
//!
//!  - The memory region is a borrowed slice (or a `NonNull<[u8]>` for
//!    `unsafe` callers), so the region's length is checked when the pool is
//!    created.
//!
#![no_std]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

cfg_if::cfg_if! {
    if #[cfg(any(test, feature = "std"))] {
        extern crate std;
        extern crate alloc;
    } else if #[cfg(feature = "alloc")] {
        extern crate alloc;
    }
}

mod error;
mod pool;
mod state;
mod table;
mod utils;
pub use self::{
    error::{AllocError, ErrorKind, InitError, ReleaseError},
    pool::{Allocations, Pool},
    state::BlockState,
    table::ControlTable,
};

#[cfg(any(test, feature = "alloc"))]
mod heap;
#[cfg(any(test, feature = "alloc"))]
pub use self::heap::HeapPool;
