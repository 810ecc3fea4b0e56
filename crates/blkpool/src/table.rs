use core::ops::DerefMut;

use crate::BlockState;

mod sealed {
    pub trait Sealed {}
}

/// Storage for a pool's control table.
///
/// This trait is sealed. It's implemented for `&mut [BlockState]` and, with
/// the `alloc` feature, `Vec<BlockState>`. The length of either can't change
/// while the pool owns it.
///
/// Other table types are rejected:
///
/// ```rust,compile_fail
/// use blkpool::{BlockState, Pool};
/// use std::{mem::MaybeUninit, ops::{Deref, DerefMut}};
///
/// struct Growing([BlockState; 8], usize);
///
/// impl Deref for Growing {
///     type Target = [BlockState];
///     fn deref(&self) -> &[BlockState] { &self.0[..self.1] }
/// }
///
/// impl DerefMut for Growing {
///     fn deref_mut(&mut self) -> &mut [BlockState] { &mut self.0[..self.1] }
/// }
///
/// let mut memory = [MaybeUninit::uninit(); 16];
/// let pool = Pool::new(&mut memory, Growing([BlockState::FREE; 8], 1), 16);
/// ```
pub trait ControlTable: sealed::Sealed + DerefMut<Target = [BlockState]> {}

impl sealed::Sealed for &mut [BlockState] {}
impl ControlTable for &mut [BlockState] {}

#[cfg(any(test, feature = "alloc"))]
impl sealed::Sealed for alloc::vec::Vec<BlockState> {}
#[cfg(any(test, feature = "alloc"))]
impl ControlTable for alloc::vec::Vec<BlockState> {}
