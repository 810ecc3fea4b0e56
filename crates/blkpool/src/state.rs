use const_default1::ConstDefault;
use core::num::NonZeroUsize;

/// The state of a single block, as recorded in a pool's control table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// The block is not part of any allocation.
    Free,
    /// The block is the first one of a live allocation spanning the given
    /// number of consecutive blocks (including this one).
    Head(NonZeroUsize),
    /// The block belongs to the allocation headed by the nearest preceding
    /// [`Head`](Self::Head).
    Continuation,
}

impl BlockState {
    /// The initial state of every block.
    pub const FREE: Self = Self::Free;

    #[inline]
    pub const fn is_free(self) -> bool {
        matches!(self, Self::Free)
    }

    /// Get the span length if this is a head block.
    #[inline]
    pub const fn head_len(self) -> Option<usize> {
        match self {
            Self::Head(len) => Some(len.get()),
            _ => None,
        }
    }
}

impl Default for BlockState {
    #[inline]
    fn default() -> Self {
        Self::FREE
    }
}

impl ConstDefault for BlockState {
    const DEFAULT: Self = Self::FREE;
}
