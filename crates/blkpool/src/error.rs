//! Failure reasons
use core::fmt;

/// The broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A parameter was unusable (zero sizes, a missing or too small region).
    InvalidArgument,
    /// The control table could not be allocated.
    ResourceExhaustion,
    /// No run of free blocks is long enough, whether because the pool is
    /// full or because its free space is fragmented.
    InsufficientContiguousSpace,
    /// The pointer passed for deallocation does not head a live allocation.
    InvalidFree,
}

/// The error type returned by the pool constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitError {
    /// The memory region is missing.
    NullMemory,
    ZeroBlockSize,
    ZeroBlockCount,
    /// `block_size * num_blocks` is not representable in `usize`.
    SizeOverflow,
    /// The memory region is shorter than `block_size * num_blocks` bytes.
    RegionTooSmall { required: usize, actual: usize },
    /// The control table could not be allocated.
    TableAllocFailed,
}

impl InitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableAllocFailed => ErrorKind::ResourceExhaustion,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullMemory => f.write_str("memory region is null"),
            Self::ZeroBlockSize => f.write_str("block size is zero"),
            Self::ZeroBlockCount => f.write_str("block count is zero"),
            Self::SizeOverflow => f.write_str("pool size overflows `usize`"),
            Self::RegionTooSmall { required, actual } => write!(
                f,
                "memory region is {} bytes long ({} bytes required)",
                actual, required
            ),
            Self::TableAllocFailed => f.write_str("failed to allocate the control table"),
        }
    }
}

/// The error type returned by [`Pool::try_allocate`].
///
/// [`Pool::try_allocate`]: crate::Pool::try_allocate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocError {
    /// The requested size is zero.
    ZeroSize,
    /// The request exceeds the total free space.
    Exhausted,
    /// There is enough free space in total, but no run of free blocks is
    /// long enough.
    Fragmented,
}

impl AllocError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroSize => ErrorKind::InvalidArgument,
            Self::Exhausted | Self::Fragmented => ErrorKind::InsufficientContiguousSpace,
        }
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ZeroSize => "requested size is zero",
            Self::Exhausted => "not enough free space",
            Self::Fragmented => "no contiguous run of free blocks is long enough",
        })
    }
}

/// The error type returned by [`Pool::try_release`].
///
/// [`Pool::try_release`]: crate::Pool::try_release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseError {
    /// The pointer is outside the pool.
    OutOfRange,
    /// The pointer is not on a block boundary.
    Misaligned,
    /// The block is already free.
    NotAllocated,
    /// The block is inside an allocation but is not its first block.
    InteriorPointer,
    /// The head's span extends past the end of the pool.
    Corrupted,
}

impl ReleaseError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidFree
    }
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OutOfRange => "pointer is outside the pool",
            Self::Misaligned => "pointer is not on a block boundary",
            Self::NotAllocated => "block is not allocated",
            Self::InteriorPointer => "pointer does not point to the start of an allocation",
            Self::Corrupted => "control table is corrupted",
        })
    }
}

#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl std::error::Error for InitError {}

#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl std::error::Error for AllocError {}

#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl std::error::Error for ReleaseError {}
