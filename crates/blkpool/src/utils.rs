use core::ptr::NonNull;

/// Get the length of a slice pointer.
#[rustversion::since(1.63)]
#[inline]
pub fn nonnull_slice_len<T>(ptr: NonNull<[T]>) -> usize {
    ptr.len()
}

/// Polyfill for <https://github.com/rust-lang/rust/issues/71146>
#[rustversion::before(1.63)]
#[inline]
pub fn nonnull_slice_len<T>(ptr: NonNull<[T]>) -> usize {
    // Safety: We are just reading the slice length embedded in the fat
    //         pointer and not dereferencing the pointer. We also convert it
    //         to `*mut [MaybeUninit<UnsafeCell<u8>>]` just in case because the
    //         slice might be uninitialized and there might be outstanding
    //         mutable references to the slice.
    unsafe {
        (&*(ptr.as_ptr() as *const [core::mem::MaybeUninit<core::cell::UnsafeCell<T>>])).len()
    }
}

// Polyfill for <https://github.com/rust-lang/rust/issues/74265>
#[inline]
pub fn nonnull_slice_start<T>(ptr: NonNull<[T]>) -> NonNull<T> {
    unsafe { NonNull::new_unchecked(ptr.as_ptr() as *mut T) }
}
