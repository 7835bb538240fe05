//! Raw storage blocks.
//!
//! [`RawBuf<T>`] owns a pointer and a slot count and nothing else. It
//! allocates on creation and frees on drop, but never reads, writes, or drops
//! an element: tracking which slots are live is the owner's job.

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::error::ArrayError;

/// An owned, uninitialised block of `cap` slots for `T`.
///
/// The empty block (`cap == 0`) holds a dangling pointer and no allocation.
/// Zero-sized `T` never allocate either, whatever `cap` says.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _owns: PhantomData<T>,
}

// SAFETY: RawBuf uniquely owns its block; sending or sharing it is exactly
// as safe as sending or sharing the `T`s that live there.
unsafe impl<T: Send> Send for RawBuf<T> {}
// SAFETY: see above.
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    /// The empty block. Never allocates.
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate a block of exactly `cap` slots.
    ///
    /// `cap == 0` returns the empty block without touching the allocator.
    pub(crate) fn try_allocate(cap: usize) -> Result<Self, ArrayError> {
        if cap == 0 {
            return Ok(Self::empty());
        }
        let layout = Self::layout_for(cap)?;
        if layout.size() == 0 {
            // Zero-sized T: capacity is purely logical.
            return Ok(Self {
                ptr: NonNull::dangling(),
                cap,
                _owns: PhantomData,
            });
        }

        // SAFETY: layout has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => Ok(Self {
                ptr,
                cap,
                _owns: PhantomData,
            }),
            None => Err(ArrayError::AllocFailed {
                bytes: layout.size(),
                align: layout.align(),
            }),
        }
    }

    fn layout_for(cap: usize) -> Result<Layout, ArrayError> {
        Layout::array::<T>(cap).map_err(|_| ArrayError::CapacityOverflow { requested: cap })
    }

    /// Pointer to slot 0. Dangling (but aligned and non-null) when nothing
    /// is allocated.
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Number of slots in the block.
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    /// Whether this block holds memory obtained from the allocator.
    pub(crate) fn is_allocated(&self) -> bool {
        self.cap != 0 && mem::size_of::<T>() != 0
    }

    /// Bytes held from the allocator.
    pub(crate) fn memory_bytes(&self) -> usize {
        if self.is_allocated() {
            self.cap * mem::size_of::<T>()
        } else {
            0
        }
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if !self.is_allocated() {
            return;
        }
        // SAFETY: an allocated block was created from `Layout::array::<T>(cap)`,
        // which succeeded, so the same size and alignment are valid here.
        unsafe {
            let layout = Layout::from_size_align_unchecked(
                self.cap * mem::size_of::<T>(),
                mem::align_of::<T>(),
            );
            alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}
