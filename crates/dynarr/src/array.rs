//! The growable array.
//!
//! [`DynArray<T>`] keeps live values in the prefix `[0, len)` of a single
//! raw block. Slots past `len` are uninitialised and never read. Copying
//! and growing build a replacement block in a staging guard and only swap
//! it in once every fallible step has succeeded.

use std::alloc::{self, Layout};
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::{self, ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use crate::error::ArrayError;
use crate::growth;
use crate::iter::IntoIter;
use crate::raw::RawBuf;
use crate::staging::Staging;

/// A growable, contiguous array that owns its storage.
///
/// A full array grows to `capacity * 2 + 1` slots. Every insertion and copy
/// offers the strong guarantee: if constructing an element fails, by panic
/// or by returned error, the array is left exactly as it was and no memory
/// is leaked.
///
/// ```
/// use dynarr::DynArray;
///
/// let mut words: DynArray<String> = DynArray::new();
/// words.emplace("hello");
/// words.emplace_with(|| "hello world"[..5].to_owned());
/// words.emplace_default();
///
/// assert_eq!(words.len(), 3);
/// assert_eq!(words.capacity(), 3);
/// assert_eq!(words.as_slice(), ["hello", "hello", ""]);
///
/// words.clear();
/// assert!(words.is_empty());
/// assert_eq!(words.capacity(), 3);
/// ```
pub struct DynArray<T> {
    buf: RawBuf<T>,
    /// Number of live values at the front of `buf`.
    len: usize,
}

impl<T> DynArray<T> {
    /// Create an empty array. Never allocates.
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::empty(),
            len: 0,
        }
    }

    /// Create an empty array with room for exactly `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows; aborts through
    /// [`handle_alloc_error`](std::alloc::handle_alloc_error) if the
    /// allocator fails.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(array) => array,
            Err(err) => allocation_failure(err),
        }
    }

    /// Create an empty array with room for exactly `capacity` values,
    /// reporting allocation failure as an error.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ArrayError> {
        Ok(Self {
            buf: RawBuf::try_allocate(capacity)?,
            len: 0,
        })
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots currently allocated, live or not.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Bytes of storage currently held from the allocator.
    pub fn memory_bytes(&self) -> usize {
        self.buf.memory_bytes()
    }

    /// The live values, front to back.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` are initialised and the pointer is non-null and
        // aligned even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    /// The live values, front to back, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as for `as_slice`; `&mut self` guarantees uniqueness.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Iterate over the live values.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterate mutably over the live values.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Move everything out, leaving `self` empty with no storage.
    ///
    /// No element is constructed, cloned, or dropped.
    ///
    /// ```
    /// use dynarr::DynArray;
    ///
    /// let mut a: DynArray<u8> = [1, 2, 3].into();
    /// let b = a.take();
    /// assert_eq!(b.as_slice(), [1, 2, 3]);
    /// assert_eq!((a.len(), a.capacity()), (0, 0));
    /// ```
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    /// Append `value`, growing if full. Returns the stored value.
    pub fn push(&mut self, value: T) -> &mut T {
        self.emplace_with(|| value)
    }

    /// Append a value converted from `args`, growing if full.
    pub fn emplace<A>(&mut self, args: A) -> &mut T
    where
        A: Into<T>,
    {
        self.emplace_with(|| args.into())
    }

    /// Append `T::default()`, growing if full.
    pub fn emplace_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.emplace_with(T::default)
    }

    /// Append the value produced by `make`, growing if full.
    ///
    /// If `make` panics the array is unchanged.
    pub fn emplace_with<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        match self.try_emplace_with(|| Ok::<T, Infallible>(make())) {
            Ok(slot) => slot,
            Err(err) => allocation_failure(err),
        }
    }

    /// Append the value produced by the fallible constructor `make`.
    ///
    /// On any error (allocation failure, capacity overflow, or `make`
    /// returning `Err`) the array is unchanged: same storage, length,
    /// capacity, and contents.
    ///
    /// ```
    /// use dynarr::{ArrayError, DynArray};
    ///
    /// let mut a: DynArray<u32> = DynArray::new();
    /// a.push(1);
    /// let err = a.try_emplace_with(|| "x".parse::<u32>()).unwrap_err();
    /// assert!(matches!(err, ArrayError::Construct(_)));
    /// assert_eq!((a.len(), a.capacity()), (1, 1));
    /// ```
    pub fn try_emplace_with<E, F>(&mut self, make: F) -> Result<&mut T, ArrayError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if self.len < self.buf.capacity() {
            let value = make().map_err(ArrayError::Construct)?;
            let index = self.len;
            // SAFETY: `index < capacity` and the slot is uninitialised.
            unsafe { self.buf.ptr().add(index).write(value) };
            self.len += 1;
            // SAFETY: the slot was just initialised.
            return Ok(unsafe { &mut *self.buf.ptr().add(index) });
        }
        self.grow_then_emplace(make)
    }

    /// Slow path of insertion: relocate into a larger block, then construct.
    #[cold]
    fn grow_then_emplace<E, F>(&mut self, make: F) -> Result<&mut T, ArrayError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let old_cap = self.buf.capacity();
        let new_cap = growth::next_capacity(old_cap).ok_or(ArrayError::<E>::CapacityOverflow {
            requested: usize::MAX,
        })?;
        let mut staging =
            Staging::try_new(new_cap).map_err(|err: ArrayError| err.widen::<E>())?;

        // SAFETY: `[0, len)` are live, and the staged block is a fresh
        // allocation of `new_cap > len` slots.
        unsafe { staging.relocate_from(self.buf.ptr(), self.len) };

        // On `Err` or unwind, `staging` forgets the relocated copies and
        // frees its block; `self` was never touched.
        let value = make().map_err(ArrayError::Construct)?;
        staging.push(value);

        let (new_buf, new_len) = staging.finish();
        // The old block's values now live in `new_buf`; dropping the old
        // `RawBuf` frees memory without dropping any `T`.
        drop(mem::replace(&mut self.buf, new_buf));
        self.len = new_len;

        log::trace!(
            "grew {} from {} to {} slots, relocated {}",
            std::any::type_name::<T>(),
            old_cap,
            new_cap,
            new_len - 1,
        );

        let index = new_len - 1;
        // SAFETY: `index < len` is live.
        Ok(unsafe { &mut *self.buf.ptr().add(index) })
    }

    /// Drop every live value in index order. Capacity is retained.
    pub fn clear(&mut self) {
        let len = self.len;
        // Zero first: if a destructor panics, the rest of the slice is still
        // dropped and nothing stays reachable to be dropped again.
        self.len = 0;
        // SAFETY: `[0, len)` were live and are no longer reachable through
        // `self`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.ptr(), len)) };
    }

    /// Deep-copy the array, constructing each copy with `copy`.
    ///
    /// Copies are made in index order into a block of exactly `len()` slots.
    /// If `copy` fails for element `i`, the copies of `[0, i)` are dropped,
    /// the block is freed, and the error is returned. `self` is never
    /// modified.
    pub fn try_clone_with<E, F>(&self, mut copy: F) -> Result<Self, ArrayError<E>>
    where
        F: FnMut(&T) -> Result<T, E>,
    {
        let mut staging =
            Staging::try_new(self.len).map_err(|err: ArrayError| err.widen::<E>())?;
        for item in self.iter() {
            staging.push(copy(item).map_err(ArrayError::Construct)?);
        }
        let (buf, len) = staging.finish();
        Ok(Self { buf, len })
    }

    /// Consume into the raw block and the live length, without dropping.
    pub(crate) fn into_raw_parts(self) -> (RawBuf<T>, usize) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `buf` is moved out exactly once.
        let buf = unsafe { ptr::read(&this.buf) };
        (buf, this.len)
    }
}

impl<T: Clone> DynArray<T> {
    /// Deep-copy the array, reporting allocation failure as an error.
    ///
    /// A panic from `T::clone` unwinds after the partial copy is dropped
    /// and freed.
    pub fn try_clone(&self) -> Result<Self, ArrayError> {
        self.try_clone_with(|item| Ok::<T, Infallible>(item.clone()))
    }
}

/// Report an allocation error from an operation without a `Result` to
/// carry it.
#[cold]
#[track_caller]
fn allocation_failure(err: ArrayError) -> ! {
    if let ArrayError::AllocFailed { bytes, align } = &err {
        if let Ok(layout) = Layout::from_size_align(*bytes, *align) {
            alloc::handle_alloc_error(layout);
        }
    }
    panic!("{err}");
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        self.clear();
        // `buf` frees the block when it is dropped after this.
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynArray<T> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(array) => array,
            Err(err) => allocation_failure(err),
        }
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T: PartialEq> PartialEq<[T]> for DynArray<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Hash> Hash for DynArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(items: &[T]) -> Self {
        let mut array = Self::with_capacity(items.len());
        for item in items {
            array.push(item.clone());
        }
        array
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    fn from(items: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        array.extend(items);
        array
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let (buf, len) = self.into_raw_parts();
        IntoIter::new(buf, len)
    }
}
