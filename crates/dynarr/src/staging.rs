//! Staged construction of a replacement block.
//!
//! A [`Staging<T>`] is filled front to back while copying or growing an
//! array. Until [`Staging::finish`] is called it is a drop guard: if the
//! caller returns early or unwinds, the guard drops the values it owns and
//! frees its block, leaving the source array untouched.
//!
//! The filled prefix `[0, filled)` has two parts:
//!
//! ```text
//! [0, relocated)        bit-copies whose ownership still belongs to the source
//! [relocated, filled)   values constructed here and owned by the guard
//! ```
//!
//! Only the second part is dropped on rollback.

use std::mem::ManuallyDrop;
use std::ptr;

use crate::error::ArrayError;
use crate::raw::RawBuf;

pub(crate) struct Staging<T> {
    buf: RawBuf<T>,
    relocated: usize,
    filled: usize,
}

impl<T> Staging<T> {
    /// Allocate a block of `cap` slots to fill.
    pub(crate) fn try_new(cap: usize) -> Result<Self, ArrayError> {
        Ok(Self {
            buf: RawBuf::try_allocate(cap)?,
            relocated: 0,
            filled: 0,
        })
    }

    /// Bitwise-move `count` values from `src` into the front of the block.
    ///
    /// The copies are not owned by the guard: on rollback they are forgotten,
    /// because the source still owns the originals. On [`finish`](Self::finish)
    /// ownership passes to the new block and the caller must release the
    /// source block without dropping its values.
    ///
    /// # Safety
    ///
    /// `src` must point to `count` initialised values that do not overlap this
    /// block, and nothing may have been written to the guard yet.
    pub(crate) unsafe fn relocate_from(&mut self, src: *const T, count: usize) {
        assert_eq!(self.filled, 0, "relocation must precede construction");
        assert!(count <= self.buf.capacity(), "relocation exceeds staged capacity");
        // SAFETY: caller guarantees `src` holds `count` values and does not
        // overlap; the block has at least `count` slots.
        unsafe { ptr::copy_nonoverlapping(src, self.buf.ptr(), count) };
        self.relocated = count;
        self.filled = count;
    }

    /// Move `value` into the next free slot, taking ownership of it.
    ///
    /// # Panics
    ///
    /// Panics if every slot is already filled.
    pub(crate) fn push(&mut self, value: T) {
        assert!(self.filled < self.buf.capacity(), "staged block is full");
        // SAFETY: `filled < capacity`, and slots at or past `filled` are
        // uninitialised.
        unsafe { self.buf.ptr().add(self.filled).write(value) };
        self.filled += 1;
    }

    /// Disarm the guard and hand back the block and its filled length.
    pub(crate) fn finish(self) -> (RawBuf<T>, usize) {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `buf` is moved out exactly once.
        let buf = unsafe { ptr::read(&this.buf) };
        (buf, this.filled)
    }
}

impl<T> Drop for Staging<T> {
    fn drop(&mut self) {
        let owned = self.filled - self.relocated;
        log::debug!(
            "rolling back staged block of {} slots for {}: dropping {} constructed, forgetting {} relocated",
            self.buf.capacity(),
            std::any::type_name::<T>(),
            owned,
            self.relocated,
        );
        // SAFETY: `[relocated, filled)` were written by `push` and are owned
        // by this guard alone. `buf` frees the block afterwards.
        unsafe {
            let start = self.buf.ptr().add(self.relocated);
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(start, owned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Noisy(Rc<Cell<usize>>);

    impl Drop for Noisy {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn rollback_drops_constructed_values() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut staging = Staging::try_new(4).unwrap();
            staging.push(Noisy(drops.clone()));
            staging.push(Noisy(drops.clone()));
        }
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn rollback_forgets_relocated_values() {
        let drops = Rc::new(Cell::new(0));
        let source = [Noisy(drops.clone()), Noisy(drops.clone())];
        {
            let mut staging = Staging::try_new(3).unwrap();
            // SAFETY: `source` holds two values and outlives the call.
            unsafe { staging.relocate_from(source.as_ptr(), 2) };
            staging.push(Noisy(drops.clone()));
        }
        // Only the value constructed in the staged block is dropped.
        assert_eq!(drops.get(), 1);
        drop(source);
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn finish_hands_over_ownership() {
        let drops = Rc::new(Cell::new(0));
        let mut staging = Staging::try_new(2).unwrap();
        staging.push(Noisy(drops.clone()));
        let (buf, len) = staging.finish();
        assert_eq!(len, 1);
        assert_eq!(drops.get(), 0);
        // SAFETY: slot 0 was filled by `push` and is dropped once here.
        unsafe { ptr::drop_in_place(buf.ptr()) };
        assert_eq!(drops.get(), 1);
    }

    #[test]
    #[should_panic(expected = "staged block is full")]
    fn push_past_capacity_panics() {
        let mut staging = Staging::try_new(1).unwrap();
        staging.push(1u8);
        staging.push(2u8);
    }
}
