//! Owned iteration.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use crate::raw::RawBuf;

/// An iterator that moves values out of a [`DynArray`](crate::DynArray).
///
/// Values not yet yielded are dropped, and the block freed, when the
/// iterator is dropped.
pub struct IntoIter<T> {
    buf: RawBuf<T>,
    /// Next live slot to yield from the front.
    start: usize,
    /// One past the last live slot.
    end: usize,
}

impl<T> IntoIter<T> {
    /// `[0, len)` of `buf` must be live and owned by the caller.
    pub(crate) fn new(buf: RawBuf<T>, len: usize) -> Self {
        debug_assert!(len <= buf.capacity());
        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    /// The values not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[start, end)` are live and owned by the iterator.
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        // SAFETY: `start < end`, so the slot is live; advancing `start`
        // transfers ownership to the caller.
        let value = unsafe { ptr::read(self.buf.ptr().add(self.start)) };
        self.start += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: the slot at the old `end - 1` is live and no longer
        // reachable from the iterator.
        Some(unsafe { ptr::read(self.buf.ptr().add(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        let start = self.start;
        self.start = self.end;
        // SAFETY: `[start, end)` were live and are no longer reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.ptr().add(start),
                remaining,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::DynArray;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Token(Rc<Cell<usize>>);

    impl Drop for Token {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn yields_in_insertion_order() {
        let a: DynArray<String> = ["a", "b", "c"].map(String::from).into();
        let out: Vec<String> = a.into_iter().collect();
        assert_eq!(out, ["a", "b", "c"]);
    }

    #[test]
    fn double_ended() {
        let a: DynArray<u8> = [1, 2, 3, 4].into();
        let mut it = a.into_iter();
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next_back(), Some(4));
        assert_eq!(it.len(), 2);
        assert_eq!(it.as_slice(), [2, 3]);
        assert_eq!(format!("{it:?}"), "IntoIter([2, 3])");
    }

    #[test]
    fn dropping_part_way_drops_the_rest() {
        let drops = Rc::new(Cell::new(0));
        let a: DynArray<Token> = (0..5).map(|_| Token(drops.clone())).collect();
        let mut it = a.into_iter();
        let first = it.next();
        assert_eq!(drops.get(), 0);
        drop(it);
        assert_eq!(drops.get(), 4);
        drop(first);
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn empty_array_yields_nothing() {
        let a: DynArray<u64> = DynArray::new();
        let mut it = a.into_iter();
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }
}
