//! Allocation accounting.
//!
//! [`CountingAlloc`] forwards to [`System`] and counts every allocation and
//! deallocation made by the current thread. Counters are thread-local so
//! tests running in parallel do not see each other's traffic.
//!
//! It can also be told to fail: while a [`FailGuard`] from [`fail_after`] is
//! alive, allocations on the current thread return null once the given
//! number of them have succeeded.
//!
//! It only counts or fails once installed in the test binary:
//!
//! ```ignore
//! use dynarr_test_utils::CountingAlloc;
//!
//! #[global_allocator]
//! static ALLOC: CountingAlloc = CountingAlloc;
//! ```

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    // Const-initialised and drop-free, so touching it never allocates.
    static COUNTS: Cell<AllocSnapshot> = const { Cell::new(AllocSnapshot::ZERO) };
    // Allocations left before failing; `None` when disarmed.
    static REMAINING: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Global allocator wrapper that counts per-thread traffic.
pub struct CountingAlloc;

fn record(update: impl FnOnce(&mut AllocSnapshot)) {
    // `try_with` fails only during thread teardown; those calls go uncounted.
    let _ = COUNTS.try_with(|cell| {
        let mut counts = cell.get();
        update(&mut counts);
        cell.set(counts);
    });
}

fn should_fail() -> bool {
    REMAINING
        .try_with(|cell| match cell.get() {
            Some(0) => true,
            Some(n) => {
                cell.set(Some(n - 1));
                false
            }
            None => false,
        })
        .unwrap_or(false)
}

/// Make allocations on this thread fail after `successes` more succeed.
///
/// Failing stays in effect until the returned guard is dropped. Failed
/// requests return null and are not counted.
#[must_use = "allocation failure is disarmed when the guard is dropped"]
pub fn fail_after(successes: usize) -> FailGuard {
    REMAINING.with(|cell| cell.set(Some(successes)));
    FailGuard { _not_send: PhantomData }
}

/// Keeps [`fail_after`] armed on the current thread while alive.
pub struct FailGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for FailGuard {
    fn drop(&mut self) {
        let _ = REMAINING.try_with(|cell| cell.set(None));
    }
}

// SAFETY: every successful call is forwarded unchanged to `System`, and a
// failing `alloc` returns null, which the contract permits. The counters are
// side effects only.
unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if should_fail() {
            return std::ptr::null_mut();
        }
        // SAFETY: caller upholds `GlobalAlloc::alloc`'s contract.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record(|c| {
                c.allocs += 1;
                c.bytes_allocated += layout.size();
            });
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        record(|c| {
            c.deallocs += 1;
            c.bytes_freed += layout.size();
        });
        // SAFETY: caller upholds `GlobalAlloc::dealloc`'s contract.
        unsafe { System.dealloc(ptr, layout) }
    }
}

/// Cumulative allocator traffic on one thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocSnapshot {
    /// Successful allocations.
    pub allocs: usize,
    /// Deallocations.
    pub deallocs: usize,
    /// Bytes handed out.
    pub bytes_allocated: usize,
    /// Bytes returned.
    pub bytes_freed: usize,
}

impl AllocSnapshot {
    pub const ZERO: Self = Self {
        allocs: 0,
        deallocs: 0,
        bytes_allocated: 0,
        bytes_freed: 0,
    };

    /// Counters for the current thread so far.
    pub fn now() -> Self {
        COUNTS.with(Cell::get)
    }

    /// Traffic between `earlier` and `self`.
    pub fn since(&self, earlier: &Self) -> Self {
        Self {
            allocs: self.allocs - earlier.allocs,
            deallocs: self.deallocs - earlier.deallocs,
            bytes_allocated: self.bytes_allocated - earlier.bytes_allocated,
            bytes_freed: self.bytes_freed - earlier.bytes_freed,
        }
    }

    /// Bytes allocated but not yet freed.
    pub fn live_bytes(&self) -> isize {
        self.bytes_allocated as isize - self.bytes_freed as isize
    }

    /// Whether everything allocated was also freed.
    pub fn is_balanced(&self) -> bool {
        self.allocs == self.deallocs && self.bytes_allocated == self.bytes_freed
    }

    /// Panic with the counters if anything leaked.
    #[track_caller]
    pub fn assert_balanced(&self) {
        assert!(self.is_balanced(), "allocator traffic not balanced: {self:?}");
    }
}

/// Run `f` and return its result with the traffic it caused on this thread.
///
/// Anything `f` returns that still owns memory counts as live.
pub fn measure<R>(f: impl FnOnce() -> R) -> (R, AllocSnapshot) {
    let before = AllocSnapshot::now();
    let result = f();
    let after = AllocSnapshot::now();
    (result, after.since(&before))
}
