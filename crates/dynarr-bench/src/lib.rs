//! Benchmark workloads for dynarr.
//!
//! Provides deterministic inputs shared by the criterion benches and the
//! walkthrough example:
//!
//! - [`fill_sequential`]: push `n` integers into an empty array
//! - [`labels`]: `n` distinct heap-owning strings
//! - [`fill_presized`]: push `n` integers into an array sized up front

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dynarr::DynArray;

/// Element counts used by the parameterised benches.
pub const SIZES: [usize; 4] = [16, 256, 4_096, 65_536];

/// Push `0..n` one at a time, growing from empty.
pub fn fill_sequential(n: usize) -> DynArray<u64> {
    let mut array = DynArray::new();
    for i in 0..n as u64 {
        array.push(i);
    }
    array
}

/// Push `0..n` into an array with capacity for all of them.
pub fn fill_presized(n: usize) -> DynArray<u64> {
    let mut array = DynArray::with_capacity(n);
    for i in 0..n as u64 {
        array.push(i);
    }
    array
}

/// `n` distinct labels, so clone and drop costs include heap traffic.
pub fn labels(n: usize) -> DynArray<String> {
    (0..n).map(|i| format!("label-{i:06}")).collect()
}
