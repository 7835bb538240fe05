//! Growable contiguous array with manual allocation and strong failure safety.
//!
//! [`DynArray<T>`] owns one heap block sized to its capacity and tracks how
//! many leading slots hold live values. Every slot transition (uninitialised
//! to live, live to dropped) is an explicit step, so that a failing
//! constructor can be rolled back without leaking or double-dropping.
//!
//! # Architecture
//!
//! ```text
//! DynArray<T> (public container)
//! ├── RawBuf<T>    (pointer + capacity; allocates and frees, never touches elements)
//! ├── len          (live prefix [0, len))
//! └── Staging<T>   (transient drop guard used while copying or growing;
//!                   owns a fresh RawBuf and rolls it back on failure)
//! ```
//!
//! # Growth
//!
//! A full array grows to `capacity * 2 + 1` slots (see [`growth`]). Existing
//! elements are relocated by bitwise move, which cannot fail, so the only
//! fallible step during growth is constructing the new element. If it fails
//! the new block is discarded and the array is left exactly as it was.
//!
//! # Failure channels
//!
//! - Panics from `T::clone` or a constructor closure unwind through the
//!   array; drop guards restore the pre-call state on the way out.
//! - The `try_*` operations report allocation failure and constructor
//!   errors as [`ArrayError`] values instead.
//!
//! # Safety
//!
//! `unsafe` is confined to the raw buffer, the staging guard, the array and
//! its owned iterator. Each block states the invariant it relies on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array;
pub mod error;
pub mod growth;
pub mod iter;
mod raw;
mod staging;

// Public re-exports for the primary API surface.
pub use array::DynArray;
pub use error::ArrayError;
pub use iter::IntoIter;
