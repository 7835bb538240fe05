//! Test utilities and instrumented element types for dynarr development.
//!
//! Provides an allocation-counting global allocator ([`CountingAlloc`]) and
//! element types that record drops ([`Tracked`]) or fail to construct on
//! demand ([`Flaky`]). None of this depends on `dynarr` itself, so it can
//! be used from the library's unit tests and its integration tests alike.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod alloc;
pub mod fixtures;

pub use crate::alloc::{fail_after, measure, AllocSnapshot, CountingAlloc, FailGuard};
pub use crate::fixtures::{
    catch_construct_failure, CloneBudget, ConstructFailure, DropCounter, Flaky, Tracked,
};
