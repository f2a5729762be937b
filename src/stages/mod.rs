//! Single-purpose lazy stages.
//!
//! Each stage wraps exactly one upstream [`Stage`](crate::stage::Stage) (zip and
//! concatenation own a list of them) and forwards at most one entry per pull.
//! The only stages that materialise their upstream are `SortStage` and
//! the trailing window; `BufferStage` caches as it goes.

pub(crate) mod basic;
pub(crate) mod buffer;
pub(crate) mod insert;
pub(crate) mod slice;
pub mod sort;
pub(crate) mod stop;
pub(crate) mod unfold;
pub(crate) mod unique;
pub(crate) mod zip;

pub use sort::{SortMode, SortOrder};
