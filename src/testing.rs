//! Testing utilities for lazyflow pipelines.
//!
//! This module gives downstream crates the pieces used by this crate's own
//! tests:
//!
//! - **Assertions**: compare pipeline output with `serde_json` literals
//! - **Fixtures**: small record sets (a category tree, articles with comments)
//! - **Debug utilities**: log elements as they flow through a pipeline
//!
//! # Quick Start
//!
//! ```no_run
//! use lazyflow::*;
//! use lazyflow::testing::*;
//! use serde_json::json;
//!
//! #[test]
//! fn doubles() -> anyhow::Result<()> {
//!     let out = collection(json!([1, 2, 3]))
//!         .map(|v, _| Value::from(v.as_i64().unwrap_or(0) * 2))
//!         .to_list()?;
//!     assert_values_equal(&out, json!([2, 4, 6]));
//!     Ok(())
//! }
//! ```
//!
//! # Debug Utilities
//!
//! ```no_run
//! use lazyflow::*;
//! use lazyflow::testing::*;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let out = collection(json!([1, 2, 3]))
//!     .debug_inspect("after source")
//!     .filter(|v, _| v.as_i64() != Some(2))
//!     .debug_count("after filter")
//!     .to_list()?;
//! # Ok(())
//! # }
//! ```
//!
//! Output goes through `tracing`; install a subscriber (for example
//! `tracing_subscriber::fmt()`) to see it.

pub mod assertions;
pub mod debug;
pub mod fixtures;

pub use assertions::*;
pub use debug::*;
pub use fixtures::*;
