//! # Lazyflow
//!
//! A **lazy collection pipeline** library: compose filter, map, sort, group,
//! nest, zip and friends over sequences of records, scalars and opaque
//! objects, and pull the result through one element at a time.
//!
//! ## Key Features
//!
//! - **Pull-based evaluation** - nothing runs until an element is pulled
//! - **Property paths** - `"author.name"`, `"comments.{*}.user"` wherever a key is needed
//! - **Map/reduce engine** - behind `group_by`, `index_by`, `count_by`, `combine` and `nest`
//! - **Tree building** - rebuild hierarchies from `(id, parent_id)` rows and walk them back out
//! - **Bounded memory tails** - `take_last(n)` keeps at most `n` elements, even over generators
//! - **Replay** - `buffer()` makes single-pass sources readable any number of times
//!
//! ## Quick Start
//!
//! ```no_run
//! use lazyflow::*;
//! use serde_json::json;
//!
//! # fn main() -> Result<()> {
//! let by_author = collection(json!([
//!     {"title": "First", "author": {"name": "mariano"}},
//!     {"title": "Second", "author": {"name": "jose"}},
//!     {"title": "Third", "author": {"name": "mariano"}},
//! ]))
//! .combine("title", "author.name", None)
//! .to_array(true)?;
//!
//! assert_eq!(by_author.len(), 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Collection
//!
//! A [`Collection`] wraps exactly one [`Stage`]. Chainable operations consume
//! the collection and wrap its stage in a new one, so a pipeline is a chain
//! where every stage owns its upstream. Elements are `(Key, Value)` entries:
//!
//! - [`Key`] - an integer or a string; integer-looking strings normalise to integers
//! - [`Value`] - null, bool, int, float, string, list, ordered [`Record`], or an opaque [`Object`]
//!
//! ### Sources
//!
//! - [`Collection::from_vec`] / [`collection`] - in memory, rewindable, length known up front
//! - [`Collection::from_generator`] - any iterator, single pass
//!
//! Operations that materialise (`sort_by`, `to_array`, `count`, `median`,
//! `cartesian_product`, `transpose`) consume a single-pass source. Reading
//! it again yields nothing; call [`buffer`](Collection::buffer) first.
//!
//! ### Errors
//!
//! Stages are lazy, so data errors ([`PipelineError::InvalidGroupKey`],
//! [`PipelineError::UnsupportedShape`] from nesting) surface when the
//! offending element is pulled. Argument errors (`take_last(0)`, `chunk(0)`,
//! an unknown traversal order) are returned by the builder call.
//!
//! ### Logging
//!
//! Materialisation points log at `debug` level through `tracing`. The crate
//! never installs a subscriber.
//!
//! ## Module Overview
//!
//! - [`collection`] - the `Collection` facade, sources and materialisation
//! - [`path`] - property paths, extractors and condition sets
//! - [`stage`] - the pull contract and in-memory / iterator sources
//! - [`map_reduce`] - the two-phase map/reduce engine
//! - [`tree`] - tree building and traversal orders
//! - [`trailing`] - the circular buffer behind `take_last`
//! - [`config`] - per-collection defaults
//! - [`testing`] - assertions, fixtures and debug stages for tests

pub mod collection;
pub mod config;
pub mod error;
pub mod map_reduce;
pub mod path;
pub mod stage;
pub mod stages;
pub mod testing;
pub mod trailing;
pub mod tree;
pub mod value;
mod helpers;

// Re-export commonly used items
pub use collection::{Collection, collection};
pub use config::CollectionConfig;
pub use error::{PipelineError, Result};
pub use map_reduce::{Emission, Emitter, MapReduce};
pub use path::{Conditions, Extractor, Path, WILDCARD};
pub use stage::{Entry, IterSource, MemorySource, Stage};
pub use stages::{SortMode, SortOrder};
pub use trailing::CircularBuffer;
pub use tree::TraversalOrder;
pub use value::{Key, Object, Record, Value};
