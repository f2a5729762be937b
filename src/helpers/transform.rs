//! Lazy, chainable transforms on [`Collection`].
//!
//! Every method here returns a new collection wrapping the previous one.
//! Nothing is pulled until the result is iterated; [`Collection::sort_by`]
//! and [`Collection::take_last`] materialise their input at that point, the
//! rest forward one element per pull.
//!
//! ## Example
//! ```no_run
//! use lazyflow::*;
//! use serde_json::json;
//!
//! let names = collection(json!([
//!     {"name": "ada", "age": 36},
//!     {"name": "bob", "age": 17},
//!     {"name": "cy", "age": 52},
//! ]))
//! .filter(|row, _| row.property("age").is_some_and(|a| a.to_f64_lossy() >= 18.0))
//! .sort_by("age")
//! .extract("name")
//! .to_list()?;
//! assert_eq!(names, vec![Value::from("cy"), Value::from("ada")]);
//! # Ok::<(), PipelineError>(())
//! ```

use crate::collection::Collection;
use crate::error::{PipelineError, Result};
use crate::path::{Conditions, Extractor};
use crate::stage::MemorySource;
use crate::stages::basic::{FilterStage, MapStage, ReindexStage, TryMapStage};
use crate::stages::buffer::BufferStage;
use crate::stages::insert::InsertStage;
use crate::stages::slice::{ChunkShape, ChunkStage, ConcatStage, LimitStage};
use crate::stages::sort::{SortMode, SortOrder, SortStage};
use crate::stages::stop::StopStage;
use crate::stages::unfold::UnfoldStage;
use crate::stages::unique::UniqueStage;
use crate::stages::zip::{ZipFn, ZipStage};
use crate::trailing;
use crate::value::{Key, Value};
use std::rc::Rc;

impl Collection {
    /// Keep elements for which `predicate(value, key)` is true.
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value, &Key) -> bool + 'static,
    {
        self.chain(|up| Box::new(FilterStage::new(up, Rc::new(predicate), true)))
    }

    /// Keep truthy elements only.
    pub fn filter_truthy(self) -> Self {
        self.filter(|value, _| value.is_truthy())
    }

    /// Drop elements for which `predicate(value, key)` is true.
    pub fn reject<F>(self, predicate: F) -> Self
    where
        F: Fn(&Value, &Key) -> bool + 'static,
    {
        self.chain(|up| Box::new(FilterStage::new(up, Rc::new(predicate), false)))
    }

    /// Replace each value with `f(value, key)`. Keys are kept.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value, &Key) -> Value + 'static,
    {
        self.chain(|up| Box::new(MapStage::new(up, Rc::new(f))))
    }

    /// Like [`Collection::map`] for transforms that can fail. The error is
    /// raised when the offending element is pulled.
    pub fn try_map<F>(self, f: F) -> Self
    where
        F: Fn(Value, &Key) -> Result<Value> + 'static,
    {
        self.chain(|up| Box::new(TryMapStage::new(up, Rc::new(f))))
    }

    /// Resolve a property path against every element.
    ///
    /// A path containing `{*}` yields the matched children one by one;
    /// elements where nothing matched are skipped.
    pub fn extract(self, path: impl Into<Extractor>) -> Self {
        let extractor = path.into();
        if !extractor.is_fan_out() {
            return self.map(move |value, key| extractor.extract(&value, key));
        }
        self.map(move |value, key| extractor.extract(&value, key))
            .filter(|value, _| value.is_iterable())
            .flatten()
    }

    /// Drop elements equal to one already seen.
    pub fn unique(self) -> Self {
        self.unique_by(Extractor::identity())
    }

    /// Keep the first element for each extracted value.
    pub fn unique_by(self, by: impl Into<Extractor>) -> Self {
        let by = by.into();
        self.chain(|up| Box::new(UniqueStage::new(up, by)))
    }

    /// Stable sort by an extracted value using the configured order and mode
    /// (descending and numeric unless configured otherwise).
    pub fn sort_by(self, by: impl Into<Extractor>) -> Self {
        let (order, mode) = (self.config.sort_order, self.config.sort_mode);
        self.sort_by_with(by, order, mode)
    }

    pub fn sort_by_with(self, by: impl Into<Extractor>, order: SortOrder, mode: SortMode) -> Self {
        let by = by.into();
        self.chain(|up| Box::new(SortStage::new(up, by, order, mode)))
    }

    /// Yield elements until `condition` first holds; that element and
    /// everything after it is never yielded, and upstream is not pulled again.
    pub fn stop_when<F>(self, condition: F) -> Self
    where
        F: Fn(&Value, &Key) -> bool + 'static,
    {
        self.chain(|up| Box::new(StopStage::new(up, Rc::new(condition))))
    }

    /// [`Collection::stop_when`] with a set of `path == value` conditions.
    pub fn stop_when_matches(self, conditions: Conditions) -> Self {
        self.stop_when(move |value, key| conditions.matches(value, key))
    }

    /// Splice the nested sequence `f(value, key)` into the output, flattening
    /// nested lists all the way down.
    pub fn unfold<F>(self, f: F) -> Self
    where
        F: Fn(Value, &Key) -> Value + 'static,
    {
        self.chain(|up| Box::new(UnfoldStage::new(up, Rc::new(f))))
    }

    /// [`Collection::unfold`] treating every element as the nested sequence.
    pub fn flatten(self) -> Self {
        self.unfold(|value, _| value)
    }

    /// Positional tuples of this and `others`; stops at the shortest input.
    pub fn zip(self, others: Vec<Collection>) -> Self {
        self.zip_stage(others, None)
    }

    /// Like [`Collection::zip`], combining each tuple with `f`.
    pub fn zip_with<F>(self, others: Vec<Collection>, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Value + 'static,
    {
        self.zip_stage(others, Some(Rc::new(f)))
    }

    fn zip_stage(self, others: Vec<Collection>, combine: Option<ZipFn>) -> Self {
        self.chain(move |up| {
            let mut sources = Vec::with_capacity(others.len() + 1);
            sources.push(up);
            sources.extend(others.into_iter().map(Collection::into_stage));
            Box::new(ZipStage::new(sources, combine))
        })
    }

    /// Write the i-th element of `values` at `path` inside the i-th element.
    pub fn insert(self, path: &str, values: impl Into<Collection>) -> Self {
        let values = values.into().into_stage();
        let path = path.to_string();
        self.chain(move |up| Box::new(InsertStage::new(up, &path, values)))
    }

    /// Cache elements as they are pulled so the collection can be replayed
    /// with [`Collection::try_clone`] even over a single-pass source.
    pub fn buffer(self) -> Self {
        self.chain(|up| Box::new(BufferStage::new(up)))
    }

    /// Materialise now into an in-memory, rewindable collection.
    pub fn compile(self, preserve_keys: bool) -> Result<Self> {
        let config = Rc::clone(&self.config);
        let record = self.to_array(preserve_keys)?;
        Ok(Collection {
            stage: Box::new(MemorySource::from_entries(record.into_entries())),
            config,
        })
    }

    /// At most `n` elements, after skipping `offset`.
    pub fn take(self, n: usize, offset: usize) -> Self {
        self.chain(|up| Box::new(LimitStage::new(up, offset, Some(n))))
    }

    pub fn skip(self, n: usize) -> Self {
        self.chain(|up| Box::new(LimitStage::new(up, n, None)))
    }

    /// The last `n` elements with their keys, holding at most `n` in memory.
    ///
    /// In-memory and fixed-length sources are sliced directly; anything else
    /// streams through a ring buffer.
    ///
    /// ### Errors
    /// `InvalidArgument` when `n` is zero, before anything is pulled.
    pub fn take_last(self, n: usize) -> Result<Self> {
        let config = Rc::clone(&self.config);
        let stage = trailing::take_last(self.into_stage(), n)?;
        Ok(Collection { stage, config })
    }

    /// Lists of `size` consecutive values; the last may be shorter.
    pub fn chunk(self, size: usize) -> Result<Self> {
        check_chunk_size(size)?;
        Ok(self.chain(|up| Box::new(ChunkStage::new(up, size, ChunkShape::List))))
    }

    /// Records of `size` consecutive entries, keyed by the original keys or
    /// from zero.
    pub fn chunk_with_keys(self, size: usize, preserve_keys: bool) -> Result<Self> {
        check_chunk_size(size)?;
        let shape = if preserve_keys {
            ChunkShape::KeepKeys
        } else {
            ChunkShape::Reindexed
        };
        Ok(self.chain(|up| Box::new(ChunkStage::new(up, size, shape))))
    }

    /// This collection followed by `other`. Keys are kept as produced.
    pub fn append(self, other: impl Into<Collection>) -> Self {
        let other = other.into().into_stage();
        self.chain(|up| Box::new(ConcatStage::new(vec![up, other])))
    }

    /// Append one value, under `key` or key `0`.
    pub fn append_item(self, value: impl Into<Value>, key: Option<Key>) -> Self {
        self.append(single(value, key))
    }

    pub fn prepend(self, other: impl Into<Collection>) -> Self {
        let other = other.into().into_stage();
        self.chain(|up| Box::new(ConcatStage::new(vec![other, up])))
    }

    /// Prepend one value, under `key` or key `0`.
    pub fn prepend_item(self, value: impl Into<Value>, key: Option<Key>) -> Self {
        self.prepend(single(value, key))
    }

    /// Discard keys and number elements from zero.
    pub fn values(self) -> Self {
        self.chain(|up| Box::new(ReindexStage::new(up)))
    }

    /// Hand the whole collection to `f` and continue with what it returns.
    pub fn through<F>(self, f: F) -> Self
    where
        F: FnOnce(Collection) -> Collection,
    {
        f(self)
    }
}

fn single(value: impl Into<Value>, key: Option<Key>) -> Collection {
    Collection::from_entries(vec![(key.unwrap_or(Key::Int(0)), value.into())])
}

fn check_chunk_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(PipelineError::invalid_argument("chunk size must be at least 1"));
    }
    Ok(())
}
