use crate::config::CollectionConfig;
use crate::error::{PipelineError, Result};
use crate::stage::{Entry, IterSource, MemorySource, Stage, drain};
use crate::value::{Key, Record, Value};
use std::fmt;
use std::rc::Rc;

/// A lazy, keyed sequence of [`Value`]s.
///
/// Chainable operations consume the collection and wrap its stage in a new
/// one; nothing runs until an element is pulled, either by iterating the
/// collection or by a terminal operation such as [`Collection::to_list`].
pub struct Collection {
    pub(crate) stage: Box<dyn Stage>,
    pub(crate) config: Rc<CollectionConfig>,
}

/// Wrap anything convertible into a [`Collection`].
///
/// ```no_run
/// use lazyflow::collection;
/// use serde_json::json;
///
/// let evens = collection(json!([1, 2, 3, 4]))
///     .filter(|v, _| v.as_i64().is_some_and(|n| n % 2 == 0))
///     .to_list()?;
/// assert_eq!(evens.len(), 2);
/// # Ok::<(), lazyflow::PipelineError>(())
/// ```
pub fn collection(items: impl Into<Collection>) -> Collection {
    items.into()
}

impl Collection {
    pub fn from_stage(stage: impl Stage + 'static) -> Self {
        Self {
            stage: Box::new(stage),
            config: Rc::default(),
        }
    }

    /// In-memory values keyed by position. Rewindable.
    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Self {
        Self::from_stage(MemorySource::from_values(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    /// In-memory entries with their keys. Rewindable.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self::from_stage(MemorySource::from_entries(entries))
    }

    pub fn from_record(record: Record) -> Self {
        Self::from_entries(record.into_entries())
    }

    /// A single-pass source over any iterator; values are keyed by position.
    ///
    /// Pulling it to the end exhausts it. Use [`Collection::buffer`] when it
    /// has to be read more than once.
    pub fn from_generator<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value> + 'static,
        I::IntoIter: 'static,
    {
        Self::from_stage(IterSource::from_values(iter.into_iter().map(Into::into)))
    }

    /// A single-pass source whose elements may fail to be produced.
    pub fn from_results<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Result<Value>>,
        I::IntoIter: 'static,
    {
        Self::from_stage(IterSource::from_results(iter))
    }

    pub fn empty() -> Self {
        Self::from_stage(MemorySource::empty())
    }

    #[must_use]
    pub fn with_config(mut self, config: CollectionConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub(crate) fn with_config_rc(mut self, config: Rc<CollectionConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Wrap the current stage, keeping the configuration.
    pub(crate) fn chain(self, wrap: impl FnOnce(Box<dyn Stage>) -> Box<dyn Stage>) -> Self {
        Self {
            stage: wrap(self.stage),
            config: self.config,
        }
    }

    /// A new collection over `stage` that shares this collection's configuration.
    pub(crate) fn derive(&self, stage: Box<dyn Stage>) -> Self {
        Self {
            stage,
            config: Rc::clone(&self.config),
        }
    }

    pub(crate) fn into_stage(self) -> Box<dyn Stage> {
        self.stage
    }

    /// An independent cursor over what this collection has not yielded yet.
    ///
    /// `None` when the chain is built on a single-pass source; buffer it first.
    pub fn try_clone(&self) -> Option<Self> {
        Some(self.derive(self.stage.fork()?))
    }

    pub fn is_replayable(&self) -> bool {
        self.stage.fork().is_some()
    }

    /// Materialise into a record.
    ///
    /// With `preserve_keys`, an entry whose key was already seen overwrites
    /// the earlier value in place. Without it, every element is kept under
    /// its position.
    pub fn to_array(self, preserve_keys: bool) -> Result<Record> {
        let mut stage = self.stage;
        let entries = drain(&mut *stage)?;
        let mut record = Record::with_capacity(entries.len());
        for (key, value) in entries {
            if preserve_keys {
                record.insert(key, value);
            } else {
                record.push(value);
            }
        }
        Ok(record)
    }

    /// Every element in order, keys discarded. Never loses elements.
    pub fn to_list(self) -> Result<Vec<Value>> {
        let mut stage = self.stage;
        Ok(drain(&mut *stage)?.into_iter().map(|(_, v)| v).collect())
    }

    /// Every entry in order, duplicate keys included.
    pub fn to_entries(self) -> Result<Vec<Entry>> {
        let mut stage = self.stage;
        drain(&mut *stage)
    }

    /// The serializable view: same data as `to_array(true)`.
    pub fn json_serialize(self) -> Result<Value> {
        Ok(Value::Map(self.to_array(true)?))
    }

    pub fn to_json(self) -> Result<serde_json::Value> {
        let record = self.to_array(true)?;
        serde_json::to_value(&record)
            .map_err(|e| PipelineError::invalid_argument(format!("serialize collection: {e}")))
    }

    pub fn to_json_string(self) -> Result<String> {
        let record = self.to_array(true)?;
        serde_json::to_string(&record)
            .map_err(|e| PipelineError::invalid_argument(format!("serialize collection: {e}")))
    }

    /// Number of elements.
    ///
    /// Answered without iterating when the length is known up front;
    /// otherwise the source is consumed.
    pub fn count(self) -> Result<usize> {
        if let Some(n) = self.stage.exact_len() {
            return Ok(n);
        }
        let mut stage = self.stage;
        let mut n = 0;
        while let Some(item) = stage.next_entry() {
            item?;
            n += 1;
        }
        Ok(n)
    }

    /// Number of distinct keys, i.e. the length of `to_array(true)`.
    pub fn count_keys(self) -> Result<usize> {
        Ok(self.to_array(true)?.len())
    }
}

impl Iterator for Collection {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.stage.next_entry()
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("stage", &self.stage.name())
            .field("len", &self.stage.exact_len())
            .finish_non_exhaustive()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Collection {
    fn from(values: Vec<T>) -> Self {
        Self::from_vec(values)
    }
}

impl From<Record> for Collection {
    fn from(record: Record) -> Self {
        Self::from_record(record)
    }
}

/// Lists and records are iterated; anything else becomes a one-element collection.
impl From<Value> for Collection {
    fn from(value: Value) -> Self {
        match value {
            Value::List(items) => Self::from_vec(items),
            Value::Map(record) => Self::from_record(record),
            other => Self::from_entries(vec![(Key::Int(0), other)]),
        }
    }
}

impl From<serde_json::Value> for Collection {
    fn from(value: serde_json::Value) -> Self {
        Self::from(Value::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preserve_keys_collapses_duplicates() -> Result<()> {
        let entries = vec![
            (Key::from("a"), Value::from(1)),
            (Key::from("b"), Value::from(2)),
            (Key::from("a"), Value::from(3)),
        ];
        let kept = Collection::from_entries(entries.clone()).to_array(true)?;
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.get(&Key::from("a")), Some(&Value::Int(3)));
        assert_eq!(Collection::from_entries(entries.clone()).to_list()?.len(), 3);
        assert_eq!(Collection::from_entries(entries).count_keys()?, 2);
        Ok(())
    }

    #[test]
    fn count_of_generator_consumes_it() -> Result<()> {
        let c = Collection::from_generator((1..=4).filter(|n| n % 2 == 0));
        assert!(!c.is_replayable());
        assert_eq!(c.count()?, 2);
        Ok(())
    }

    #[test]
    fn scalar_json_becomes_single_element() -> Result<()> {
        assert_eq!(collection(json!("x")).to_list()?, vec![Value::from("x")]);
        Ok(())
    }
}
