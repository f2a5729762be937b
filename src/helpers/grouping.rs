//! Grouping, indexing, counting and combining.
//!
//! All of these run on the [`MapReduce`] engine and are lazy: the whole
//! input is consumed on the first pull of the result. Keys come from an
//! [`Extractor`]; a key that resolves to `null` (or to a list, record or
//! object) fails with [`PipelineError::InvalidGroupKey`] at that point.

use crate::collection::Collection;
use crate::error::{PipelineError, Result};
use crate::map_reduce::{MapReduce, MapReduceStage};
use crate::path::Extractor;
use crate::value::{Key, Record, Value};

/// Resolve a grouping key, rejecting null and non-scalar results.
pub(crate) fn group_key(by: &Extractor, value: &Value, key: &Key) -> Result<Key> {
    let raw = by.extract(value, key);
    if raw.is_null() {
        return Err(PipelineError::group_key(by.describe(), raw));
    }
    raw.to_key()
        .ok_or_else(|| PipelineError::group_key(by.describe(), raw))
}

impl Collection {
    /// Run a custom [`MapReduce`] over the collection.
    pub fn map_reduce(self, engine: MapReduce) -> Self {
        self.chain(|up| Box::new(MapReduceStage::new(up, engine)))
    }

    /// Lists of elements keyed by the extracted group, groups in first-seen order.
    ///
    /// ### Example
    /// ```no_run
    /// use lazyflow::*;
    /// use serde_json::json;
    ///
    /// let groups = collection(json!([
    ///     {"id": 1, "kind": "a"},
    ///     {"id": 2, "kind": "b"},
    ///     {"id": 3, "kind": "a"},
    /// ]))
    /// .group_by("kind")
    /// .to_array(true)?;
    /// assert_eq!(groups.get(&Key::from("a")).and_then(Value::len), Some(2));
    /// # Ok::<(), PipelineError>(())
    /// ```
    pub fn group_by(self, by: impl Into<Extractor>) -> Self {
        let by = by.into();
        self.map_reduce(
            MapReduce::new(move |value, key, emitter| {
                let group = group_key(&by, &value, key)?;
                emitter.emit_intermediate(value, group);
                Ok(())
            })
            .with_reducer(|values, group, emitter| {
                emitter.emit(values, group.clone());
                Ok(())
            }),
        )
    }

    /// Elements keyed by the extracted value; the last element wins a key,
    /// which keeps the position it was first seen at.
    pub fn index_by(self, by: impl Into<Extractor>) -> Self {
        let by = by.into();
        self.map_reduce(MapReduce::new(move |value, key, emitter| {
            let index = group_key(&by, &value, key)?;
            emitter.emit(value, index);
            Ok(())
        }))
    }

    /// Number of elements per extracted group.
    pub fn count_by(self, by: impl Into<Extractor>) -> Self {
        let by = by.into();
        self.map_reduce(
            MapReduce::new(move |value, key, emitter| {
                let group = group_key(&by, &value, key)?;
                emitter.emit_intermediate(value, group);
                Ok(())
            })
            .with_reducer(|values, group, emitter| {
                emitter.emit(values.len(), group.clone());
                Ok(())
            }),
        )
    }

    /// Key/value pairs extracted from every element.
    ///
    /// Without `group`, yields `value(element)` under `key(element)`. With it,
    /// yields one record per group mapping keys to values; within a group the
    /// first value for a key is kept.
    pub fn combine(
        self,
        key: impl Into<Extractor>,
        value: impl Into<Extractor>,
        group: Option<Extractor>,
    ) -> Self {
        let (key_by, value_by) = (key.into(), value.into());
        let Some(group_by) = group else {
            return self.map_reduce(MapReduce::new(move |row, key, emitter| {
                let out_key = group_key(&key_by, &row, key)?;
                emitter.emit(value_by.extract(&row, key), out_key);
                Ok(())
            }));
        };
        self.map_reduce(
            MapReduce::new(move |row, key, emitter| {
                let out_key = group_key(&key_by, &row, key)?;
                let group = group_key(&group_by, &row, key)?;
                let mut pair = Record::with_capacity(1);
                pair.insert(out_key, value_by.extract(&row, key));
                emitter.emit_intermediate(pair, group);
                Ok(())
            })
            .with_reducer(|pairs, group, emitter| {
                let mut merged = Record::new();
                for pair in pairs {
                    let Value::Map(pair) = pair else { continue };
                    for (k, v) in pair {
                        merged.insert_if_absent(k, v);
                    }
                }
                emitter.emit(merged, group.clone());
                Ok(())
            }),
        )
    }
}
