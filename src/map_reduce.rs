//! Two-phase map/reduce evaluator.
//!
//! The mapper sees every upstream entry and records [`Emission`]s on an
//! [`Emitter`]: final results (`emit`) and per-group intermediate values
//! (`emit_intermediate`). Once upstream is exhausted the reducer runs once per
//! group, in the order each group key was first seen, and may emit further
//! final results.
//!
//! Final results are stored in call order. Emitting under a key that already
//! holds a result replaces that result in place; emitting without a key
//! appends under the next free integer key.
//!
//! Grouping, indexing, counting, `combine` and tree nesting are all built on
//! this engine.

use crate::error::{PipelineError, Result};
use crate::stage::{Entry, Stage, fork_rest};
use crate::value::{Key, Record, Value};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

/// One output of a mapper or reducer call.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    /// A final result, under `key` or appended when `key` is `None`.
    Emit { value: Value, key: Option<Key> },
    /// A value to hand to the reducer for `group`.
    Intermediate { value: Value, group: Key },
}

/// Collects the emissions of a single mapper or reducer call.
#[derive(Debug, Default)]
pub struct Emitter {
    emissions: Vec<Emission>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, value: impl Into<Value>, key: impl Into<Key>) {
        self.emissions.push(Emission::Emit {
            value: value.into(),
            key: Some(key.into()),
        });
    }

    /// Emit a final result under the next free integer key.
    pub fn emit_value(&mut self, value: impl Into<Value>) {
        self.emissions.push(Emission::Emit {
            value: value.into(),
            key: None,
        });
    }

    pub fn emit_intermediate(&mut self, value: impl Into<Value>, group: impl Into<Key>) {
        self.emissions.push(Emission::Intermediate {
            value: value.into(),
            group: group.into(),
        });
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }

    pub fn into_emissions(self) -> Vec<Emission> {
        self.emissions
    }

    fn drain(&mut self) -> std::vec::Drain<'_, Emission> {
        self.emissions.drain(..)
    }
}

pub type MapperFn = dyn Fn(Value, &Key, &mut Emitter) -> Result<()>;
pub type ReducerFn = dyn Fn(Vec<Value>, &Key, &mut Emitter) -> Result<()>;

/// A mapper and an optional reducer.
#[derive(Clone)]
pub struct MapReduce {
    mapper: Rc<MapperFn>,
    reducer: Option<Rc<ReducerFn>>,
}

/// Intermediate values per group, in first-seen group order.
#[derive(Default)]
struct Groups {
    order: Vec<(Key, Vec<Value>)>,
    index: HashMap<Key, usize>,
}

impl Groups {
    fn push(&mut self, group: Key, value: Value) {
        match self.index.get(&group) {
            Some(&i) => self.order[i].1.push(value),
            None => {
                self.index.insert(group.clone(), self.order.len());
                self.order.push((group, vec![value]));
            }
        }
    }
}

fn store(result: &mut Record, value: Value, key: Option<Key>) {
    match key {
        Some(key) => {
            result.insert(key, value);
        }
        None => {
            result.push(value);
        }
    }
}

impl MapReduce {
    pub fn new<M>(mapper: M) -> Self
    where
        M: Fn(Value, &Key, &mut Emitter) -> Result<()> + 'static,
    {
        Self {
            mapper: Rc::new(mapper),
            reducer: None,
        }
    }

    #[must_use]
    pub fn with_reducer<R>(mut self, reducer: R) -> Self
    where
        R: Fn(Vec<Value>, &Key, &mut Emitter) -> Result<()> + 'static,
    {
        self.reducer = Some(Rc::new(reducer));
        self
    }

    /// Run both phases over `upstream` and return the final results.
    pub fn run(&self, upstream: &mut dyn Stage) -> Result<Record> {
        let mut result = Record::new();
        let mut groups = Groups::default();
        let mut emitter = Emitter::new();
        let mut mapped = 0usize;

        while let Some(item) = upstream.next_entry() {
            let (key, value) = item?;
            (self.mapper)(value, &key, &mut emitter)?;
            mapped += 1;
            for emission in emitter.drain() {
                match emission {
                    Emission::Emit { value, key } => store(&mut result, value, key),
                    Emission::Intermediate { value, group } => groups.push(group, value),
                }
            }
        }

        if groups.order.is_empty() {
            debug!(mapped, results = result.len(), "map/reduce finished without groups");
            return Ok(result);
        }
        let Some(reducer) = &self.reducer else {
            return Err(PipelineError::invalid_argument(
                "intermediate values were emitted but no reducer was given",
            ));
        };

        let group_count = groups.order.len();
        for (group, values) in groups.order {
            reducer(values, &group, &mut emitter)?;
            for emission in emitter.drain() {
                match emission {
                    Emission::Emit { value, key } => store(&mut result, value, key),
                    Emission::Intermediate { .. } => {
                        return Err(PipelineError::invalid_argument(
                            "emit_intermediate is only valid in the map phase",
                        ));
                    }
                }
            }
        }
        debug!(mapped, groups = group_count, results = result.len(), "map/reduce finished");
        Ok(result)
    }
}

/// Runs a [`MapReduce`] on first pull and replays its results.
pub(crate) struct MapReduceStage {
    upstream: Box<dyn Stage>,
    engine: MapReduce,
    output: Option<std::vec::IntoIter<Entry>>,
}

impl MapReduceStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, engine: MapReduce) -> Self {
        Self {
            upstream,
            engine,
            output: None,
        }
    }
}

impl Stage for MapReduceStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.output.is_none() {
            match self.engine.run(&mut *self.upstream) {
                Ok(result) => self.output = Some(result.into_entries().into_iter()),
                Err(e) => {
                    self.output = Some(Vec::new().into_iter());
                    return Some(Err(e));
                }
            }
        }
        self.output.as_mut()?.next().map(Ok)
    }

    fn exact_len(&self) -> Option<usize> {
        self.output.as_ref().map(ExactSizeIterator::len)
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        if let Some(output) = &self.output {
            return Some(fork_rest(output));
        }
        Some(Box::new(Self::new(self.upstream.fork()?, self.engine.clone())))
    }

    fn name(&self) -> &'static str {
        "map_reduce"
    }
}
