//! The pull contract every pipeline stage implements, plus the two sources.
//!
//! A stage owns exactly one upstream stage and produces at most one entry per
//! call to [`Stage::next_entry`]. Nothing is computed between pulls.
//!
//! Sources come in two flavours:
//! - [`MemorySource`]: an in-memory slice. Rewindable, countable, and sliceable
//!   without iterating.
//! - [`IterSource`]: any Rust iterator. Single-pass; once pulled to the end it
//!   stays exhausted. Use `Collection::buffer` to make it replayable.

use crate::error::Result;
use crate::value::{Key, Value};
use std::rc::Rc;

/// A keyed element flowing through a pipeline.
pub type Entry = (Key, Value);

/// Pull-based lazy sequence.
pub trait Stage {
    /// Produce the next entry, `None` once exhausted. Errors surface here, at
    /// the point the offending element is pulled.
    fn next_entry(&mut self) -> Option<Result<Entry>>;

    /// Remaining number of entries, when known without pulling.
    fn exact_len(&self) -> Option<usize> {
        None
    }

    /// An independent copy that yields what this stage has not produced yet.
    ///
    /// Forking before the first pull replays the whole sequence. Stateful
    /// stages carry their progress into the fork, and stages that already
    /// materialised their output fork the remainder. `None` for single-pass
    /// sources and anything built on them.
    fn fork(&self) -> Option<Box<dyn Stage>> {
        None
    }

    /// The remaining entries as an in-memory slice, when this is one.
    fn as_memory(&self) -> Option<&MemorySource> {
        None
    }

    /// Short name used in log output.
    fn name(&self) -> &'static str;
}

impl Stage for Box<dyn Stage> {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        (**self).next_entry()
    }

    fn exact_len(&self) -> Option<usize> {
        (**self).exact_len()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        (**self).fork()
    }

    fn as_memory(&self) -> Option<&MemorySource> {
        (**self).as_memory()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Drain a stage into a vector, stopping at the first error.
pub(crate) fn drain(stage: &mut dyn Stage) -> Result<Vec<Entry>> {
    let mut out = Vec::with_capacity(stage.exact_len().unwrap_or(0));
    while let Some(item) = stage.next_entry() {
        out.push(item?);
    }
    Ok(out)
}

/// Fork of a stage whose output is already materialised: the entries it
/// has not handed out yet, as a fresh in-memory source.
pub(crate) fn fork_rest(rest: &std::vec::IntoIter<Entry>) -> Box<dyn Stage> {
    Box::new(MemorySource::from_entries(rest.as_slice().to_vec()))
}

/// Entries held in memory and shared between forks.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Rc<[Entry]>,
    pos: usize,
    end: usize,
}

impl MemorySource {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let end = entries.len();
        Self {
            data: entries.into(),
            pos: 0,
            end,
        }
    }

    /// Values keyed by position.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self::from_entries(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::from(i), v))
                .collect(),
        )
    }

    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }

    pub fn remaining(&self) -> &[Entry] {
        &self.data[self.pos..self.end]
    }

    /// The last `n` remaining entries, sharing storage with `self`.
    pub fn tail(&self, n: usize) -> Self {
        Self {
            data: Rc::clone(&self.data),
            pos: self.end - n.min(self.end - self.pos),
            end: self.end,
        }
    }
}

impl Stage for MemorySource {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.pos >= self.end {
            return None;
        }
        let entry = self.data[self.pos].clone();
        self.pos += 1;
        Some(Ok(entry))
    }

    fn exact_len(&self) -> Option<usize> {
        Some(self.end - self.pos)
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(self.clone()))
    }

    fn as_memory(&self) -> Option<&MemorySource> {
        Some(self)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Single-pass source over any iterator of entries.
pub struct IterSource {
    iter: Box<dyn Iterator<Item = Result<Entry>>>,
}

impl IterSource {
    pub fn from_entries<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
        I::IntoIter: 'static,
    {
        Self {
            iter: Box::new(iter.into_iter().map(Ok)),
        }
    }

    /// Values keyed by position.
    pub fn from_values<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'static,
    {
        Self {
            iter: Box::new(
                iter.into_iter()
                    .enumerate()
                    .map(|(i, v)| Ok((Key::from(i), v))),
            ),
        }
    }

    /// A generator that can fail while producing elements.
    pub fn from_results<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Result<Value>>,
        I::IntoIter: 'static,
    {
        Self {
            iter: Box::new(
                iter.into_iter()
                    .enumerate()
                    .map(|(i, r)| r.map(|v| (Key::from(i), v))),
            ),
        }
    }
}

impl Stage for IterSource {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        self.iter.next()
    }

    fn name(&self) -> &'static str {
        "iterator"
    }
}
