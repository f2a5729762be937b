//! Positional zipping of several sequences.

use crate::error::Result;
use crate::stage::{Entry, Stage};
use crate::value::{Key, Value};
use std::rc::Rc;

pub(crate) type ZipFn = Rc<dyn Fn(Vec<Value>) -> Value>;

/// Pulls one entry from every source per step and stops at the shortest.
pub(crate) struct ZipStage {
    sources: Vec<Box<dyn Stage>>,
    combine: Option<ZipFn>,
    index: usize,
    done: bool,
}

impl ZipStage {
    pub(crate) fn new(sources: Vec<Box<dyn Stage>>, combine: Option<ZipFn>) -> Self {
        Self {
            sources,
            combine,
            index: 0,
            done: false,
        }
    }
}

impl Stage for ZipStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.done || self.sources.is_empty() {
            return None;
        }
        let mut row = Vec::with_capacity(self.sources.len());
        for source in &mut self.sources {
            match source.next_entry() {
                Some(Ok((_, value))) => row.push(value),
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
        let key = Key::from(self.index);
        self.index += 1;
        let value = match &self.combine {
            Some(f) => f(row),
            None => Value::List(row),
        };
        Some(Ok((key, value)))
    }

    fn exact_len(&self) -> Option<usize> {
        if self.done {
            return Some(0);
        }
        self.sources
            .iter()
            .map(|s| s.exact_len())
            .collect::<Option<Vec<_>>>()?
            .into_iter()
            .min()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        let sources = self
            .sources
            .iter()
            .map(|s| s.fork())
            .collect::<Option<Vec<_>>>()?;
        Some(Box::new(Self {
            sources,
            combine: self.combine.clone(),
            index: self.index,
            done: self.done,
        }))
    }

    fn name(&self) -> &'static str {
        "zip"
    }
}
