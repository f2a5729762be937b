//! Positional insertion of values into elements.

use crate::error::Result;
use crate::stage::{Entry, Stage};
use crate::value::Value;

/// Writes the i-th value of `values` at `path` inside the i-th element.
///
/// Elements whose path cannot be navigated, and every element after `values`
/// runs out, pass through unchanged.
pub(crate) struct InsertStage {
    upstream: Box<dyn Stage>,
    values: Box<dyn Stage>,
    parents: Vec<String>,
    target: String,
    values_done: bool,
}

impl InsertStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, path: &str, values: Box<dyn Stage>) -> Self {
        let mut parents: Vec<String> = path.split('.').map(str::to_string).collect();
        let target = parents.pop().unwrap_or_default();
        Self {
            upstream,
            values,
            parents,
            target,
            values_done: false,
        }
    }
}

fn insert_at(row: &mut Value, parents: &[String], target: &str, value: Value) -> bool {
    let mut pointer = row;
    for step in parents {
        pointer = match pointer.property_mut(step) {
            Some(next) => next,
            None => return false,
        };
    }
    pointer.set_property(target, value)
}

impl Stage for InsertStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let (key, mut row) = match self.upstream.next_entry()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        if !self.values_done {
            match self.values.next_entry() {
                Some(Ok((_, value))) => {
                    insert_at(&mut row, &self.parents, &self.target, value);
                }
                Some(Err(e)) => return Some(Err(e)),
                None => self.values_done = true,
            }
        }
        Some(Ok((key, row)))
    }

    fn exact_len(&self) -> Option<usize> {
        if !self.values_done {
            self.values.exact_len()?;
        }
        self.upstream.exact_len()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            values: self.values.fork()?,
            parents: self.parents.clone(),
            target: self.target.clone(),
            values_done: self.values_done,
        }))
    }

    fn name(&self) -> &'static str {
        "insert"
    }
}
