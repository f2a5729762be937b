//! Flattening of nested sequences.

use crate::error::Result;
use crate::stage::{Entry, Stage};
use crate::value::Value;

use super::basic::MapFn;
use std::rc::Rc;

/// Splices the nested sequence produced for each upstream entry.
///
/// The value returned by the unfolder is iterated with its own keys (a list or
/// a record). Inside it, nested lists are flattened all the way down while
/// records are yielded whole. A non-iterable result is forwarded as is.
pub(crate) struct UnfoldStage {
    upstream: Box<dyn Stage>,
    unfolder: MapFn,
    stack: Vec<std::vec::IntoIter<Entry>>,
}

impl UnfoldStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, unfolder: MapFn) -> Self {
        Self {
            upstream,
            unfolder,
            stack: Vec::new(),
        }
    }
}

impl Stage for UnfoldStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        loop {
            if let Some(top) = self.stack.last_mut() {
                match top.next() {
                    Some((_, Value::List(items))) => {
                        let nested = Value::List(items).into_entries().unwrap_or_default();
                        self.stack.push(nested.into_iter());
                    }
                    Some(entry) => return Some(Ok(entry)),
                    None => {
                        self.stack.pop();
                    }
                }
                continue;
            }

            let (key, value) = match self.upstream.next_entry()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            let unfolded = (self.unfolder)(value, &key);
            if !unfolded.is_iterable() {
                return Some(Ok((key, unfolded)));
            }
            let entries = unfolded.into_entries().unwrap_or_default();
            self.stack.push(entries.into_iter());
        }
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            unfolder: Rc::clone(&self.unfolder),
            stack: self.stack.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "unfold"
    }
}
