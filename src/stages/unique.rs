//! First-seen de-duplication.

use crate::error::Result;
use crate::path::Extractor;
use crate::stage::{Entry, Stage};
use crate::value::Value;
use std::collections::HashSet;

/// Forwards the first entry seen for each computed key.
///
/// Remembers every key it has seen, so memory grows with the number of
/// distinct keys.
pub(crate) struct UniqueStage {
    upstream: Box<dyn Stage>,
    key: Extractor,
    seen: HashSet<Value>,
}

impl UniqueStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, key: Extractor) -> Self {
        Self {
            upstream,
            key,
            seen: HashSet::new(),
        }
    }
}

impl Stage for UniqueStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        loop {
            let (key, value) = match self.upstream.next_entry()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            if self.seen.insert(self.key.extract(&value, &key)) {
                return Some(Ok((key, value)));
            }
        }
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            key: self.key.clone(),
            seen: self.seen.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "unique"
    }
}
