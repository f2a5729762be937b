//! Early termination.

use crate::error::Result;
use crate::stage::{Entry, Stage};

use super::basic::Predicate;
use std::rc::Rc;

/// Forwards entries until the condition first holds, then never pulls again.
///
/// The entry that satisfied the condition is not forwarded.
pub(crate) struct StopStage {
    upstream: Box<dyn Stage>,
    condition: Predicate,
    stopped: bool,
}

impl StopStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, condition: Predicate) -> Self {
        Self {
            upstream,
            condition,
            stopped: false,
        }
    }
}

impl Stage for StopStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.stopped {
            return None;
        }
        let (key, value) = match self.upstream.next_entry()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        if (self.condition)(&value, &key) {
            self.stopped = true;
            return None;
        }
        Some(Ok((key, value)))
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            condition: Rc::clone(&self.condition),
            stopped: self.stopped,
        }))
    }

    fn name(&self) -> &'static str {
        "stop_when"
    }
}
