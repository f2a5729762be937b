//! Debug utilities for inspecting pipelines during test execution.
//!
//! This module provides an extension trait that adds pass-through logging
//! stages to [`Collection`]. Everything is reported through `tracing`.

use crate::collection::Collection;
use crate::error::Result;
use crate::stage::{Entry, Stage};
use crate::value::{Key, Value};
use std::rc::Rc;
use tracing::{debug, trace};

type Inspector = Rc<dyn Fn(&Value, &Key)>;

/// Pass-through stage that logs (and optionally inspects) each entry.
pub(crate) struct InspectStage {
    upstream: Box<dyn Stage>,
    label: Rc<str>,
    inspector: Option<Inspector>,
    seen: usize,
    count_only: bool,
}

impl InspectStage {
    fn new(upstream: Box<dyn Stage>, label: &str, inspector: Option<Inspector>, count_only: bool) -> Self {
        Self {
            upstream,
            label: label.into(),
            inspector,
            seen: 0,
            count_only,
        }
    }
}

impl Stage for InspectStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let Some(item) = self.upstream.next_entry() else {
            debug!(label = %self.label, count = self.seen, "exhausted");
            return None;
        };
        if let Ok((key, value)) = &item {
            if !self.count_only {
                trace!(label = %self.label, index = self.seen, %key, %value, "element");
            }
            if let Some(inspector) = &self.inspector {
                inspector(value, key);
            }
            self.seen += 1;
        }
        Some(item)
    }

    fn exact_len(&self) -> Option<usize> {
        self.upstream.exact_len()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            label: Rc::clone(&self.label),
            inspector: self.inspector.clone(),
            seen: self.seen,
            count_only: self.count_only,
        }))
    }

    fn name(&self) -> &'static str {
        "inspect"
    }
}

/// Extension trait adding debug stages to [`Collection`].
///
/// These stages forward every element unchanged.
pub trait CollectionDebugExt {
    /// Log each element at `trace` level and the total at `debug` level once
    /// upstream is exhausted.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use lazyflow::*;
    /// use lazyflow::testing::CollectionDebugExt;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let out = Collection::from_vec(vec![1, 2, 3])
    ///     .debug_inspect("after source")
    ///     .to_list()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    fn debug_inspect(self, label: &str) -> Collection;

    /// Like `debug_inspect`, also calling `inspector` on every element.
    #[must_use]
    fn debug_inspect_with<F>(self, label: &str, inspector: F) -> Collection
    where
        F: Fn(&Value, &Key) + 'static;

    /// Log only the number of elements that passed, once upstream is exhausted.
    #[must_use]
    fn debug_count(self, label: &str) -> Collection;
}

impl CollectionDebugExt for Collection {
    fn debug_inspect(self, label: &str) -> Collection {
        self.chain(|up| Box::new(InspectStage::new(up, label, None, false)))
    }

    fn debug_inspect_with<F>(self, label: &str, inspector: F) -> Collection
    where
        F: Fn(&Value, &Key) + 'static,
    {
        self.chain(|up| Box::new(InspectStage::new(up, label, Some(Rc::new(inspector)), false)))
    }

    fn debug_count(self, label: &str) -> Collection {
        self.chain(|up| Box::new(InspectStage::new(up, label, None, true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn inspector_sees_every_element_and_forwards_it() -> Result<()> {
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let out = Collection::from_vec(vec![1, 2, 3])
            .debug_inspect_with("test", move |_, _| counter.set(counter.get() + 1))
            .to_list()?;
        assert_eq!(out.len(), 3);
        assert_eq!(seen.get(), 3);
        Ok(())
    }
}
