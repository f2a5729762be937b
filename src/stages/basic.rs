//! Element-wise stages: filter, map and re-keying.

use crate::error::Result;
use crate::stage::{Entry, Stage};
use crate::value::{Key, Value};
use std::rc::Rc;

pub(crate) type Predicate = Rc<dyn Fn(&Value, &Key) -> bool>;
pub(crate) type MapFn = Rc<dyn Fn(Value, &Key) -> Value>;
pub(crate) type TryMapFn = Rc<dyn Fn(Value, &Key) -> Result<Value>>;

/// Forwards entries whose predicate result equals `keep`.
pub(crate) struct FilterStage {
    upstream: Box<dyn Stage>,
    predicate: Predicate,
    keep: bool,
}

impl FilterStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, predicate: Predicate, keep: bool) -> Self {
        Self {
            upstream,
            predicate,
            keep,
        }
    }
}

impl Stage for FilterStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        loop {
            let (key, value) = match self.upstream.next_entry()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e)),
            };
            if (self.predicate)(&value, &key) == self.keep {
                return Some(Ok((key, value)));
            }
        }
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self::new(
            self.upstream.fork()?,
            Rc::clone(&self.predicate),
            self.keep,
        )))
    }

    fn name(&self) -> &'static str {
        if self.keep { "filter" } else { "reject" }
    }
}

/// Replaces each value with `f(value, key)`; keys are kept.
pub(crate) struct MapStage {
    upstream: Box<dyn Stage>,
    f: MapFn,
}

impl MapStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, f: MapFn) -> Self {
        Self { upstream, f }
    }
}

impl Stage for MapStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        Some(
            self.upstream
                .next_entry()?
                .map(|(key, value)| {
                    let mapped = (self.f)(value, &key);
                    (key, mapped)
                }),
        )
    }

    fn exact_len(&self) -> Option<usize> {
        self.upstream.exact_len()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self::new(self.upstream.fork()?, Rc::clone(&self.f))))
    }

    fn name(&self) -> &'static str {
        "map"
    }
}

/// Like [`MapStage`] for transforms that can fail per element.
pub(crate) struct TryMapStage {
    upstream: Box<dyn Stage>,
    f: TryMapFn,
}

impl TryMapStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, f: TryMapFn) -> Self {
        Self { upstream, f }
    }
}

impl Stage for TryMapStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let (key, value) = match self.upstream.next_entry()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };
        Some((self.f)(value, &key).map(|mapped| (key, mapped)))
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self::new(self.upstream.fork()?, Rc::clone(&self.f))))
    }

    fn name(&self) -> &'static str {
        "try_map"
    }
}

/// Discards upstream keys and numbers entries from zero.
pub(crate) struct ReindexStage {
    upstream: Box<dyn Stage>,
    next: usize,
}

impl ReindexStage {
    pub(crate) fn new(upstream: Box<dyn Stage>) -> Self {
        Self { upstream, next: 0 }
    }
}

impl Stage for ReindexStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let item = self.upstream.next_entry()?;
        Some(item.map(|(_, value)| {
            let key = Key::from(self.next);
            self.next += 1;
            (key, value)
        }))
    }

    fn exact_len(&self) -> Option<usize> {
        self.upstream.exact_len()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            next: self.next,
        }))
    }

    fn name(&self) -> &'static str {
        "values"
    }
}
