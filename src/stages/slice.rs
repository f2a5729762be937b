//! Windowing and concatenation: take, skip, chunk, append, prepend.

use crate::error::Result;
use crate::stage::{Entry, Stage};
use crate::value::{Key, Record, Value};
use std::collections::VecDeque;

/// Skips `offset` entries on first pull, then forwards at most `limit`.
pub(crate) struct LimitStage {
    upstream: Box<dyn Stage>,
    limit: Option<usize>,
    pending_skip: usize,
    taken: usize,
}

impl LimitStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, offset: usize, limit: Option<usize>) -> Self {
        Self {
            upstream,
            limit,
            pending_skip: offset,
            taken: 0,
        }
    }
}

impl Stage for LimitStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.limit.is_some_and(|limit| self.taken >= limit) {
            return None;
        }
        while self.pending_skip > 0 {
            if let Err(e) = self.upstream.next_entry()? {
                return Some(Err(e));
            }
            self.pending_skip -= 1;
        }
        let item = self.upstream.next_entry()?;
        self.taken += 1;
        Some(item)
    }

    fn exact_len(&self) -> Option<usize> {
        let available = self.upstream.exact_len()?.saturating_sub(self.pending_skip);
        Some(match self.limit {
            Some(limit) => available.min(limit - self.taken.min(limit)),
            None => available,
        })
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            limit: self.limit,
            pending_skip: self.pending_skip,
            taken: self.taken,
        }))
    }

    fn name(&self) -> &'static str {
        "limit"
    }
}

/// How a chunk is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChunkShape {
    /// A list of values.
    List,
    /// A record keyed by the upstream keys.
    KeepKeys,
    /// A record keyed from zero.
    Reindexed,
}

/// Groups consecutive entries into chunks of `size` (the last may be shorter).
pub(crate) struct ChunkStage {
    upstream: Box<dyn Stage>,
    size: usize,
    shape: ChunkShape,
    index: usize,
}

impl ChunkStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, size: usize, shape: ChunkShape) -> Self {
        Self {
            upstream,
            size,
            shape,
            index: 0,
        }
    }
}

impl Stage for ChunkStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let mut items = Vec::with_capacity(self.size);
        while items.len() < self.size {
            match self.upstream.next_entry() {
                Some(Ok(entry)) => items.push(entry),
                Some(Err(e)) => return Some(Err(e)),
                None => break,
            }
        }
        if items.is_empty() {
            return None;
        }
        let chunk = match self.shape {
            ChunkShape::List => Value::List(items.into_iter().map(|(_, v)| v).collect()),
            ChunkShape::KeepKeys => Value::Map(items.into_iter().collect::<Record>()),
            ChunkShape::Reindexed => {
                let mut record = Record::with_capacity(items.len());
                for (_, v) in items {
                    record.push(v);
                }
                Value::Map(record)
            }
        };
        let key = Key::from(self.index);
        self.index += 1;
        Some(Ok((key, chunk)))
    }

    fn exact_len(&self) -> Option<usize> {
        Some(self.upstream.exact_len()?.div_ceil(self.size))
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            size: self.size,
            shape: self.shape,
            index: self.index,
        }))
    }

    fn name(&self) -> &'static str {
        "chunk"
    }
}

/// Drains each part in turn, keeping the keys each part produces.
pub(crate) struct ConcatStage {
    parts: VecDeque<Box<dyn Stage>>,
}

impl ConcatStage {
    pub(crate) fn new(parts: Vec<Box<dyn Stage>>) -> Self {
        Self {
            parts: parts.into(),
        }
    }
}

impl Stage for ConcatStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        loop {
            let front = self.parts.front_mut()?;
            match front.next_entry() {
                Some(item) => return Some(item),
                None => {
                    self.parts.pop_front();
                }
            }
        }
    }

    fn exact_len(&self) -> Option<usize> {
        self.parts.iter().map(|p| p.exact_len()).sum()
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        let parts = self
            .parts
            .iter()
            .map(|p| p.fork())
            .collect::<Option<Vec<_>>>()?;
        Some(Box::new(Self::new(parts)))
    }

    fn name(&self) -> &'static str {
        "concat"
    }
}
