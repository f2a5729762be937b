//! The last `n` entries of a sequence in O(n) memory.
//!
//! Three strategies, cheapest first:
//! 1. in-memory source: slice the tail directly;
//! 2. known remaining length `m`: skip `m - n` entries and take the rest;
//! 3. anything else: stream upstream through a [`CircularBuffer`] of `n`
//!    slots and rotate it back into chronological order at the end.

use crate::error::{PipelineError, Result};
use crate::stage::{Entry, Stage, fork_rest};
use crate::stages::slice::LimitStage;
use tracing::debug;

/// Fixed-capacity ring that remembers the most recent `capacity` items.
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    bucket: usize,
    seen: usize,
}

impl<T> CircularBuffer<T> {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "circular buffer needs at least one slot");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            bucket: 0,
            seen: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
        } else {
            self.slots[self.bucket] = item;
        }
        self.bucket = (self.bucket + 1) % self.capacity;
        self.seen += 1;
    }

    /// Total number of items ever pushed.
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Oldest first. Slots never written are not part of the output.
    pub fn into_chronological(mut self) -> Vec<T> {
        if self.seen <= self.capacity {
            return self.slots;
        }
        let offset = self.seen % self.capacity;
        let mut newer = self.slots.split_off(offset);
        newer.append(&mut self.slots);
        newer
    }
}

/// Streams upstream through a ring buffer on first pull, then replays it.
struct TrailingWindowStage {
    upstream: Box<dyn Stage>,
    n: usize,
    window: Option<std::vec::IntoIter<Entry>>,
}

impl TrailingWindowStage {
    fn fill(&mut self) -> Result<std::vec::IntoIter<Entry>> {
        let mut ring = CircularBuffer::new(self.n);
        while let Some(item) = self.upstream.next_entry() {
            ring.push(item?);
        }
        debug!(seen = ring.seen(), kept = ring.len(), "trailing window filled");
        Ok(ring.into_chronological().into_iter())
    }
}

impl Stage for TrailingWindowStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.window.is_none() {
            match self.fill() {
                Ok(window) => self.window = Some(window),
                Err(e) => {
                    self.window = Some(Vec::new().into_iter());
                    return Some(Err(e));
                }
            }
        }
        self.window.as_mut()?.next().map(Ok)
    }

    fn exact_len(&self) -> Option<usize> {
        match &self.window {
            Some(window) => Some(window.len()),
            None => self.upstream.exact_len().map(|m| m.min(self.n)),
        }
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        if let Some(window) = &self.window {
            return Some(fork_rest(window));
        }
        Some(Box::new(Self {
            upstream: self.upstream.fork()?,
            n: self.n,
            window: None,
        }))
    }

    fn name(&self) -> &'static str {
        "take_last"
    }
}

/// Wrap `upstream` so that it yields only its last `n` entries, keys intact.
pub(crate) fn take_last(upstream: Box<dyn Stage>, n: usize) -> Result<Box<dyn Stage>> {
    if n == 0 {
        return Err(PipelineError::invalid_argument(
            "take_last needs at least one element",
        ));
    }
    if let Some(memory) = upstream.as_memory() {
        debug!(n, strategy = "slice", "take_last");
        return Ok(Box::new(memory.tail(n)));
    }
    if let Some(m) = upstream.exact_len() {
        debug!(n, len = m, strategy = "skip", "take_last");
        return Ok(Box::new(LimitStage::new(upstream, m.saturating_sub(n), Some(n))));
    }
    debug!(n, strategy = "ring", "take_last");
    Ok(Box::new(TrailingWindowStage {
        upstream,
        n,
        window: None,
    }))
}
