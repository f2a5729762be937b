//! Caching stage that makes single-pass sources replayable.

use crate::error::Result;
use crate::stage::{Entry, Stage};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

struct BufferState {
    upstream: Option<Box<dyn Stage>>,
    cache: Vec<Entry>,
}

/// Caches every entry it pulls. Forks share the cache, so upstream is
/// consumed at most once no matter how many cursors replay it; a cursor that
/// runs past the cache resumes pulling where the previous one stopped.
pub(crate) struct BufferStage {
    state: Rc<RefCell<BufferState>>,
    pos: usize,
}

impl BufferStage {
    pub(crate) fn new(upstream: Box<dyn Stage>) -> Self {
        Self {
            state: Rc::new(RefCell::new(BufferState {
                upstream: Some(upstream),
                cache: Vec::new(),
            })),
            pos: 0,
        }
    }
}

impl Stage for BufferStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let mut state = self.state.borrow_mut();
        if let Some(entry) = state.cache.get(self.pos) {
            let entry = entry.clone();
            self.pos += 1;
            return Some(Ok(entry));
        }
        let pulled = state.upstream.as_mut()?.next_entry();
        match pulled {
            Some(Ok(entry)) => {
                state.cache.push(entry.clone());
                self.pos += 1;
                Some(Ok(entry))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                debug!(cached = state.cache.len(), "buffer filled");
                state.upstream = None;
                None
            }
        }
    }

    fn exact_len(&self) -> Option<usize> {
        let state = self.state.borrow();
        let cached = state.cache.len().saturating_sub(self.pos);
        match &state.upstream {
            None => Some(cached),
            Some(upstream) => upstream.exact_len().map(|n| n + cached),
        }
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            state: Rc::clone(&self.state),
            pos: self.pos,
        }))
    }

    fn name(&self) -> &'static str {
        "buffer"
    }
}
