//! Element lookups and short-circuiting predicates.
//!
//! Everything here except [`Collection::match_conditions`] is terminal and
//! pulls only as far as it needs to.

use crate::collection::Collection;
use crate::error::Result;
use crate::path::Conditions;
use crate::trailing;
use crate::value::{Key, Value};

impl Collection {
    /// Keep elements matching every `path == value` condition.
    pub fn match_conditions(self, conditions: Conditions) -> Self {
        self.filter(move |value, key| conditions.matches(value, key))
    }

    /// The first element matching `conditions`.
    pub fn first_match(self, conditions: Conditions) -> Result<Option<Value>> {
        self.match_conditions(conditions).first()
    }

    pub fn first(mut self) -> Result<Option<Value>> {
        match self.next() {
            Some(item) => Ok(Some(item?.1)),
            None => Ok(None),
        }
    }

    pub fn last(self) -> Result<Option<Value>> {
        let mut stage = trailing::take_last(self.into_stage(), 1)?;
        match stage.next_entry() {
            Some(item) => Ok(Some(item?.1)),
            None => Ok(None),
        }
    }

    /// True when nothing is left to pull. May consume one element of a
    /// single-pass source.
    pub fn is_empty(mut self) -> Result<bool> {
        if let Some(n) = self.stage.exact_len() {
            return Ok(n == 0);
        }
        match self.next() {
            Some(item) => item.map(|_| false),
            None => Ok(true),
        }
    }

    /// True when `predicate` holds for every element (and for none at all).
    pub fn every<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&Value, &Key) -> bool,
    {
        for item in self {
            let (key, value) = item?;
            if !predicate(&value, &key) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True when `predicate` holds for at least one element.
    pub fn some<F>(self, predicate: F) -> Result<bool>
    where
        F: Fn(&Value, &Key) -> bool,
    {
        for item in self {
            let (key, value) = item?;
            if predicate(&value, &key) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True when an element is strictly equal to `needle`.
    pub fn contains(self, needle: &Value) -> Result<bool> {
        self.some(|value, _| value == needle)
    }

    /// Call `f` on every element in order.
    pub fn each<F>(self, mut f: F) -> Result<()>
    where
        F: FnMut(&Value, &Key),
    {
        for item in self {
            let (key, value) = item?;
            f(&value, &key);
        }
        Ok(())
    }
}
