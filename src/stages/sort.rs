//! Stable sorting by an extracted value.

use crate::error::Result;
use crate::path::Extractor;
use crate::stage::{Entry, Stage, drain, fork_rest};
use crate::value::Value;
use ordered_float::OrderedFloat;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::debug;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// How extracted values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// As numbers; values that are not numeric count as zero.
    #[default]
    Numeric,
    /// As strings, byte-wise.
    String,
    /// As strings, with digit runs compared by numeric value (`"img2" < "img10"`).
    Natural,
    /// By the values' own ordering ([`Value::compare_regular`]).
    Regular,
}

impl SortMode {
    pub fn compare(self, a: &Value, b: &Value) -> Ordering {
        match self {
            SortMode::Numeric => OrderedFloat(a.to_f64_lossy()).cmp(&OrderedFloat(b.to_f64_lossy())),
            SortMode::String => a.to_string_lossy().cmp(&b.to_string_lossy()),
            SortMode::Natural => natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()),
            SortMode::Regular => a.compare_regular(b),
        }
    }
}

static NATURAL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|\D+").expect("valid natural-order token regex"));

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Natural-order string comparison.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = NATURAL_TOKEN.find_iter(a).map(|m| m.as_str());
    let mut right = NATURAL_TOKEN.find_iter(b).map(|m| m.as_str());
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let both_digits = x.as_bytes()[0].is_ascii_digit() && y.as_bytes()[0].is_ascii_digit();
                let ord = if both_digits {
                    compare_digits(x, y)
                } else {
                    x.cmp(y)
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// Materialises upstream on first pull, sorts it stably and replays it.
pub(crate) struct SortStage {
    upstream: Box<dyn Stage>,
    by: Extractor,
    order: SortOrder,
    mode: SortMode,
    sorted: Option<std::vec::IntoIter<Entry>>,
}

impl SortStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, by: Extractor, order: SortOrder, mode: SortMode) -> Self {
        Self {
            upstream,
            by,
            order,
            mode,
            sorted: None,
        }
    }

    fn materialise(&mut self) -> Result<std::vec::IntoIter<Entry>> {
        let entries = drain(&mut *self.upstream)?;
        let mut keyed: Vec<(Value, Entry)> = entries
            .into_iter()
            .map(|(k, v)| (self.by.extract(&v, &k), (k, v)))
            .collect();
        let (order, mode) = (self.order, self.mode);
        keyed.sort_by(|(a, _), (b, _)| match order {
            SortOrder::Ascending => mode.compare(a, b),
            SortOrder::Descending => mode.compare(b, a),
        });
        debug!(elements = keyed.len(), by = %self.by.describe(), ?order, ?mode, "sorted");
        Ok(keyed
            .into_iter()
            .map(|(_, entry)| entry)
            .collect::<Vec<_>>()
            .into_iter())
    }
}

impl Stage for SortStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.sorted.is_none() {
            match self.materialise() {
                Ok(sorted) => self.sorted = Some(sorted),
                Err(e) => {
                    self.sorted = Some(Vec::new().into_iter());
                    return Some(Err(e));
                }
            }
        }
        self.sorted.as_mut()?.next().map(Ok)
    }

    fn exact_len(&self) -> Option<usize> {
        match &self.sorted {
            Some(sorted) => Some(sorted.len()),
            None => self.upstream.exact_len(),
        }
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        if let Some(sorted) = &self.sorted {
            return Some(fork_rest(sorted));
        }
        Some(Box::new(Self::new(
            self.upstream.fork()?,
            self.by.clone(),
            self.order,
            self.mode,
        )))
    }

    fn name(&self) -> &'static str {
        "sort"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order_compares_digit_runs_by_value() {
        assert_eq!(natural_cmp("img2", "img10"), Ordering::Less);
        assert_eq!(natural_cmp("img10", "img10"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "b"), Ordering::Less);
        assert_eq!(natural_cmp("x01", "x1"), Ordering::Greater);
        assert_eq!(natural_cmp("file", "file1"), Ordering::Less);
    }

    #[test]
    fn numeric_mode_treats_text_as_zero() {
        let mode = SortMode::Numeric;
        assert_eq!(mode.compare(&Value::from("abc"), &Value::from(1)), Ordering::Less);
        assert_eq!(mode.compare(&Value::from("10"), &Value::from(9)), Ordering::Greater);
    }

    #[test]
    fn string_mode_is_lexical() {
        let mode = SortMode::String;
        assert_eq!(mode.compare(&Value::from(10), &Value::from(9)), Ordering::Less);
    }
}
