//! Terminal aggregates: sum, average, median, min/max and reduce.
//!
//! These consume the collection. Numeric aggregates read ints, floats,
//! numeric strings, booleans and null (as zero); anything else fails with
//! [`PipelineError::NonNumeric`].

use crate::collection::Collection;
use crate::error::{PipelineError, Result};
use crate::path::Extractor;
use crate::stages::{SortMode, SortOrder};
use crate::value::{Key, Number, Value};

fn number_of(value: &Value) -> Result<Number> {
    value
        .number()
        .ok_or_else(|| PipelineError::NonNumeric(value.clone()))
}

/// `sum / count`, exact integer when it divides evenly.
fn divide(sum: Number, count: usize) -> Value {
    #[allow(clippy::cast_possible_wrap)]
    let count_i = count as i64;
    match sum {
        Number::Int(s) if s % count_i == 0 => Value::Int(s / count_i),
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let count_f = count as f64;
            Value::Float(sum.as_f64() / count_f)
        }
    }
}

impl Collection {
    fn extracted(self, path: Option<Extractor>) -> Self {
        match path {
            Some(path) => self.extract(path),
            None => self,
        }
    }

    /// Sum of the elements, or of `path` extracted from each. Zero when empty.
    pub fn sum_of(self, path: Option<Extractor>) -> Result<Value> {
        let mut sum = Number::Int(0);
        for item in self.extracted(path) {
            let (_, value) = item?;
            sum = sum.add(number_of(&value)?);
        }
        Ok(sum.into_value())
    }

    /// Arithmetic mean, `Null` when empty.
    pub fn avg(self, path: Option<Extractor>) -> Result<Value> {
        let mut sum = Number::Int(0);
        let mut count = 0usize;
        for item in self.extracted(path) {
            let (_, value) = item?;
            sum = sum.add(number_of(&value)?);
            count += 1;
        }
        if count == 0 {
            return Ok(Value::Null);
        }
        Ok(divide(sum, count))
    }

    /// Middle value after sorting, or the mean of the two middle values for
    /// an even count. `Null` when empty.
    pub fn median(self, path: Option<Extractor>) -> Result<Value> {
        let mut values = self.extracted(path).to_list()?;
        if values.is_empty() {
            return Ok(Value::Null);
        }
        values.sort_by(Value::compare_regular);
        let middle = values.len() / 2;
        if values.len() % 2 == 1 {
            return Ok(values.swap_remove(middle));
        }
        let sum = number_of(&values[middle - 1])?.add(number_of(&values[middle])?);
        Ok(divide(sum, 2))
    }

    /// The element with the smallest extracted value, compared with `mode`.
    pub fn min(self, by: impl Into<Extractor>, mode: SortMode) -> Result<Option<Value>> {
        self.sort_by_with(by, SortOrder::Ascending, mode).first()
    }

    /// The element with the largest extracted value, compared with `mode`.
    pub fn max(self, by: impl Into<Extractor>, mode: SortMode) -> Result<Option<Value>> {
        self.sort_by_with(by, SortOrder::Descending, mode).first()
    }

    /// Fold every element into an accumulator.
    ///
    /// Without `initial`, the first element seeds the accumulator; an empty
    /// collection then reduces to `Null`.
    pub fn reduce<F>(self, f: F, initial: Option<Value>) -> Result<Value>
    where
        F: Fn(Value, Value, &Key) -> Value,
    {
        let mut acc = initial;
        for item in self {
            let (key, value) = item?;
            acc = Some(match acc {
                Some(acc) => f(acc, value, &key),
                None => value,
            });
        }
        Ok(acc.unwrap_or_default())
    }
}
