//! Cartesian product and transpose. Both materialise the collection eagerly.

use crate::collection::Collection;
use crate::error::{PipelineError, Result};
use crate::value::Value;
use tracing::debug;

/// Children of a one-dimensional row, or why it is not one.
fn flat_row(row: Value, position: usize) -> Result<Vec<Value>> {
    let Some(entries) = row.clone().into_entries() else {
        return Err(PipelineError::unsupported_shape(format!(
            "row {position} is a {}, not a list or record",
            row.type_name()
        )));
    };
    let values: Vec<Value> = entries.into_iter().map(|(_, v)| v).collect();
    if values.iter().any(Value::is_iterable) {
        return Err(PipelineError::unsupported_shape(format!(
            "row {position} is multidimensional"
        )));
    }
    Ok(values)
}

impl Collection {
    /// Every combination taking one value from each row, in odometer order:
    /// the last row varies fastest.
    ///
    /// `filter` drops combinations before `operation` maps the survivors.
    /// An empty collection, or any empty row, yields no combinations.
    ///
    /// ### Errors
    /// `UnsupportedShape` when a row is not a flat list or record.
    ///
    /// ### Example
    /// ```no_run
    /// use lazyflow::*;
    /// use serde_json::json;
    ///
    /// let pairs = collection(json!([["A", "B"], [1, 2]]))
    ///     .cartesian_product(None, None)?
    ///     .to_list()?;
    /// assert_eq!(pairs[1], Value::from(json!(["A", 2])));
    /// # Ok::<(), PipelineError>(())
    /// ```
    pub fn cartesian_product(
        self,
        operation: Option<&dyn Fn(Vec<Value>) -> Value>,
        filter: Option<&dyn Fn(&[Value]) -> bool>,
    ) -> Result<Self> {
        let config = std::rc::Rc::clone(&self.config);
        let rows = self
            .to_list()?
            .into_iter()
            .enumerate()
            .map(|(i, row)| flat_row(row, i))
            .collect::<Result<Vec<_>>>()?;

        let mut result = Vec::new();
        if !rows.is_empty() && rows.iter().all(|row| !row.is_empty()) {
            let last = rows.len() - 1;
            let mut indexes = vec![0usize; rows.len()];
            loop {
                let combination: Vec<Value> = indexes
                    .iter()
                    .zip(&rows)
                    .map(|(&i, row)| row[i].clone())
                    .collect();
                if filter.is_none_or(|keep| keep(&combination)) {
                    result.push(match operation {
                        Some(op) => op(combination),
                        None => Value::List(combination),
                    });
                }

                indexes[last] += 1;
                let mut column = last;
                while column > 0 && indexes[column] == rows[column].len() {
                    indexes[column] = 0;
                    column -= 1;
                    indexes[column] += 1;
                }
                if indexes[0] == rows[0].len() {
                    break;
                }
            }
        }
        debug!(rows = rows.len(), combinations = result.len(), "cartesian product");
        Ok(Collection::from_vec(result).with_config_rc(config))
    }

    /// Swap rows and columns. Column `j` of the output lists the `j`-th value
    /// of every row.
    ///
    /// ### Errors
    /// `UnsupportedShape` when rows differ in length or are not lists or records.
    pub fn transpose(self) -> Result<Self> {
        let config = std::rc::Rc::clone(&self.config);
        let mut rows = Vec::new();
        for (i, row) in self.to_list()?.into_iter().enumerate() {
            let Some(entries) = row.clone().into_entries() else {
                return Err(PipelineError::unsupported_shape(format!(
                    "row {i} is a {}, not a list or record",
                    row.type_name()
                )));
            };
            rows.push(entries.into_iter().map(|(_, v)| v).collect::<Vec<_>>());
        }
        let width = rows.first().map_or(0, Vec::len);
        if let Some(i) = rows.iter().position(|row| row.len() != width) {
            return Err(PipelineError::unsupported_shape(format!(
                "row {i} has {} columns, expected {width}",
                rows[i].len()
            )));
        }
        let mut columns: Vec<Vec<Value>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
        for row in rows {
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Ok(Collection::from_vec(columns).with_config_rc(config))
    }
}
