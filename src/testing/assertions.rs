//! Assertion functions for testing pipeline outputs.
//!
//! Expected values are written as `serde_json` literals and converted with
//! `Value::from`, so integer/float distinctions follow JSON number parsing.

use crate::value::{Key, Record, Value};
use std::fmt::Debug;

fn expected_list(expected: serde_json::Value) -> Vec<Value> {
    match Value::from(expected) {
        Value::List(items) => items,
        other => vec![other],
    }
}

/// Assert that a list of values equals a JSON array, in order.
///
/// # Panics
///
/// Panics if the lists differ in length or content.
///
/// # Example
///
/// ```
/// use lazyflow::Value;
/// use lazyflow::testing::assert_values_equal;
/// use serde_json::json;
///
/// assert_values_equal(&[Value::from(1), Value::from("a")], json!([1, "a"]));
/// ```
pub fn assert_values_equal(actual: &[Value], expected: serde_json::Value) {
    let expected = expected_list(expected);
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e}\n  Actual: {a}"
        );
    }
}

/// Assert that a record equals a JSON object, including key order.
///
/// # Panics
///
/// Panics if keys, key order or values differ.
pub fn assert_record_equal(actual: &Record, expected: serde_json::Value) {
    let expected = Value::from(expected);
    let Value::Map(expected) = expected else {
        panic!("expected value must be a JSON object, got {expected}");
    };
    let actual_keys: Vec<&Key> = actual.keys().collect();
    let expected_keys: Vec<&Key> = expected.keys().collect();
    assert_eq!(
        actual_keys, expected_keys,
        "Record key mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (key, e) in expected.iter() {
        let a = actual.get(key);
        assert_eq!(a, Some(e), "Record mismatch at key {key}");
    }
}

/// Assert the keys of a list of entries, in order.
///
/// # Panics
///
/// Panics if the keys differ.
pub fn assert_keys<K: Into<Key> + Clone + Debug>(actual: &[(Key, Value)], expected: &[K]) {
    let actual: Vec<&Key> = actual.iter().map(|(k, _)| k).collect();
    let expected: Vec<Key> = expected.iter().cloned().map(Into::into).collect();
    let expected: Vec<&Key> = expected.iter().collect();
    assert_eq!(actual, expected, "Key mismatch");
}

/// Assert that all values satisfy a predicate.
///
/// # Panics
///
/// Panics with the first failing index.
pub fn assert_all(values: &[Value], predicate: impl Fn(&Value) -> bool) {
    for (i, item) in values.iter().enumerate() {
        assert!(
            predicate(item),
            "Predicate failed for element at index {i}: {item}"
        );
    }
}

/// Assert that at least one value satisfies a predicate.
///
/// # Panics
///
/// Panics if no value satisfies the predicate.
pub fn assert_any(values: &[Value], predicate: impl Fn(&Value) -> bool) {
    assert!(
        values.iter().any(predicate),
        "No element satisfied the predicate. Collection: {values:?}"
    );
}

/// Assert that no value satisfies a predicate.
///
/// # Panics
///
/// Panics with the first matching index.
pub fn assert_none(values: &[Value], predicate: impl Fn(&Value) -> bool) {
    if let Some(i) = values.iter().position(predicate) {
        panic!("Element at index {i} unexpectedly satisfied the predicate: {}", values[i]);
    }
}
