//! Pre-built record sets for tree, grouping and path tests.

use crate::value::Value;
use serde_json::json;

/// A flat category table with `id`, `parent_id` and `name`.
///
/// Rows are deliberately out of parent order: children appear before their
/// parents. Two roots (`1` and `6`); `9` cites a parent that does not exist.
///
/// # Example
///
/// ```
/// use lazyflow::testing::category_rows;
///
/// assert_eq!(category_rows().len(), 9);
/// ```
#[must_use]
pub fn category_rows() -> Vec<Value> {
    rows(json!([
        {"id": 4, "parent_id": 3, "name": "laptops"},
        {"id": 1, "parent_id": null, "name": "electronics"},
        {"id": 2, "parent_id": 1, "name": "phones"},
        {"id": 3, "parent_id": 1, "name": "computers"},
        {"id": 5, "parent_id": 3, "name": "desktops"},
        {"id": 6, "parent_id": null, "name": "books"},
        {"id": 7, "parent_id": 6, "name": "fiction"},
        {"id": 8, "parent_id": 6, "name": "poetry"},
        {"id": 9, "parent_id": 42, "name": "orphan"},
    ]))
}

/// Articles each carrying an author record and a list of comments.
#[must_use]
pub fn articles_with_comments() -> Vec<Value> {
    rows(json!([
        {
            "id": 1,
            "title": "First",
            "author": {"name": "mariano", "id": 10},
            "comments": [
                {"user": "larry", "votes": 3},
                {"user": "mark", "votes": 1},
            ],
        },
        {
            "id": 2,
            "title": "Second",
            "author": {"name": "jose", "id": 11},
            "comments": [{"user": "larry", "votes": 5}],
        },
        {
            "id": 3,
            "title": "Third",
            "author": {"name": "mariano", "id": 10},
            "comments": [],
        },
    ]))
}

/// People with a `group` and a numeric `score`; scores include a float and a
/// numeric string.
#[must_use]
pub fn scored_people() -> Vec<Value> {
    rows(json!([
        {"name": "ann", "group": "a", "score": 10},
        {"name": "ben", "group": "b", "score": 25},
        {"name": "cat", "group": "a", "score": 2.5},
        {"name": "dan", "group": "c", "score": "7"},
        {"name": "eve", "group": "b", "score": 40},
    ]))
}

fn rows(json: serde_json::Value) -> Vec<Value> {
    match Value::from(json) {
        Value::List(items) => items,
        other => vec![other],
    }
}
