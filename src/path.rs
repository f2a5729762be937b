//! Property paths and value extractors.
//!
//! A [`Path`] is a dot-separated navigation expression such as
//! `"author.name"` or `"comments.{*}.user"`. It is split once when the stage
//! is built; resolving it never fails. A missing segment simply yields
//! [`Value::Null`].
//!
//! The `{*}` segment fans out: everything after it is resolved against each
//! child of the iterable found at that point, producing a nested list that
//! callers flatten (see `Collection::extract`). A further `{*}` in the
//! remainder fans out again inside each child.
//!
//! Every grouping, indexing, sorting and matching operation takes an
//! [`Extractor`], which is either a compiled path or a closure; `&str` and
//! `String` convert into one directly.

use crate::value::{Key, Value};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// The fan-out segment.
pub const WILDCARD: &str = "{*}";

/// A compiled property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    source: String,
    segments: Rc<[String]>,
}

impl Path {
    pub fn new(path: &str) -> Self {
        Self {
            source: path.to_string(),
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| s == WILDCARD)
    }

    /// Resolve against one element. Missing segments give `Null`.
    pub fn resolve(&self, value: &Value) -> Value {
        resolve_segments(value, &self.segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn walk<'a>(start: &'a Value, segments: &[String]) -> Option<Cow<'a, Value>> {
    let mut current = Cow::Borrowed(start);
    for segment in segments {
        current = match current {
            Cow::Borrowed(v) => v.property(segment)?,
            Cow::Owned(v) => Cow::Owned(v.property(segment)?.into_owned()),
        };
    }
    Some(current)
}

fn resolve_segments(value: &Value, segments: &[String]) -> Value {
    let Some(star) = segments.iter().position(|s| s == WILDCARD) else {
        return walk(value, segments).map_or(Value::Null, Cow::into_owned);
    };
    let Some(container) = walk(value, &segments[..star]) else {
        return Value::Null;
    };
    let rest = &segments[star + 1..];
    let children: Vec<Value> = match &*container {
        Value::List(items) => items.iter().map(|c| resolve_segments(c, rest)).collect(),
        Value::Map(record) => record.values().map(|c| resolve_segments(c, rest)).collect(),
        _ => return Value::Null,
    };
    Value::List(children)
}

type ExtractFn = dyn Fn(&Value, &Key) -> Value;

#[derive(Clone)]
enum Kind {
    Identity,
    Path(Path),
    Func(Rc<ExtractFn>),
}

/// Pure lookup from an element (and its key) to a value.
#[derive(Clone)]
pub struct Extractor {
    kind: Kind,
}

impl Extractor {
    /// Returns the element itself.
    pub fn identity() -> Self {
        Self { kind: Kind::Identity }
    }

    pub fn path(path: &str) -> Self {
        Self {
            kind: Kind::Path(Path::new(path)),
        }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Value, &Key) -> Value + 'static,
    {
        Self {
            kind: Kind::Func(Rc::new(f)),
        }
    }

    pub fn extract(&self, value: &Value, key: &Key) -> Value {
        match &self.kind {
            Kind::Identity => value.clone(),
            Kind::Path(path) => path.resolve(value),
            Kind::Func(f) => f(value, key),
        }
    }

    /// True for paths containing `{*}`; their results are nested lists.
    pub fn is_fan_out(&self) -> bool {
        matches!(&self.kind, Kind::Path(p) if p.has_wildcard())
    }

    /// Human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            Kind::Identity => "<identity>".to_string(),
            Kind::Path(path) => path.to_string(),
            Kind::Func(_) => "<closure>".to_string(),
        }
    }
}

impl fmt::Debug for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Extractor").field(&self.describe()).finish()
    }
}

impl From<&str> for Extractor {
    fn from(value: &str) -> Self {
        Self::path(value)
    }
}

impl From<String> for Extractor {
    fn from(value: String) -> Self {
        Self::path(&value)
    }
}

impl From<&String> for Extractor {
    fn from(value: &String) -> Self {
        Self::path(value)
    }
}

impl From<Path> for Extractor {
    fn from(value: Path) -> Self {
        Self {
            kind: Kind::Path(value),
        }
    }
}

/// A conjunction of `path == value` tests using loose equality.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    matchers: Vec<(Extractor, Value)>,
}

impl Conditions {
    pub fn new<S, V, I>(conditions: I) -> Self
    where
        S: Into<Extractor>,
        V: Into<Value>,
        I: IntoIterator<Item = (S, V)>,
    {
        Self {
            matchers: conditions
                .into_iter()
                .map(|(path, expected)| (path.into(), expected.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// True when every condition holds. An empty set matches everything.
    pub fn matches(&self, value: &Value, key: &Key) -> bool {
        self.matchers
            .iter()
            .all(|(extractor, expected)| extractor.extract(value, key).loose_eq(expected))
    }
}
