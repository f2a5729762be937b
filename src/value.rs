//! Element model: keys, values, ordered records and opaque objects.
//!
//! Pipelines carry `(Key, Value)` entries. A [`Value`] is a tagged variant so
//! that property paths can dispatch explicitly on what they are looking at:
//! ordered records ([`Record`]), positional lists, scalars, or opaque host
//! objects that expose named properties through [`Object`].

use ordered_float::OrderedFloat;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Entry key. Integer-looking strings normalise to [`Key::Int`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Build a key from text, normalising canonical integers (`"12"` but not `"012"`).
    pub fn parse(s: &str) -> Self {
        canonical_int(s).map_or_else(|| Self::Str(s.to_string()), Self::Int)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(_) => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Int(i) => Value::Int(i),
            Self::Str(s) => Value::Str(s),
        }
    }
}

fn canonical_int(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if negative && digits == "0" {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Key {
    #[allow(clippy::cast_possible_wrap)]
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        match canonical_int(&value) {
            Some(i) => Self::Int(i),
            None => Self::Str(value),
        }
    }
}

/// Host object carried through a pipeline without being decomposed.
///
/// Paths reach into an object only through [`Object::property`].
pub trait Object: fmt::Debug + Send + Sync {
    /// Look up a named property; `None` when the object does not expose it.
    fn property(&self, name: &str) -> Option<Value>;

    /// Representation used when the element is serialized.
    fn to_value(&self) -> Value {
        Value::Null
    }

    fn as_any(&self) -> &dyn Any;
}

/// Insertion-ordered map from [`Key`] to [`Value`].
///
/// Inserting an existing key overwrites the value in place, keeping its
/// original position. [`Record::push`] appends under the next free integer key.
#[derive(Debug, Clone, Default)]
pub struct Record {
    entries: Vec<(Key, Value)>,
    index: HashMap<Key, usize>,
    next_index: i64,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            next_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite; returns the previous value for the key.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(&i) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[i].1, value));
        }
        if let Key::Int(i) = key {
            if i >= self.next_index {
                self.next_index = i.saturating_add(1);
            }
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Insert only when the key is not present yet. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, key: Key, value: Value) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.insert(key, value);
        true
    }

    /// Append under the next integer key and return that key.
    pub fn push(&mut self, value: impl Into<Value>) -> Key {
        let key = Key::Int(self.next_index);
        self.insert(key.clone(), value);
        key
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn into_entries(self) -> Vec<(Key, Value)> {
        self.entries
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A pipeline element.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(Record),
    Opaque(Arc<dyn Object>),
}

/// Numeric view of a value used by aggregates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub(crate) fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map_or_else(|| Number::Float(self.as_f64() + other.as_f64()), Number::Int),
            _ => Number::Float(self.as_f64() + other.as_f64()),
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Int(i),
            Number::Float(f) => Value::Float(f),
        }
    }
}

fn parse_number(s: &str) -> Option<Number> {
    let t = s.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Some(Number::Int(i));
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite()).map(Number::Float)
}

impl Value {
    /// Wrap a host object.
    pub fn object(object: impl Object + 'static) -> Self {
        Self::Opaque(Arc::new(object))
    }

    /// Build a record value from key/value pairs.
    pub fn record<K: Into<Key>, V: Into<Value>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self::Map(pairs.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Loose truthiness: null, false, zero, `""`, `"0"` and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !(s.is_empty() || s == "0"),
            Self::List(items) => !items.is_empty(),
            Self::Map(record) => !record.is_empty(),
            Self::Opaque(_) => true,
        }
    }

    /// Lists and records can be iterated as nested sequences.
    pub fn is_iterable(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Opaque(_) => "object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            Self::Map(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Object> {
        match self {
            Self::Opaque(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Number of direct children of a list or record.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::List(items) => Some(items.len()),
            Self::Map(record) => Some(record.len()),
            _ => None,
        }
    }

    pub(crate) fn number(&self) -> Option<Number> {
        match self {
            Self::Null => Some(Number::Int(0)),
            Self::Bool(b) => Some(Number::Int(i64::from(*b))),
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            Self::Str(s) => parse_number(s),
            _ => None,
        }
    }

    /// Numeric reading used by numeric sorting; unreadable values count as zero.
    pub fn to_f64_lossy(&self) -> f64 {
        self.number().map_or(0.0, Number::as_f64)
    }

    /// Textual reading used by string and natural sorting.
    pub fn to_string_lossy(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(true) => "1".to_string(),
            Self::Bool(false) => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
            Self::List(_) | Self::Map(_) => "Array".to_string(),
            Self::Opaque(object) => format!("{object:?}"),
        }
    }

    /// Convert to a key. `None` for null, containers and objects.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_key(&self) -> Option<Key> {
        match self {
            Self::Bool(b) => Some(Key::Int(i64::from(*b))),
            Self::Int(i) => Some(Key::Int(*i)),
            Self::Float(f) if f.is_finite() => Some(Key::Int(f.trunc() as i64)),
            Self::Str(s) => Some(Key::parse(s)),
            _ => None,
        }
    }

    /// Direct child lookup on a list or record.
    pub fn get(&self, key: &Key) -> Option<&Value> {
        match (self, key) {
            (Self::Map(record), key) => record.get(key),
            (Self::List(items), Key::Int(i)) => usize::try_from(*i).ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// One step of property-path navigation.
    ///
    /// Records are addressed by key, lists by index and objects through
    /// [`Object::property`]. Null children count as missing.
    pub fn property(&self, segment: &str) -> Option<Cow<'_, Value>> {
        let found = match self {
            Self::Map(_) | Self::List(_) => self.get(&Key::parse(segment)).map(Cow::Borrowed),
            Self::Opaque(object) => object.property(segment).map(Cow::Owned),
            _ => None,
        };
        found.filter(|v| !v.is_null())
    }

    /// Mutable counterpart of [`Value::property`] for records and lists.
    pub(crate) fn property_mut(&mut self, segment: &str) -> Option<&mut Value> {
        let found = match self {
            Self::Map(record) => record.get_mut(&Key::parse(segment)),
            Self::List(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        };
        found.filter(|v| !v.is_null())
    }

    /// Set a direct child. Lists accept an existing index or the next one.
    pub(crate) fn set_property(&mut self, segment: &str, value: Value) -> bool {
        match self {
            Self::Map(record) => {
                record.insert(Key::parse(segment), value);
                true
            }
            Self::List(items) => match segment.parse::<usize>() {
                Ok(i) if i < items.len() => {
                    items[i] = value;
                    true
                }
                Ok(i) if i == items.len() => {
                    items.push(value);
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Children of a list or record as keyed entries.
    pub fn into_entries(self) -> Option<Vec<(Key, Value)>> {
        match self {
            Self::List(items) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (Key::from(i), v))
                    .collect(),
            ),
            Self::Map(record) => Some(record.into_entries()),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Str(_) => 3,
            Self::List(_) => 4,
            Self::Map(_) => 5,
            Self::Opaque(_) => 6,
        }
    }

    /// Total order used by regular sorting and by `median`.
    pub fn compare_regular(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                OrderedFloat(self.to_f64_lossy()).cmp(&OrderedFloat(other.to_f64_lossy()))
            }
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Str(a), Self::Str(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.compare_regular(y) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Self::Map(a), Self::Map(b)) => a.len().cmp(&b.len()).then_with(|| {
                for (x, y) in a.values().zip(b.values()) {
                    match x.compare_regular(y) {
                        Ordering::Equal => {}
                        ord => return ord,
                    }
                }
                Ordering::Equal
            }),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Loose equality used by condition matching.
    ///
    /// Numbers and numeric strings compare by value, null equals any falsy
    /// value, booleans compare by truthiness; everything else is strict.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Str(s)) | (Self::Str(s), Self::Null) => s.is_empty(),
            (Self::Null, v) | (v, Self::Null) => !v.is_truthy(),
            (Self::Bool(b), v) | (v, Self::Bool(b)) => *b == v.is_truthy(),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_) | Self::Str(_))
            | (Self::Str(_), Self::Int(_) | Self::Float(_)) => {
                match (self.numeric_strict(), other.numeric_strict()) {
                    (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
                    _ => false,
                }
            }
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.loose_eq(w)))
            }
            _ => self == other,
        }
    }

    fn numeric_strict(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            Self::Str(s) => parse_number(s),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            Self::Float(f) => {
                1u8.hash(state);
                OrderedFloat(*f).hash(state);
            }
            Self::Str(s) => s.hash(state),
            Self::List(items) => items.hash(state),
            Self::Map(record) => record.hash(state),
            Self::Opaque(object) => (Arc::as_ptr(object).cast::<()>() as usize).hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{self:?}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Str(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(record) => record.serialize(serializer),
            Self::Opaque(object) => object.to_value().serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(&k.to_string(), v)?;
        }
        map.end()
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Self::Str(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(fields) => Self::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (Key::from(k), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_possible_wrap)]
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        value.into_value()
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
