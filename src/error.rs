//! Error type shared by every stage and terminal operation.
//!
//! Stages are lazy, so most of these surface only when the offending element
//! is actually pulled. Argument checks that do not depend on data
//! (`take_last(0)`, `chunk(0)`, an unknown traversal order) fail eagerly from
//! the builder call instead.

use crate::value::Value;
use std::fmt;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure raised while building or pulling through a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A grouping path resolved to `null` (or to something that cannot be a key).
    InvalidGroupKey {
        /// Path or extractor description that produced the key.
        path: String,
        /// The value that could not be used as a key.
        found: Value,
    },
    /// An argument was rejected before any element was pulled.
    InvalidArgument(String),
    /// Input rows do not have the shape an operation requires.
    UnsupportedShape(String),
    /// An aggregate met a value that cannot be read as a number.
    NonNumeric(Value),
}

impl PipelineError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn unsupported_shape(message: impl Into<String>) -> Self {
        Self::UnsupportedShape(message.into())
    }

    pub(crate) fn group_key(path: impl Into<String>, found: Value) -> Self {
        Self::InvalidGroupKey {
            path: path.into(),
            found,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGroupKey { path, found } => {
                write!(f, "cannot use {found} from path `{path}` as a group key")
            }
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::UnsupportedShape(message) => write!(f, "unsupported shape: {message}"),
            Self::NonNumeric(value) => write!(f, "expected a numeric value, found {value}"),
        }
    }
}

impl std::error::Error for PipelineError {}
