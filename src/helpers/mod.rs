pub(crate) mod aggregates;
pub(crate) mod combinators;
pub(crate) mod grouping;
pub(crate) mod matching;
pub(crate) mod transform;
pub(crate) mod tree;
