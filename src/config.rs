//! Defaults shared by every collection derived from the same source.

use crate::error::{PipelineError, Result};
use crate::stages::{SortMode, SortOrder};
use serde::{Deserialize, Serialize};

/// Settings consulted by tree building, tree printing and sorting when the
/// caller does not pass an explicit value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Property that receives a node's children in `nest`.
    pub nesting_key: String,
    /// Prefix repeated once per depth level by `print_tree`.
    pub tree_spacer: String,
    pub sort_order: SortOrder,
    pub sort_mode: SortMode,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            nesting_key: "children".to_string(),
            tree_spacer: "__".to_string(),
            sort_order: SortOrder::default(),
            sort_mode: SortMode::default(),
        }
    }
}

impl CollectionConfig {
    pub fn with_nesting_key(mut self, key: impl Into<String>) -> Self {
        self.nesting_key = key.into();
        self
    }

    pub fn with_tree_spacer(mut self, spacer: impl Into<String>) -> Self {
        self.tree_spacer = spacer.into();
        self
    }

    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn with_sort_mode(mut self, mode: SortMode) -> Self {
        self.sort_mode = mode;
        self
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| PipelineError::invalid_argument(format!("collection config: {e}")))
    }
}
