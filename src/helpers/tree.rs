use crate::collection::Collection;
use crate::error::Result;
use crate::path::Extractor;
use crate::tree::{NestStage, TraversalOrder, TreePrinterStage, TreeWalkStage};

impl Collection {
    /// Rebuild trees from flat rows, children under the configured nesting key.
    ///
    /// Rows whose parent id is null, `""`, `0`, or the id of no row, become
    /// roots. Roots come out in the order their parent ids were first seen.
    ///
    /// Rows must be records. Opaque objects and scalars fail with
    /// [`PipelineError::UnsupportedShape`](crate::PipelineError::UnsupportedShape)
    /// once the collection is pulled.
    ///
    /// ### Example
    /// ```no_run
    /// use lazyflow::*;
    /// use serde_json::json;
    ///
    /// let roots = collection(json!([
    ///     {"id": 1, "parent_id": null},
    ///     {"id": 2, "parent_id": 1},
    ///     {"id": 3, "parent_id": 1},
    /// ]))
    /// .nest("id", "parent_id")
    /// .to_list()?;
    /// assert_eq!(roots.len(), 1);
    /// assert_eq!(roots[0].property("children").and_then(|c| c.len()), Some(2));
    /// # Ok::<(), PipelineError>(())
    /// ```
    pub fn nest(self, id: impl Into<Extractor>, parent: impl Into<Extractor>) -> Self {
        let nesting_key = self.config.nesting_key.clone();
        self.nest_with_key(id, parent, &nesting_key)
    }

    pub fn nest_with_key(
        self,
        id: impl Into<Extractor>,
        parent: impl Into<Extractor>,
        nesting_key: &str,
    ) -> Self {
        let (id, parent) = (id.into(), parent.into());
        let nesting_key = nesting_key.to_string();
        self.chain(|up| Box::new(NestStage::new(up, id, parent, nesting_key)))
    }

    /// Flatten nested rows; `order` is `"desc"` (parents first), `"asc"`
    /// (children first) or `"leaves"`.
    ///
    /// ### Errors
    /// `InvalidArgument` for any other order, before anything is pulled.
    pub fn list_nested(self, order: &str) -> Result<Self> {
        let order: TraversalOrder = order.parse()?;
        let nesting = Extractor::path(&self.config.nesting_key);
        Ok(self.list_nested_by(order, nesting))
    }

    pub fn list_nested_by(self, order: TraversalOrder, nesting: impl Into<Extractor>) -> Self {
        let nesting = nesting.into();
        self.chain(|up| Box::new(TreeWalkStage::new(up, order, nesting)))
    }

    /// Pre-order listing of nested rows as indented labels.
    ///
    /// Each label is `value(node)` prefixed with the configured spacer once
    /// per depth level. Keys come from `key` when given, otherwise they count
    /// up from zero.
    pub fn print_tree(self, value: impl Into<Extractor>, key: Option<Extractor>) -> Self {
        let nesting = Extractor::path(&self.config.nesting_key);
        let spacer = self.config.tree_spacer.clone();
        let value = value.into();
        self.chain(|up| Box::new(TreePrinterStage::new(up, nesting, value, key, spacer)))
    }
}
