//! Tree building from flat `(id, parent id)` rows and tree traversal.
//!
//! [`NestStage`] runs the map/reduce engine over the rows. Every row becomes
//! one node in an arena and is grouped under its parent id; the reducer then
//! either links a group under the node owning that id or, when no node does
//! (or the parent id is empty), emits the group's nodes as roots. Edges are
//! arena indices, and a node has at most one parent, so the finished trees
//! are assembled without aliasing and without cycles.
//!
//! [`TreeWalkStage`] flattens nested rows back out in pre-order, post-order
//! or leaves-only order, reading children from a nesting property.

use crate::error::{PipelineError, Result};
use crate::map_reduce::MapReduce;
use crate::path::Extractor;
use crate::stage::{Entry, Stage, fork_rest};
use crate::value::{Key, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;
use tracing::debug;

/// Order in which [`TreeWalkStage`] yields nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Parent before its children (`"desc"`).
    PreOrder,
    /// Children before their parent (`"asc"`).
    PostOrder,
    /// Only nodes without children (`"leaves"`).
    Leaves,
}

impl FromStr for TraversalOrder {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "desc" => Ok(Self::PreOrder),
            "asc" => Ok(Self::PostOrder),
            "leaves" => Ok(Self::Leaves),
            other => Err(PipelineError::invalid_argument(format!(
                "unknown traversal order `{other}`, expected desc, asc or leaves"
            ))),
        }
    }
}

#[derive(Debug)]
struct Node {
    value: Option<Value>,
    children: Vec<usize>,
}

#[derive(Debug, Default)]
struct Arena {
    nodes: Vec<Node>,
    by_id: HashMap<Key, usize>,
}

/// Parent ids that mark a root: null, `""` and `0`.
fn is_root_marker(key: &Key) -> bool {
    match key {
        Key::Int(i) => *i == 0,
        Key::Str(s) => s.is_empty(),
    }
}

fn node_key(extractor: &Extractor, value: &Value, key: &Key) -> Result<Key> {
    let raw = extractor.extract(value, key);
    if raw.is_null() {
        return Ok(Key::Str(String::new()));
    }
    raw.to_key()
        .ok_or_else(|| PipelineError::group_key(extractor.describe(), raw))
}

/// Builds nested trees on first pull and yields the roots.
pub(crate) struct NestStage {
    upstream: Box<dyn Stage>,
    id: Extractor,
    parent: Extractor,
    nesting_key: String,
    roots: Option<std::vec::IntoIter<Entry>>,
}

impl NestStage {
    pub(crate) fn new(
        upstream: Box<dyn Stage>,
        id: Extractor,
        parent: Extractor,
        nesting_key: impl Into<String>,
    ) -> Self {
        Self {
            upstream,
            id,
            parent,
            nesting_key: nesting_key.into(),
            roots: None,
        }
    }

    fn engine(&self, arena: &Rc<RefCell<Arena>>) -> MapReduce {
        let (id, parent) = (self.id.clone(), self.parent.clone());
        let map_arena = Rc::clone(arena);
        let reduce_arena = Rc::clone(arena);
        MapReduce::new(move |value, key, emitter| {
            if !matches!(value, Value::Map(_)) {
                return Err(PipelineError::unsupported_shape(format!(
                    "nest needs record rows, found {}",
                    value.type_name()
                )));
            }
            let node_id = node_key(&id, &value, key)?;
            let parent_id = node_key(&parent, &value, key)?;
            let mut arena = map_arena.borrow_mut();
            let index = arena.nodes.len();
            arena.nodes.push(Node {
                value: Some(value),
                children: Vec::new(),
            });
            arena.by_id.insert(node_id, index);
            emitter.emit_intermediate(index, parent_id);
            Ok(())
        })
        .with_reducer(move |indices, parent_id, emitter| {
            let mut arena = reduce_arena.borrow_mut();
            let owner = if is_root_marker(parent_id) {
                None
            } else {
                arena.by_id.get(parent_id).copied()
            };
            let children = indices.iter().filter_map(Value::as_i64).filter_map(|i| usize::try_from(i).ok());
            match owner {
                Some(owner) => arena.nodes[owner].children.extend(children),
                None => children.for_each(|root| emitter.emit_value(root)),
            }
            Ok(())
        })
    }

    fn build(&mut self) -> Result<std::vec::IntoIter<Entry>> {
        let arena = Rc::new(RefCell::new(Arena::default()));
        let reduced = self.engine(&arena).run(&mut *self.upstream)?;

        let mut arena = arena.borrow_mut();
        let mut roots = Vec::with_capacity(reduced.len());
        for (key, index) in reduced {
            let Some(index) = index.as_i64().and_then(|i| usize::try_from(i).ok()) else {
                continue;
            };
            roots.push((key, assemble(&mut arena.nodes, index, &self.nesting_key)));
        }
        debug!(nodes = arena.nodes.len(), roots = roots.len(), "nested");
        Ok(roots.into_iter())
    }
}

/// Move the subtree under `root` out of the arena, children nested under
/// `nesting_key`. Iterative post-order so deep trees do not grow the call stack.
fn assemble(nodes: &mut [Node], root: usize, nesting_key: &str) -> Value {
    let mut stack = vec![(root, false)];
    let mut done: HashMap<usize, Value> = HashMap::new();
    while let Some((index, expanded)) = stack.pop() {
        if !expanded {
            stack.push((index, true));
            stack.extend(nodes[index].children.iter().rev().map(|&c| (c, false)));
            continue;
        }
        let children = std::mem::take(&mut nodes[index].children)
            .into_iter()
            .filter_map(|c| done.remove(&c))
            .collect::<Vec<_>>();
        let mut value = nodes[index].value.take().unwrap_or_default();
        value.set_property(nesting_key, Value::List(children));
        done.insert(index, value);
    }
    done.remove(&root).unwrap_or_default()
}

impl Stage for NestStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        if self.roots.is_none() {
            match self.build() {
                Ok(roots) => self.roots = Some(roots),
                Err(e) => {
                    self.roots = Some(Vec::new().into_iter());
                    return Some(Err(e));
                }
            }
        }
        self.roots.as_mut()?.next().map(Ok)
    }

    fn exact_len(&self) -> Option<usize> {
        self.roots.as_ref().map(ExactSizeIterator::len)
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        if let Some(roots) = &self.roots {
            return Some(fork_rest(roots));
        }
        Some(Box::new(Self::new(
            self.upstream.fork()?,
            self.id.clone(),
            self.parent.clone(),
            self.nesting_key.clone(),
        )))
    }

    fn name(&self) -> &'static str {
        "nest"
    }
}

#[derive(Clone)]
struct Frame {
    children: std::vec::IntoIter<Entry>,
    parent: Option<Entry>,
}

/// Lazily flattens nested rows, pulling one root at a time from upstream.
pub(crate) struct TreeWalkStage {
    upstream: Box<dyn Stage>,
    order: TraversalOrder,
    nesting: Extractor,
    stack: Vec<Frame>,
}

impl TreeWalkStage {
    pub(crate) fn new(upstream: Box<dyn Stage>, order: TraversalOrder, nesting: Extractor) -> Self {
        Self {
            upstream,
            order,
            nesting,
            stack: Vec::new(),
        }
    }

    fn children_of(&self, value: &Value, key: &Key) -> Option<Vec<Entry>> {
        let children = self.nesting.extract(value, key);
        if children.len().unwrap_or(0) == 0 {
            return None;
        }
        children.into_entries()
    }

    fn fork_walk(&self) -> Option<Self> {
        Some(Self {
            upstream: self.upstream.fork()?,
            order: self.order,
            nesting: self.nesting.clone(),
            stack: self.stack.clone(),
        })
    }

    /// Next node together with its depth (roots are at depth 0).
    pub(crate) fn next_node(&mut self) -> Option<Result<(usize, Entry)>> {
        loop {
            let (depth, entry) = if let Some(frame) = self.stack.last_mut() {
                if let Some(entry) = frame.children.next() {
                    (self.stack.len(), entry)
                } else {
                    if let Some(Frame {
                        parent: Some(parent),
                        ..
                    }) = self.stack.pop()
                    {
                        return Some(Ok((self.stack.len(), parent)));
                    }
                    continue;
                }
            } else {
                match self.upstream.next_entry()? {
                    Ok(entry) => (0, entry),
                    Err(e) => return Some(Err(e)),
                }
            };

            let Some(children) = self.children_of(&entry.1, &entry.0) else {
                return Some(Ok((depth, entry)));
            };
            let children = children.into_iter();
            match self.order {
                TraversalOrder::PreOrder => {
                    self.stack.push(Frame {
                        children,
                        parent: None,
                    });
                    return Some(Ok((depth, entry)));
                }
                TraversalOrder::PostOrder => self.stack.push(Frame {
                    children,
                    parent: Some(entry),
                }),
                TraversalOrder::Leaves => self.stack.push(Frame {
                    children,
                    parent: None,
                }),
            }
        }
    }
}

impl Stage for TreeWalkStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        Some(self.next_node()?.map(|(_, entry)| entry))
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(self.fork_walk()?))
    }

    fn name(&self) -> &'static str {
        "list_nested"
    }
}

/// Pre-order listing where each node becomes its extracted value prefixed
/// with `spacer` once per depth level.
pub(crate) struct TreePrinterStage {
    walk: TreeWalkStage,
    value: Extractor,
    key: Option<Extractor>,
    spacer: String,
    counter: usize,
}

impl TreePrinterStage {
    pub(crate) fn new(
        upstream: Box<dyn Stage>,
        nesting: Extractor,
        value: Extractor,
        key: Option<Extractor>,
        spacer: impl Into<String>,
    ) -> Self {
        Self {
            walk: TreeWalkStage::new(upstream, TraversalOrder::PreOrder, nesting),
            value,
            key,
            spacer: spacer.into(),
            counter: 0,
        }
    }
}

impl Stage for TreePrinterStage {
    fn next_entry(&mut self) -> Option<Result<Entry>> {
        let (depth, (key, node)) = match self.walk.next_node()? {
            Ok(found) => found,
            Err(e) => return Some(Err(e)),
        };
        let label = format!(
            "{}{}",
            self.spacer.repeat(depth),
            self.value.extract(&node, &key).to_string_lossy()
        );
        let out_key = match &self.key {
            None => {
                let k = Key::from(self.counter);
                self.counter += 1;
                k
            }
            Some(extractor) => match node_key(extractor, &node, &key) {
                Ok(k) => k,
                Err(e) => return Some(Err(e)),
            },
        };
        Some(Ok((out_key, Value::Str(label))))
    }

    fn fork(&self) -> Option<Box<dyn Stage>> {
        Some(Box::new(Self {
            walk: self.walk.fork_walk()?,
            value: self.value.clone(),
            key: self.key.clone(),
            spacer: self.spacer.clone(),
            counter: self.counter,
        }))
    }

    fn name(&self) -> &'static str {
        "print_tree"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{MemorySource, drain};
    use serde_json::json;

    fn rows(json: serde_json::Value) -> Box<dyn Stage> {
        let Value::List(items) = Value::from(json) else {
            panic!("fixture must be a list");
        };
        Box::new(MemorySource::from_values(items))
    }

    #[test]
    fn traversal_order_parses_the_three_modes() {
        assert_eq!("desc".parse::<TraversalOrder>(), Ok(TraversalOrder::PreOrder));
        assert_eq!("asc".parse::<TraversalOrder>(), Ok(TraversalOrder::PostOrder));
        assert_eq!("leaves".parse::<TraversalOrder>(), Ok(TraversalOrder::Leaves));
        assert!(matches!(
            "sideways".parse::<TraversalOrder>(),
            Err(PipelineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn nest_links_children_regardless_of_row_order() -> Result<()> {
        let source = rows(json!([
            {"id": 3, "parent_id": 2},
            {"id": 1, "parent_id": null},
            {"id": 2, "parent_id": 1},
        ]));
        let mut nest = NestStage::new(source, "id".into(), "parent_id".into(), "children");
        let roots = drain(&mut nest)?;
        assert_eq!(roots.len(), 1);
        let expected = Value::from(json!({
            "id": 1, "parent_id": null, "children": [
                {"id": 2, "parent_id": 1, "children": [
                    {"id": 3, "parent_id": 2, "children": []}
                ]}
            ]
        }));
        assert_eq!(roots[0].1, expected);
        Ok(())
    }

    #[test]
    fn nest_rejects_scalar_rows() {
        let mut nest = NestStage::new(rows(json!([1, 2])), "id".into(), "parent_id".into(), "children");
        assert!(matches!(
            nest.next_entry(),
            Some(Err(PipelineError::UnsupportedShape(_)))
        ));
    }

    #[test]
    fn walk_reports_depth() -> Result<()> {
        let source = rows(json!([
            {"name": "a", "children": [{"name": "b", "children": [{"name": "c"}]}]},
            {"name": "d"},
        ]));
        let mut walk = TreeWalkStage::new(source, TraversalOrder::PreOrder, "children".into());
        let mut depths = Vec::new();
        while let Some(node) = walk.next_node() {
            let (depth, (_, value)) = node?;
            depths.push((depth, value.property("name").map(|n| n.to_string_lossy())));
        }
        assert_eq!(
            depths,
            vec![
                (0, Some("a".to_string())),
                (1, Some("b".to_string())),
                (2, Some("c".to_string())),
                (0, Some("d".to_string())),
            ]
        );
        Ok(())
    }
}
