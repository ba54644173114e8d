//! Model Store: the display-row tree and its path->object side-table

mod path;
mod row;

pub use path::RowPath;
pub use row::{DisplayRow, Materialization, RowKind};

use std::sync::{Arc, Weak};

use ahash::AHashMap;
use thiserror::Error;
use tracing::debug;

use crate::events::{RowEvent, TreeSubscriber};
use crate::inspect::ObjectRef;

/// Errors that can occur in model operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("no row at path {0}")]
    UnknownPath(RowPath),

    #[error("path {0} is not bound")]
    NotBound(RowPath),

    #[error("unknown row {0:?}")]
    UnknownRow(RowId),

    #[error("invalid path string: {0:?}")]
    InvalidPath(String),

    #[error("binding at {0} has no matching row in the tree")]
    StructuralViolation(RowPath),
}

impl ModelError {
    /// True for errors that mean "the UI event refers to a row that is gone"
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            ModelError::UnknownPath(_) | ModelError::NotBound(_) | ModelError::UnknownRow(_)
        )
    }
}

/// Stable handle to a row, valid until the row is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

/// Side-table entry
#[derive(Clone)]
pub struct Binding {
    pub path: RowPath,
    /// `None` for group rows
    pub object: Option<ObjectRef>,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("path", &self.path)
            .field("object", &self.object.as_ref().map(|o| o.type_name().to_string()))
            .finish()
    }
}

#[derive(Debug)]
struct RowNode {
    row: DisplayRow,
    parent: Option<RowId>,
    children: Vec<RowId>,
}

/// Ordered tree of display rows plus the path->object side-table.
///
/// The store references inspected objects but never traverses them; all
/// mutation goes through [`ModelStore::append`], [`ModelStore::bind`],
/// [`ModelStore::clear_subtree`] and [`ModelStore::clear`].
pub struct ModelStore {
    nodes: AHashMap<RowId, RowNode>,
    next_id: u64,
    bindings: AHashMap<RowPath, Binding>,
    subscribers: Vec<Weak<dyn TreeSubscriber>>,
}

impl ModelStore {
    const ROOT: RowId = RowId(0);

    /// Create an empty store holding only the root sentinel
    pub fn new() -> Self {
        let mut nodes = AHashMap::new();
        nodes.insert(
            Self::ROOT,
            RowNode {
                row: DisplayRow::group(""),
                parent: None,
                children: Vec::new(),
            },
        );

        Self {
            nodes,
            next_id: 1,
            bindings: AHashMap::new(),
            subscribers: Vec::new(),
        }
    }

    /// The invisible root sentinel; top-level rows are its children
    pub fn root(&self) -> RowId {
        Self::ROOT
    }

    /// Append `row` as the last child of `parent`.
    ///
    /// Does not touch the side-table; callers bind separately.
    pub fn append(&mut self, parent: RowId, row: DisplayRow) -> Result<RowId, ModelError> {
        if !self.nodes.contains_key(&parent) {
            return Err(ModelError::UnknownRow(parent));
        }

        let id = RowId(self.next_id);
        self.next_id += 1;

        let event_row = row.clone();
        self.nodes.insert(
            id,
            RowNode {
                row,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }

        let path = self.path_of(id)?;
        let parent_path = path.parent().unwrap_or_default();
        self.notify(RowEvent::RowAppended {
            parent: parent_path,
            path,
            label: event_row.label,
            summary: event_row.summary,
            is_leaf_marker: event_row.is_leaf_marker,
            kind: event_row.kind,
        });

        Ok(id)
    }

    /// Record or overwrite the binding at `path`
    pub fn bind(&mut self, path: RowPath, object: Option<ObjectRef>) {
        self.bindings.insert(path.clone(), Binding { path, object });
    }

    /// Look up the object bound at `path`.
    ///
    /// `Ok(None)` is a bound group row; `NotBound` means the row is stale.
    pub fn resolve(&self, path: &RowPath) -> Result<Option<ObjectRef>, ModelError> {
        self.bindings
            .get(path)
            .map(|binding| binding.object.clone())
            .ok_or_else(|| ModelError::NotBound(path.clone()))
    }

    pub fn binding(&self, path: &RowPath) -> Option<&Binding> {
        self.bindings.get(path)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of bindings strictly below `path`
    pub fn bindings_under(&self, path: &RowPath) -> usize {
        self.bindings
            .keys()
            .filter(|p| p.is_descendant_of(path))
            .count()
    }

    /// Current path of a row
    pub fn path_of(&self, id: RowId) -> Result<RowPath, ModelError> {
        let mut indices = Vec::new();
        let mut current = id;

        while let Some(parent) = self.node(current)?.parent {
            let index = self
                .node(parent)?
                .children
                .iter()
                .position(|child| *child == current)
                .ok_or(ModelError::UnknownRow(current))?;
            indices.push(index);
            current = parent;
        }

        indices.reverse();
        Ok(RowPath::new(indices))
    }

    /// Row currently at `path`
    pub fn row_at(&self, path: &RowPath) -> Result<RowId, ModelError> {
        let mut current = Self::ROOT;
        for &index in path.indices() {
            current = *self
                .node(current)?
                .children
                .get(index)
                .ok_or_else(|| ModelError::UnknownPath(path.clone()))?;
        }
        Ok(current)
    }

    pub fn row(&self, id: RowId) -> Option<&DisplayRow> {
        self.nodes.get(&id).map(|node| &node.row)
    }

    pub fn set_state(&mut self, id: RowId, state: Materialization) -> Result<(), ModelError> {
        let node = self.nodes.get_mut(&id).ok_or(ModelError::UnknownRow(id))?;
        node.row.state = state;
        Ok(())
    }

    /// Children of `id` in display order; empty for unknown rows
    pub fn children(&self, id: RowId) -> &[RowId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of rows, not counting the root sentinel
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every descendant of `id` and evict every binding below its path.
    ///
    /// Returns the number of evicted bindings. Calling it again is a no-op.
    pub fn clear_subtree(&mut self, id: RowId) -> Result<usize, ModelError> {
        let path = self.path_of(id)?;

        let mut pending = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Err(ModelError::UnknownRow(id)),
        };
        let removed_rows = !pending.is_empty();

        while let Some(child) = pending.pop() {
            if let Some(node) = self.nodes.remove(&child) {
                pending.extend(node.children);
            }
        }

        let before = self.bindings.len();
        self.bindings.retain(|p, _| !p.is_descendant_of(&path));
        let evicted = before - self.bindings.len();

        if removed_rows || evicted > 0 {
            debug!("Cleared subtree at {} ({} bindings evicted)", path, evicted);
            self.notify(RowEvent::SubtreeRemoved { path });
        }

        Ok(evicted)
    }

    /// Tear down the whole tree and side-table
    pub fn clear(&mut self) {
        self.nodes.retain(|id, _| *id == Self::ROOT);
        if let Some(root) = self.nodes.get_mut(&Self::ROOT) {
            root.children.clear();
        }
        self.bindings.clear();
        self.notify(RowEvent::Cleared);
    }

    /// Check that every side-table entry points at a live, non-placeholder row
    pub fn verify_bindings(&self) -> Result<(), ModelError> {
        for (key, binding) in &self.bindings {
            if *key != binding.path {
                return Err(ModelError::StructuralViolation(key.clone()));
            }
            let id = self
                .row_at(key)
                .map_err(|_| ModelError::StructuralViolation(key.clone()))?;
            if id == Self::ROOT || self.row(id).map_or(true, DisplayRow::is_placeholder) {
                return Err(ModelError::StructuralViolation(key.clone()));
            }
        }
        Ok(())
    }

    /// Add a subscriber; held weakly
    pub fn subscribe(&mut self, subscriber: Arc<dyn TreeSubscriber>) {
        self.subscribers.push(Arc::downgrade(&subscriber));
    }

    fn notify(&mut self, event: RowEvent) {
        // Remove any dead weak references
        self.subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in &self.subscribers {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_row_event(&event);
            }
        }
    }

    fn node(&self, id: RowId) -> Result<&RowNode, ModelError> {
        self.nodes.get(&id).ok_or(ModelError::UnknownRow(id))
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}
