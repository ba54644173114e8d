//! Explorer facade: the Model Store plus the expander behind one API
//!
//! The UI layer talks to the explorer with paths only. Requests for rows
//! that are gone are ignored rather than reported.

use std::sync::Arc;

use tracing::{debug, info};

use ov_core::{ModelError, ModelStore, ObjectRef, RowKind, RowPath, TreeSubscriber};

use crate::config::ExpanderConfig;
use crate::expander::{CollapseReport, ExpandReport, LazyExpander};

/// User intents accepted from the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum TreeIntent {
    Expand(RowPath),
    Collapse(RowPath),
    ContextAction(RowPath),
}

/// Result of handling a [`TreeIntent`]
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Expanded(ExpandReport),
    Collapsed(CollapseReport),
    Context(RowDetails),
    /// The intent referred to a stale row
    Ignored,
}

/// What the context menu gets to show for a row
#[derive(Debug, Clone, PartialEq)]
pub struct RowDetails {
    pub path: RowPath,

    pub label: String,

    pub summary: String,

    /// Runtime type of the bound object; `None` for group rows
    pub type_name: Option<String>,

    pub kind: RowKind,
}

/// Tree of display rows over one or more root objects
pub struct Explorer {
    store: ModelStore,
    expander: LazyExpander,
}

impl Explorer {
    pub fn new(config: ExpanderConfig) -> Self {
        Self {
            store: ModelStore::new(),
            expander: LazyExpander::new(config),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn expander(&self) -> &LazyExpander {
        &self.expander
    }

    /// Register a subscriber for row events; held weakly
    pub fn subscribe(&mut self, subscriber: Arc<dyn TreeSubscriber>) {
        self.store.subscribe(subscriber);
    }

    /// Add a top-level row bound to `object`
    pub fn add_root(&mut self, label: &str, object: ObjectRef) -> Result<RowPath, ModelError> {
        let path = self.expander.append_root(&mut self.store, label, object)?;
        info!("Added root {:?} at {}", label, path);
        Ok(path)
    }

    pub fn expand(&mut self, path: &RowPath) -> Result<ExpandReport, ModelError> {
        self.expander.expand(&mut self.store, path)
    }

    pub fn collapse(&mut self, path: &RowPath) -> Result<CollapseReport, ModelError> {
        self.expander.collapse(&mut self.store, path)
    }

    /// Details of the row at `path` for a context menu
    pub fn context_details(&self, path: &RowPath) -> Result<RowDetails, ModelError> {
        let id = self.store.row_at(path)?;
        let row = self.store.row(id).ok_or(ModelError::UnknownRow(id))?;
        let object = self.store.resolve(path)?;

        Ok(RowDetails {
            path: path.clone(),
            label: row.label.clone(),
            summary: row.summary.clone(),
            type_name: object.map(|o| o.type_name().to_string()),
            kind: row.kind,
        })
    }

    /// Dispatch a UI intent. Stale paths yield [`IntentOutcome::Ignored`].
    pub fn handle(&mut self, intent: TreeIntent) -> Result<IntentOutcome, ModelError> {
        let result = match &intent {
            TreeIntent::Expand(path) => self.expand(path).map(IntentOutcome::Expanded),
            TreeIntent::Collapse(path) => self.collapse(path).map(IntentOutcome::Collapsed),
            TreeIntent::ContextAction(path) => self.context_details(path).map(IntentOutcome::Context),
        };

        match result {
            Err(e) if e.is_stale() => {
                debug!("Ignoring {:?}: {}", intent, e);
                Ok(IntentOutcome::Ignored)
            }
            other => other,
        }
    }

    /// Remove every row and binding
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(ExpanderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ov_core::{EventLog, RowEvent};
    use ov_objects::{sample_module, JsonNode, ObjectGraph};

    #[test]
    fn test_add_root_emits_row_and_placeholder() {
        let g = ObjectGraph::new();
        let log = Arc::new(EventLog::new());
        let mut explorer = Explorer::default();
        explorer.subscribe(log.clone());

        let path = explorer.add_root("__main__", sample_module(&g)).unwrap();
        assert_eq!(path, RowPath::new(vec![0]));

        let events = log.drain();
        assert_eq!(events.len(), 2);
        match &events[0] {
            RowEvent::RowAppended { parent, label, kind, .. } => {
                assert!(parent.is_root());
                assert_eq!(label, "__main__");
                assert_eq!(*kind, RowKind::Member);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            &events[1],
            RowEvent::RowAppended { kind: RowKind::Placeholder, .. }
        ));
    }

    #[test]
    fn test_expand_replaces_placeholder() {
        let doc = JsonNode::parse(r#"{"b": 1, "a": [true]}"#).unwrap();
        let log = Arc::new(EventLog::new());
        let mut explorer = Explorer::default();
        let path = explorer.add_root("doc", doc).unwrap();
        explorer.subscribe(log.clone());

        let outcome = explorer.handle(TreeIntent::Expand(path.clone())).unwrap();
        assert!(matches!(outcome, IntentOutcome::Expanded(ref r) if r.children == 2));

        let events = log.drain();
        assert_eq!(events[0], RowEvent::SubtreeRemoved { path: path.clone() });
        let appended: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                RowEvent::RowAppended { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect();
        // "[a]" is a list and gets a placeholder, "[b]" is terminal
        assert_eq!(appended, vec!["[a]", "", "[b]"]);
    }

    #[test]
    fn test_stale_intents_are_ignored() {
        let g = ObjectGraph::new();
        let mut explorer = Explorer::default();
        let path = explorer.add_root("xs", g.list(vec![g.list(vec![])])).unwrap();

        explorer.expand(&path).unwrap();
        let inner = path.child(1);
        explorer.expand(&inner).unwrap();
        explorer.collapse(&path).unwrap();

        for intent in [
            TreeIntent::Expand(inner.child(0)),
            TreeIntent::Collapse(inner.clone()),
            TreeIntent::ContextAction(RowPath::new(vec![7])),
        ] {
            assert_eq!(explorer.handle(intent).unwrap(), IntentOutcome::Ignored);
        }
    }

    #[test]
    fn test_context_details() {
        let g = ObjectGraph::new();
        let mut explorer = Explorer::default();
        let cls = g.class("Thing", &[], None);
        let thing = g.instance(&cls);
        thing.set_attr("get_x", g.function("get_x", &["self"]));
        thing.set_attr("set_x", g.function("set_x", &["self", "v"]));
        let path = explorer.add_root("thing", thing).unwrap();
        explorer.expand(&path).unwrap();

        let details = explorer.context_details(&path.child(0)).unwrap();
        assert_eq!(details.label, "__class__");
        assert_eq!(details.summary, "<class 'Thing'>");
        assert_eq!(details.type_name.as_deref(), Some("type"));

        let group = explorer.context_details(&path.child(1)).unwrap();
        assert_eq!(group.label, "Functions +");
        assert_eq!(group.kind, RowKind::Group);
        assert_eq!(group.type_name, None);

        // Group rows ignore expand and collapse
        let outcome = explorer.handle(TreeIntent::Expand(path.child(1))).unwrap();
        assert!(matches!(outcome, IntentOutcome::Expanded(ref r) if r.skipped));
        let outcome = explorer.handle(TreeIntent::Collapse(path.child(1))).unwrap();
        assert!(matches!(outcome, IntentOutcome::Collapsed(ref r) if r.skipped));
    }

    #[test]
    fn test_clear_tears_down_everything() {
        let g = ObjectGraph::new();
        let log = Arc::new(EventLog::new());
        let mut explorer = Explorer::default();
        explorer.subscribe(log.clone());

        let path = explorer.add_root("__main__", sample_module(&g)).unwrap();
        explorer.expand(&path).unwrap();
        assert!(explorer.store().binding_count() > 1);

        explorer.clear();
        assert!(explorer.store().is_empty());
        assert_eq!(explorer.store().binding_count(), 0);
        assert_eq!(log.drain().last(), Some(&RowEvent::Cleared));
    }

    #[test]
    fn test_sample_module_explores_cleanly() {
        let g = ObjectGraph::new();
        let mut explorer = Explorer::default();
        let path = explorer.add_root("__main__", sample_module(&g)).unwrap();

        let report = explorer.expand(&path).unwrap();
        assert!(report.diagnostics.is_empty());

        // Open every top-level child once, then collapse the root
        let count = explorer.store().children(explorer.store().row_at(&path).unwrap()).len();
        for i in 0..count {
            explorer.expand(&path.child(i)).unwrap();
        }
        explorer.collapse(&path).unwrap();
        assert_eq!(explorer.store().bindings_under(&path), 0);
        assert!(explorer.store().verify_bindings().is_ok());
    }
}
