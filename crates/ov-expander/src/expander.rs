//! Lazy expansion and collapse of display rows
//!
//! Rows are created closed, carrying one placeholder child. The first
//! expansion inspects the bound object and synthesizes the row's immediate
//! children; collapse evicts them again and restores the placeholder.

use std::cmp::Ordering;

use tracing::{debug, warn};

use ov_core::{
    same_object, summarize, Capability, DisplayRow, Inspect, InspectError, Materialization,
    ModelError, ModelStore, ObjectRef, RowId, RowKind, RowPath, SortKey,
};

use crate::classify::{classify_and_group, Member};
use crate::config::ExpanderConfig;

/// A non-fatal introspection failure met during one expansion
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Row being expanded
    pub path: RowPath,

    pub capability: Capability,

    pub message: String,
}

/// Outcome of an expansion request
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandReport {
    pub path: RowPath,

    /// Rows appended directly under the expanded row
    pub children: usize,

    pub diagnostics: Vec<Diagnostic>,

    /// True if the row was a group, a leaf or already materialized
    pub skipped: bool,
}

impl ExpandReport {
    fn skipped(path: RowPath) -> Self {
        Self {
            path,
            children: 0,
            diagnostics: Vec::new(),
            skipped: true,
        }
    }
}

/// Outcome of a collapse request
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseReport {
    pub path: RowPath,

    /// Side-table entries released
    pub evicted: usize,

    pub skipped: bool,
}

/// Policy layer that turns inspected objects into display rows
#[derive(Debug, Clone, Default)]
pub struct LazyExpander {
    config: ExpanderConfig,
}

impl LazyExpander {
    pub fn new(config: ExpanderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    /// True if `object` can never yield a child row.
    ///
    /// Only the capability set is consulted. Atomic types do not count
    /// their sized iteration.
    pub fn is_terminal(&self, object: &dyn Inspect) -> bool {
        let mut capabilities = object.capabilities();
        if self.config.is_atomic_type(object.type_name()) {
            capabilities = capabilities.without(Capability::SizedIteration);
        }
        capabilities.is_empty()
    }

    /// Append a bound member row, closed, under `parent`
    pub fn append_member(
        &self,
        store: &mut ModelStore,
        parent: RowId,
        label: &str,
        object: ObjectRef,
    ) -> Result<RowId, ModelError> {
        let summary = summarize(object.as_ref(), self.config.summary_budget);
        let is_leaf = self.is_terminal(object.as_ref());

        let id = store.append(parent, DisplayRow::member(label, summary, is_leaf))?;
        let path = store.path_of(id)?;
        store.bind(path, Some(object));

        if !is_leaf {
            store.append(id, DisplayRow::placeholder())?;
        }
        Ok(id)
    }

    /// Append a group header `"<name> +"` under `parent`; bound to nothing
    pub fn append_group(
        &self,
        store: &mut ModelStore,
        parent: RowId,
        name: &str,
    ) -> Result<RowId, ModelError> {
        let id = store.append(parent, DisplayRow::group(format!("{} +", name)))?;
        let path = store.path_of(id)?;
        store.bind(path, None);
        Ok(id)
    }

    /// Append a top-level row for `object` and return its path
    pub fn append_root(
        &self,
        store: &mut ModelStore,
        label: &str,
        object: ObjectRef,
    ) -> Result<RowPath, ModelError> {
        let root = store.root();
        let id = self.append_member(store, root, label, object)?;
        store.path_of(id)
    }

    /// Materialize the children of the row at `path`.
    ///
    /// Only closed member rows expand; anything else is a no-op. A path
    /// that no longer resolves fails with a stale [`ModelError`].
    pub fn expand(&self, store: &mut ModelStore, path: &RowPath) -> Result<ExpandReport, ModelError> {
        let id = store.row_at(path)?;
        let closed = store
            .row(id)
            .map_or(false, |row| row.kind == RowKind::Member && row.state == Materialization::Unopened);
        if !closed {
            debug!("Expand of {} skipped", path);
            return Ok(ExpandReport::skipped(path.clone()));
        }

        let object = match store.resolve(path)? {
            Some(object) => object,
            None => return Ok(ExpandReport::skipped(path.clone())),
        };

        store.set_state(id, Materialization::Materializing)?;
        store.clear_subtree(id)?;

        let mut expansion = Expansion {
            expander: self,
            store: &mut *store,
            row: id,
            path: path.clone(),
            diagnostics: Vec::new(),
        };
        let outcome = expansion.run(&object);
        let diagnostics = expansion.diagnostics;
        if let Err(e) = outcome {
            warn!("Expansion of {} failed, closing it again: {}", path, e);
            self.close(store, id)?;
            return Err(e);
        }

        store.set_state(id, Materialization::Materialized)?;
        let children = store.children(id).len();
        debug!(
            "Expanded {} ({} children, {} diagnostics)",
            path,
            children,
            diagnostics.len()
        );

        Ok(ExpandReport {
            path: path.clone(),
            children,
            diagnostics,
            skipped: false,
        })
    }

    /// Drop the children of the row at `path` and restore its placeholder.
    ///
    /// Any opened member row closes, including one whose expansion produced
    /// no children.
    pub fn collapse(&self, store: &mut ModelStore, path: &RowPath) -> Result<CollapseReport, ModelError> {
        let id = store.row_at(path)?;
        let open = store.row(id).map_or(false, |row| {
            row.kind == RowKind::Member
                && !row.is_leaf_marker
                && row.state != Materialization::Unopened
        });
        if !open {
            debug!("Collapse of {} skipped", path);
            return Ok(CollapseReport {
                path: path.clone(),
                evicted: 0,
                skipped: true,
            });
        }

        let evicted = self.close(store, id)?;
        debug_assert!(store.verify_bindings().is_ok());

        Ok(CollapseReport {
            path: path.clone(),
            evicted,
            skipped: false,
        })
    }

    /// Back to closed-with-placeholder; returns the bindings released
    fn close(&self, store: &mut ModelStore, id: RowId) -> Result<usize, ModelError> {
        let evicted = store.clear_subtree(id)?;
        store.append(id, DisplayRow::placeholder())?;
        store.set_state(id, Materialization::Unopened)?;
        Ok(evicted)
    }
}

/// State of one in-progress expansion
struct Expansion<'a> {
    expander: &'a LazyExpander,
    store: &'a mut ModelStore,
    row: RowId,
    path: RowPath,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Expansion<'a> {
    fn run(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        let capabilities = object.capabilities();

        if capabilities.contains(Capability::Class) {
            self.class(object)?;
        }
        if capabilities.contains(Capability::Bases) {
            self.bases(object)?;
        }
        if capabilities.contains(Capability::Slots) {
            self.slots(object)?;
        }
        if capabilities.contains(Capability::Signature) {
            self.signature(object)?;
        }
        if capabilities.contains(Capability::Attributes) {
            self.attributes(object)?;
        }

        if capabilities.contains(Capability::KeyValue) {
            self.entries(object)?;
        } else if capabilities.contains(Capability::SizedIteration)
            && !self.expander.config.is_atomic_type(object.type_name())
        {
            self.elements(object)?;
        }

        Ok(())
    }

    fn diagnose(&mut self, capability: Capability, error: InspectError) {
        debug!("Probe {} failed at {}: {}", capability, self.path, error);
        self.diagnostics.push(Diagnostic {
            path: self.path.clone(),
            capability,
            message: error.to_string(),
        });
    }

    fn member(&mut self, parent: RowId, label: &str, object: ObjectRef) -> Result<RowId, ModelError> {
        self.expander.append_member(self.store, parent, label, object)
    }

    /// Group header plus its members; nothing when `members` is empty
    fn group(&mut self, parent: RowId, name: &str, members: Vec<Member<ObjectRef>>) -> Result<(), ModelError> {
        if members.is_empty() {
            return Ok(());
        }
        let group = self.expander.append_group(self.store, parent, name)?;
        for member in members {
            self.member(group, &member.name, member.value)?;
        }
        Ok(())
    }

    fn class(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        match object.class() {
            Ok(class) if !same_object(&class, object) => {
                self.member(self.row, "__class__", class)?;
            }
            Ok(_) => {}
            Err(e) => self.diagnose(Capability::Class, e),
        }
        Ok(())
    }

    fn bases(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        match object.bases() {
            Ok(bases) => {
                self.member(self.row, "__bases__", bases)?;
            }
            Err(e) => self.diagnose(Capability::Bases, e),
        }
        Ok(())
    }

    fn slots(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        let mut names = match object.slots() {
            Ok(names) => names,
            Err(e) => {
                self.diagnose(Capability::Slots, e);
                return Ok(());
            }
        };
        names.sort();

        let mut members = Vec::with_capacity(names.len());
        for name in names {
            match object.slot_value(&name) {
                Ok(value) => members.push(Member::new(name, value.type_name().to_string(), value)),
                Err(e) => self.diagnose(Capability::Slots, e),
            }
        }
        self.group(self.row, "__slots__", members)
    }

    fn signature(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        match object.signature() {
            Ok(signature) => {
                self.member(self.row, "args", signature)?;
            }
            Err(e) => self.diagnose(Capability::Signature, e),
        }
        Ok(())
    }

    fn attributes(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        let pairs = match object.attributes() {
            Ok(pairs) => pairs,
            Err(e) => {
                self.diagnose(Capability::Attributes, e);
                return Ok(());
            }
        };

        let members = pairs
            .into_iter()
            .map(|(name, value)| {
                let type_name = value.type_name().to_string();
                Member::new(name, type_name, value)
            })
            .collect();
        let buckets = classify_and_group(members, &self.expander.config);

        self.group(self.row, "Internals", buckets.internals)?;
        self.group(self.row, "Modules", buckets.modules)?;

        if !buckets.functions.is_empty() {
            let functions = self.expander.append_group(self.store, self.row, "Functions")?;
            for group in buckets.functions {
                if group.is_singleton() {
                    for member in group.members {
                        self.member(functions, &group.key, member.value)?;
                    }
                } else {
                    self.group(functions, &group.key, group.members)?;
                }
            }
        }

        for member in buckets.others {
            self.member(self.row, &member.name, member.value)?;
        }
        Ok(())
    }

    /// Key-value rows sorted by key. Any key that cannot be displayed or
    /// ordered aborts the whole step.
    fn entries(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        let entries = match object.entries() {
            Ok(entries) => entries,
            Err(e) => {
                self.diagnose(Capability::KeyValue, e);
                return Ok(());
            }
        };

        let mut keyed = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let sort_key = match key.sort_key() {
                Some(sort_key) => sort_key,
                None => {
                    let error = InspectError::Unorderable(format!(
                        "{} key {}",
                        key.type_name(),
                        summarize(key.as_ref(), self.expander.config.summary_budget)
                    ));
                    return self.abort_entries(error);
                }
            };
            let label = match key.display() {
                Ok(label) => label,
                Err(e) => return self.abort_entries(e),
            };
            keyed.push((sort_key, label, value));
        }

        let keys: Vec<SortKey> = keyed.iter().map(|(key, _, _)| key.clone()).collect();
        if !SortKey::all_comparable(&keys) {
            let error = InspectError::Unorderable("keys of mixed kinds".to_string());
            return self.abort_entries(error);
        }
        keyed.sort_by(|a, b| a.0.try_cmp(&b.0).unwrap_or(Ordering::Equal));

        for (_, label, value) in keyed {
            self.member(self.row, &format!("[{}]", label), value)?;
        }
        Ok(())
    }

    fn abort_entries(&mut self, error: InspectError) -> Result<(), ModelError> {
        warn!("Key-value view of {} abandoned: {}", self.path, error);
        self.diagnose(Capability::KeyValue, error);
        Ok(())
    }

    /// Indexed element rows. A failing iterator ends the step quietly,
    /// keeping the rows already appended.
    fn elements(&mut self, object: &ObjectRef) -> Result<(), ModelError> {
        let elements = match object.elements() {
            Ok(elements) => elements,
            Err(e) => {
                debug!("Iteration of {} unavailable: {}", self.path, e);
                return Ok(());
            }
        };

        for (index, item) in elements.enumerate() {
            match item {
                Ok(value) => {
                    self.member(self.row, &format!("[{}]", index), value)?;
                }
                Err(e) => {
                    debug!("Iteration of {} abandoned at [{}]: {}", self.path, index, e);
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ov_core::Capabilities;
    use ov_objects::{JsonNode, ObjectGraph};
    use std::sync::Arc;

    fn setup(object: ObjectRef) -> (ModelStore, LazyExpander, RowPath) {
        let mut store = ModelStore::new();
        let expander = LazyExpander::default();
        let path = expander.append_root(&mut store, "root", object).unwrap();
        (store, expander, path)
    }

    fn labels(store: &ModelStore, path: &RowPath) -> Vec<String> {
        let id = store.row_at(path).unwrap();
        store
            .children(id)
            .iter()
            .map(|child| store.row(*child).unwrap().label.clone())
            .collect()
    }

    fn row(store: &ModelStore, path: &RowPath) -> DisplayRow {
        store.row(store.row_at(path).unwrap()).unwrap().clone()
    }

    #[test]
    fn test_new_row_carries_one_placeholder() {
        let g = ObjectGraph::new();
        let (store, _, path) = setup(g.list(vec![g.int(1)]));

        let id = store.row_at(&path).unwrap();
        assert_eq!(store.children(id).len(), 1);
        assert!(row(&store, &path.child(0)).is_placeholder());
        assert_eq!(row(&store, &path).state, Materialization::Unopened);
        assert!(store.resolve(&path.child(0)).is_err());
    }

    #[test]
    fn test_expand_collapse_round_trip() {
        let g = ObjectGraph::new();
        let inner = g.list(vec![g.int(1), g.int(2)]);
        let (mut store, expander, path) = setup(g.list(vec![inner, g.str("x")]));

        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(report.children, 3);
        let inner = expander.expand(&mut store, &path.child(1)).unwrap();
        assert!(store.bindings_under(&path) > 3);

        let collapsed = expander.collapse(&mut store, &path).unwrap();
        assert!(!collapsed.skipped);

        let id = store.row_at(&path).unwrap();
        assert_eq!(store.children(id).len(), 1);
        assert!(row(&store, &path.child(0)).is_placeholder());
        assert_eq!(store.bindings_under(&path), 0);
        assert_eq!(collapsed.evicted, report.children + inner.children);
        assert_eq!(row(&store, &path).state, Materialization::Unopened);
        assert!(store.verify_bindings().is_ok());

        // Reopens after collapse
        let again = expander.expand(&mut store, &path).unwrap();
        assert_eq!(again.children, 3);
    }

    #[test]
    fn test_reexpand_is_noop() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.list(vec![g.int(1), g.int(2)]));

        expander.expand(&mut store, &path).unwrap();
        let first = labels(&store, &path);
        let bindings = store.binding_count();

        let second = expander.expand(&mut store, &path).unwrap();
        assert!(second.skipped);
        assert_eq!(labels(&store, &path), first);
        assert_eq!(store.binding_count(), bindings);
    }

    #[test]
    fn test_long_summary_is_truncated() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.list(vec![g.str("x".repeat(120)), g.int(7)]));
        expander.expand(&mut store, &path).unwrap();

        let long = row(&store, &path.child(1));
        assert_eq!(long.summary.chars().count(), 83);
        assert!(long.summary.ends_with("..."));
        assert_eq!(row(&store, &path.child(2)).summary, "7");
    }

    #[test]
    fn test_accessors_grouped_under_functions() {
        let g = ObjectGraph::new();
        let cls = g.class("Thing", &[], None);
        let thing = g.instance(&cls);
        for name in ["unset_x", "foo", "get_x", "set_x"] {
            thing.set_attr(name, g.function(name, &["self"]));
        }
        let (mut store, expander, path) = setup(thing);

        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "Functions +"]);

        let functions = path.child(1);
        assert!(row(&store, &functions).is_group());
        assert_eq!(labels(&store, &functions), vec!["foo", "x +"]);
        assert_eq!(
            labels(&store, &functions.child(1)),
            vec!["get_x", "set_x", "unset_x"]
        );

        // Groups are bound to nothing and have no placeholder
        assert!(store.resolve(&functions).unwrap().is_none());
        assert!(!row(&store, &functions.child(0)).is_group());
        assert!(store.resolve(&functions.child(0)).unwrap().is_some());
    }

    #[test]
    fn test_buckets_in_fixed_order() {
        let g = ObjectGraph::new();
        let m = g.module("pkg");
        m.set_attr("zeta", g.int(1));
        m.set_attr("os", g.module("os"));
        m.set_attr("run", g.native("run"));
        m.set_attr("alpha", g.int(2));
        let (mut store, expander, path) = setup(m);

        expander.expand(&mut store, &path).unwrap();
        assert_eq!(
            labels(&store, &path),
            vec!["__class__", "Internals +", "Modules +", "Functions +", "alpha", "zeta"]
        );
        assert_eq!(labels(&store, &path.child(1)), vec!["__doc__", "__name__"]);
        assert_eq!(labels(&store, &path.child(2)), vec!["os"]);
        assert_eq!(labels(&store, &path.child(3)), vec!["run"]);
    }

    #[test]
    fn test_key_value_rows_sorted_by_key() {
        let g = ObjectGraph::new();
        let d = g.dict(vec![(g.str("b"), g.int(1)), (g.str("a"), g.int(2))]);
        let (mut store, expander, path) = setup(d);

        let report = expander.expand(&mut store, &path).unwrap();
        assert!(report.diagnostics.is_empty());
        assert_eq!(labels(&store, &path), vec!["__class__", "[a]", "[b]"]);
        assert_eq!(row(&store, &path.child(1)).summary, "2");
        assert_eq!(row(&store, &path.child(2)).summary, "1");
    }

    #[test]
    fn test_tuple_keys_use_display_form() {
        let g = ObjectGraph::new();
        let d = g.dict(vec![
            (g.tuple(vec![g.int(1), g.int(0)]), g.str("b")),
            (g.tuple(vec![g.int(0), g.int(1)]), g.str("a")),
        ]);
        let (mut store, expander, path) = setup(d);

        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "[(0, 1)]", "[(1, 0)]"]);
    }

    #[test]
    fn test_unorderable_keys_abort_step() {
        let g = ObjectGraph::new();
        let d = g.dict(vec![(g.str("a"), g.int(1)), (g.int(2), g.int(2))]);
        let (mut store, expander, path) = setup(d);

        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__"]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].capability, Capability::KeyValue);
        assert_eq!(report.diagnostics[0].path, path);
    }

    #[test]
    fn test_key_without_sort_key_aborts_step() {
        let g = ObjectGraph::new();
        let d = g.dict(vec![(g.none(), g.int(1))]);
        let (mut store, expander, path) = setup(d);

        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__"]);
        assert_eq!(report.diagnostics[0].capability, Capability::KeyValue);
    }

    #[test]
    fn test_atomic_iterables_do_not_expand() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.str("hello"));
        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__"]);

        let (mut store, expander, path) = setup(g.bytes(b"abc".to_vec()));
        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__"]);

        let (mut store, expander, path) = setup(g.tuple(vec![g.str("a"), g.str("b")]));
        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "[0]", "[1]"]);
    }

    #[test]
    fn test_collapse_is_prefix_safe() {
        let g = ObjectGraph::new();
        let mut store = ModelStore::new();
        let expander = LazyExpander::default();
        for i in 0..12 {
            expander
                .append_root(&mut store, &format!("r{}", i), g.list(vec![g.int(i)]))
                .unwrap();
        }

        let one = RowPath::new(vec![1]);
        let ten = RowPath::new(vec![10]);
        expander.expand(&mut store, &one).unwrap();
        expander.expand(&mut store, &ten).unwrap();
        expander.expand(&mut store, &one.child(1)).unwrap();
        let under_ten = store.bindings_under(&ten);
        assert!(under_ten > 0);

        expander.collapse(&mut store, &one).unwrap();
        assert_eq!(store.bindings_under(&one), 0);
        assert!(store.resolve(&one).unwrap().is_some());
        assert_eq!(store.bindings_under(&ten), under_ten);
        assert!(store.resolve(&ten.child(1)).unwrap().is_some());
        assert!(store.verify_bindings().is_ok());
    }

    #[test]
    fn test_class_row_skipped_for_own_class() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.type_type());

        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__bases__"]);
    }

    #[test]
    fn test_slots_group_sorted() {
        let g = ObjectGraph::new();
        let cls = g.class("Point", &[], Some(&["y", "x", "z"][..]));
        let p = g.instance(&cls);
        p.set_slot("y", g.int(2));
        p.set_slot("x", g.int(1));
        let (mut store, expander, path) = setup(p);

        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "__slots__ +"]);
        assert_eq!(labels(&store, &path.child(1)), vec!["x", "y"]);

        // Unset slot reported, not fatal
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].capability, Capability::Slots);
    }

    #[test]
    fn test_signature_rows() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.function("area", &["self"]));
        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "args"]);
        assert_eq!(
            row(&store, &path.child(1)).summary,
            "FullArgSpec(args=['self'], varargs=None, varkw=None)"
        );

        // Native callables carry no signature
        let (mut store, expander, path) = setup(g.native("len"));
        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__"]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_slotted_class_lists_member_descriptors() {
        let g = ObjectGraph::new();
        let cls = g.class("Point", &[], Some(&["y", "x"][..]));
        let (mut store, expander, path) = setup(cls);

        let report = expander.expand(&mut store, &path).unwrap();
        assert!(report.diagnostics.is_empty());
        assert_eq!(
            labels(&store, &path),
            vec!["__class__", "__bases__", "__slots__ +", "Internals +"]
        );
        let slots = path.child(2);
        assert_eq!(labels(&store, &slots), vec!["x", "y"]);
        assert_eq!(row(&store, &slots.child(0)).summary, "<member 'x' of 'Point' objects>");
    }

    #[test]
    fn test_lone_accessor_labelled_by_key() {
        let g = ObjectGraph::new();
        let cls = g.class("Thing", &[], None);
        let thing = g.instance(&cls);
        for name in ["z", "get_y", "a"] {
            thing.set_attr(name, g.function(name, &["self"]));
        }
        let (mut store, expander, path) = setup(thing);

        expander.expand(&mut store, &path).unwrap();
        let functions = path.child(1);
        assert_eq!(labels(&store, &functions), vec!["a", "y", "z"]);
        assert_eq!(
            row(&store, &functions.child(1)).summary,
            "<function get_y>"
        );
    }

    #[test]
    fn test_methods_grouped_under_functions() {
        let g = ObjectGraph::new();
        let shape = g.class("Shape", &[], None);
        let circle = g.class("Circle", &[shape], None);
        circle.set_attr("get_radius", g.function("get_radius", &["self"]));
        circle.set_attr("set_radius", g.function("set_radius", &["self", "value"]));
        circle.set_attr("unit", g.static_method(&g.function("unit", &[])));
        circle.set_attr("from_diameter", g.class_method(&g.function("from_diameter", &["cls", "d"])));
        let c = g.instance(&circle);
        c.set_attr("area", g.method("area", &c));
        c.set_attr("radius", g.float(2.5));

        let (mut store, expander, path) = setup(circle);
        let report = expander.expand(&mut store, &path).unwrap();
        assert!(report.diagnostics.is_empty());
        assert_eq!(
            labels(&store, &path),
            vec!["__class__", "__bases__", "Internals +", "Functions +"]
        );
        let functions = path.child(3);
        assert_eq!(labels(&store, &functions), vec!["from_diameter", "radius +", "unit"]);
        assert_eq!(
            labels(&store, &functions.child(1)),
            vec!["get_radius", "set_radius"]
        );
        assert_eq!(
            row(&store, &functions.child(2)).summary,
            "<staticmethod(<function unit>)>"
        );

        let (mut store, expander, path) = setup(c);
        expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "Functions +", "radius"]);
        assert_eq!(labels(&store, &path.child(1)), vec!["area"]);
    }

    #[test]
    fn test_empty_containers_round_trip() {
        for text in ["[]", "{}"] {
            let (mut store, expander, path) = setup(JsonNode::parse(text).unwrap());
            assert!(!row(&store, &path).is_leaf_marker);

            let report = expander.expand(&mut store, &path).unwrap();
            assert_eq!(report.children, 0);

            let collapsed = expander.collapse(&mut store, &path).unwrap();
            assert!(!collapsed.skipped);
            let id = store.row_at(&path).unwrap();
            assert_eq!(store.children(id).len(), 1);
            assert!(row(&store, &path.child(0)).is_placeholder());
            assert_eq!(row(&store, &path).state, Materialization::Unopened);
            assert_eq!(store.bindings_under(&path), 0);

            assert!(!expander.expand(&mut store, &path).unwrap().skipped);
        }
    }

    #[test]
    fn test_half_built_row_can_close() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.list(vec![g.int(1), g.int(2)]));
        let id = store.row_at(&path).unwrap();

        // Children appended, state never finished
        store.clear_subtree(id).unwrap();
        store.set_state(id, Materialization::Materializing).unwrap();
        expander.append_member(&mut store, id, "[0]", g.int(1)).unwrap();

        let collapsed = expander.collapse(&mut store, &path).unwrap();
        assert!(!collapsed.skipped);
        assert_eq!(collapsed.evicted, 1);
        assert_eq!(row(&store, &path).state, Materialization::Unopened);
        assert!(store.verify_bindings().is_ok());

        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["__class__", "[0]", "[1]"]);
        assert_eq!(report.children, 3);
    }

    struct Number(i64);

    impl Inspect for Number {
        fn type_name(&self) -> &str {
            "int"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::empty()
        }

        fn render(&self) -> Result<String, InspectError> {
            Ok(self.0.to_string())
        }
    }

    /// Yields two items, then fails
    struct Flaky;

    impl Inspect for Flaky {
        fn type_name(&self) -> &str {
            "generator"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities::empty().with(Capability::SizedIteration)
        }

        fn render(&self) -> Result<String, InspectError> {
            Err(InspectError::Render("no repr".into()))
        }

        fn elements(
            &self,
        ) -> Result<Box<dyn Iterator<Item = Result<ObjectRef, InspectError>> + '_>, InspectError>
        {
            let items: Vec<Result<ObjectRef, InspectError>> = vec![
                Ok(Arc::new(Number(1)) as ObjectRef),
                Ok(Arc::new(Number(2)) as ObjectRef),
                Err(InspectError::Iteration("exhausted".into())),
                Ok(Arc::new(Number(4)) as ObjectRef),
            ];
            Ok(Box::new(items.into_iter()))
        }
    }

    #[test]
    fn test_failing_iterator_keeps_partial_rows() {
        let (mut store, expander, path) = setup(Arc::new(Flaky));
        assert_eq!(row(&store, &path).summary, "");

        let report = expander.expand(&mut store, &path).unwrap();
        assert_eq!(labels(&store, &path), vec!["[0]", "[1]"]);
        assert!(report.diagnostics.is_empty());

        // Terminal elements get no placeholder
        let first = row(&store, &path.child(0));
        assert!(first.is_leaf_marker);
        assert!(store.children(store.row_at(&path.child(0)).unwrap()).is_empty());
    }

    #[test]
    fn test_leaf_and_group_requests_are_noops() {
        let doc = JsonNode::parse(r#"{"n": 1}"#).unwrap();
        let (mut store, expander, path) = setup(doc);
        expander.expand(&mut store, &path).unwrap();

        let leaf = path.child(0);
        assert!(row(&store, &leaf).is_leaf_marker);
        assert!(expander.expand(&mut store, &leaf).unwrap().skipped);
        assert!(expander.collapse(&mut store, &leaf).unwrap().skipped);

        // Collapse of a closed row does nothing
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.list(vec![]));
        assert!(expander.collapse(&mut store, &path).unwrap().skipped);
    }

    #[test]
    fn test_stale_path_is_an_error() {
        let g = ObjectGraph::new();
        let (mut store, expander, path) = setup(g.list(vec![g.list(vec![])]));
        expander.expand(&mut store, &path).unwrap();
        expander.collapse(&mut store, &path).unwrap();

        let err = expander.expand(&mut store, &path.child(0).child(0)).unwrap_err();
        assert!(err.is_stale());
    }
}
