//! Attribute classification and accessor grouping
//!
//! A naming heuristic, not a structural property of the inspected object,
//! so it is kept as one pure function independent of traversal.

use std::collections::BTreeMap;

use crate::config::ExpanderConfig;

/// One attribute pair plus the runtime type name of its value
#[derive(Debug, Clone, PartialEq)]
pub struct Member<T> {
    pub name: String,
    pub type_name: String,
    pub value: T,
}

impl<T> Member<T> {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            value,
        }
    }
}

/// Functions sharing a base name
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionGroup<T> {
    pub key: String,
    /// Sorted by full name
    pub members: Vec<Member<T>>,
}

impl<T> FunctionGroup<T> {
    /// A singleton renders as a plain row, not a sub-group
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Disjoint partition of an attribute mapping, each bucket sorted by name
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets<T> {
    pub internals: Vec<Member<T>>,
    pub modules: Vec<Member<T>>,
    /// Sorted by key
    pub functions: Vec<FunctionGroup<T>>,
    pub others: Vec<Member<T>>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            internals: Vec::new(),
            modules: Vec::new(),
            functions: Vec::new(),
            others: Vec::new(),
        }
    }
}

impl<T> Buckets<T> {
    pub fn is_empty(&self) -> bool {
        self.internals.is_empty()
            && self.modules.is_empty()
            && self.functions.is_empty()
            && self.others.is_empty()
    }
}

/// Base name of an accessor such as `get_x` or `unset_x`.
///
/// The name splits on its first underscore; the prefix must be a configured
/// accessor prefix and the remainder must be non-empty.
pub fn accessor_key<'a>(name: &'a str, config: &ExpanderConfig) -> Option<&'a str> {
    let (prefix, rest) = name.split_once('_')?;
    if !rest.is_empty() && config.is_accessor_prefix(prefix) {
        Some(rest)
    } else {
        None
    }
}

/// Partition attribute pairs into internals, modules, functions and the rest.
///
/// Precedence is fixed: a reserved name is an internal whatever its value,
/// then module-typed values, then function-typed values. Functions are
/// merged by [`accessor_key`], everything else keys on its own name.
pub fn classify_and_group<T>(mut members: Vec<Member<T>>, config: &ExpanderConfig) -> Buckets<T> {
    members.sort_by(|a, b| a.name.cmp(&b.name));

    let mut buckets = Buckets::default();
    let mut functions: BTreeMap<String, Vec<Member<T>>> = BTreeMap::new();

    for member in members {
        if config.is_internal(&member.name) {
            buckets.internals.push(member);
        } else if config.is_module_type(&member.type_name) {
            buckets.modules.push(member);
        } else if config.is_function_type(&member.type_name) {
            let key = accessor_key(&member.name, config)
                .unwrap_or(member.name.as_str())
                .to_string();
            functions.entry(key).or_default().push(member);
        } else {
            buckets.others.push(member);
        }
    }

    buckets.functions = functions
        .into_iter()
        .map(|(key, members)| FunctionGroup { key, members })
        .collect();

    buckets
}
