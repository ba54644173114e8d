//! Dynamic runtime object model
//!
//! A small reflective object system with classes, bases, slots, attribute
//! dictionaries, modules, functions and the usual containers. Every value
//! exposes its capabilities through [`Inspect`].

mod builder;
mod repr;

pub use builder::ObjectGraph;

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use ov_core::{Capabilities, Capability, Inspect, InspectError, ObjectRef, SortKey};

/// Shared handle to a graph object
pub type Obj = Arc<Object>;

/// Callable signature description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSpec {
    pub args: Vec<String>,
    pub varargs: Option<String>,
    pub varkw: Option<String>,
}

/// What an object is
#[derive(Debug)]
pub enum Payload {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(RwLock<Vec<Obj>>),
    Tuple(Vec<Obj>),
    Dict(RwLock<Vec<(Obj, Obj)>>),
    Type {
        name: String,
        /// Tuple of base types
        bases: Obj,
        /// Slot names declared for instances
        slots: Option<Vec<String>>,
        /// Member descriptor per declared slot
        slot_members: IndexMap<String, Obj>,
    },
    /// Class-level accessor for one declared slot
    MemberDescriptor {
        name: String,
        owner: String,
    },
    Module(String),
    Function {
        name: String,
        signature: Obj,
    },
    /// Native callable without an inspectable signature
    Native(String),
    Method {
        name: String,
        receiver: Obj,
    },
    StaticMethod(Obj),
    ClassMethod(Obj),
    Signature(ArgSpec),
    Instance {
        slots: Option<Vec<String>>,
        slot_values: RwLock<IndexMap<String, Obj>>,
    },
}

/// A value in the object graph
pub struct Object {
    type_name: String,
    class: RwLock<Option<Obj>>,
    payload: Payload,
    dict: Option<RwLock<IndexMap<String, Obj>>>,
}

impl Object {
    pub(crate) fn new(
        type_name: impl Into<String>,
        class: Option<Obj>,
        payload: Payload,
        has_dict: bool,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            class: RwLock::new(class),
            payload,
            dict: has_dict.then(|| RwLock::new(IndexMap::new())),
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn class_of(&self) -> Option<Obj> {
        self.class.read().clone()
    }

    pub(crate) fn set_class(&self, class: Obj) {
        *self.class.write() = Some(class);
    }

    /// Set an entry in the attribute dictionary. Returns false if the object has none.
    pub fn set_attr(&self, name: impl Into<String>, value: Obj) -> bool {
        match &self.dict {
            Some(dict) => {
                dict.write().insert(name.into(), value);
                true
            }
            None => false,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<Obj> {
        self.dict.as_ref()?.read().get(name).cloned()
    }

    /// Set a declared slot. Returns false for undeclared names.
    pub fn set_slot(&self, name: &str, value: Obj) -> bool {
        match &self.payload {
            Payload::Instance {
                slots: Some(names),
                slot_values,
            } if names.iter().any(|n| n == name) => {
                slot_values.write().insert(name.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Append to a list object
    pub fn push(&self, value: Obj) -> bool {
        match &self.payload {
            Payload::List(items) => {
                items.write().push(value);
                true
            }
            _ => false,
        }
    }

    /// Insert or replace a dict entry; keys compare by their text rendering
    pub fn insert(&self, key: Obj, value: Obj) -> bool {
        match &self.payload {
            Payload::Dict(entries) => {
                let mut entries = entries.write();
                let rendered = key.repr();
                match entries.iter_mut().find(|(k, _)| k.repr() == rendered) {
                    Some(entry) => entry.1 = value,
                    None => entries.push((key, value)),
                }
                true
            }
            _ => false,
        }
    }
}

// Graphs are cyclic (`type` is its own class), so Debug prints the repr only
impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Object")
            .field("type_name", &self.type_name)
            .field("repr", &self.repr())
            .finish()
    }
}

fn upcast(obj: &Obj) -> ObjectRef {
    obj.clone()
}

impl Inspect for Object {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty();
        if self.class.read().is_some() {
            caps = caps.with(Capability::Class);
        }
        if self.dict.is_some() {
            caps = caps.with(Capability::Attributes);
        }
        match &self.payload {
            Payload::Type { slots: Some(_), .. } => caps.with(Capability::Bases).with(Capability::Slots),
            Payload::Type { .. } => caps.with(Capability::Bases),
            Payload::Function { .. } => caps.with(Capability::Signature),
            Payload::Instance { slots: Some(_), .. } => caps.with(Capability::Slots),
            Payload::Dict(_) => caps.with(Capability::KeyValue),
            Payload::List(_) | Payload::Tuple(_) | Payload::Str(_) | Payload::Bytes(_) => {
                caps.with(Capability::SizedIteration)
            }
            _ => caps,
        }
    }

    fn render(&self) -> Result<String, InspectError> {
        Ok(self.repr())
    }

    fn display(&self) -> Result<String, InspectError> {
        match &self.payload {
            Payload::Str(s) => Ok(s.clone()),
            _ => Ok(self.repr()),
        }
    }

    fn sort_key(&self) -> Option<SortKey> {
        match &self.payload {
            Payload::Bool(b) => Some(SortKey::Bool(*b)),
            Payload::Int(i) => Some(SortKey::Int(*i)),
            Payload::Float(f) => Some(SortKey::Float(*f)),
            Payload::Str(s) => Some(SortKey::Text(s.clone())),
            Payload::Bytes(b) => Some(SortKey::Bytes(b.clone())),
            Payload::Tuple(items) => items
                .iter()
                .map(|item| item.sort_key())
                .collect::<Option<Vec<_>>>()
                .map(SortKey::Tuple),
            _ => None,
        }
    }

    fn class(&self) -> Result<ObjectRef, InspectError> {
        self.class
            .read()
            .as_ref()
            .map(upcast)
            .ok_or(InspectError::Unsupported(Capability::Class))
    }

    fn bases(&self) -> Result<ObjectRef, InspectError> {
        match &self.payload {
            Payload::Type { bases, .. } => Ok(upcast(bases)),
            _ => Err(InspectError::Unsupported(Capability::Bases)),
        }
    }

    fn slots(&self) -> Result<Vec<String>, InspectError> {
        match &self.payload {
            Payload::Instance {
                slots: Some(names), ..
            }
            | Payload::Type {
                slots: Some(names), ..
            } => Ok(names.clone()),
            _ => Err(InspectError::Unsupported(Capability::Slots)),
        }
    }

    fn slot_value(&self, name: &str) -> Result<ObjectRef, InspectError> {
        match &self.payload {
            Payload::Instance { slot_values, .. } => slot_values
                .read()
                .get(name)
                .map(upcast)
                .ok_or_else(|| InspectError::MissingAttribute(name.to_string())),
            Payload::Type { slot_members, .. } => slot_members
                .get(name)
                .map(upcast)
                .ok_or_else(|| InspectError::MissingAttribute(name.to_string())),
            _ => Err(InspectError::Unsupported(Capability::Slots)),
        }
    }

    fn signature(&self) -> Result<ObjectRef, InspectError> {
        match &self.payload {
            Payload::Function { signature, .. } => Ok(upcast(signature)),
            Payload::Native(name) => Err(InspectError::Signature(format!(
                "no signature found for builtin {}",
                name
            ))),
            _ => Err(InspectError::Unsupported(Capability::Signature)),
        }
    }

    fn attributes(&self) -> Result<Vec<(String, ObjectRef)>, InspectError> {
        let dict = self
            .dict
            .as_ref()
            .ok_or(InspectError::Unsupported(Capability::Attributes))?;
        Ok(dict
            .read()
            .iter()
            .map(|(name, value)| (name.clone(), upcast(value)))
            .collect())
    }

    fn entries(&self) -> Result<Vec<(ObjectRef, ObjectRef)>, InspectError> {
        match &self.payload {
            Payload::Dict(entries) => Ok(entries
                .read()
                .iter()
                .map(|(k, v)| (upcast(k), upcast(v)))
                .collect()),
            _ => Err(InspectError::Unsupported(Capability::KeyValue)),
        }
    }

    fn elements(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<ObjectRef, InspectError>> + '_>, InspectError> {
        let items: Vec<ObjectRef> = match &self.payload {
            Payload::List(items) => items.read().iter().map(upcast).collect(),
            Payload::Tuple(items) => items.iter().map(upcast).collect(),
            // Elements of text and bytes are detached values without a class
            Payload::Str(s) => s
                .chars()
                .map(|c| {
                    Arc::new(Object::new("str", None, Payload::Str(c.to_string()), false))
                        as ObjectRef
                })
                .collect(),
            Payload::Bytes(bytes) => bytes
                .iter()
                .map(|b| {
                    Arc::new(Object::new("int", None, Payload::Int(i64::from(*b)), false))
                        as ObjectRef
                })
                .collect(),
            _ => return Err(InspectError::Unsupported(Capability::SizedIteration)),
        };
        Ok(Box::new(items.into_iter().map(Ok)))
    }
}
