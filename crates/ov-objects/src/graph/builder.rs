use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::{ArgSpec, Obj, Object, Payload};

/// Built-in types created with every graph, besides `type` and `object`
const BUILTIN_TYPES: &[&str] = &[
    "NoneType",
    "bool",
    "int",
    "float",
    "str",
    "bytes",
    "list",
    "tuple",
    "dict",
    "module",
    "function",
    "builtin_function_or_method",
    "method",
    "staticmethod",
    "classmethod",
    "FullArgSpec",
    "member_descriptor",
];

/// Factory for graph objects, owning the built-in type objects.
///
/// `type` is its own class and every built-in derives from `object`, so the
/// type objects form a cycle that lives as long as any object of the graph.
pub struct ObjectGraph {
    types: IndexMap<String, Obj>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        let object_bases = Arc::new(Object::new("tuple", None, Payload::Tuple(Vec::new()), false));
        let object_type = Arc::new(Object::new(
            "type",
            None,
            Payload::Type {
                name: "object".to_string(),
                bases: object_bases,
                slots: None,
                slot_members: IndexMap::new(),
            },
            true,
        ));
        let type_bases = Arc::new(Object::new(
            "tuple",
            None,
            Payload::Tuple(vec![object_type.clone()]),
            false,
        ));
        let type_type = Arc::new(Object::new(
            "type",
            None,
            Payload::Type {
                name: "type".to_string(),
                bases: type_bases,
                slots: None,
                slot_members: IndexMap::new(),
            },
            true,
        ));
        type_type.set_class(type_type.clone());
        object_type.set_class(type_type.clone());

        let mut graph = Self {
            types: IndexMap::new(),
        };
        graph.types.insert("type".to_string(), type_type);
        graph.types.insert("object".to_string(), object_type);

        for name in BUILTIN_TYPES {
            let ty = graph.new_type(name, &[], None);
            graph.types.insert(name.to_string(), ty);
        }

        // Bases tuples made before `tuple` existed
        if let Some(tuple) = graph.builtin_type("tuple") {
            for ty in graph.types.values() {
                if let Payload::Type { bases, .. } = ty.payload() {
                    if bases.class_of().is_none() {
                        bases.set_class(tuple.clone());
                    }
                }
            }
        }

        graph
    }

    /// A built-in type object by name
    pub fn builtin_type(&self, name: &str) -> Option<Obj> {
        self.types.get(name).cloned()
    }

    pub fn type_type(&self) -> Obj {
        self.types["type"].clone()
    }

    pub fn object_type(&self) -> Obj {
        self.types["object"].clone()
    }

    fn make(&self, type_name: &str, payload: Payload, has_dict: bool) -> Obj {
        Arc::new(Object::new(
            type_name,
            self.builtin_type(type_name),
            payload,
            has_dict,
        ))
    }

    pub fn none(&self) -> Obj {
        self.make("NoneType", Payload::None, false)
    }

    pub fn boolean(&self, value: bool) -> Obj {
        self.make("bool", Payload::Bool(value), false)
    }

    pub fn int(&self, value: i64) -> Obj {
        self.make("int", Payload::Int(value), false)
    }

    pub fn float(&self, value: f64) -> Obj {
        self.make("float", Payload::Float(value), false)
    }

    pub fn str(&self, value: impl Into<String>) -> Obj {
        self.make("str", Payload::Str(value.into()), false)
    }

    pub fn bytes(&self, value: Vec<u8>) -> Obj {
        self.make("bytes", Payload::Bytes(value), false)
    }

    pub fn list(&self, items: Vec<Obj>) -> Obj {
        self.make("list", Payload::List(RwLock::new(items)), false)
    }

    pub fn tuple(&self, items: Vec<Obj>) -> Obj {
        self.make("tuple", Payload::Tuple(items), false)
    }

    /// A dict; later duplicates of a key are kept as given
    pub fn dict(&self, entries: Vec<(Obj, Obj)>) -> Obj {
        self.make("dict", Payload::Dict(RwLock::new(entries)), false)
    }

    /// A module with `__name__` and `__doc__` set
    pub fn module(&self, name: &str) -> Obj {
        let module = self.make("module", Payload::Module(name.to_string()), true);
        module.set_attr("__name__", self.str(name));
        module.set_attr("__doc__", self.none());
        module
    }

    pub fn function(&self, name: &str, args: &[&str]) -> Obj {
        self.function_with_spec(
            name,
            ArgSpec {
                args: args.iter().map(|a| a.to_string()).collect(),
                ..ArgSpec::default()
            },
        )
    }

    pub fn function_with_spec(&self, name: &str, spec: ArgSpec) -> Obj {
        let signature = self.make("FullArgSpec", Payload::Signature(spec), false);
        self.make(
            "function",
            Payload::Function {
                name: name.to_string(),
                signature,
            },
            true,
        )
    }

    /// A native callable whose signature cannot be inspected
    pub fn native(&self, name: &str) -> Obj {
        self.make("builtin_function_or_method", Payload::Native(name.to_string()), false)
    }

    pub fn method(&self, name: &str, receiver: &Obj) -> Obj {
        self.make(
            "method",
            Payload::Method {
                name: name.to_string(),
                receiver: receiver.clone(),
            },
            false,
        )
    }

    pub fn static_method(&self, function: &Obj) -> Obj {
        self.make("staticmethod", Payload::StaticMethod(function.clone()), false)
    }

    pub fn class_method(&self, function: &Obj) -> Obj {
        self.make("classmethod", Payload::ClassMethod(function.clone()), false)
    }

    /// A class deriving from `bases` (or `object` when empty).
    ///
    /// With `slots`, instances get declared slots instead of a dictionary.
    pub fn class(&self, name: &str, bases: &[Obj], slots: Option<&[&str]>) -> Obj {
        let class = self.new_type(name, bases, slots);
        class.set_attr("__module__", self.str("__main__"));
        class.set_attr("__doc__", self.none());
        class
    }

    fn new_type(&self, name: &str, bases: &[Obj], slots: Option<&[&str]>) -> Obj {
        let bases = if bases.is_empty() {
            self.builtin_type("object").into_iter().collect()
        } else {
            bases.to_vec()
        };

        let slots: Option<Vec<String>> = slots.map(|names| names.iter().map(|s| s.to_string()).collect());
        let slot_members = slots
            .iter()
            .flatten()
            .map(|slot| {
                let member = self.make(
                    "member_descriptor",
                    Payload::MemberDescriptor {
                        name: slot.clone(),
                        owner: name.to_string(),
                    },
                    false,
                );
                (slot.clone(), member)
            })
            .collect();

        Arc::new(Object::new(
            "type",
            self.builtin_type("type"),
            Payload::Type {
                name: name.to_string(),
                bases: self.tuple(bases),
                slots,
                slot_members,
            },
            true,
        ))
    }

    /// A fresh instance of `class`
    pub fn instance(&self, class: &Obj) -> Obj {
        let (type_name, slots) = match class.payload() {
            Payload::Type { name, slots, .. } => (name.clone(), slots.clone()),
            _ => ("object".to_string(), None),
        };
        let has_dict = slots.is_none();

        Arc::new(Object::new(
            type_name,
            Some(class.clone()),
            Payload::Instance {
                slots,
                slot_values: RwLock::new(IndexMap::new()),
            },
            has_dict,
        ))
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
