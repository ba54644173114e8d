use std::fmt::Write;

use super::{ArgSpec, Object, Payload};

/// Containers nested deeper than this render as `...`
const MAX_DEPTH: usize = 6;

/// Rendering stops once the output grows past this many bytes
const MAX_LEN: usize = 1024;

impl Object {
    /// Canonical debug representation.
    ///
    /// Bounded in depth and length, so cyclic containers terminate.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out, 0);
        out
    }

    fn write_repr(&self, out: &mut String, depth: usize) {
        if out.len() > MAX_LEN {
            return;
        }

        match &self.payload {
            Payload::None => out.push_str("None"),
            Payload::Bool(b) => out.push_str(if *b { "True" } else { "False" }),
            Payload::Int(i) => {
                let _ = write!(out, "{}", i);
            }
            Payload::Float(f) => {
                let _ = write!(out, "{:?}", f);
            }
            Payload::Str(s) => write_quoted(out, s),
            Payload::Bytes(bytes) => {
                out.push_str("b'");
                for b in bytes {
                    match b {
                        b'\\' => out.push_str("\\\\"),
                        b'\'' => out.push_str("\\'"),
                        0x20..=0x7e => out.push(*b as char),
                        _ => {
                            let _ = write!(out, "\\x{:02x}", b);
                        }
                    }
                }
                out.push('\'');
            }
            Payload::List(items) => {
                let items = items.read_recursive();
                write_seq(out, "[", "]", items.iter().map(|o| &**o), depth, false);
            }
            Payload::Tuple(items) => {
                write_seq(out, "(", ")", items.iter().map(|o| &**o), depth, items.len() == 1);
            }
            Payload::Dict(entries) => {
                if depth >= MAX_DEPTH {
                    out.push_str("{...}");
                    return;
                }
                out.push('{');
                for (i, (key, value)) in entries.read_recursive().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if out.len() > MAX_LEN {
                        out.push_str("...");
                        break;
                    }
                    key.write_repr(out, depth + 1);
                    out.push_str(": ");
                    value.write_repr(out, depth + 1);
                }
                out.push('}');
            }
            Payload::Type { name, .. } => {
                let _ = write!(out, "<class '{}'>", name);
            }
            Payload::MemberDescriptor { name, owner } => {
                let _ = write!(out, "<member '{}' of '{}' objects>", name, owner);
            }
            Payload::Module(name) => {
                let _ = write!(out, "<module '{}'>", name);
            }
            Payload::Function { name, .. } => {
                let _ = write!(out, "<function {}>", name);
            }
            Payload::Native(name) => {
                let _ = write!(out, "<built-in function {}>", name);
            }
            Payload::Method { name, receiver } => {
                let _ = write!(out, "<bound method {} of ", name);
                receiver.write_repr(out, depth + 1);
                out.push('>');
            }
            Payload::StaticMethod(inner) => {
                out.push_str("<staticmethod(");
                inner.write_repr(out, depth + 1);
                out.push_str(")>");
            }
            Payload::ClassMethod(inner) => {
                out.push_str("<classmethod(");
                inner.write_repr(out, depth + 1);
                out.push_str(")>");
            }
            Payload::Signature(spec) => write_argspec(out, spec),
            Payload::Instance { .. } => {
                let _ = write!(out, "<{} object>", self.type_name);
            }
        }
    }
}

fn write_seq<'a>(
    out: &mut String,
    open: &str,
    close: &str,
    items: impl Iterator<Item = &'a Object>,
    depth: usize,
    trailing_comma: bool,
) {
    if depth >= MAX_DEPTH {
        out.push_str(open);
        out.push_str("...");
        out.push_str(close);
        return;
    }
    out.push_str(open);
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if out.len() > MAX_LEN {
            out.push_str("...");
            break;
        }
        item.write_repr(out, depth + 1);
    }
    if trailing_comma {
        out.push(',');
    }
    out.push_str(close);
}

fn write_quoted(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

fn write_names(out: &mut String, names: &[String]) {
    out.push('[');
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_quoted(out, name);
    }
    out.push(']');
}

fn write_optional(out: &mut String, name: &Option<String>) {
    match name {
        Some(name) => write_quoted(out, name),
        None => out.push_str("None"),
    }
}

fn write_argspec(out: &mut String, spec: &ArgSpec) {
    out.push_str("FullArgSpec(args=");
    write_names(out, &spec.args);
    out.push_str(", varargs=");
    write_optional(out, &spec.varargs);
    out.push_str(", varkw=");
    write_optional(out, &spec.varkw);
    out.push(')');
}
