use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use ov_core::{Capabilities, Capability, Inspect, InspectError, ObjectRef, SortKey};

use super::SourceError;

/// Rendering stops once the output grows past this many bytes
const MAX_RENDER_LEN: usize = 1024;

/// A parsed JSON document as an inspectable tree.
///
/// Children are shared handles, so re-inspecting a node yields the same
/// objects every time.
#[derive(Debug)]
pub enum JsonNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    Array(Vec<Arc<JsonNode>>),
    /// Keys are text nodes, in document order
    Object(Vec<(Arc<JsonNode>, Arc<JsonNode>)>),
}

impl JsonNode {
    pub fn parse(text: &str) -> Result<Arc<JsonNode>, SourceError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Arc::new(JsonNode::from(value)))
    }

    pub fn load(path: &Path) -> Result<Arc<JsonNode>, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let node = Self::parse(&text)?;
        info!("Loaded JSON document {} ({} bytes)", path.display(), text.len());
        Ok(node)
    }

    fn write_json(&self, out: &mut String) {
        if out.len() > MAX_RENDER_LEN {
            out.push_str("...");
            return;
        }
        match self {
            JsonNode::Null => out.push_str("null"),
            JsonNode::Bool(b) => {
                let _ = write!(out, "{}", b);
            }
            JsonNode::Number(n) => {
                let _ = write!(out, "{}", n);
            }
            JsonNode::Text(s) => out.push_str(&Value::String(s.clone()).to_string()),
            JsonNode::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_json(out);
                    if out.len() > MAX_RENDER_LEN {
                        break;
                    }
                }
                out.push(']');
            }
            JsonNode::Object(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.write_json(out);
                    out.push_str(": ");
                    value.write_json(out);
                    if out.len() > MAX_RENDER_LEN {
                        break;
                    }
                }
                out.push('}');
            }
        }
    }
}

impl From<Value> for JsonNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => JsonNode::Null,
            Value::Bool(b) => JsonNode::Bool(b),
            Value::Number(n) => JsonNode::Number(n),
            Value::String(s) => JsonNode::Text(s),
            Value::Array(items) => JsonNode::Array(
                items
                    .into_iter()
                    .map(|item| Arc::new(JsonNode::from(item)))
                    .collect(),
            ),
            Value::Object(map) => JsonNode::Object(
                map.into_iter()
                    .map(|(k, v)| (Arc::new(JsonNode::Text(k)), Arc::new(JsonNode::from(v))))
                    .collect(),
            ),
        }
    }
}

impl Inspect for JsonNode {
    fn type_name(&self) -> &str {
        match self {
            JsonNode::Null => "NoneType",
            JsonNode::Bool(_) => "bool",
            JsonNode::Number(n) if n.is_f64() => "float",
            JsonNode::Number(_) => "int",
            JsonNode::Text(_) => "str",
            JsonNode::Array(_) => "list",
            JsonNode::Object(_) => "dict",
        }
    }

    fn capabilities(&self) -> Capabilities {
        match self {
            JsonNode::Array(_) => Capabilities::empty().with(Capability::SizedIteration),
            JsonNode::Object(_) => Capabilities::empty().with(Capability::KeyValue),
            _ => Capabilities::empty(),
        }
    }

    fn render(&self) -> Result<String, InspectError> {
        let mut out = String::new();
        self.write_json(&mut out);
        Ok(out)
    }

    fn display(&self) -> Result<String, InspectError> {
        match self {
            JsonNode::Text(s) => Ok(s.clone()),
            _ => self.render(),
        }
    }

    fn sort_key(&self) -> Option<SortKey> {
        match self {
            JsonNode::Bool(b) => Some(SortKey::Bool(*b)),
            JsonNode::Number(n) => match n.as_i64() {
                Some(i) => Some(SortKey::Int(i)),
                None => n.as_f64().map(SortKey::Float),
            },
            JsonNode::Text(s) => Some(SortKey::Text(s.clone())),
            _ => None,
        }
    }

    fn entries(&self) -> Result<Vec<(ObjectRef, ObjectRef)>, InspectError> {
        match self {
            JsonNode::Object(entries) => Ok(entries
                .iter()
                .map(|(k, v)| (k.clone() as ObjectRef, v.clone() as ObjectRef))
                .collect()),
            _ => Err(InspectError::Unsupported(Capability::KeyValue)),
        }
    }

    fn elements(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<ObjectRef, InspectError>> + '_>, InspectError> {
        match self {
            JsonNode::Array(items) => Ok(Box::new(
                items.iter().map(|item| Ok(item.clone() as ObjectRef)),
            )),
            _ => Err(InspectError::Unsupported(Capability::SizedIteration)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let doc = JsonNode::parse(r#"{"name": "demo", "tags": [1, 2.5, null], "ok": true}"#).unwrap();

        assert_eq!(doc.type_name(), "dict");
        assert!(doc.capabilities().contains(Capability::KeyValue));

        let entries = doc.entries().unwrap();
        assert_eq!(entries.len(), 3);

        let tags = entries
            .iter()
            .find(|(k, _)| k.display().unwrap() == "tags")
            .map(|(_, v)| v.clone())
            .unwrap();
        let types: Vec<String> = tags
            .elements()
            .unwrap()
            .map(|item| item.unwrap().type_name().to_string())
            .collect();
        assert_eq!(types, vec!["int", "float", "NoneType"]);
    }

    #[test]
    fn test_render() {
        let doc = JsonNode::parse(r#"[1, "a\"b", {"k": false}]"#).unwrap();
        assert_eq!(doc.render().unwrap(), r#"[1, "a\"b", {"k": false}]"#);
    }

    #[test]
    fn test_scalars_have_no_capabilities() {
        let doc = JsonNode::parse(r#""text""#).unwrap();
        assert!(doc.capabilities().is_empty());
        assert_eq!(doc.display().unwrap(), "text");
        assert_eq!(doc.sort_key(), Some(SortKey::Text("text".into())));
    }

    #[test]
    fn test_children_are_stable() {
        let doc = JsonNode::parse("[[1]]").unwrap();
        let first = doc.elements().unwrap().next().unwrap().unwrap();
        let again = doc.elements().unwrap().next().unwrap().unwrap();
        assert!(ov_core::same_object(&first, &again));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(JsonNode::parse("{"), Err(SourceError::Json(_))));
    }

    #[test]
    fn test_long_render_is_bounded() {
        let items: Vec<String> = (0..2000).map(|i| i.to_string()).collect();
        let doc = JsonNode::parse(&format!("[{}]", items.join(","))).unwrap();
        assert!(doc.render().unwrap().len() < MAX_RENDER_LEN + 16);
    }
}
