//! Registry document access
//!
//! The registry is a JSON object mapping element name to a hand-maintained
//! template. Only `props` key names and `children` membership take part in
//! comparison; everything else rides along untouched, so the document is
//! held as the open [`Object`] tree and mutated in place.

use crate::error::{Error, ErrorKind, Result, Span};
use crate::json;
use crate::value::{Array, Object, Value};

/// Parsed registry document
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    root: Object,
}

impl Registry {
    /// Parse a registry document from JSON text.
    pub fn parse(input: &str) -> Result<Self> {
        let value = json::parse(input)?;
        let root = match value {
            Value::Object(root) => root,
            _ => {
                return Err(invalid_document(
                    "top level must be an object mapping element names to templates",
                ));
            }
        };

        for (name, entry) in root.iter() {
            if entry.as_object().is_none() {
                return Err(invalid_document(&format!(
                    "entry for element `{name}` is not an object"
                )));
            }
        }

        Ok(Self { root })
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.root.contains_key(name)
    }

    pub fn element(&self, name: &str) -> Option<&Object> {
        self.root.get(name).and_then(Value::as_object)
    }

    /// The element's `props` mapping, if it exposes one at all. A missing or
    /// non-object `props` field means the entry is not yet structurally
    /// comparable for attributes.
    pub fn props_of(&self, name: &str) -> Option<&Object> {
        self.element(name)?.get("props").and_then(Value::as_object)
    }

    /// The element's declared children, in document order. Absent, empty,
    /// or non-array values all mean "no children declared".
    pub fn children_of(&self, name: &str) -> Option<Vec<String>> {
        let array = self.element(name)?.get("children")?.as_array()?;
        let children: Vec<String> = array
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        if children.is_empty() {
            None
        } else {
            Some(children)
        }
    }

    /// Insert a freshly synthesized element template.
    pub fn insert_element(&mut self, name: &str, template: Object) {
        self.root.insert(name, template);
    }

    /// Add one attribute template to an element's `props`, leaving every
    /// other prop untouched.
    pub fn insert_prop(&mut self, element: &str, attribute: &str, template: Object) {
        let Some(entry) = self.root.get_mut(element).and_then(Value::as_object_mut) else {
            return;
        };
        match entry.get_mut("props").and_then(Value::as_object_mut) {
            Some(props) => {
                props.insert(attribute, template);
            }
            None => {
                let mut props = Object::new();
                props.insert(attribute, template);
                entry.insert("props", props);
            }
        }
    }

    /// Set (or overwrite) an element's children array.
    pub fn set_children(&mut self, element: &str, children: &[String]) {
        let Some(entry) = self.root.get_mut(element).and_then(Value::as_object_mut) else {
            return;
        };
        let array: Array = children
            .iter()
            .map(|c| Value::String(c.clone()))
            .collect();
        entry.insert("children", array);
    }

    /// Serialize the whole document with stable formatting.
    pub fn to_json_pretty(&self) -> String {
        json::to_string_pretty(&Value::Object(self.root.clone()))
    }
}

fn invalid_document(reason: &str) -> Error {
    Error::new(
        ErrorKind::InvalidDocument {
            reason: reason.to_string(),
        },
        Span::empty(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "report": {
            "name": "report",
            "description": "Top-level report",
            "props": {
                "id": {"type": "string", "description": "Report id", "required": true}
            },
            "children": ["header", "row"]
        },
        "row": {
            "name": "row",
            "description": "One data row",
            "props": {}
        },
        "legacy": {
            "name": "legacy",
            "description": "No props yet"
        }
    }"#;

    #[test]
    fn test_parse_and_views() -> Result<()> {
        let registry = Registry::parse(SAMPLE)?;
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("report"));

        let props = registry.props_of("report");
        assert_eq!(props.map(Object::len), Some(1));
        assert!(registry.props_of("legacy").is_none());

        assert_eq!(
            registry.children_of("report"),
            Some(vec!["header".to_string(), "row".to_string()])
        );
        assert_eq!(registry.children_of("row"), None);
        Ok(())
    }

    #[test]
    fn test_empty_children_array_means_none() -> Result<()> {
        let registry = Registry::parse(r#"{"x": {"children": []}}"#)?;
        assert_eq!(registry.children_of("x"), None);
        Ok(())
    }

    #[test]
    fn test_rejects_non_object_root() {
        let result = Registry::parse("[1, 2, 3]");
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_rejects_non_object_entry() {
        let result = Registry::parse(r#"{"x": "not a template"}"#);
        assert!(matches!(
            result,
            Err(err) if matches!(err.kind(), ErrorKind::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_set_children_overwrites_in_place() -> Result<()> {
        let mut registry = Registry::parse(SAMPLE)?;
        registry.set_children("report", &["header".to_string(), "footer".to_string()]);
        assert_eq!(
            registry.children_of("report"),
            Some(vec!["header".to_string(), "footer".to_string()])
        );
        Ok(())
    }

    #[test]
    fn test_insert_prop_preserves_existing_props() -> Result<()> {
        let mut registry = Registry::parse(SAMPLE)?;
        let mut template = Object::new();
        template.insert("type", "string");
        registry.insert_prop("report", "title", template);

        let props = registry.props_of("report");
        assert_eq!(props.map(Object::len), Some(2));
        assert!(props.is_some_and(|p| p.contains_key("id")));
        Ok(())
    }

    #[test]
    fn test_unknown_metadata_round_trips() -> Result<()> {
        let input = "{\n  \"x\": {\n    \"description\": \"kept\",\n    \"validation\": {\n      \"custom\": [\n        1,\n        2\n      ]\n    }\n  }\n}\n";
        let registry = Registry::parse(input)?;
        assert_eq!(registry.to_json_pretty(), input);
        Ok(())
    }
}
