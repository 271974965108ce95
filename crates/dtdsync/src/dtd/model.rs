//! Normalized grammar model

use indexmap::map::{Iter, Keys};
use indexmap::IndexMap;

/// A single attribute declared in an ATTLIST statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDef {
    pub name: String,
    /// Raw type token as written: a keyword like `CDATA` or a parenthesized
    /// enumeration like `(a|b|c)`.
    pub type_token: String,
    /// True only for `#REQUIRED`; `#IMPLIED`, `#FIXED` and default-value
    /// literals are all optional.
    pub required: bool,
    /// Enumeration alternatives, empty for non-enumerated types.
    pub enum_values: Vec<String>,
}

impl AttributeDef {
    pub fn is_enumerated(&self) -> bool {
        !self.enum_values.is_empty()
    }
}

/// An element and the facts the grammar states about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub name: String,
    pub attributes: IndexMap<String, AttributeDef>,
    /// `None` means the element has no structural children (EMPTY or
    /// text-only content). This is distinct from an empty list, which the
    /// content-model resolver never produces.
    pub children: Option<Vec<String>>,
}

impl ElementDef {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: None,
        }
    }
}

/// Element table accumulated across all declaration statements.
///
/// An element may be declared by several statements in any order (ELEMENT
/// and ATTLIST, or repeated declarations); facts merge into one record.
/// Attributes union across statements with a later spec for the same name
/// overwriting. A children determination is only ever replaced by a later
/// non-absent determination, so statement order does not matter except when
/// two statements disagree, in which case the later one wins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    elements: IndexMap<String, ElementDef>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ElementDef> {
        self.elements.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    pub fn names(&self) -> Keys<'_, String, ElementDef> {
        self.elements.keys()
    }

    pub fn iter(&self) -> Iter<'_, String, ElementDef> {
        self.elements.iter()
    }

    /// Record an element declaration with its resolved children.
    pub fn record_element(&mut self, name: &str, children: Option<Vec<String>>) {
        let def = self.entry(name);
        if children.is_some() {
            def.children = children;
        }
    }

    /// Record one attribute from an ATTLIST statement.
    pub fn record_attribute(&mut self, element: &str, attribute: AttributeDef) {
        let def = self.entry(element);
        def.attributes.insert(attribute.name.clone(), attribute);
    }

    fn entry(&mut self, name: &str) -> &mut ElementDef {
        self.elements
            .entry(name.to_string())
            .or_insert_with(|| ElementDef::new(name))
    }
}

impl<'a> IntoIterator for &'a Grammar {
    type Item = (&'a String, &'a ElementDef);
    type IntoIter = Iter<'a, String, ElementDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
