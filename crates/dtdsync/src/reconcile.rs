//! Reconciliation
//!
//! Turns a [`SchemaDelta`] into registry edits. Dry-run mode only reports;
//! apply mode mutates the in-memory document. Persisting the result is the
//! caller's job, and only worthwhile when at least one edit was applied.
//! Synthesized templates are minimal placeholders; existing hand-authored
//! metadata is never rewritten.

use tracing::debug;

use crate::diff::SchemaDelta;
use crate::dtd::{AttributeDef, ElementDef, Grammar};
use crate::registry::Registry;
use crate::value::{Array, Object, Value};

/// Reconciliation mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    DryRun,
    Apply,
}

impl Mode {
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Result of a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    /// Edits applied (or, in dry-run mode, that would be applied).
    pub edits: usize,
    /// Human-readable action log in deterministic (sorted) order.
    pub actions: Vec<String>,
}

/// Reconcile the registry against the delta.
pub fn reconcile(
    grammar: &Grammar,
    delta: &SchemaDelta,
    registry: &mut Registry,
    mode: Mode,
) -> Outcome {
    let mut outcome = Outcome::default();
    let apply = !mode.is_dry_run();

    let mut missing_elements = delta.missing_elements.clone();
    missing_elements.sort();
    for name in &missing_elements {
        let Some(def) = grammar.get(name) else {
            continue;
        };
        if apply {
            registry.insert_element(name, element_template(def));
        }
        outcome.edits += 1;
        outcome.actions.push(format!("{} element: {name}", verb(mode, "add")));
        if let Some(children) = def.children.as_deref() {
            outcome
                .actions
                .push(format!("    with children: {children:?}"));
        }
    }

    let mut attr_elements: Vec<&String> = delta.missing_attributes.keys().collect();
    attr_elements.sort();
    for name in attr_elements {
        let Some(def) = grammar.get(name) else {
            continue;
        };
        let Some(attrs) = delta.missing_attributes.get(name) else {
            continue;
        };
        let mut attrs = attrs.clone();
        attrs.sort();
        for attr_name in &attrs {
            let Some(attr) = def.attributes.get(attr_name) else {
                continue;
            };
            if apply {
                registry.insert_prop(name, attr_name, attribute_template(attr));
            }
            outcome.edits += 1;
            outcome
                .actions
                .push(format!("{} attribute: {name}.{attr_name}", verb(mode, "add")));
        }
    }

    let mut children_elements: Vec<&String> = delta.missing_children.keys().collect();
    children_elements.sort();
    for name in children_elements {
        let Some(children) = delta.missing_children.get(name) else {
            continue;
        };
        if apply {
            registry.set_children(name, children);
        }
        outcome.edits += 1;
        outcome
            .actions
            .push(format!("{} children to: {name}", verb(mode, "add")));
        outcome.actions.push(format!("    children: {children:?}"));
    }

    let mut incorrect_elements: Vec<&String> = delta.incorrect_children.keys().collect();
    incorrect_elements.sort();
    for name in incorrect_elements {
        let Some(mismatch) = delta.incorrect_children.get(name) else {
            continue;
        };
        if apply {
            registry.set_children(name, &mismatch.should_be);
        }
        outcome.edits += 1;
        outcome
            .actions
            .push(format!("{} children for: {name}", verb(mode, "update")));
        outcome
            .actions
            .push(format!("    from: {:?}", mismatch.current));
        outcome
            .actions
            .push(format!("    to:   {:?}", mismatch.should_be));
    }

    debug!(edits = outcome.edits, dry_run = mode.is_dry_run(), "reconciled");
    outcome
}

fn verb(mode: Mode, action: &str) -> &'static str {
    match (mode, action) {
        (Mode::DryRun, "add") => "[dry-run] would add",
        (Mode::Apply, "add") => "added",
        (Mode::DryRun, _) => "[dry-run] would update",
        (Mode::Apply, _) => "updated",
    }
}

/// Minimal element template: placeholder description, props copied from the
/// grammar record, children only when non-empty.
fn element_template(def: &ElementDef) -> Object {
    let mut template = Object::new();
    template.insert("name", def.name.as_str());
    template.insert("description", format!("Element for {}", def.name));

    let mut props = Object::new();
    for (attr_name, attr) in &def.attributes {
        props.insert(attr_name.as_str(), attribute_template(attr));
    }
    template.insert("props", props);

    if let Some(children) = def.children.as_deref() {
        if !children.is_empty() {
            let array: Array = children
                .iter()
                .map(|c| Value::String(c.clone()))
                .collect();
            template.insert("children", array);
        }
    }

    template
}

/// Attribute template: scalar types collapse to "string"; enumerations
/// render as an explicit alternatives list.
fn attribute_template(attr: &AttributeDef) -> Object {
    let mut template = Object::new();

    if attr.is_enumerated() {
        let mut alternatives = Array::new();
        for value in &attr.enum_values {
            let mut alternative = Object::new();
            alternative.insert("value", value.as_str());
            alternative.insert("description", format!("Value {value}"));
            alternatives.push(alternative);
        }
        let mut one_of = Object::new();
        one_of.insert("oneOf", alternatives);
        template.insert("type", one_of);
    } else {
        template.insert("type", "string");
    }

    template.insert("description", format!("Attribute {}", attr.name));
    template.insert("required", attr.required);
    template
}
