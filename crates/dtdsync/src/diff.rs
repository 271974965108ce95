//! Schema comparison
//!
//! Pure comparison of the grammar model against the registry document.
//! Results keep grammar iteration order; display layers sort as they see
//! fit.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::dtd::Grammar;
use crate::registry::Registry;

/// A children array that exists on both sides but disagrees as a set.
/// Both sides are recorded verbatim, in each source's own order, for human
/// review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildrenMismatch {
    pub current: Vec<String>,
    pub should_be: Vec<String>,
}

/// Structural delta between grammar and registry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaDelta {
    /// Elements the grammar declares that the registry lacks entirely.
    pub missing_elements: Vec<String>,
    /// Per existing element: grammar attributes absent from its props.
    pub missing_attributes: IndexMap<String, Vec<String>>,
    /// Elements whose grammar declares children but whose registry entry
    /// has none.
    pub missing_children: IndexMap<String, Vec<String>>,
    /// Elements where both sides declare children but membership differs.
    pub incorrect_children: IndexMap<String, ChildrenMismatch>,
    /// Non-fatal anomaly: registry entries with grammar attributes but no
    /// props mapping at all. Skipped for attribute comparison, not counted
    /// as missing attributes.
    pub skipped_props: Vec<String>,
}

impl SchemaDelta {
    /// Number of discrepancies that reconciliation would edit.
    pub fn total_issues(&self) -> usize {
        self.missing_elements.len()
            + self
                .missing_attributes
                .values()
                .map(Vec::len)
                .sum::<usize>()
            + self.missing_children.len()
            + self.incorrect_children.len()
    }

    pub fn is_in_sync(&self) -> bool {
        self.total_issues() == 0
    }
}

/// Compare grammar facts against the registry document.
pub fn diff(grammar: &Grammar, registry: &Registry) -> SchemaDelta {
    let mut delta = SchemaDelta::default();

    for (name, def) in grammar {
        if !registry.contains(name) {
            delta.missing_elements.push(name.clone());
            continue;
        }

        match registry.props_of(name) {
            Some(props) => {
                let missing: Vec<String> = def
                    .attributes
                    .keys()
                    .filter(|attr| !props.contains_key(attr))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    delta.missing_attributes.insert(name.clone(), missing);
                }
            }
            None if !def.attributes.is_empty() => {
                delta.skipped_props.push(name.clone());
            }
            None => {}
        }

        // Children comparison only applies when the grammar itself declares
        // children; grammar silence is not evidence of a mismatch.
        if let Some(expected) = &def.children {
            let expected_set: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
            match registry.children_of(name) {
                None => {
                    delta.missing_children.insert(name.clone(), expected.clone());
                }
                Some(current) => {
                    let current_set: BTreeSet<&str> =
                        current.iter().map(String::as_str).collect();
                    if current_set != expected_set {
                        delta.incorrect_children.insert(
                            name.clone(),
                            ChildrenMismatch {
                                current,
                                should_be: expected.clone(),
                            },
                        );
                    }
                }
            }
        }
    }

    debug!(
        missing_elements = delta.missing_elements.len(),
        missing_attributes = delta.missing_attributes.len(),
        missing_children = delta.missing_children.len(),
        incorrect_children = delta.incorrect_children.len(),
        skipped_props = delta.skipped_props.len(),
        "computed delta"
    );

    delta
}
