//! Content-model resolution
//!
//! Interprets a single content-model string into either "no children"
//! (`None`) or the deduplicated, first-occurrence-ordered list of child
//! element names it references. Structural operators (`,` `|` `?` `*` `+`
//! and grouping parentheses) only separate names; their semantics are not
//! tracked.

use indexmap::IndexSet;

/// Resolve a content model to its referenced child names.
///
/// `EMPTY` and any model containing `#PCDATA` (text-only or mixed content,
/// with or without parentheses) yield `None`: such elements carry no
/// structural children. A model that contains no identifiers at all also
/// yields `None`.
pub fn resolve(content_model: &str) -> Option<Vec<String>> {
    let model = content_model.trim();
    if model == "EMPTY" || model.contains("#PCDATA") {
        return None;
    }

    let model = strip_enclosing_parens(model);

    let mut names: IndexSet<String> = IndexSet::new();
    let bytes = model.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let Some(&b) = bytes.get(i) else { break };
        if is_name_start(b) {
            let start = i;
            while i < bytes.len() && bytes.get(i).copied().is_some_and(is_name_char) {
                i += 1;
            }
            if let Some(raw) = model.get(start..i) {
                names.insert(raw.to_string());
            }
        } else {
            i += 1;
        }
    }

    if names.is_empty() {
        None
    } else {
        Some(names.into_iter().collect())
    }
}

fn strip_enclosing_parens(model: &str) -> &str {
    model
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(model)
}

const fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_')
}

const fn is_name_char(b: u8) -> bool {
    is_name_start(b) || b.is_ascii_digit()
}
