//! dtdsync - keeps a DTD grammar and its JSON element registry in sync
//!
//! Parses the grammar into a normalized element table, loads the registry as
//! an order-preserving document, computes the structural delta, and
//! reconciles the registry against it without disturbing hand-authored
//! metadata.
//!
//! # Quick Start
//!
//! ```
//! use dtdsync::{diff, parse_dtd, parse_registry};
//! # fn main() -> Result<(), dtdsync::Error> {
//! let grammar = parse_dtd("<!ELEMENT report (header?,row*)>")?;
//! let registry = parse_registry("{}")?;
//! let delta = diff(&grammar, &registry);
//! assert_eq!(delta.missing_elements, vec!["report".to_string()]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod cursor;
pub use cursor::Cursor;

pub mod value;
pub use value::{Array, Object, Value};

pub mod json;

pub mod dtd;
pub use dtd::{AttributeDef, ElementDef, Grammar};

pub mod registry;
pub use registry::Registry;

pub mod diff;
pub use diff::{diff, ChildrenMismatch, SchemaDelta};

pub mod reconcile;
pub use reconcile::{reconcile, Mode, Outcome};

/// Parse DTD grammar source
pub fn parse_dtd(input: &str) -> Result<Grammar> {
    let mut parser = dtd::Parser::new(input.as_bytes());
    parser.parse()
}

/// Parse a registry document from JSON text
pub fn parse_registry(input: &str) -> Result<Registry> {
    Registry::parse(input)
}
