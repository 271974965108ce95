//! DTD grammar parsing
//!
//! Turns declaration statements (`<!ELEMENT ...>`, `<!ATTLIST ...>`) into a
//! normalized table of element facts suitable for comparison against the
//! registry.

pub mod content;
pub mod model;
pub mod parser;

pub use model::{AttributeDef, ElementDef, Grammar};
pub use parser::Parser;
