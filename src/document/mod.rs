//! XML document model.
//!
//! - `node`: elements, attributes and other content
//! - `tree`: a loaded document with path-based navigation
//! - `parser`: raw bytes to `ParsedDocument` via quick-xml
//! - `matcher`: local-name matching within one document
//! - `store`: every loaded document, keyed by path

pub mod matcher;
pub mod node;
pub mod parser;
pub mod store;
pub mod tree;
