//! XMLQuill - structural editing across several XML documents at once.
//!
//! Documents are loaded into a [`document::store::DocumentStore`] keyed by
//! path. Edits made through [`editor::state::EditorState`] (or directly with
//! [`editor::mutations::MutationEngine`]) either stay within one document or
//! apply to every loaded document by matching element and attribute local
//! names. Touched documents are written back in place.
//!
//! # Example
//!
//! ```no_run
//! use xmlquill::config::Config;
//! use xmlquill::editor::selection::{ElementRef, NodeRef};
//! use xmlquill::editor::state::EditorState;
//!
//! let mut state = EditorState::new(Config::load());
//! state.open_file("a.xml").unwrap();
//! state.open_file("b.xml").unwrap();
//!
//! let doc = state.store().get("a.xml").unwrap();
//! state.select(NodeRef::Element(ElementRef::new(doc, vec![0]))).unwrap();
//!
//! // Every element and attribute with the selected name, in both files
//! state.apply_value("9").unwrap();
//! ```

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod file;
pub mod ui;
