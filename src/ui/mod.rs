//! Presentation helpers.
//!
//! The editor never depends on a widget toolkit. This module only turns a
//! document into plain data that any front end can draw: a labelled tree
//! or a flat list of indented lines.

pub mod tree_view;
