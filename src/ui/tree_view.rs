//! Tree projection of an XML document for display.
//!
//! This module provides:
//! - `TreeViewNode`: a read-only, serializable tree mirroring one document
//! - `TreeViewLine`: a single displayable line, with its depth
//! - `TreeViewState`: the visible lines of a document given which elements are expanded
//!
//! Projections are rebuilt from the document whenever they are needed and are
//! never saved anywhere.

use crate::document::node::XmlElement;
use crate::document::tree::ParsedDocument;
use crate::editor::selection::{ElementRef, NodeRef};
use serde::Serialize;
use std::collections::HashSet;

/// One entry of a document projection.
///
/// An element's label is its local name when it has child elements, and
/// `"name: value"` otherwise. Attributes are leaf entries labelled
/// `"name: value"`, listed before the element's child elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeViewNode {
    pub label: String,
    pub node_ref: NodeRef,
    pub children: Vec<TreeViewNode>,
}

/// Builds the projection of a whole document, rooted at its root element.
///
/// # Example
///
/// ```
/// use xmlquill::document::parser::{parse_document, ParseOptions};
/// use xmlquill::ui::tree_view::build_tree_view;
///
/// let xml = br#"<root><item id="1">a</item></root>"#;
/// let doc = parse_document("a.xml", xml, &ParseOptions::default()).unwrap();
///
/// let view = build_tree_view(&doc);
/// assert_eq!(view.label, "root");
/// assert_eq!(view.children[0].label, "item: a");
/// assert_eq!(view.children[0].children[0].label, "id: 1");
/// ```
pub fn build_tree_view(doc: &ParsedDocument) -> TreeViewNode {
    build_node(doc, doc.root(), &mut Vec::new())
}

fn build_node(doc: &ParsedDocument, element: &XmlElement, path: &mut Vec<usize>) -> TreeViewNode {
    let element_ref = ElementRef::new(doc, path.clone());

    let mut children: Vec<TreeViewNode> = element
        .attributes()
        .iter()
        .enumerate()
        .map(|(index, attr)| TreeViewNode {
            label: format!("{}: {}", attr.local_name(), attr.value()),
            node_ref: NodeRef::Attribute {
                element: element_ref.clone(),
                index,
            },
            children: Vec::new(),
        })
        .collect();

    for (index, child) in element.children().enumerate() {
        path.push(index);
        children.push(build_node(doc, child, path));
        path.pop();
    }

    TreeViewNode {
        label: element_label(element),
        node_ref: NodeRef::Element(element_ref),
        children,
    }
}

fn element_label(element: &XmlElement) -> String {
    if element.has_elements() {
        element.local_name().to_string()
    } else {
        format!("{}: {}", element.local_name(), element.value())
    }
}

impl TreeViewNode {
    /// Flattens the projection into depth-annotated lines, every node included.
    pub fn lines(&self) -> Vec<TreeViewLine> {
        let mut lines = Vec::new();
        self.push_lines(0, &mut lines);
        lines
    }

    fn push_lines(&self, depth: usize, lines: &mut Vec<TreeViewLine>) {
        lines.push(TreeViewLine {
            node_ref: self.node_ref.clone(),
            depth,
            label: self.label.clone(),
            expandable: !self.children.is_empty(),
            expanded: !self.children.is_empty(),
        });
        for child in &self.children {
            child.push_lines(depth + 1, lines);
        }
    }
}

/// Represents a single line in the tree view display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeViewLine {
    /// The element or attribute this line shows
    pub node_ref: NodeRef,
    /// Indentation depth (0 for the root element)
    pub depth: usize,
    pub label: String,
    /// Whether this line has attributes or child elements under it
    pub expandable: bool,
    pub expanded: bool,
}

/// Manages the visible lines of one document and which elements are expanded.
///
/// # Example
///
/// ```
/// use xmlquill::document::parser::{parse_document, ParseOptions};
/// use xmlquill::ui::tree_view::TreeViewState;
///
/// let xml = b"<root><list><item>1</item></list></root>";
/// let doc = parse_document("a.xml", xml, &ParseOptions::default()).unwrap();
///
/// let mut state = TreeViewState::new();
/// state.rebuild(&doc);
/// assert_eq!(state.lines().len(), 1);
///
/// state.expand_all(&doc);
/// state.rebuild(&doc);
/// assert_eq!(state.lines().len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct TreeViewState {
    lines: Vec<TreeViewLine>,
    expanded_paths: HashSet<Vec<usize>>,
}

impl TreeViewState {
    /// Creates a new empty TreeViewState. Everything starts collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the list of visible tree view lines.
    pub fn lines(&self) -> &[TreeViewLine] {
        &self.lines
    }

    /// Toggles the expand/collapse state of the element at the given path.
    ///
    /// After toggling, call `rebuild()` to regenerate the visible lines.
    pub fn toggle_expand(&mut self, path: &[usize]) {
        if !self.expanded_paths.remove(path) {
            self.expanded_paths.insert(path.to_vec());
        }
    }

    pub fn is_expanded(&self, path: &[usize]) -> bool {
        self.expanded_paths.contains(path)
    }

    /// Expands every element that has something under it.
    pub fn expand_all(&mut self, doc: &ParsedDocument) {
        self.expand_recursive(doc.root(), &mut Vec::new());
    }

    pub fn collapse_all(&mut self) {
        self.expanded_paths.clear();
    }

    fn expand_recursive(&mut self, element: &XmlElement, path: &mut Vec<usize>) {
        if element.attributes().is_empty() && !element.has_elements() {
            return;
        }
        self.expanded_paths.insert(path.clone());
        for (index, child) in element.children().enumerate() {
            path.push(index);
            self.expand_recursive(child, path);
            path.pop();
        }
    }

    /// Rebuilds the visible lines from the document.
    ///
    /// Call this after the document changes or expand/collapse state changes.
    /// Expansion is remembered by element path, so after a structural edit
    /// some elements may come back collapsed.
    pub fn rebuild(&mut self, doc: &ParsedDocument) {
        self.lines.clear();
        let view = build_tree_view(doc);
        self.push_visible(&view, &mut Vec::new(), 0);
    }

    fn push_visible(&mut self, node: &TreeViewNode, path: &mut Vec<usize>, depth: usize) {
        let expandable = !node.children.is_empty();
        let expanded = expandable && self.is_expanded(path);
        self.lines.push(TreeViewLine {
            node_ref: node.node_ref.clone(),
            depth,
            label: node.label.clone(),
            expandable,
            expanded,
        });
        if !expanded {
            return;
        }

        let mut element_index = 0;
        for child in &node.children {
            match &child.node_ref {
                NodeRef::Attribute { .. } => self.lines.push(TreeViewLine {
                    node_ref: child.node_ref.clone(),
                    depth: depth + 1,
                    label: child.label.clone(),
                    expandable: false,
                    expanded: false,
                }),
                NodeRef::Element(_) => {
                    path.push(element_index);
                    self.push_visible(child, path, depth + 1);
                    path.pop();
                    element_index += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::{parse_document, ParseOptions};

    fn doc(xml: &str) -> ParsedDocument {
        parse_document("v.xml", xml.as_bytes(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_leaf_label_keeps_separator() {
        let view = build_tree_view(&doc("<root><empty/></root>"));
        assert_eq!(view.children[0].label, "empty: ");
    }

    #[test]
    fn test_attributes_listed_before_children() {
        let view = build_tree_view(&doc(r#"<root a="1"><x>2</x></root>"#));
        let labels: Vec<_> = view.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["a: 1", "x: 2"]);
    }

    #[test]
    fn test_lines_depths() {
        let view = build_tree_view(&doc("<root><list><item>1</item></list></root>"));
        let depths: Vec<_> = view.lines().iter().map(|l| l.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
    }

    #[test]
    fn test_toggle_expand() {
        let d = doc(r#"<root id="r"><list><item>1</item></list></root>"#);
        let mut state = TreeViewState::new();
        state.toggle_expand(&[]);
        state.rebuild(&d);
        let labels: Vec<_> = state.lines().iter().map(|l| l.label.clone()).collect();
        assert_eq!(labels, vec!["root", "id: r", "list"]);
        assert!(state.lines()[2].expandable);
        assert!(!state.lines()[2].expanded);

        state.toggle_expand(&[]);
        state.rebuild(&d);
        assert_eq!(state.lines().len(), 1);
    }
}
