//! Name-based node matching within one document.
//!
//! All functions here are pure. They walk the element tree depth-first in
//! pre-order (a node before its children, children left to right), starting
//! at the root, and compare local names only: prefixes and namespaces are
//! ignored. Results are element paths (child-element indices from the root),
//! which stay valid until the document's structure changes.

use super::tree::ParsedDocument;
use crate::document::node::XmlElement;

/// An attribute located by the matcher: the path of its element plus the
/// attribute's position in that element's attribute list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub element: Vec<usize>,
    pub index: usize,
}

/// Returns the path of every element whose local name is `local_name`, in pre-order.
///
/// # Example
///
/// ```
/// use xmlquill::document::matcher::find_elements_by_name;
/// use xmlquill::document::parser::{parse_document, ParseOptions};
///
/// let xml = b"<item><list><item/></list><item/></item>";
/// let doc = parse_document("a.xml", xml, &ParseOptions::default()).unwrap();
///
/// let matches = find_elements_by_name(&doc, "item");
/// assert_eq!(matches, vec![vec![], vec![0, 0], vec![1]]);
/// ```
pub fn find_elements_by_name(document: &ParsedDocument, local_name: &str) -> Vec<Vec<usize>> {
    let mut matches = Vec::new();
    walk(document.root(), &mut Vec::new(), &mut |element, path| {
        if element.local_name() == local_name {
            matches.push(path.to_vec());
        }
        true
    });
    matches
}

/// Returns every attribute whose local name is `local_name`, in pre-order of
/// their elements and attribute order within an element.
pub fn find_attributes_by_name(
    document: &ParsedDocument,
    local_name: &str,
) -> Vec<AttributeMatch> {
    let mut matches = Vec::new();
    walk(document.root(), &mut Vec::new(), &mut |element, path| {
        for (index, attr) in element.attributes().iter().enumerate() {
            if attr.local_name() == local_name {
                matches.push(AttributeMatch {
                    element: path.to_vec(),
                    index,
                });
            }
        }
        true
    });
    matches
}

/// Returns the path of the first element, in pre-order, named `local_name`.
pub fn find_first_element_by_name(
    document: &ParsedDocument,
    local_name: &str,
) -> Option<Vec<usize>> {
    let mut found = None;
    walk(document.root(), &mut Vec::new(), &mut |element, path| {
        if element.local_name() == local_name {
            found = Some(path.to_vec());
            return false;
        }
        true
    });
    found
}

/// Pre-order traversal. The visitor returns false to stop the walk.
fn walk<F>(element: &XmlElement, path: &mut Vec<usize>, visit: &mut F) -> bool
where
    F: FnMut(&XmlElement, &[usize]) -> bool,
{
    if !visit(element, path) {
        return false;
    }
    for (index, child) in element.children().enumerate() {
        path.push(index);
        let keep_going = walk(child, path, visit);
        path.pop();
        if !keep_going {
            return false;
        }
    }
    true
}
