//! A loaded XML document and path-based navigation.
//!
//! This module provides the `ParsedDocument` type: one file's parse tree plus
//! the path it was loaded from. Elements inside a document are addressed by
//! a sequence of child-element indices starting at the root, the same way a
//! tree view addresses its rows.
//!
//! # Example
//!
//! ```
//! use xmlquill::document::tree::ParsedDocument;
//! use xmlquill::document::node::{XmlElement, XmlName};
//!
//! let mut root = XmlElement::new(XmlName::new("root"));
//! root.append_child(XmlElement::with_text(XmlName::new("item"), "1"));
//! let doc = ParsedDocument::new("a.xml", root);
//!
//! // Navigate to the first child of the root
//! let item = doc.get_element(&[0]).unwrap();
//! assert_eq!(item.value(), "1");
//!
//! // An out of range path resolves to nothing
//! assert!(doc.get_element(&[0, 3]).is_none());
//! ```

use super::node::{XmlElement, XmlNode};
use anyhow::{anyhow, Result};

/// The `<?xml ...?>` declaration of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("utf-8".to_string()),
            standalone: None,
        }
    }
}

/// One loaded XML document.
///
/// The revision counter increases on every structural change (an element
/// detached, appended, or dropped by a value replacement). References into
/// the document remember the revision they were taken at, so a stale
/// reference is detected instead of silently landing on a different node.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    path: String,
    declaration: Option<XmlDeclaration>,
    prolog: Vec<XmlNode>,
    root: XmlElement,
    epilog: Vec<XmlNode>,
    revision: u64,
}

impl ParsedDocument {
    /// Creates a document with just a root element.
    pub fn new(path: impl Into<String>, root: XmlElement) -> Self {
        Self {
            path: path.into(),
            declaration: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
            revision: 0,
        }
    }

    /// Creates a document with the markup that surrounds the root element.
    pub fn with_parts(
        path: impl Into<String>,
        declaration: Option<XmlDeclaration>,
        prolog: Vec<XmlNode>,
        root: XmlElement,
        epilog: Vec<XmlNode>,
    ) -> Self {
        Self {
            path: path.into(),
            declaration,
            prolog,
            root,
            epilog,
            revision: 0,
        }
    }

    /// The path this document was loaded from and is saved back to.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    /// Comments, processing instructions and doctype before the root element.
    pub fn prolog(&self) -> &[XmlNode] {
        &self.prolog
    }

    /// Comments and processing instructions after the root element.
    pub fn epilog(&self) -> &[XmlNode] {
        &self.epilog
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Returns a mutable reference to the root element.
    ///
    /// Callers that add or remove elements through this reference must call
    /// `bump_revision()` afterwards.
    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.root
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Marks the element structure as changed, invalidating older references.
    pub fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Gets the element at the given child-index path. The empty path is the root.
    pub fn get_element(&self, path: &[usize]) -> Option<&XmlElement> {
        let mut current = &self.root;
        for &index in path {
            current = current.child(index)?;
        }
        Some(current)
    }

    /// Gets a mutable reference to the element at the given path.
    pub fn get_element_mut(&mut self, path: &[usize]) -> Option<&mut XmlElement> {
        let mut current = &mut self.root;
        for &index in path {
            current = current.child_mut(index)?;
        }
        Some(current)
    }

    /// Detaches the element at `path` from its parent and returns it.
    /// Returns an error if the path is empty (cannot detach root) or invalid.
    pub fn detach(&mut self, path: &[usize]) -> Result<XmlElement> {
        let (&index, parent_path) = path
            .split_last()
            .ok_or_else(|| anyhow!("Cannot delete the root element"))?;

        let parent = self
            .get_element_mut(parent_path)
            .ok_or_else(|| anyhow!("Parent element not found"))?;

        let count = parent.child_count();
        let removed = parent.remove_child(index).ok_or_else(|| {
            anyhow!(
                "Index {} out of bounds for element with {} children",
                index,
                count
            )
        })?;

        self.bump_revision();
        Ok(removed)
    }

    /// Appends `child` as the last child of the element at `parent_path` and
    /// returns the path of the new element.
    pub fn append_child(&mut self, parent_path: &[usize], child: XmlElement) -> Result<Vec<usize>> {
        let parent = self
            .get_element_mut(parent_path)
            .ok_or_else(|| anyhow!("Parent element not found"))?;

        let index = parent.append_child(child);
        self.bump_revision();

        let mut path = parent_path.to_vec();
        path.push(index);
        Ok(path)
    }
}
