//! Selection state: what the user last pointed at, and what a delete would remove.
//!
//! Two separate pieces of state live here:
//!
//! - `SelectionSnapshot` is just a name and a value. Bulk operations match on
//!   the snapshot's name across every document, so where it came from does not
//!   matter.
//! - `NodeRef` points at one concrete element or attribute in one document.
//!   Structural operations (adding a child, opening the context menu) need it.

use crate::document::node::XmlElement;
use crate::document::store::DocumentStore;
use crate::document::tree::ParsedDocument;
use crate::error::EditError;
use serde::Serialize;

/// A reference to one element of one loaded document.
///
/// The reference records the document revision it was taken at. Once the
/// document's structure changes the reference stops resolving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementRef {
    pub document: String,
    pub path: Vec<usize>,
    pub revision: u64,
}

impl ElementRef {
    /// Takes a reference to the element at `path` in `document`.
    pub fn new(document: &ParsedDocument, path: Vec<usize>) -> Self {
        Self {
            document: document.path().to_string(),
            path,
            revision: document.revision(),
        }
    }

    /// Returns true if this reference points at a document's root element.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Checks the reference against the store and returns its document.
    pub fn document_in<'a>(
        &self,
        store: &'a DocumentStore,
    ) -> Result<&'a ParsedDocument, EditError> {
        let document = store.get(&self.document).ok_or_else(|| {
            EditError::selection(format!("No document loaded from {}", self.document))
        })?;
        if document.revision() != self.revision {
            return Err(EditError::selection(
                "The selected node is out of date; select it again",
            ));
        }
        Ok(document)
    }

    /// Resolves the reference to its element.
    pub fn resolve<'a>(&self, store: &'a DocumentStore) -> Result<&'a XmlElement, EditError> {
        self.document_in(store)?
            .get_element(&self.path)
            .ok_or_else(|| EditError::selection("The selected element no longer exists"))
    }
}

/// The live selected node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeRef {
    Element(ElementRef),
    Attribute { element: ElementRef, index: usize },
}

impl NodeRef {
    /// Returns the element reference if this node is an element.
    pub fn as_element(&self) -> Option<&ElementRef> {
        match self {
            NodeRef::Element(element) => Some(element),
            NodeRef::Attribute { .. } => None,
        }
    }

    /// The document this node belongs to.
    pub fn document(&self) -> &str {
        match self {
            NodeRef::Element(element) | NodeRef::Attribute { element, .. } => &element.document,
        }
    }

    /// Reads the node's current local name and value.
    pub fn snapshot(&self, store: &DocumentStore) -> Result<SelectionSnapshot, EditError> {
        match self {
            NodeRef::Element(element) => {
                let node = element.resolve(store)?;
                Ok(SelectionSnapshot::new(node.local_name(), node.value()))
            }
            NodeRef::Attribute { element, index } => {
                let attr = element.resolve(store)?.attributes().get(*index).ok_or_else(|| {
                    EditError::selection("The selected attribute no longer exists")
                })?;
                Ok(SelectionSnapshot::new(attr.local_name(), attr.value()))
            }
        }
    }
}

/// The name and value of the last node the user selected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SelectionSnapshot {
    pub name: String,
    pub value: String,
}

impl SelectionSnapshot {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The element a confirmed delete would remove.
///
/// Opening the context menu on an element captures it; a later open replaces
/// it. Confirming a delete consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    Pending(ElementRef),
}

impl DeleteState {
    /// Replaces any pending target with `target`.
    pub fn capture(&mut self, target: ElementRef) {
        *self = DeleteState::Pending(target);
    }

    /// Drops any pending target.
    pub fn cancel(&mut self) {
        *self = DeleteState::Idle;
    }

    /// Removes and returns the pending target, leaving the state idle.
    pub fn take(&mut self) -> Option<ElementRef> {
        match std::mem::take(self) {
            DeleteState::Pending(target) => Some(target),
            DeleteState::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<&ElementRef> {
        match self {
            DeleteState::Pending(target) => Some(target),
            DeleteState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DeleteState::Idle)
    }
}
