//! XML node representation.
//!
//! This module provides the core data structures for representing XML documents
//! in xmlquill. Elements keep their qualified name (prefix, local name and the
//! resolved namespace URI), their namespace declarations, their attributes and
//! an ordered content list. Matching across documents only ever looks at the
//! local name; the prefix and namespace are carried along so edits never lose
//! them.
//!
//! # Example
//!
//! ```
//! use xmlquill::document::node::{XmlElement, XmlName};
//!
//! let mut item = XmlElement::with_text(XmlName::new("item"), "1");
//! assert_eq!(item.value(), "1");
//! assert!(!item.has_elements());
//!
//! let mut root = XmlElement::new(XmlName::new("root"));
//! root.append_child(item.clone());
//! assert!(root.has_elements());
//!
//! item.set_value("9");
//! assert_eq!(item.value(), "9");
//! ```

/// A possibly prefixed XML name with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlName {
    prefix: Option<String>,
    local: String,
    namespace: Option<String>,
}

impl XmlName {
    /// Creates an unprefixed name in no namespace.
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            namespace: None,
        }
    }

    /// Creates a name with an explicit prefix and namespace URI.
    pub fn qualified(
        prefix: Option<String>,
        local: impl Into<String>,
        namespace: Option<String>,
    ) -> Self {
        Self {
            prefix,
            local: local.into(),
            namespace,
        }
    }

    /// Returns a name with the same prefix and namespace but a different local part.
    ///
    /// ```
    /// use xmlquill::document::node::XmlName;
    ///
    /// let name = XmlName::qualified(Some("x".into()), "item", Some("urn:x".into()));
    /// let sibling = name.with_local("note");
    /// assert_eq!(sibling.to_string(), "x:note");
    /// assert_eq!(sibling.namespace(), Some("urn:x"));
    /// ```
    pub fn with_local(&self, local: impl Into<String>) -> Self {
        Self {
            prefix: self.prefix.clone(),
            local: local.into(),
            namespace: self.namespace.clone(),
        }
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl std::fmt::Display for XmlName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// An `xmlns` or `xmlns:prefix` declaration on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDeclaration {
    /// `None` for the default namespace
    pub prefix: Option<String>,
    pub uri: String,
}

impl NamespaceDeclaration {
    /// The attribute name this declaration is written as.
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        }
    }
}

/// An attribute: a name and a scalar text value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    name: XmlName,
    value: String,
}

impl XmlAttribute {
    pub fn new(name: XmlName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    pub fn name(&self) -> &XmlName {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name.local()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

/// One entry in an element's content, or in a document's prolog/epilog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Unescaped character data
    Text(String),
    CData(String),
    /// Raw comment body, written back verbatim
    Comment(String),
    /// Raw processing instruction body (target and data)
    ProcessingInstruction(String),
    /// Raw doctype body; only appears in a prolog
    DocType(String),
}

/// An XML element.
///
/// Child element indices used throughout the crate (paths, `child`,
/// `remove_child`) count elements only; text, comments and other content
/// entries are skipped when indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub(crate) name: XmlName,
    pub(crate) namespaces: Vec<NamespaceDeclaration>,
    pub(crate) attributes: Vec<XmlAttribute>,
    pub(crate) content: Vec<XmlNode>,
}

impl XmlElement {
    /// Creates an element with no attributes and no content.
    pub fn new(name: XmlName) -> Self {
        Self {
            name,
            namespaces: Vec::new(),
            attributes: Vec::new(),
            content: Vec::new(),
        }
    }

    /// Creates a leaf element holding `text`. Empty text produces an empty element.
    pub fn with_text(name: XmlName, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.set_value(text);
        element
    }

    pub fn name(&self) -> &XmlName {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name.local()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace()
    }

    /// Changes the local name, keeping this element's own prefix and namespace.
    pub fn rename(&mut self, local: &str) {
        self.name = self.name.with_local(local);
    }

    pub fn namespace_declarations(&self) -> &[NamespaceDeclaration] {
        &self.namespaces
    }

    pub fn declare_namespace(&mut self, prefix: Option<String>, uri: impl Into<String>) {
        self.namespaces.push(NamespaceDeclaration {
            prefix,
            uri: uri.into(),
        });
    }

    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut [XmlAttribute] {
        &mut self.attributes
    }

    /// Returns the first attribute with the given local name.
    pub fn attribute(&self, local: &str) -> Option<&XmlAttribute> {
        self.attributes.iter().find(|a| a.local_name() == local)
    }

    pub fn content(&self) -> &[XmlNode] {
        &self.content
    }

    /// Appends a raw content entry (text, comment, ...).
    pub fn push_content(&mut self, node: XmlNode) {
        self.content.push(node);
    }

    /// Iterates over child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.content.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.content.iter_mut().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Returns the `index`th child element.
    pub fn child(&self, index: usize) -> Option<&XmlElement> {
        self.children().nth(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        self.children_mut().nth(index)
    }

    /// Returns true if this element has at least one child element.
    pub fn has_elements(&self) -> bool {
        self.content
            .iter()
            .any(|node| matches!(node, XmlNode::Element(_)))
    }

    /// Appends `child` as the last child element and returns its child index.
    pub fn append_child(&mut self, child: XmlElement) -> usize {
        let index = self.child_count();
        self.content.push(XmlNode::Element(child));
        index
    }

    /// Detaches the `index`th child element, leaving other content in place.
    pub fn remove_child(&mut self, index: usize) -> Option<XmlElement> {
        let position = self
            .content
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, XmlNode::Element(_)))
            .nth(index)
            .map(|(position, _)| position)?;

        match self.content.remove(position) {
            XmlNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the concatenated text and CDATA of this element and all descendants.
    pub fn value(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.content {
            match node {
                XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                _ => {}
            }
        }
    }

    /// Replaces the entire content with a single text node.
    ///
    /// Child elements are dropped. Returns true if any were.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        let had_elements = self.has_elements();
        let value = value.into();
        self.content.clear();
        if !value.is_empty() {
            self.content.push(XmlNode::Text(value));
        }
        had_elements
    }
}
