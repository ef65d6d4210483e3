//! XML parsing into `ParsedDocument` trees.
//!
//! This module drives `quick-xml`'s namespace-resolving reader over the raw
//! bytes of a file and builds the owned element tree used by the editor.
//! Every element records the namespace URI its prefix resolved to at parse
//! time, so later edits (renames, new children) can keep it.
//!
//! # Example
//!
//! ```
//! use xmlquill::document::parser::{parse_document, ParseOptions};
//!
//! let xml = br#"<root xmlns:x="urn:x"><x:item id="7">1</x:item></root>"#;
//! let doc = parse_document("a.xml", xml, &ParseOptions::default()).unwrap();
//!
//! let item = doc.get_element(&[0]).unwrap();
//! assert_eq!(item.local_name(), "item");
//! assert_eq!(item.namespace(), Some("urn:x"));
//! assert_eq!(item.attribute("id").unwrap().value(), "7");
//! ```

use super::node::{XmlAttribute, XmlElement, XmlName, XmlNode};
use super::tree::{ParsedDocument, XmlDeclaration};
use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::borrow::Cow;

/// Options controlling how raw bytes become a tree.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Keep whitespace-only text nodes instead of dropping them.
    pub preserve_whitespace: bool,
}

/// Parses raw XML bytes into a `ParsedDocument` keyed by `path`.
///
/// The input must be UTF-8 (a leading byte order mark is accepted). A
/// declaration naming any other encoding is rejected, since documents are
/// always written back as UTF-8.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not valid UTF-8
/// - The XML is malformed (mismatched tags, bad attributes, undeclared prefixes)
/// - There is no root element, or more than one
pub fn parse_document(
    path: impl Into<String>,
    bytes: &[u8],
    options: &ParseOptions,
) -> Result<ParsedDocument> {
    let text = std::str::from_utf8(bytes).context("Document is not valid UTF-8")?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = NsReader::from_str(text);
    reader.config_mut().trim_text(false);

    let mut declaration = None;
    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root: Option<XmlElement> = None;
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        let position = reader.buffer_position();
        let (resolved, event) = reader
            .read_resolved_event()
            .with_context(|| format!("Malformed XML near byte {}", position))?;
        let namespace = resolved_namespace(resolved)?;

        match event {
            Event::Decl(decl) => {
                declaration = Some(read_declaration(&decl)?);
            }
            Event::Start(start) => {
                let element = read_element(&reader, &start, namespace)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = read_element(&reader, &start, namespace)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| anyhow!("Unexpected closing tag near byte {}", position))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text.unescape().context("Invalid character data")?;
                push_text(text, &mut stack, options)?;
            }
            Event::CData(data) => {
                let data = std::str::from_utf8(&data).context("Invalid CDATA section")?;
                push_content(
                    XmlNode::CData(data.to_string()),
                    &mut stack,
                    &root,
                    &mut prolog,
                    &mut epilog,
                )?;
            }
            Event::Comment(comment) => {
                let comment = std::str::from_utf8(&comment).context("Invalid comment")?;
                push_content(
                    XmlNode::Comment(comment.to_string()),
                    &mut stack,
                    &root,
                    &mut prolog,
                    &mut epilog,
                )?;
            }
            Event::PI(pi) => {
                let pi = std::str::from_utf8(&pi).context("Invalid processing instruction")?;
                push_content(
                    XmlNode::ProcessingInstruction(pi.to_string()),
                    &mut stack,
                    &root,
                    &mut prolog,
                    &mut epilog,
                )?;
            }
            Event::DocType(doctype) => {
                if root.is_some() || !stack.is_empty() {
                    bail!("DOCTYPE must appear before the root element");
                }
                let doctype = std::str::from_utf8(&doctype).context("Invalid DOCTYPE")?;
                prolog.push(XmlNode::DocType(doctype.to_string()));
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.last() {
        bail!("Unexpected end of document: <{}> is not closed", open.name());
    }
    let root = root.ok_or_else(|| anyhow!("Document has no root element"))?;

    Ok(ParsedDocument::with_parts(path, declaration, prolog, root, epilog))
}

/// Turns a resolved element namespace into an owned URI.
fn resolved_namespace(resolved: ResolveResult) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(Namespace(uri)) => Ok(Some(std::str::from_utf8(uri)?.to_string())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => bail!(
            "Undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ),
    }
}

fn read_declaration(decl: &quick_xml::events::BytesDecl) -> Result<XmlDeclaration> {
    let version = decl.version().context("Invalid XML declaration")?;
    let encoding = match decl.encoding() {
        Some(encoding) => Some(bytes_to_string(encoding.context("Invalid encoding")?)?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(standalone) => Some(bytes_to_string(standalone.context("Invalid standalone")?)?),
        None => None,
    };

    if let Some(encoding) = &encoding {
        if !is_supported_encoding(encoding) {
            bail!("Unsupported encoding '{}': only UTF-8 documents can be edited", encoding);
        }
    }

    Ok(XmlDeclaration {
        version: bytes_to_string(version)?,
        encoding,
        standalone,
    })
}

fn is_supported_encoding(encoding: &str) -> bool {
    matches!(
        encoding.to_ascii_lowercase().as_str(),
        "utf-8" | "utf8" | "us-ascii" | "ascii"
    )
}

fn bytes_to_string(bytes: Cow<[u8]>) -> Result<String> {
    Ok(std::str::from_utf8(&bytes)?.to_string())
}

/// Builds an element (without content) from a start tag.
fn read_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart,
    namespace: Option<String>,
) -> Result<XmlElement> {
    let qname = start.name();
    let prefix = match qname.prefix() {
        Some(prefix) => Some(std::str::from_utf8(prefix.as_ref())?.to_string()),
        None => None,
    };
    let local = std::str::from_utf8(qname.local_name().as_ref())?.to_string();
    let mut element = XmlElement::new(XmlName::qualified(prefix, local, namespace));

    for attr in start.attributes() {
        let attr = attr.context("Malformed attribute")?;
        let key = attr.key.as_ref();
        let value = attr.unescape_value().context("Invalid attribute value")?;

        if key == b"xmlns" {
            element.declare_namespace(None, value.into_owned());
            continue;
        }
        if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            let prefix = std::str::from_utf8(prefix)?.to_string();
            element.declare_namespace(Some(prefix), value.into_owned());
            continue;
        }

        let (resolved, local) = reader.resolve_attribute(attr.key);
        let attr_namespace = resolved_namespace(resolved)?;
        let attr_prefix = match attr.key.prefix() {
            Some(prefix) => Some(std::str::from_utf8(prefix.as_ref())?.to_string()),
            None => None,
        };
        let attr_local = std::str::from_utf8(local.as_ref())?.to_string();
        element.attributes.push(XmlAttribute::new(
            XmlName::qualified(attr_prefix, attr_local, attr_namespace),
            value.into_owned(),
        ));
    }

    Ok(element)
}

/// Attaches a finished element to its parent, or makes it the root.
fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.append_child(element);
        }
        None => {
            if root.is_some() {
                bail!("Document has more than one root element");
            }
            *root = Some(element);
        }
    }
    Ok(())
}

fn push_text(text: Cow<str>, stack: &mut [XmlElement], options: &ParseOptions) -> Result<()> {
    let whitespace_only = text.chars().all(char::is_whitespace);
    match stack.last_mut() {
        Some(parent) => {
            if !whitespace_only || options.preserve_whitespace {
                parent.push_content(XmlNode::Text(text.into_owned()));
            }
        }
        None => {
            if !whitespace_only {
                bail!("Text content outside of the root element");
            }
        }
    }
    Ok(())
}

/// Places a non-element node inside the open element, or in the prolog/epilog.
fn push_content(
    node: XmlNode,
    stack: &mut [XmlElement],
    root: &Option<XmlElement>,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_content(node),
        None => {
            if matches!(node, XmlNode::CData(_)) {
                bail!("CDATA outside of the root element");
            }
            if root.is_some() {
                epilog.push(node);
            } else {
                prolog.push(node);
            }
        }
    }
    Ok(())
}
