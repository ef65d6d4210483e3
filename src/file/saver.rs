//! XML file saving functionality.
//!
//! This module serializes `ParsedDocument` trees with `quick-xml`'s writer and
//! saves them with atomic write operations, optional backups and transparent
//! gzip compression.

use crate::config::Config;
use crate::document::node::{XmlElement, XmlNode};
use crate::document::parser::{parse_document, ParseOptions};
use crate::document::tree::{ParsedDocument, XmlDeclaration};
use anyhow::{Context, Result};
use quick_xml::events::{
    BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event,
};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Serializes a document to UTF-8 bytes.
///
/// With `preserve_whitespace` off, output is indented with `indent_size`
/// spaces; otherwise the content is written exactly as held in memory.
///
/// # Example
///
/// ```
/// use xmlquill::config::Config;
/// use xmlquill::document::parser::{parse_document, ParseOptions};
/// use xmlquill::file::saver::serialize_document;
///
/// let xml = b"<root><item>1</item></root>";
/// let doc = parse_document("a.xml", xml, &ParseOptions::default()).unwrap();
/// let bytes = serialize_document(&doc, &Config::default()).unwrap();
/// let text = String::from_utf8(bytes).unwrap();
///
/// assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
/// assert!(text.contains("  <item>1</item>"));
/// ```
pub fn serialize_document(doc: &ParsedDocument, config: &Config) -> Result<Vec<u8>> {
    let indent = !config.preserve_whitespace;
    let mut writer = if indent {
        Writer::new_with_indent(Vec::new(), b' ', config.indent_size)
    } else {
        Writer::new(Vec::new())
    };

    let default_declaration = XmlDeclaration::default();
    let declaration = match doc.declaration() {
        Some(declaration) => Some(declaration),
        None if config.write_declaration => Some(&default_declaration),
        None => None,
    };

    if let Some(decl) = declaration {
        writer.write_event(Event::Decl(BytesDecl::new(
            &decl.version,
            decl.encoding.as_deref(),
            decl.standalone.as_deref(),
        )))?;
        line_break(&mut writer, indent)?;
    }

    for node in doc.prolog() {
        write_node(&mut writer, node)?;
        line_break(&mut writer, indent)?;
    }

    write_element(&mut writer, doc.root())?;

    for node in doc.epilog() {
        line_break(&mut writer, indent)?;
        write_node(&mut writer, node)?;
    }

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

/// Separates top-level markup when the writer is not adding its own line breaks.
fn line_break(writer: &mut Writer<Vec<u8>>, indent: bool) -> Result<()> {
    if !indent {
        writer.get_mut().write_all(b"\n")?;
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<()> {
    let name = element.name().to_string();
    let mut start = BytesStart::new(name.as_str());

    for decl in element.namespace_declarations() {
        let key = decl.attribute_name();
        start.push_attribute((key.as_str(), decl.uri.as_str()));
    }
    for attr in element.attributes() {
        let key = attr.name().to_string();
        start.push_attribute((key.as_str(), attr.value()));
    }

    if element.content().is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if has_mixed_content(element) {
        // Indenting between text and markup would change the element's value
        let mut inline = Writer::new(Vec::new());
        for node in element.content() {
            write_node(&mut inline, node)?;
        }
        let markup = String::from_utf8(inline.into_inner())?;
        writer.write_event(Event::Text(BytesText::from_escaped(markup)))?;
    } else {
        for node in element.content() {
            write_node(writer, node)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

/// True when character data sits next to other nodes in the element's content.
fn has_mixed_content(element: &XmlElement) -> bool {
    let is_text = |node: &XmlNode| matches!(node, XmlNode::Text(_) | XmlNode::CData(_));
    let content = element.content();
    content.iter().any(is_text) && !content.iter().all(is_text)
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element)?,
        XmlNode::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        XmlNode::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        XmlNode::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?
        }
        XmlNode::ProcessingInstruction(pi) => {
            writer.write_event(Event::PI(BytesPI::new(pi.as_str())))?
        }
        XmlNode::DocType(doctype) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?
        }
    }
    Ok(())
}

/// Creates a backup of a file by copying it with a .bak extension.
fn create_backup<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    let mut backup_path = path.to_path_buf();
    let original_name = backup_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name"))?;
    backup_path.set_file_name(format!("{}.bak", original_name));
    fs::copy(path, backup_path).context("Failed to create backup")?;
    Ok(())
}

/// Saves a document to a file with optional backup creation.
///
/// The serialized output is parsed back before anything touches the disk, so
/// a serialization bug can never overwrite a user's file with broken XML.
/// Paths ending in `.gz` are written gzip-compressed.
///
/// # Examples
///
/// ```no_run
/// use xmlquill::config::Config;
/// use xmlquill::document::node::{XmlElement, XmlName};
/// use xmlquill::document::tree::ParsedDocument;
/// use xmlquill::file::saver::save_xml_file;
///
/// let doc = ParsedDocument::new("output.xml", XmlElement::new(XmlName::new("root")));
/// save_xml_file("output.xml", &doc, &Config::default()).unwrap();
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - Serialization fails or produces XML that does not parse back
/// - Backup creation fails (if requested)
/// - Writing the temp file or renaming it onto the target fails
///
/// # Atomic Write
///
/// The data is written to a temporary file next to the target and then
/// renamed over it, so the target is never left partially written.
pub fn save_xml_file<P: AsRef<Path>>(path: P, doc: &ParsedDocument, config: &Config) -> Result<()> {
    let path = path.as_ref();
    let should_compress = path.to_string_lossy().ends_with(".gz");

    let bytes = serialize_document(doc, config).context("Failed to serialize XML")?;

    let check = ParseOptions {
        preserve_whitespace: true,
    };
    parse_document(doc.path(), &bytes, &check)
        .context("Generated invalid XML - this is a bug in xmlquill's serialization")?;

    if config.create_backup && path.exists() {
        create_backup(path)?;
    }

    write_file_atomic(path, &bytes, should_compress)?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());

    Ok(())
}

/// Writes data to a file atomically, optionally compressing with gzip.
///
/// # Errors
///
/// Returns an error if:
/// - Creating the temp file fails
/// - Writing or compressing fails
/// - Renaming the temp file fails
fn write_file_atomic<P: AsRef<Path>>(path: P, data: &[u8], compress: bool) -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let path = path.as_ref();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid file name"))?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    if compress {
        let file = fs::File::create(&temp_path).context("Failed to create temp file")?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(data)
            .context("Failed to write compressed data")?;
        encoder.finish().context("Failed to finish compression")?;
    } else {
        fs::write(&temp_path, data).context("Failed to write temp file")?;
    }

    // Atomic rename
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).context("Failed to rename temp file");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(xml: &str) -> ParsedDocument {
        parse_document("t.xml", xml.as_bytes(), &ParseOptions::default()).unwrap()
    }

    fn to_string(doc: &ParsedDocument, config: &Config) -> String {
        String::from_utf8(serialize_document(doc, config).unwrap()).unwrap()
    }

    #[test]
    fn test_serialize_indented() {
        let doc = parse("<root><list><item>1</item></list></root>");
        let text = to_string(&doc, &Config::default());
        assert_eq!(
            text,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n  <list>\n    <item>1</item>\n  </list>\n</root>\n"
        );
    }

    #[test]
    fn test_serialize_without_declaration() {
        let doc = parse("<root/>");
        let config = Config {
            write_declaration: false,
            ..Config::default()
        };
        assert_eq!(to_string(&doc, &config), "<root/>\n");
    }

    #[test]
    fn test_original_declaration_kept() {
        let doc = parse("<?xml version=\"1.0\" standalone=\"yes\"?><root/>");
        let text = to_string(&doc, &Config::default());
        assert!(text.starts_with("<?xml version=\"1.0\" standalone=\"yes\"?>"));
    }

    #[test]
    fn test_serialize_escapes_text_and_attributes() {
        let mut doc = parse(r#"<root q="">x</root>"#);
        let root = doc.root_mut();
        root.set_value("a < b & c");
        root.attributes_mut()[0].set_value("\"x\" & <y>");
        let text = to_string(&doc, &Config::default());

        let back = parse_document("t.xml", text.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(back.root().value(), "a < b & c");
        assert_eq!(back.root().attribute("q").unwrap().value(), "\"x\" & <y>");
    }

    #[test]
    fn test_namespaces_written_back() {
        let doc = parse(r#"<x:root xmlns:x="urn:x" xmlns="urn:d"><x:item x:id="1"/><plain/></x:root>"#);
        let text = to_string(&doc, &Config::default());
        assert!(text.contains(r#"<x:root xmlns:x="urn:x" xmlns="urn:d">"#));
        assert!(text.contains(r#"<x:item x:id="1"/>"#));

        let back = parse_document("t.xml", text.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(back.get_element(&[1]).unwrap().namespace(), Some("urn:d"));
    }

    #[test]
    fn test_preserve_whitespace_round_trip() {
        let xml = "<root>\n\t<item>1</item>\n\t<!-- c -->\n</root>";
        let options = ParseOptions {
            preserve_whitespace: true,
        };
        let doc = parse_document("t.xml", xml.as_bytes(), &options).unwrap();
        let config = Config {
            preserve_whitespace: true,
            write_declaration: false,
            ..Config::default()
        };
        assert_eq!(to_string(&doc, &config), format!("{}\n", xml));
    }

    #[test]
    fn test_cdata_comment_and_pi_kept() {
        let doc = parse("<root><![CDATA[<raw>]]><!--note--><?app go?></root>");
        let text = to_string(&doc, &Config::default());
        assert!(text.contains("<![CDATA[<raw>]]>"));
        assert!(text.contains("<!--note-->"));
        assert!(text.contains("<?app go?>"));
    }

    #[test]
    fn test_mixed_content_written_inline() {
        let doc = parse("<doc><p><em>Hi</em> there</p><list><item>1</item></list></doc>");
        let config = Config {
            write_declaration: false,
            ..Config::default()
        };
        assert_eq!(
            to_string(&doc, &config),
            "<doc>\n  <p><em>Hi</em> there</p>\n  <list>\n    <item>1</item>\n  </list>\n</doc>\n"
        );
    }

    #[test]
    fn test_write_file_atomic_uncompressed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xml");
        write_file_atomic(&path, b"<root/>", false).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<root/>");
        assert!(!dir.path().join(".out.xml.tmp").exists());
    }

    #[test]
    fn test_write_file_atomic_compressed() {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xml.gz");
        write_file_atomic(&path, b"<root/>", true).unwrap();

        let file = fs::File::open(&path).unwrap();
        let mut decoder = GzDecoder::new(file);
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();
        assert_eq!(decompressed, "<root/>");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.xml");
        assert!(write_file_atomic(&path, b"<root/>", false).is_err());
    }
}
