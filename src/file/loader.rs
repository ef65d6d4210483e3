//! XML file loading functionality.
//!
//! This module reads documents from disk as raw bytes, transparently
//! decompressing gzipped files, and parses them into `ParsedDocument`
//! structures that can be edited by xmlquill.

use crate::document::parser::{parse_document, ParseOptions};
use crate::document::tree::ParsedDocument;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Reads a file into memory, gunzipping it when needed.
///
/// A file is treated as gzip if its name ends in `.gz` or its content starts
/// with the gzip magic bytes.
///
/// # Errors
///
/// Returns an error if:
/// - The file could not be read (doesn't exist, permission denied, etc.)
/// - The file looks gzipped but can't be decompressed
pub fn read_xml_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if is_gzip_path(path) || raw.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&raw)
    } else {
        Ok(raw)
    }
}

/// Loads and parses an XML file from the filesystem.
///
/// The document is keyed by the path exactly as given.
///
/// # Examples
///
/// ```no_run
/// use xmlquill::document::parser::ParseOptions;
/// use xmlquill::file::loader::load_xml_file;
///
/// let doc = load_xml_file("catalog.xml", &ParseOptions::default()).unwrap();
/// println!("root element: {}", doc.root().local_name());
/// ```
///
/// # Errors
///
/// This function will return an error if:
/// - The file cannot be read
/// - The file contents are not well-formed XML
pub fn load_xml_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<ParsedDocument> {
    let path = path.as_ref();
    let bytes = read_xml_bytes(path)?;
    parse_document(path.to_string_lossy(), &bytes, options).context("Failed to parse XML")
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

/// Decompresses gzip-encoded bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid gzip format.
fn decompress_gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .context("Failed to decompress gzipped file - file may be corrupted")?;
    Ok(content)
}
