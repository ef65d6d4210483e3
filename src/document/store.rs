//! The set of loaded documents.
//!
//! `DocumentStore` maps a file path to its `ParsedDocument`. A path is loaded
//! at most once; iteration follows load order, which is also the order bulk
//! mutations visit documents in.

use super::parser::{parse_document, ParseOptions};
use super::tree::ParsedDocument;
use crate::config::Config;
use crate::error::EditError;
use crate::file::saver::save_xml_file;
use indexmap::IndexMap;

/// Every loaded document, keyed by the path it was loaded from.
///
/// # Example
///
/// ```
/// use xmlquill::document::store::DocumentStore;
///
/// let mut store = DocumentStore::new();
/// assert!(store.load("a.xml", b"<root><item>1</item></root>").unwrap());
///
/// // The second load of the same path is ignored
/// assert!(!store.load("a.xml", b"<other/>").unwrap());
/// assert_eq!(store.get("a.xml").unwrap().root().local_name(), "root");
/// ```
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: IndexMap<String, ParsedDocument>,
    options: ParseOptions,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that parses with the given options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            documents: IndexMap::new(),
            options,
        }
    }

    /// Parses `bytes` and stores the result under `path`.
    ///
    /// Returns `Ok(false)` without parsing if `path` is already loaded, so the
    /// first load wins and in-memory edits are never thrown away.
    pub fn load(&mut self, path: &str, bytes: &[u8]) -> Result<bool, EditError> {
        if self.documents.contains_key(path) {
            log::debug!("{} already loaded, ignoring", path);
            return Ok(false);
        }

        let document =
            parse_document(path, bytes, &self.options).map_err(|e| EditError::parse(path, &e))?;
        log::info!("Loaded {}", path);
        self.documents.insert(path.to_string(), document);
        Ok(true)
    }

    pub fn get(&self, path: &str) -> Option<&ParsedDocument> {
        self.documents.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut ParsedDocument> {
        self.documents.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.documents.contains_key(path)
    }

    /// Iterates over `(path, document)` pairs in load order.
    pub fn all(&self) -> impl Iterator<Item = (&str, &ParsedDocument)> {
        self.documents.iter().map(|(path, doc)| (path.as_str(), doc))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ParsedDocument)> {
        self.documents
            .iter_mut()
            .map(|(path, doc)| (path.as_str(), doc))
    }

    /// Returns the loaded paths in load order.
    pub fn paths(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Writes the document loaded from `path` back to that same path.
    ///
    /// Only that one file is touched.
    pub fn save(&self, path: &str, config: &Config) -> Result<(), EditError> {
        let document = self
            .documents
            .get(path)
            .ok_or_else(|| EditError::selection(format!("No document loaded from {}", path)))?;

        save_xml_file(path, document, config).map_err(|e| EditError::io(path, &e))?;
        log::debug!("Saved {}", path);
        Ok(())
    }
}
